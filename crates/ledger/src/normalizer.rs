use core_types::{LedgerEvent, NormalizedRecord};
use prices::PriceIndex;
use rust_decimal::Decimal;
use tracing::warn;

/// Converts raw ledger events into canonical BTC-denominated records.
///
/// Each event maps to exactly one record. PnL categories (realized PnL,
/// funding fees, commissions) are quoted amounts and divide by the BTC
/// reference price at the event's timestamp, falling back to the live spot
/// price when the historical series has no sample. Capital-flow categories
/// (deposits, withdrawals, transfers) can arrive in any asset and go through
/// the general conversion path.
///
/// Pure: deterministic for identical inputs, no state, no side effects
/// beyond logging unconvertible amounts.
pub fn normalize(events: &[LedgerEvent], index: &PriceIndex) -> Vec<NormalizedRecord> {
    events
        .iter()
        .map(|event| NormalizedRecord {
            timestamp: event.timestamp,
            category: event.category,
            btc_amount: to_btc(event, index),
        })
        .collect()
}

fn to_btc(event: &LedgerEvent, index: &PriceIndex) -> Decimal {
    if event.native_amount.is_zero() {
        return Decimal::ZERO;
    }
    if event.asset == "BTC" {
        return event.native_amount;
    }

    if event.category.is_pnl() {
        // Income is quoted in the contract's quote asset; divide by the BTC
        // reference price closest to the event time.
        match index.price_at(event.timestamp).or_else(|| index.btc_spot()) {
            Some(price) if !price.is_zero() => event.native_amount / price,
            _ => {
                warn!(
                    asset = %event.asset,
                    amount = %event.native_amount,
                    "no reference price for income event, contributing zero"
                );
                Decimal::ZERO
            }
        }
    } else {
        index.convert(&event.asset, event.native_amount)
    }
}
