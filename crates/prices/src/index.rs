use crate::error::PriceIndexError;
use chrono::{DateTime, Utc};
use core_types::PriceSample;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

/// Stable-value assets that are treated as 1:1 with the USD leg of a
/// BTC-quote pair when converting into BTC.
const STABLE_ASSETS: [&str; 6] = ["USDT", "USDC", "BUSD", "FDUSD", "TUSD", "DAI"];

/// A historical price series plus a live spot-price map.
///
/// Built once per run from already-retrieved market data, then queried
/// repeatedly by the normalizer. The index is immutable after construction.
#[derive(Debug, Clone)]
pub struct PriceIndex {
    /// Daily reference samples (BTC quoted in USDT), ascending in time.
    samples: Vec<PriceSample>,
    /// Live symbol -> price map, e.g. "ETHUSDT" -> 3000.
    spot: HashMap<String, Decimal>,
}

impl PriceIndex {
    /// Builds the index, validating that sample timestamps are strictly
    /// increasing. Gaps between samples are fine; reordering is not.
    pub fn new(
        samples: Vec<PriceSample>,
        spot: HashMap<String, Decimal>,
    ) -> Result<Self, PriceIndexError> {
        for (i, pair) in samples.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(PriceIndexError::UnorderedSamples(i + 1));
            }
        }
        Ok(Self { samples, spot })
    }

    /// Returns the close price of the sample nearest in time to `timestamp`.
    ///
    /// Binary search over the sorted series; when two samples are equally
    /// distant, the earlier one wins. Returns `None` for an empty index, in
    /// which case callers fall back to the live spot price.
    pub fn price_at(&self, timestamp: DateTime<Utc>) -> Option<Decimal> {
        if self.samples.is_empty() {
            return None;
        }

        let idx = self
            .samples
            .partition_point(|s| s.timestamp < timestamp);

        let candidate = if idx == 0 {
            &self.samples[0]
        } else if idx == self.samples.len() {
            &self.samples[idx - 1]
        } else {
            let before = &self.samples[idx - 1];
            let after = &self.samples[idx];
            let dist_before = timestamp - before.timestamp;
            let dist_after = after.timestamp - timestamp;
            // Ties favor the earlier sample.
            if dist_before <= dist_after {
                before
            } else {
                after
            }
        };

        Some(candidate.close)
    }

    /// Looks up a live spot price by symbol, e.g. "ETHUSDT".
    pub fn spot(&self, symbol: &str) -> Option<Decimal> {
        self.spot.get(symbol).copied()
    }

    /// The live BTC reference price (BTC quoted in the first stable asset
    /// for which a pair exists). This is the fallback when the historical
    /// series has no usable sample.
    pub fn btc_spot(&self) -> Option<Decimal> {
        STABLE_ASSETS
            .iter()
            .find_map(|stable| self.spot(&format!("BTC{stable}")))
    }

    /// Converts an amount of `asset` into BTC using the live spot map.
    ///
    /// Resolution order: BTC is the identity; a stable-value asset divides
    /// by the BTC price quoted in that asset; a direct `{asset}BTC` pair
    /// multiplies by its rate; otherwise triangulate through USDT. An asset
    /// with no convertible rate contributes zero; unconvertible amounts are
    /// logged, never fatal.
    pub fn convert(&self, asset: &str, amount: Decimal) -> Decimal {
        if amount.is_zero() {
            return Decimal::ZERO;
        }
        if asset == "BTC" {
            return amount;
        }

        if STABLE_ASSETS.contains(&asset) {
            if let Some(btc_quote) = self.spot(&format!("BTC{asset}")) {
                if !btc_quote.is_zero() {
                    return amount / btc_quote;
                }
            }
        }

        if let Some(rate) = self.spot(&format!("{asset}BTC")) {
            return amount * rate;
        }

        if let (Some(asset_usdt), Some(btc_usdt)) =
            (self.spot(&format!("{asset}USDT")), self.spot("BTCUSDT"))
        {
            if !btc_usdt.is_zero() {
                return amount * asset_usdt / btc_usdt;
            }
        }

        warn!(asset, %amount, "no convertible rate for asset, contributing zero");
        Decimal::ZERO
    }
}
