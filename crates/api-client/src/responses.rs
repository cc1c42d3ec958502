use chrono::{NaiveDateTime, TimeZone, Utc};
use core_types::{IncomeCategory, LedgerEvent};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.

/// One row of `GET /fapi/v1/income`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRow {
    pub symbol: String,
    pub income_type: String,
    /// Signed amount, quoted in `asset`.
    pub income: Decimal,
    pub asset: String,
    pub time: i64,
    pub tran_id: i64,
}

impl IncomeRow {
    /// Maps the row to a ledger event. Income types outside the report's
    /// scope (bonuses, rebates, ...) map to `None` and are skipped; the
    /// ambiguous `TRANSFER` type resolves direction by amount sign.
    pub fn to_ledger_event(&self) -> Option<LedgerEvent> {
        let category = match self.income_type.as_str() {
            "REALIZED_PNL" => IncomeCategory::RealizedPnl,
            "FUNDING_FEE" => IncomeCategory::FundingFee,
            "COMMISSION" => IncomeCategory::Commission,
            "TRANSFER" => {
                if self.income.is_sign_negative() {
                    IncomeCategory::TransferOut
                } else {
                    IncomeCategory::TransferIn
                }
            }
            other => {
                debug!(income_type = other, tran_id = self.tran_id, "skipping income row");
                return None;
            }
        };

        Some(LedgerEvent {
            timestamp: Utc.timestamp_millis_opt(self.time).single()?,
            category,
            asset: self.asset.clone(),
            native_amount: self.income,
        })
    }
}

/// A single asset's balance from `GET /fapi/v2/balance`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub account_alias: String,
    pub asset: String,
    pub balance: Decimal,
    pub cross_wallet_balance: Decimal,
    pub cross_un_pnl: Decimal,
    pub available_balance: Decimal,
}

/// One symbol's latest price from `GET /fapi/v1/ticker/price`.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// One row of `GET /sapi/v1/capital/deposit/hisrec` (spot wallet).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRow {
    pub amount: Decimal,
    pub coin: String,
    pub insert_time: i64,
    pub status: i32,
}

impl DepositRow {
    pub fn to_ledger_event(&self) -> Option<LedgerEvent> {
        Some(LedgerEvent {
            timestamp: Utc.timestamp_millis_opt(self.insert_time).single()?,
            category: IncomeCategory::Deposit,
            asset: self.coin.clone(),
            native_amount: self.amount,
        })
    }
}

/// One row of `GET /sapi/v1/capital/withdraw/history` (spot wallet).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRow {
    pub amount: Decimal,
    pub coin: String,
    /// Binance returns this as "YYYY-MM-DD HH:MM:SS" rather than millis.
    pub apply_time: String,
    pub status: i32,
}

impl WithdrawRow {
    /// Withdrawals are reported positive by the API; the ledger convention
    /// is a signed outflow.
    pub fn to_ledger_event(&self) -> Option<LedgerEvent> {
        let naive = NaiveDateTime::parse_from_str(&self.apply_time, "%Y-%m-%d %H:%M:%S")
            .inspect_err(|e| debug!(apply_time = %self.apply_time, %e, "skipping withdrawal with unparseable time"))
            .ok()?;
        Some(LedgerEvent {
            timestamp: Utc.from_utc_datetime(&naive),
            category: IncomeCategory::Withdrawal,
            asset: self.coin.clone(),
            native_amount: -self.amount,
        })
    }
}

/// Represents an error response from the Binance API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i16,
    pub msg: String,
}
