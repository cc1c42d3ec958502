use crate::enums::{IncomeCategory, ScenarioKind, TrendDirection};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One daily candle of the reference price series (BTC quoted in USDT).
///
/// Samples are kept in ascending time order; gaps between days are tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub close: Decimal,
}

/// A raw account ledger event exactly as retrieved from the exchange.
///
/// `native_amount` is signed: outflows (withdrawals, transfers out,
/// commissions, negative PnL) carry a negative amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub timestamp: DateTime<Utc>,
    pub category: IncomeCategory,
    pub asset: String,
    pub native_amount: Decimal,
}

/// A ledger event converted into the BTC reporting denomination.
///
/// Derived 1:1 from a `LedgerEvent` by the normalizer; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub timestamp: DateTime<Utc>,
    pub category: IncomeCategory,
    pub btc_amount: Decimal,
}

/// One aggregation window (day, week or month) with its running total.
///
/// Buckets are sparse: a period with no contributing records is absent from
/// the sequence, not zero-filled. After sorting by `period_start`,
/// `cumulative_btc` of bucket `i` equals the sum of `sum_btc` over `0..=i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub period_key: String,
    pub period_start: DateTime<Utc>,
    pub sum_btc: Decimal,
    pub cumulative_btc: Decimal,
}

/// A single point of the reconstructed equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity_btc: Decimal,
}

/// The single best or worst trading day, with its matching return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayStat {
    pub date: NaiveDate,
    pub pnl_btc: Decimal,
    pub return_pct: Decimal,
}

/// A read-only snapshot of the account's risk statistics.
///
/// `max_drawdown_btc` is zero or negative; `win_rate` is a fraction in
/// `0..=1`. When fewer than 2 equity points exist the analyzer returns
/// `RiskMetrics::neutral()` instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub sharpe: Decimal,
    pub max_drawdown_btc: Decimal,
    pub max_drawdown_pct: Decimal,
    pub best_day: Option<DayStat>,
    pub worst_day: Option<DayStat>,
    pub win_rate: Decimal,
    pub profit_factor: Decimal,
}

impl RiskMetrics {
    /// The documented all-zero snapshot used when there is not enough data.
    pub fn neutral() -> Self {
        Self {
            sharpe: Decimal::ZERO,
            max_drawdown_btc: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            best_day: None,
            worst_day: None,
            win_rate: Decimal::ZERO,
            profit_factor: Decimal::ZERO,
        }
    }
}

impl Default for RiskMetrics {
    fn default() -> Self {
        Self::neutral()
    }
}

/// One forward projection of the account balance.
///
/// Both projections are exposed; `compound_balance_btc` is the primary one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub kind: ScenarioKind,
    pub monthly_pnl_btc: Decimal,
    pub linear_balance_btc: Decimal,
    pub compound_balance_btc: Decimal,
    pub total_roi_pct: Decimal,
    pub annualized_roi_pct: Decimal,
}

/// The fitted monthly trend plus its three scenario projections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastModel {
    pub avg_monthly_pnl_btc: Decimal,
    pub std_dev_monthly_pnl_btc: Decimal,
    pub trend_slope: Decimal,
    pub trend_intercept: Decimal,
    pub r_squared: Decimal,
    pub trend_direction: TrendDirection,
    pub horizon_months: u32,
    pub scenarios: Vec<ScenarioProjection>,
}

impl ForecastModel {
    /// The all-zero model returned when fewer than 2 monthly buckets exist.
    pub fn zero(horizon_months: u32) -> Self {
        Self {
            avg_monthly_pnl_btc: Decimal::ZERO,
            std_dev_monthly_pnl_btc: Decimal::ZERO,
            trend_slope: Decimal::ZERO,
            trend_intercept: Decimal::ZERO,
            r_squared: Decimal::ZERO,
            trend_direction: TrendDirection::Flat,
            horizon_months,
            scenarios: Vec::new(),
        }
    }
}
