use serde::{Deserialize, Serialize};

/// The category of a raw ledger event, as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomeCategory {
    RealizedPnl,
    FundingFee,
    Commission,
    Deposit,
    Withdrawal,
    TransferIn,
    TransferOut,
}

impl IncomeCategory {
    /// Returns true for the categories that feed the PnL aggregates.
    pub fn is_pnl(&self) -> bool {
        matches!(
            self,
            IncomeCategory::RealizedPnl | IncomeCategory::FundingFee | IncomeCategory::Commission
        )
    }

    /// Returns true for the categories that feed the capital-flow aggregates.
    pub fn is_capital_flow(&self) -> bool {
        !self.is_pnl()
    }
}

/// The bucket length used by the temporal aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

/// The sign of the fitted monthly PnL trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Flat,
}

/// Which of the three forward projections a scenario represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Optimistic,
    Average,
    Pessimistic,
}
