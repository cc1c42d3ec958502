pub mod enums;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Granularity, IncomeCategory, ScenarioKind, TrendDirection};
pub use structs::{
    Bucket, DayStat, EquityPoint, ForecastModel, LedgerEvent, NormalizedRecord, PriceSample,
    RiskMetrics, ScenarioProjection,
};
