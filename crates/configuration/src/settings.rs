use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub report: ReportSettings,
}

/// Exchange credentials for both environments.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub production: ApiKeys,
    pub testnet: ApiKeys,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeys {
    pub key: String,
    pub secret: String,
}

/// Parameters for a single report run.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    /// How far back to pull ledger history, in days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// How many months forward the scenario projections run.
    #[serde(default = "default_forecast_months")]
    pub forecast_months: u32,

    /// The reference pair for the historical BTC price series.
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            forecast_months: default_forecast_months(),
            symbol: default_symbol(),
        }
    }
}

fn default_lookback_days() -> u32 {
    90
}

fn default_forecast_months() -> u32 {
    6
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}
