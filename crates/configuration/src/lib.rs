use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{ApiConfig, ApiKeys, Config, ReportSettings};

/// Loads the application configuration.
///
/// Reads `config.toml`, then applies `MERIDIAN_`-prefixed environment
/// variables on top (e.g. `MERIDIAN_API__PRODUCTION__KEY`), and
/// deserializes the result into the strongly-typed `Config` struct.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config.toml").required(false))
        .add_source(config::Environment::with_prefix("MERIDIAN").separator("__"))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;

    if config.report.lookback_days == 0 {
        return Err(ConfigError::ValidationError(
            "report.lookback_days must be at least 1".to_string(),
        ));
    }
    if config.report.forecast_months == 0 {
        return Err(ConfigError::ValidationError(
            "report.forecast_months must be at least 1".to_string(),
        ));
    }

    Ok(config)
}
