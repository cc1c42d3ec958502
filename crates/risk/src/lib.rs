//! # Risk Analyzer
//!
//! Derives the account's risk statistics (Sharpe ratio, drawdown, win/loss
//! stats, profit factor) from the reconstructed equity curve and the daily
//! PnL stream. A pure, stateless calculation: given partial or empty input
//! it degrades to a neutral snapshot instead of failing, so a report can
//! always render.

pub mod analyzer;

pub use analyzer::{analyze, PROFIT_FACTOR_NO_LOSSES};
