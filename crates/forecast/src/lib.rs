//! # Trend & Forecast Engine
//!
//! Fits a least-squares trend to the monthly PnL aggregates and projects
//! optimistic/average/pessimistic scenarios forward, both linearly and
//! compounded. Every division and power has an explicit guard; degenerate
//! input produces the all-zero model rather than an error.

pub mod model;

pub use model::fit;
