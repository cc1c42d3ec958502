//! # Reporter
//!
//! The rendering consumer of the analytics pipeline. Takes the plain output
//! records (buckets, equity curve, risk metrics, forecast) and formats them
//! as terminal tables. All presentation decisions live here; the analytics
//! crates never format anything.

pub mod render;

pub use render::{render_buckets, render_equity, render_forecast, render_summary};
