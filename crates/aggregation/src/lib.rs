//! # Temporal Aggregator
//!
//! Buckets BTC-denominated records into daily/weekly/monthly sums with
//! running cumulative totals. Aggregation is a pure fold over an immutable
//! snapshot; re-running it on the same records yields the same buckets.

pub mod buckets;

pub use buckets::{aggregate, default_week_anchor};
