//! # Price Index
//!
//! Historical reference prices plus live spot prices, with cross-asset
//! conversion into the BTC reporting denomination.
//!
//! The index is built once per run from already-retrieved market data and is
//! immutable afterwards. Lookups are pure; a missing rate degrades to zero
//! rather than failing, since the report must render with partial data.

pub mod error;
pub mod index;

pub use error::PriceIndexError;
pub use index::PriceIndex;
