//! # Event Normalizer
//!
//! Converts raw, multi-asset ledger events into canonical BTC-denominated
//! records. This is the only place where asset conversion decisions are
//! made; everything downstream works purely in BTC.

pub mod normalizer;

pub use normalizer::normalize;
