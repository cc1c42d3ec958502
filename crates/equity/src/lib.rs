//! # Equity Reconstructor
//!
//! Derives a synthetic equity curve from cumulative daily PnL and a known
//! current balance. The curve's shape is exact relative to the recorded
//! PnL; its level is anchored so the last point matches the balance the
//! exchange reports today.

pub mod curve;

pub use curve::reconstruct;
