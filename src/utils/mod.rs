//! Utility functions for holdscore.
//!
//! - [`conversion`] - smallest-unit token amounts to decimals
//! - [`address`] - address normalization

mod address;
mod conversion;

pub use address::{normalize_address, same_address, shorten_address};
pub use conversion::{big_pow10, u256_to_bigdecimal};
