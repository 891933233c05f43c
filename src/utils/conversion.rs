//! Type conversion utilities.
//!
//! Converts raw U256 token amounts into exact decimals. Nothing here goes
//! through f64.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use once_cell::sync::Lazy;

/// Convert a smallest-unit U256 amount into a decimal token amount.
///
/// # Example
/// ```ignore
/// let value = U256::from(1_000_000_000_000_000_000u128); // 1e18
/// let adjusted = u256_to_bigdecimal(value, 18); // 1
/// ```
pub fn u256_to_bigdecimal(value: U256, decimals: u8) -> BigDecimal {
    // Bytes avoid a decimal string round-trip
    let bytes: [u8; 32] = value.to_le_bytes();
    let big_int = BigInt::from_bytes_le(num_bigint::Sign::Plus, &bytes);

    BigDecimal::new(big_int, i64::from(decimals))
}

static POW10_CACHE: Lazy<[BigInt; 25]> =
    Lazy::new(|| std::array::from_fn(|i| BigInt::from(10u32).pow(i as u32)));

/// Compute 10^exp as BigInt.
pub fn big_pow10(exp: u32) -> BigInt {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigInt::from(10u32).pow(exp)
    }
}
