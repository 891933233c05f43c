//! Holding-time points.
//!
//! `points = balance * POINTS_PER_TOKEN * blocks_held` and
//! `level = floor(points / POINTS_PER_LEVEL) + 1`, both in exact decimal
//! arithmetic so 18-decimal balances and long holding periods lose nothing.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::utils::{big_pow10, u256_to_bigdecimal};

/// Decimal count of the tracked token.
pub const TOKEN_DECIMALS: u8 = 18;

/// Points needed per level.
pub const POINTS_PER_LEVEL: u32 = 650;

/// Points earned per whole token per block held: 1e-10.
pub static POINTS_PER_TOKEN: Lazy<BigDecimal> = Lazy::new(|| BigDecimal::new(BigInt::from(1), 10));

/// Result of [`compute_score`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    pub points: BigDecimal,
    pub level: u64,
}

/// Everything shown for one checked address. Recomputed on every request;
/// only `points` is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsSnapshot {
    pub token_balance: BigDecimal,
    pub blocks_held: u64,
    pub points: BigDecimal,
    pub level: u64,
}

/// Score a decimal token balance held from `start_block` to `current_block`.
pub fn compute_score(token_balance: &BigDecimal, current_block: u64, start_block: u64) -> Result<Score> {
    let blocks_held = blocks_held(current_block, start_block)?;

    if token_balance.is_negative() {
        return Err(Error::Validation(format!(
            "token balance cannot be negative: {}",
            token_balance
        )));
    }

    let points = token_balance * &*POINTS_PER_TOKEN * BigDecimal::from(blocks_held);
    let level = level_for(&points);

    Ok(Score { points, level })
}

/// Score a raw smallest-unit balance, as returned by `balanceOf`.
pub fn snapshot(raw_balance: U256, current_block: u64, start_block: u64) -> Result<PointsSnapshot> {
    let token_balance = u256_to_bigdecimal(raw_balance, TOKEN_DECIMALS);
    let Score { points, level } = compute_score(&token_balance, current_block, start_block)?;

    Ok(PointsSnapshot {
        token_balance,
        blocks_held: current_block - start_block,
        points,
        level,
    })
}

fn blocks_held(current_block: u64, start_block: u64) -> Result<u64> {
    current_block.checked_sub(start_block).ok_or_else(|| {
        Error::Validation(format!(
            "current block {} is before start block {}",
            current_block, start_block
        ))
    })
}

/// `floor(points / POINTS_PER_LEVEL) + 1`, saturating at `u64::MAX`.
///
/// Done on the unscaled integer so no division rounding can push a value
/// just below a level boundary over it.
pub fn level_for(points: &BigDecimal) -> u64 {
    let (digits, scale) = points.as_bigint_and_exponent();
    let per_level = BigInt::from(POINTS_PER_LEVEL);

    let (numerator, denominator) = if scale >= 0 {
        (digits, per_level * big_pow10(scale as u32))
    } else {
        (digits * big_pow10(scale.unsigned_abs() as u32), per_level)
    };

    // Non-negative operands: truncation is floor
    let completed = numerator / denominator;

    completed
        .to_u64()
        .and_then(|levels| levels.checked_add(1))
        .unwrap_or(u64::MAX)
}
