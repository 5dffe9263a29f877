//! Integer math shared by the ledger modules. Every division floors.

use crate::constants::*;
use crate::error::{LedgerError, Result};

// ─── Integer square root (Babylonian method) ──────────────────────────────────
pub fn isqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let mut x = n;
    let mut y = (x + 1) >> 1;
    while y < x {
        x = y;
        y = (y + n / y) >> 1;
    }
    x
}

/// Position-ledger liquidity: (a + b) / 2.
pub fn mean_liquidity(amount_a: u64, amount_b: u64) -> u64 {
    ((amount_a as u128 + amount_b as u128) / 2) as u64
}

/// Pool liquidity: floor(sqrt(a × b)).
pub fn pool_liquidity(amount_a: u64, amount_b: u64) -> Result<u64> {
    let product = (amount_a as u128)
        .checked_mul(amount_b as u128)
        .ok_or(LedgerError::MathOverflow)?;
    u64::try_from(isqrt(product)).map_err(|_| LedgerError::MathOverflow)
}

/// Share of `amount` released by withdrawing `liquidity` out of `total`.
/// Truncates toward zero; the remainder stays in the position.
pub fn proportional_share(liquidity: u64, amount: u64, total: u64) -> Result<u64> {
    if total == 0 {
        return Err(LedgerError::MathOverflow);
    }
    let share = (liquidity as u128)
        .checked_mul(amount as u128)
        .ok_or(LedgerError::MathOverflow)?
        / total as u128;
    u64::try_from(share).map_err(|_| LedgerError::MathOverflow)
}

/// Flat harvest: 0.5 % of the position's current liquidity.
pub fn harvest_amount(liquidity: u64) -> u64 {
    (liquidity as u128 * HARVEST_RATE_NUMERATOR / HARVEST_RATE_DENOMINATOR) as u64
}

/// floor(total × weight / 10 000)
pub fn weighted_amount(total: u64, weight_bps: u16) -> u64 {
    (total as u128 * weight_bps as u128 / BPS_DENOMINATOR) as u64
}

/// One day of an annual yield: floor(amount × apy / (10 000 × 365)).
pub fn daily_yield(amount: u64, apy_bps: u16) -> u64 {
    (amount as u128 * apy_bps as u128 / (BPS_DENOMINATOR * DAYS_PER_YEAR)) as u64
}

pub fn checked_add(a: u128, b: u128) -> Result<u128> {
    a.checked_add(b).ok_or(LedgerError::MathOverflow)
}

/// Global and task fees share the configured bounds.
pub fn check_fee_bounds(fee_bps: u16, min_bps: u16, max_bps: u16) -> Result<()> {
    if fee_bps < min_bps || fee_bps > max_bps {
        return Err(LedgerError::FeeOutOfBounds { fee_bps, min_bps, max_bps });
    }
    Ok(())
}
