use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::pool_liquidity::{active_pool, owned_position};
use super::Context;
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::math::{checked_add, harvest_amount};
use crate::state::PoolYield;

/// Credit a flat 0.5 % of the position's current liquidity as yield.
/// No cooldown: each call credits the same amount again. The pool must be active.
pub fn handler(ctx: &mut Context, pool: Pubkey, index: usize) -> Result<u64> {
    let record = active_pool(ctx, &pool)?;
    let position = owned_position(ctx, &pool, index)?;
    let user = ctx.caller;

    let amount = harvest_amount(position.liquidity);
    let fees_earned = position.fees_earned.checked_add(amount).ok_or(LedgerError::MathOverflow)?;
    let (user_total, user_pool_total) = {
        let account = ctx.state.users.get(&user).ok_or(LedgerError::PositionNotFound { index })?;
        (
            checked_add(account.pool_yield_total, amount as u128)?,
            checked_add(account.pool_yield(&pool), amount as u128)?,
        )
    };
    let pool_fees = checked_add(record.total_fees, amount as u128)?;
    let global = checked_add(ctx.state.totals.pool_yield, amount as u128)?;

    let account = ctx.state.user_mut(&user);
    account.pool_positions[index].fees_earned = fees_earned;
    account.pool_yield_total = user_total;
    account.pool_yields.upsert(PoolYield { pool, amount: user_pool_total });
    if let Some(p) = ctx.state.registry.pools.get_mut(&pool) {
        p.total_fees = pool_fees;
    }
    ctx.state.totals.pool_yield = global;

    info!(%user, %pool, index, amount, "yield harvested");
    ctx.emit(LedgerEvent::YieldHarvested { user, pool, position: index, amount });
    Ok(amount)
}
