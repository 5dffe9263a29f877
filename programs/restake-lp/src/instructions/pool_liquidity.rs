use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::Context;
use crate::error::{LedgerError, Result};
use crate::events::{Asset, LedgerEvent, Transfer};
use crate::math::{checked_add, pool_liquidity, proportional_share};
use crate::require;
use crate::state::{Pool, UserPoolPosition};

pub(crate) fn active_pool(ctx: &Context, pool: &Pubkey) -> Result<Pool> {
    let record = ctx
        .state
        .registry
        .pools
        .get(pool)
        .ok_or(LedgerError::PoolNotFound(*pool))?;
    require!(record.active, LedgerError::PoolInactive(*pool));
    Ok(record.clone())
}

/// The caller's pool position at `index`, checked to belong to `pool`.
pub(crate) fn owned_position(ctx: &Context, pool: &Pubkey, index: usize) -> Result<UserPoolPosition> {
    let position = ctx
        .state
        .users
        .get(&ctx.caller)
        .and_then(|u| u.pool_positions.get(index))
        .ok_or(LedgerError::PositionNotFound { index })?;
    require!(position.pool == *pool, LedgerError::PoolMismatch { index, pool: *pool });
    require!(position.active, LedgerError::PositionInactive { index });
    Ok(position.clone())
}

// ─── add_liquidity ────────────────────────────────────────────────────────────
/// Open a pool position. liquidity = floor(sqrt(amount_a × amount_b))
pub fn add_liquidity(
    ctx: &mut Context,
    pool: Pubkey,
    amount_a: u64,
    amount_b: u64,
    strategy: String,
) -> Result<usize> {
    ctx.require_not_paused()?;
    let record = active_pool(ctx, &pool)?;
    require!(amount_a > 0 && amount_b > 0, LedgerError::ZeroAmount);

    let user = ctx.caller;
    let open_positions = ctx.state.users.get(&user).map_or(0, |u| u.pool_positions.len());
    let max = ctx.config.max_pool_positions_per_user;
    require!(open_positions < max, LedgerError::PositionCapReached { max });

    let liquidity = pool_liquidity(amount_a, amount_b)?;
    let pool_total = checked_add(record.total_liquidity, liquidity as u128)?;
    let global_total = checked_add(ctx.state.totals.pool_liquidity, liquidity as u128)?;
    let custody_a = ctx.state.custody_after_credit(&record.token_a, amount_a)?;
    let custody_b = ctx.state.custody_after_credit(&record.token_b, amount_b)?;

    let now = ctx.now;
    let account = ctx.state.user_mut(&user);
    account.pool_positions.push(UserPoolPosition {
        pool,
        liquidity,
        amount_a,
        amount_b,
        strategy,
        fees_earned: 0,
        active: true,
        opened_at: now,
    });
    let index = account.pool_positions.len() - 1;

    if let Some(p) = ctx.state.registry.pools.get_mut(&pool) {
        p.total_liquidity = pool_total;
    }
    ctx.state.totals.pool_liquidity = global_total;
    ctx.state.set_custody(record.token_a, custody_a);
    ctx.state.set_custody(record.token_b, custody_b);

    info!(%user, %pool, index, amount_a, amount_b, liquidity, "pool liquidity added");
    ctx.emit(LedgerEvent::PoolLiquidityAdded {
        user,
        pool,
        position: index,
        amount_a,
        amount_b,
        liquidity,
    });
    Ok(index)
}

// ─── remove_liquidity ─────────────────────────────────────────────────────────
/// Withdraw `liquidity` from a pool position, releasing each leg in
/// proportion: amount_k = liquidity × position.amount_k / position.liquidity.
/// Truncation dust stays in the position. A drained position is closed.
pub fn remove_liquidity(
    ctx: &mut Context,
    pool: Pubkey,
    index: usize,
    liquidity: u64,
) -> Result<(u64, u64)> {
    ctx.require_not_paused()?;
    let record = ctx
        .state
        .registry
        .pools
        .get(&pool)
        .cloned()
        .ok_or(LedgerError::PoolNotFound(pool))?;
    let position = owned_position(ctx, &pool, index)?;
    require!(liquidity > 0, LedgerError::ZeroAmount);
    require!(
        liquidity <= position.liquidity,
        LedgerError::InsufficientLiquidity {
            requested: liquidity as u128,
            available: position.liquidity as u128,
        }
    );

    let amount_a = proportional_share(liquidity, position.amount_a, position.liquidity)?;
    let amount_b = proportional_share(liquidity, position.amount_b, position.liquidity)?;
    let custody_a = ctx.state.custody_after_debit(&record.token_a, amount_a)?;
    let custody_b = ctx.state.custody_after_debit(&record.token_b, amount_b)?;

    let user = ctx.caller;
    let account = ctx.state.user_mut(&user);
    let pos = &mut account.pool_positions[index];
    pos.liquidity -= liquidity;
    pos.amount_a -= amount_a;
    pos.amount_b -= amount_b;
    if pos.liquidity == 0 {
        pos.active = false;
    }

    if let Some(p) = ctx.state.registry.pools.get_mut(&pool) {
        p.total_liquidity = p.total_liquidity.saturating_sub(liquidity as u128);
    }
    ctx.state.totals.pool_liquidity =
        ctx.state.totals.pool_liquidity.saturating_sub(liquidity as u128);
    ctx.state.set_custody(record.token_a, custody_a);
    ctx.state.set_custody(record.token_b, custody_b);

    for (token, amount) in [(record.token_a, amount_a), (record.token_b, amount_b)] {
        if amount > 0 {
            ctx.pay(Transfer { recipient: user, asset: Asset::Token(token), amount });
        }
    }

    info!(%user, %pool, index, liquidity, amount_a, amount_b, "pool liquidity removed");
    ctx.emit(LedgerEvent::PoolLiquidityRemoved {
        user,
        pool,
        position: index,
        liquidity,
        amount_a,
        amount_b,
    });
    Ok((amount_a, amount_b))
}
