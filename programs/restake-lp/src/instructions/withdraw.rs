use tracing::info;

use super::Context;
use crate::error::{LedgerError, Result};
use crate::events::{Asset, LedgerEvent, Transfer};
use crate::require;

// ─── Liquidity positions ──────────────────────────────────────────────────────
/// Close a liquidity position and pay both legs back to its owner.
/// Allowed even when the protocol has since been tombstoned.
pub fn withdraw_liquidity(ctx: &mut Context, index: usize) -> Result<(u64, u64)> {
    ctx.require_not_paused()?;
    let user = ctx.caller;
    let account = ctx
        .state
        .users
        .get(&user)
        .ok_or(LedgerError::PositionNotFound { index })?;
    let position = account
        .liquidity_positions
        .get(index)
        .ok_or(LedgerError::PositionNotFound { index })?;
    require!(position.active, LedgerError::PositionInactive { index });

    let position = position.clone();
    let new_balance = account.liquidity_balance.saturating_sub(position.liquidity as u128);
    let custody_a = ctx.state.custody_after_debit(&position.token_a, position.amount_a)?;
    let custody_b = ctx.state.custody_after_debit(&position.token_b, position.amount_b)?;

    let account = ctx.state.user_mut(&user);
    account.liquidity_positions[index].active = false;
    account.liquidity_balance = new_balance;
    ctx.state.totals.liquidity = ctx
        .state
        .totals
        .liquidity
        .saturating_sub(position.liquidity as u128);
    ctx.state.set_custody(position.token_a, custody_a);
    ctx.state.set_custody(position.token_b, custody_b);

    ctx.pay(Transfer { recipient: user, asset: Asset::Token(position.token_a), amount: position.amount_a });
    ctx.pay(Transfer { recipient: user, asset: Asset::Token(position.token_b), amount: position.amount_b });

    info!(%user, index, liquidity = position.liquidity, "liquidity withdrawn");
    ctx.emit(LedgerEvent::LiquidityWithdrawn { user, position: index, liquidity: position.liquidity });
    Ok((position.amount_a, position.amount_b))
}

// ─── Restaking positions ──────────────────────────────────────────────────────
pub fn withdraw_restaking(ctx: &mut Context, index: usize) -> Result<u64> {
    ctx.require_not_paused()?;
    let user = ctx.caller;
    let position = ctx
        .state
        .users
        .get(&user)
        .and_then(|u| u.restaking_positions.get(index))
        .ok_or(LedgerError::PositionNotFound { index })?;
    require!(position.active, LedgerError::PositionInactive { index });

    let (token, amount) = (position.token, position.amount);
    let custody = ctx.state.custody_after_debit(&token, amount)?;

    ctx.state.user_mut(&user).restaking_positions[index].active = false;
    ctx.state.totals.restaked = ctx.state.totals.restaked.saturating_sub(amount as u128);
    ctx.state.set_custody(token, custody);

    ctx.pay(Transfer { recipient: user, asset: Asset::Token(token), amount });

    info!(%user, index, amount, "restaking withdrawn");
    ctx.emit(LedgerEvent::RestakingWithdrawn { user, position: index, amount });
    Ok(amount)
}
