use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::provide_liquidity::check_deposit;
use super::Context;
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::math::checked_add;
use crate::require;
use crate::state::RestakingPosition;

/// Record a single-token restake. No per-user position cap applies.
pub fn handler(
    ctx: &mut Context,
    protocol: Pubkey,
    token: Pubkey,
    amount: u64,
    strategy: String,
) -> Result<usize> {
    ctx.require_not_paused()?;
    require!(
        ctx.state.registry.is_protocol_active(&protocol),
        LedgerError::UnsupportedProtocol(protocol)
    );
    check_deposit(ctx, &token, amount, ctx.config.min_restake_amount)?;

    let new_total = checked_add(ctx.state.totals.restaked, amount as u128)?;
    let custody = ctx.state.custody_after_credit(&token, amount)?;

    let user = ctx.caller;
    let now = ctx.now;
    let account = ctx.state.user_mut(&user);
    account.restaking_positions.push(RestakingPosition {
        protocol,
        token,
        amount,
        strategy: strategy.clone(),
        timestamp: now,
        active: true,
    });
    let index = account.restaking_positions.len() - 1;

    ctx.state.totals.restaked = new_total;
    ctx.state.set_custody(token, custody);

    info!(%user, %protocol, %token, index, amount, %strategy, "restaking executed");
    ctx.emit(LedgerEvent::RestakingExecuted {
        user,
        protocol,
        token,
        position: index,
        amount,
        strategy,
    });
    Ok(index)
}
