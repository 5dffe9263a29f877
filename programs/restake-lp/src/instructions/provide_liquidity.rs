use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::Context;
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::math::{checked_add, mean_liquidity};
use crate::require;
use crate::state::LiquidityPosition;

/// Check that `token` is allowlisted and `amount` clears its minimum.
pub(crate) fn check_deposit(
    ctx: &Context,
    token: &Pubkey,
    amount: u64,
    config_minimum: u64,
) -> Result<()> {
    require!(
        ctx.state.registry.active_token(token).is_some(),
        LedgerError::UnsupportedToken(*token)
    );
    let minimum = ctx.minimum_for(config_minimum, token);
    require!(amount >= minimum, LedgerError::AmountBelowMinimum { amount, minimum });
    Ok(())
}

// ─── Handler ──────────────────────────────────────────────────────────────────
/// Record a token-pair stake in `protocol`.
/// liquidity = (amount_a + amount_b) / 2
pub fn handler(
    ctx: &mut Context,
    protocol: Pubkey,
    token_a: Pubkey,
    token_b: Pubkey,
    amount_a: u64,
    amount_b: u64,
) -> Result<usize> {
    ctx.require_not_paused()?;
    require!(
        ctx.state.registry.is_protocol_active(&protocol),
        LedgerError::UnsupportedProtocol(protocol)
    );
    require!(token_a != token_b, LedgerError::IdenticalTokens);
    let min = ctx.config.min_liquidity_amount;
    check_deposit(ctx, &token_a, amount_a, min)?;
    check_deposit(ctx, &token_b, amount_b, min)?;

    let user = ctx.caller;
    let (open_positions, balance) = ctx
        .state
        .users
        .get(&user)
        .map_or((0, 0), |u| (u.liquidity_positions.len(), u.liquidity_balance));
    let max = ctx.config.max_positions_per_user;
    require!(open_positions < max, LedgerError::PositionCapReached { max });

    // Compute every new value before the first write
    let liquidity = mean_liquidity(amount_a, amount_b);
    let new_total = checked_add(ctx.state.totals.liquidity, liquidity as u128)?;
    let new_balance = checked_add(balance, liquidity as u128)?;
    let custody_a = ctx.state.custody_after_credit(&token_a, amount_a)?;
    let custody_b = ctx.state.custody_after_credit(&token_b, amount_b)?;

    let now = ctx.now;
    let account = ctx.state.user_mut(&user);
    account.liquidity_positions.push(LiquidityPosition {
        protocol,
        token_a,
        token_b,
        amount_a,
        amount_b,
        liquidity,
        timestamp: now,
        active: true,
    });
    account.liquidity_balance = new_balance;
    let index = account.liquidity_positions.len() - 1;

    ctx.state.totals.liquidity = new_total;
    ctx.state.set_custody(token_a, custody_a);
    ctx.state.set_custody(token_b, custody_b);

    info!(%user, %protocol, index, amount_a, amount_b, liquidity, "liquidity provided");
    ctx.emit(LedgerEvent::LiquidityProvided {
        user,
        protocol,
        position: index,
        amount_a,
        amount_b,
        liquidity,
    });
    Ok(index)
}
