use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::pool_liquidity::{active_pool, owned_position};
use super::Context;
use crate::constants::BPS_DENOMINATOR;
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::require;
use crate::state::YieldPreference;

/// Retag a pool position. Metadata only.
pub fn update_strategy(ctx: &mut Context, pool: Pubkey, index: usize, strategy: String) -> Result<()> {
    active_pool(ctx, &pool)?;
    owned_position(ctx, &pool, index)?;

    let user = ctx.caller;
    ctx.state.user_mut(&user).pool_positions[index].strategy = strategy.clone();

    info!(%user, %pool, index, %strategy, "position strategy updated");
    ctx.emit(LedgerEvent::PositionStrategyUpdated { user, pool, position: index, strategy });
    Ok(())
}

/// Record the caller's yield preference. Metadata only.
pub fn set_yield_strategy(
    ctx: &mut Context,
    name: String,
    target_pool: Pubkey,
    min_yield_bps: u16,
    max_slippage_bps: u16,
) -> Result<()> {
    require!(!name.trim().is_empty(), LedgerError::EmptyName("strategy name"));
    active_pool(ctx, &target_pool)?;
    require!(
        max_slippage_bps as u128 <= BPS_DENOMINATOR,
        LedgerError::SlippageTooHigh { slippage_bps: max_slippage_bps }
    );

    let user = ctx.caller;
    let now = ctx.now;
    ctx.state.user_mut(&user).yield_preference = Some(YieldPreference {
        name: name.clone(),
        target_pool,
        min_yield_bps,
        max_slippage_bps,
        updated_at: now,
    });

    info!(%user, %name, %target_pool, min_yield_bps, max_slippage_bps, "yield preference set");
    ctx.emit(LedgerEvent::YieldPreferenceSet { user, name, target_pool });
    Ok(())
}
