use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use super::Context;
use crate::error::{LedgerError, Result};
use crate::events::{Asset, LedgerEvent, Transfer};
use crate::math::check_fee_bounds;
use crate::require;

// ─── Fees ─────────────────────────────────────────────────────────────────────
pub fn update_protocol_fee(ctx: &mut Context, fee_bps: u16) -> Result<()> {
    ctx.require_admin()?;
    check_fee_bounds(fee_bps, ctx.config.min_global_fee_bps, ctx.config.max_global_fee_bps)?;

    let old_fee_bps = ctx.state.protocol_fee_bps;
    ctx.state.protocol_fee_bps = fee_bps;

    info!(old_fee_bps, new_fee_bps = fee_bps, "protocol fee updated");
    ctx.emit(LedgerEvent::ProtocolFeeUpdated { old_fee_bps, new_fee_bps: fee_bps });
    Ok(())
}

/// Per-task fee; bounded like the global fee.
pub fn update_task_fee(ctx: &mut Context, fee_bps: u16) -> Result<()> {
    ctx.require_admin()?;
    check_fee_bounds(fee_bps, ctx.config.min_global_fee_bps, ctx.config.max_global_fee_bps)?;

    let old_fee_bps = ctx.state.task_fee_bps;
    ctx.state.task_fee_bps = fee_bps;

    info!(old_fee_bps, new_fee_bps = fee_bps, "task fee updated");
    ctx.emit(LedgerEvent::TaskFeeUpdated { old_fee_bps, new_fee_bps: fee_bps });
    Ok(())
}

// ─── Pause switch ─────────────────────────────────────────────────────────────
pub fn pause(ctx: &mut Context) -> Result<()> {
    ctx.require_admin()?;
    require!(!ctx.state.paused, LedgerError::AlreadyPaused);
    ctx.state.paused = true;

    warn!(by = %ctx.caller, "ledger paused");
    let by = ctx.caller;
    ctx.emit(LedgerEvent::Paused { by });
    Ok(())
}

pub fn unpause(ctx: &mut Context) -> Result<()> {
    ctx.require_admin()?;
    require!(ctx.state.paused, LedgerError::NotPaused);
    ctx.state.paused = false;

    info!(by = %ctx.caller, "ledger unpaused");
    let by = ctx.caller;
    ctx.emit(LedgerEvent::Unpaused { by });
    Ok(())
}

// ─── Emergency withdrawal ─────────────────────────────────────────────────────
/// Move contract-held `token` to the calling admin. Bypasses positions; only
/// the custody balance bounds it.
pub fn emergency_withdraw(ctx: &mut Context, token: Pubkey, amount: u64) -> Result<()> {
    ctx.require_admin()?;
    require!(amount > 0, LedgerError::ZeroAmount);
    let remaining = ctx.state.custody_after_debit(&token, amount)?;

    ctx.state.set_custody(token, remaining);
    let admin = ctx.caller;
    ctx.pay(Transfer { recipient: admin, asset: Asset::Token(token), amount });

    warn!(%admin, %token, amount, remaining, "emergency withdrawal");
    ctx.emit(LedgerEvent::EmergencyWithdrawal { admin, token, amount });
    Ok(())
}
