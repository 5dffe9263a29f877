use tracing::info;

use super::Context;
use crate::error::{LedgerError, Result};
use crate::events::{LedgerEvent, ProtocolAmount};
use crate::require;

/// Every move must target an active protocol with a positive amount.
pub(crate) fn check_moves(ctx: &Context, moves: &[ProtocolAmount]) -> Result<()> {
    for m in moves {
        require!(
            ctx.state.registry.is_protocol_active(&m.protocol),
            LedgerError::UnsupportedProtocol(m.protocol)
        );
        require!(m.amount > 0, LedgerError::ZeroAmount);
    }
    Ok(())
}

/// Validate a rebalancing request and publish it. Recorded balances do not
/// move; settlement happens outside the ledger.
pub fn handler(ctx: &mut Context, moves: Vec<ProtocolAmount>) -> Result<()> {
    ctx.require_not_paused()?;
    require!(!moves.is_empty(), LedgerError::EmptyList("protocols"));
    check_moves(ctx, &moves)?;

    let user = ctx.caller;
    info!(%user, legs = moves.len(), "rebalancing executed");
    ctx.emit(LedgerEvent::RebalancingExecuted { user, moves });
    Ok(())
}
