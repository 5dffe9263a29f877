use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::execute_rebalancing::check_moves;
use super::Context;
use crate::error::{LedgerError, Result};
use crate::events::{LedgerEvent, ProtocolAmount};
use crate::require;

/// Validate a cross-protocol rebalancing request and publish it. Like
/// `execute_rebalancing`, no recorded balance moves.
pub fn handler(ctx: &mut Context, from: Vec<ProtocolAmount>, to: Vec<Pubkey>) -> Result<()> {
    ctx.require_not_paused()?;
    require!(!to.is_empty(), LedgerError::EmptyList("destination protocols"));
    check_moves(ctx, &from)?;
    for protocol in &to {
        require!(
            ctx.state.registry.is_protocol_active(protocol),
            LedgerError::UnsupportedProtocol(*protocol)
        );
    }

    let user = ctx.caller;
    info!(%user, from = from.len(), to = to.len(), "rebalancing triggered");
    ctx.emit(LedgerEvent::RebalancingTriggered { user, from, to });
    Ok(())
}
