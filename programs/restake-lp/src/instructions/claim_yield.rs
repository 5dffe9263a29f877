use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::Context;
use crate::error::{LedgerError, Result};
use crate::events::{Asset, LedgerEvent, Transfer};
use crate::require;
use crate::state::ProtocolBalance;

/// Pay out the caller's strategy yield for `protocol` in the native asset.
pub fn handler(ctx: &mut Context, protocol: Pubkey) -> Result<u64> {
    require!(
        ctx.state.registry.is_protocol_active(&protocol),
        LedgerError::UnsupportedProtocol(protocol)
    );
    let user = ctx.caller;
    let (claimable, total) = ctx
        .state
        .users
        .get(&user)
        .map_or((0, 0), |u| (u.claimable(&protocol), u.total_yield_balance));
    require!(claimable > 0, LedgerError::NothingToClaim);
    let amount = u64::try_from(claimable).map_err(|_| LedgerError::MathOverflow)?;

    let account = ctx.state.user_mut(&user);
    account.yield_balances.upsert(ProtocolBalance { protocol, amount: 0 });
    account.total_yield_balance = total.saturating_sub(claimable);
    ctx.state.totals.unclaimed_yield = ctx.state.totals.unclaimed_yield.saturating_sub(claimable);

    ctx.pay(Transfer { recipient: user, asset: Asset::Native, amount });

    info!(%user, %protocol, amount, "yield claimed");
    ctx.emit(LedgerEvent::YieldClaimed { user, protocol, amount });
    Ok(amount)
}
