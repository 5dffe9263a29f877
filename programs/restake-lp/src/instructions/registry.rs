use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::Context;
use crate::constants::{MAX_APY_BPS, MAX_TOKEN_DECIMALS};
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::require;
use crate::state::{Pool, Protocol, ProtocolYield, Token};

// ─── Protocols ────────────────────────────────────────────────────────────────
/// Allowlist a protocol. A tombstoned id is reactivated in place.
pub fn add_protocol(
    ctx: &mut Context,
    id: Pubkey,
    name: String,
    fee_bps: u16,
    router: Pubkey,
) -> Result<()> {
    ctx.require_admin()?;
    require!(id != Pubkey::default(), LedgerError::ZeroIdentifier("protocol"));
    require!(!name.trim().is_empty(), LedgerError::EmptyName("protocol name"));
    let max_bps = ctx.config.max_protocol_fee_bps;
    require!(fee_bps <= max_bps, LedgerError::FeeTooHigh { fee_bps, max_bps });
    require!(
        !ctx.state.registry.protocols.get(&id).map_or(false, |p| p.active),
        LedgerError::DuplicateProtocol(id)
    );

    ctx.state.registry.protocols.upsert(Protocol {
        id,
        name: name.clone(),
        fee_bps,
        router,
        active: true,
        added_at: ctx.now,
    });

    info!(protocol = %id, %name, fee_bps, "protocol added");
    ctx.emit(LedgerEvent::ProtocolAdded { protocol: id, name, fee_bps });
    Ok(())
}

/// Tombstone a protocol. Positions that reference it are untouched.
pub fn remove_protocol(ctx: &mut Context, id: Pubkey) -> Result<()> {
    ctx.require_admin()?;
    let protocol = ctx
        .state
        .registry
        .protocols
        .get_mut(&id)
        .ok_or(LedgerError::ProtocolNotFound(id))?;
    require!(protocol.active, LedgerError::ProtocolInactive(id));
    protocol.active = false;

    info!(protocol = %id, "protocol removed");
    ctx.emit(LedgerEvent::ProtocolRemoved { protocol: id });
    Ok(())
}

// ─── Tokens ───────────────────────────────────────────────────────────────────
pub fn add_token(
    ctx: &mut Context,
    id: Pubkey,
    symbol: String,
    decimals: u8,
    min_amount: u64,
) -> Result<()> {
    ctx.require_admin()?;
    require!(id != Pubkey::default(), LedgerError::ZeroIdentifier("token"));
    require!(!symbol.trim().is_empty(), LedgerError::EmptyName("token symbol"));
    require!(
        decimals <= MAX_TOKEN_DECIMALS,
        LedgerError::DecimalsTooHigh { decimals, max: MAX_TOKEN_DECIMALS }
    );
    require!(
        !ctx.state.registry.tokens.get(&id).map_or(false, |t| t.active),
        LedgerError::DuplicateToken(id)
    );

    ctx.state.registry.tokens.upsert(Token {
        id,
        symbol: symbol.clone(),
        decimals,
        min_amount,
        active: true,
    });

    info!(token = %id, %symbol, decimals, min_amount, "token added");
    ctx.emit(LedgerEvent::TokenAdded { token: id, symbol, decimals });
    Ok(())
}

pub fn remove_token(ctx: &mut Context, id: Pubkey) -> Result<()> {
    ctx.require_admin()?;
    let token = ctx
        .state
        .registry
        .tokens
        .get_mut(&id)
        .ok_or(LedgerError::TokenNotFound(id))?;
    require!(token.active, LedgerError::TokenInactive(id));
    token.active = false;

    info!(token = %id, "token removed");
    ctx.emit(LedgerEvent::TokenRemoved { token: id });
    Ok(())
}

// ─── Pools ────────────────────────────────────────────────────────────────────
/// Register a pool. Reactivating a tombstoned pool keeps its cumulative
/// liquidity and fees, since its positions still count toward them, and
/// must name the same token pair.
pub fn add_pool(
    ctx: &mut Context,
    id: Pubkey,
    token_a: Pubkey,
    token_b: Pubkey,
    fee_tier: u32,
) -> Result<()> {
    ctx.require_admin()?;
    require!(id != Pubkey::default(), LedgerError::ZeroIdentifier("pool"));
    require!(token_a != Pubkey::default(), LedgerError::ZeroIdentifier("token A"));
    require!(token_b != Pubkey::default(), LedgerError::ZeroIdentifier("token B"));
    require!(token_a != token_b, LedgerError::IdenticalTokens);

    let pools = &ctx.state.registry.pools;
    let existing = pools.get(&id).cloned();
    match &existing {
        Some(pool) => {
            require!(!pool.active, LedgerError::DuplicatePool(id));
            // Open positions hold amounts in the original pair.
            require!(
                pool.token_a == token_a && pool.token_b == token_b,
                LedgerError::PoolTokensChanged(id)
            );
        }
        None => {
            let max = ctx.config.max_pools;
            require!(pools.len() < max, LedgerError::PoolLimitReached { max });
        }
    }

    let (total_liquidity, total_fees, created_at) = existing
        .map(|p| (p.total_liquidity, p.total_fees, p.created_at))
        .unwrap_or((0, 0, ctx.now));
    ctx.state.registry.pools.upsert(Pool {
        id,
        token_a,
        token_b,
        fee_tier,
        total_liquidity,
        total_fees,
        active: true,
        created_at,
    });

    info!(pool = %id, %token_a, %token_b, fee_tier, "pool added");
    ctx.emit(LedgerEvent::PoolAdded { pool: id, token_a, token_b, fee_tier });
    Ok(())
}

pub fn remove_pool(ctx: &mut Context, id: Pubkey) -> Result<()> {
    ctx.require_admin()?;
    let pool = ctx
        .state
        .registry
        .pools
        .get_mut(&id)
        .ok_or(LedgerError::PoolNotFound(id))?;
    require!(pool.active, LedgerError::PoolInactive(id));
    pool.active = false;

    info!(pool = %id, "pool removed");
    ctx.emit(LedgerEvent::PoolRemoved { pool: id });
    Ok(())
}

// ─── Protocol yield metadata ──────────────────────────────────────────────────
/// Set the annual yield the strategy engine prices `protocol` at.
pub fn set_protocol_yield(
    ctx: &mut Context,
    protocol: Pubkey,
    apy_bps: u16,
    liquidity: u64,
) -> Result<()> {
    ctx.require_admin()?;
    let registered = ctx
        .state
        .registry
        .protocols
        .get(&protocol)
        .ok_or(LedgerError::ProtocolNotFound(protocol))?;
    require!(registered.active, LedgerError::ProtocolInactive(protocol));
    require!(apy_bps <= MAX_APY_BPS, LedgerError::ApyTooHigh { apy_bps });

    let accrued_fees = ctx
        .state
        .registry
        .yields
        .get(&protocol)
        .map_or(0, |y| y.accrued_fees);
    ctx.state.registry.yields.upsert(ProtocolYield {
        protocol,
        apy_bps,
        liquidity: liquidity as u128,
        accrued_fees,
        active: true,
        updated_at: ctx.now,
    });

    info!(%protocol, apy_bps, liquidity, "protocol yield updated");
    ctx.emit(LedgerEvent::ProtocolYieldUpdated { protocol, apy_bps, liquidity });
    Ok(())
}
