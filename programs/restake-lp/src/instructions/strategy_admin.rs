use std::collections::HashSet;

use tracing::info;

use super::Context;
use crate::constants::{BPS_DENOMINATOR, TOTAL_WEIGHT_BPS};
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::require;
use crate::state::{StrategyLeg, YieldStrategy};

// ─── add_strategy ─────────────────────────────────────────────────────────────
/// Define a weighted allocation. Weights must sum to exactly 10 000 bps.
/// A tombstoned name is redefined in place and keeps its cumulative totals.
pub fn add_strategy(
    ctx: &mut Context,
    name: String,
    legs: Vec<StrategyLeg>,
    min_yield_bps: u16,
    max_slippage_bps: u16,
) -> Result<()> {
    ctx.require_admin()?;
    require!(!name.trim().is_empty(), LedgerError::EmptyName("strategy name"));

    let existing = ctx.state.strategies.get(&name).cloned();
    match &existing {
        Some(s) => require!(!s.active, LedgerError::DuplicateStrategy(name.clone())),
        None => {
            let max = ctx.config.max_strategies;
            require!(ctx.state.strategies.len() < max, LedgerError::StrategyLimitReached { max });
        }
    }

    require!(!legs.is_empty(), LedgerError::EmptyList("protocols"));
    let max = ctx.config.max_protocols_per_strategy;
    require!(legs.len() <= max, LedgerError::TooManyProtocols { count: legs.len(), max });
    require!(
        max_slippage_bps as u128 <= BPS_DENOMINATOR,
        LedgerError::SlippageTooHigh { slippage_bps: max_slippage_bps }
    );

    let mut seen = HashSet::with_capacity(legs.len());
    for leg in &legs {
        require!(seen.insert(leg.protocol), LedgerError::DuplicateProtocol(leg.protocol));
        require!(
            ctx.state.registry.is_protocol_active(&leg.protocol),
            LedgerError::UnsupportedProtocol(leg.protocol)
        );
    }

    let sum: u64 = legs.iter().map(|l| l.weight_bps as u64).sum();
    require!(sum == TOTAL_WEIGHT_BPS as u64, LedgerError::WeightSumMismatch { sum });

    let (total_deposited, total_yield, last_execution, created_at) = existing
        .map(|s| (s.total_deposited, s.total_yield, s.last_execution, s.created_at))
        .unwrap_or((0, 0, 0, ctx.now));
    ctx.state.strategies.upsert(YieldStrategy {
        name: name.clone(),
        legs: legs.clone(),
        min_yield_bps,
        max_slippage_bps,
        total_deposited,
        total_yield,
        last_execution,
        active: true,
        created_at,
    });

    info!(strategy = %name, legs = legs.len(), min_yield_bps, max_slippage_bps, "strategy added");
    ctx.emit(LedgerEvent::StrategyAdded { name, legs });
    Ok(())
}

// ─── remove_strategy ──────────────────────────────────────────────────────────
pub fn remove_strategy(ctx: &mut Context, name: String) -> Result<()> {
    ctx.require_admin()?;
    let strategy = ctx
        .state
        .strategies
        .get_mut(&name)
        .ok_or_else(|| LedgerError::StrategyNotFound(name.clone()))?;
    require!(strategy.active, LedgerError::StrategyInactive(name.clone()));
    strategy.active = false;

    info!(strategy = %name, "strategy removed");
    ctx.emit(LedgerEvent::StrategyRemoved { name });
    Ok(())
}
