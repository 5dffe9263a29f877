use tracing::info;

use super::Context;
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::math::{checked_add, daily_yield, weighted_amount};
use crate::require;
use crate::state::{ExecutionReceipt, ProtocolBalance, UserAllocation};

// ─── Handler ──────────────────────────────────────────────────────────────────
/// Split `amount` across the strategy's legs and credit one day of yield.
///
///   amount_i = floor(amount × weight_i / 10 000)
///   yield_i  = floor(amount_i × apy_i / (10 000 × 365))
///
/// The user's allocation snapshot is replaced, not merged. Σamount_i may fall
/// short of `amount`; the difference is reported as dust.
pub fn handler(ctx: &mut Context, name: String, amount: u64) -> Result<ExecutionReceipt> {
    ctx.require_not_paused()?;
    let strategy = ctx
        .state
        .strategies
        .get(&name)
        .cloned()
        .ok_or_else(|| LedgerError::StrategyNotFound(name.clone()))?;
    require!(strategy.active, LedgerError::StrategyInactive(name.clone()));
    require!(amount > 0, LedgerError::ZeroAmount);
    for leg in &strategy.legs {
        require!(
            ctx.state.registry.is_protocol_active(&leg.protocol),
            LedgerError::UnsupportedProtocol(leg.protocol)
        );
    }

    let now = ctx.now;
    let allocations: Vec<UserAllocation> = strategy
        .legs
        .iter()
        .map(|leg| {
            let allocated = weighted_amount(amount, leg.weight_bps);
            let apy = ctx.state.registry.apy_bps(&leg.protocol);
            UserAllocation {
                protocol: leg.protocol,
                amount: allocated,
                yield_earned: daily_yield(allocated, apy),
                last_update: now,
            }
        })
        .collect();

    // Weights sum to 10 000, so Σamount_i ≤ amount and Σyield_i < Σamount_i
    let allocated: u64 = allocations.iter().map(|a| a.amount).sum();
    let total_yield: u64 = allocations.iter().map(|a| a.yield_earned).sum();
    let dust = amount - allocated;

    let user = ctx.caller;
    let total_deposited = checked_add(strategy.total_deposited, allocated as u128)?;
    let strategy_yield = checked_add(strategy.total_yield, total_yield as u128)?;
    let global_deposits = checked_add(ctx.state.totals.strategy_deposits, allocated as u128)?;
    let unclaimed = checked_add(ctx.state.totals.unclaimed_yield, total_yield as u128)?;

    let mut balances = Vec::with_capacity(allocations.len());
    let user_total = {
        let account = ctx.state.users.get(&user);
        for a in &allocations {
            let current = account.map_or(0, |u| u.claimable(&a.protocol));
            // Two legs never share a protocol, so each balance is read once
            balances.push(ProtocolBalance {
                protocol: a.protocol,
                amount: checked_add(current, a.yield_earned as u128)?,
            });
        }
        checked_add(account.map_or(0, |u| u.total_yield_balance), total_yield as u128)?
    };

    if let Some(s) = ctx.state.strategies.get_mut(&name) {
        s.total_deposited = total_deposited;
        s.total_yield = strategy_yield;
        s.last_execution = now;
    }
    ctx.state.totals.strategy_deposits = global_deposits;
    ctx.state.totals.unclaimed_yield = unclaimed;

    let account = ctx.state.user_mut(&user);
    account.allocation_strategy = Some(name.clone());
    account.allocations = allocations.clone();
    for balance in balances {
        account.yield_balances.upsert(balance);
    }
    account.total_yield_balance = user_total;

    info!(%user, strategy = %name, amount, allocated, dust, total_yield, "strategy executed");
    ctx.emit(LedgerEvent::StrategyExecuted {
        user,
        strategy: name.clone(),
        amount,
        allocations: allocations.clone(),
        total_yield,
    });
    Ok(ExecutionReceipt { strategy: name, allocations, allocated, dust, total_yield })
}
