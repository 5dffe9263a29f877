//! Restake-LP: multi-protocol liquidity and yield accounting ledger.
//!
//! Five parts share one owned [`RestakeLp`] instance:
//!   Registry         : allowlists of protocols, tokens and pools, plus yield metadata
//!   Position Ledger  : per-user liquidity and restaking positions
//!   Pool Accounting  : per-pool positions with proportional withdrawal and harvest
//!   Strategy Engine  : named weighted allocations across protocols
//!   Fee / Admin      : bounded fees, pause switch, emergency withdrawal
//!
//! Every call runs to completion before the next one starts. Balance-mutating
//! calls hold a [`ReentrancyLock`] for their duration, and a rejected call
//! leaves the ledger exactly as it found it.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod guard;
pub mod host;
pub mod instructions;
pub mod math;
pub mod state;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

pub use config::LedgerConfig;
pub use error::{ErrorKind, LedgerError, Result};
pub use events::{Asset, LedgerEvent, ProtocolAmount, Transfer};
pub use guard::{ReentrancyGuard, ReentrancyLock};
pub use host::{AccessControl, AdminSet, Clock, ManualClock, SystemClock};
pub use instructions::{Context, Instruction, Outcome};
pub use state::*;

use instructions::*;

/// Aggregate counts and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub protocols: usize,
    pub active_protocols: usize,
    pub tokens: usize,
    pub pools: usize,
    pub strategies: usize,
    pub users: usize,
    pub total_liquidity: u128,
    pub total_restaked: u128,
    pub total_pool_liquidity: u128,
    pub total_pool_yield: u128,
    pub total_strategy_deposits: u128,
    pub unclaimed_yield: u128,
    pub protocol_fee_bps: u16,
    pub task_fee_bps: u16,
    pub paused: bool,
}

pub struct RestakeLp {
    state: LedgerState,
    config: LedgerConfig,
    clock: Arc<dyn Clock>,
    access: Arc<dyn AccessControl>,
    lock: ReentrancyLock,
    events: Vec<LedgerEvent>,
    transfers: Vec<Transfer>,
}

impl RestakeLp {
    /// Empty ledger. Fails if `config` is inconsistent.
    pub fn new(
        config: LedgerConfig,
        clock: Arc<dyn Clock>,
        access: Arc<dyn AccessControl>,
    ) -> Result<Self> {
        let state = LedgerState::new(&config);
        Self::from_state(state, config, clock, access)
    }

    /// Rebuild a ledger around previously saved state.
    pub fn from_state(
        state: LedgerState,
        config: LedgerConfig,
        clock: Arc<dyn Clock>,
        access: Arc<dyn AccessControl>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state,
            config,
            clock,
            access,
            lock: ReentrancyLock::new(),
            events: Vec::new(),
            transfers: Vec::new(),
        })
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn into_state(self) -> LedgerState {
        self.state
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Handle on the re-entrancy lock, for hosts and transfer callbacks.
    pub fn reentrancy_lock(&self) -> ReentrancyLock {
        self.lock.clone()
    }

    /// Drain the notifications published since the last call.
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain the payouts the host still has to settle.
    pub fn take_transfers(&mut self) -> Vec<Transfer> {
        std::mem::take(&mut self.transfers)
    }

    // ─── Execution ────────────────────────────────────────────────────────────

    fn run<T>(
        &mut self,
        caller: Pubkey,
        op: &'static str,
        guarded: bool,
        f: impl FnOnce(&mut Context<'_>) -> Result<T>,
    ) -> Result<T> {
        let _guard = if guarded {
            Some(self.lock.enter().map_err(|err| {
                debug!(op, %caller, %err, "rejected");
                err
            })?)
        } else {
            None
        };

        let mut ctx = Context {
            state: &mut self.state,
            config: &self.config,
            access: self.access.as_ref(),
            caller,
            now: self.clock.unix_timestamp(),
            events: Vec::new(),
            transfers: Vec::new(),
        };
        match f(&mut ctx) {
            Ok(value) => {
                self.events.append(&mut ctx.events);
                self.transfers.append(&mut ctx.transfers);
                Ok(value)
            }
            Err(err) => {
                debug!(op, %caller, kind = %err.kind(), %err, "rejected");
                Err(err)
            }
        }
    }

    /// Execute one wire-form instruction on behalf of `caller`.
    pub fn process(&mut self, caller: Pubkey, ix: Instruction) -> Result<Outcome> {
        use Instruction as Ix;

        let done = |r: Result<()>| r.map(|()| Outcome::Done);
        let position = |r: Result<usize>| r.map(|index| Outcome::Position { index });

        match ix {
            Ix::AddProtocol { id, name, fee_bps, router } => {
                done(self.add_protocol(caller, id, name, fee_bps, router))
            }
            Ix::AddToken { id, symbol, decimals, min_amount } => {
                done(self.add_token(caller, id, symbol, decimals, min_amount))
            }
            Ix::AddPool { id, token_a, token_b, fee_tier } => {
                done(self.add_pool(caller, id, token_a, token_b, fee_tier))
            }
            Ix::RemoveProtocol { id } => done(self.remove_protocol(caller, id)),
            Ix::RemoveToken { id } => done(self.remove_token(caller, id)),
            Ix::RemovePool { id } => done(self.remove_pool(caller, id)),
            Ix::SetProtocolYield { protocol, apy_bps, liquidity } => {
                done(self.set_protocol_yield(caller, protocol, apy_bps, liquidity))
            }
            Ix::ProvideLiquidity { protocol, token_a, token_b, amount_a, amount_b } => position(
                self.provide_liquidity(caller, protocol, token_a, token_b, amount_a, amount_b),
            ),
            Ix::ExecuteRestaking { protocol, token, amount, strategy } => {
                position(self.execute_restaking(caller, protocol, token, amount, strategy))
            }
            Ix::ExecuteRebalancing { protocols, amounts } => {
                let moves = pair_amounts(protocols, amounts)?;
                done(self.execute_rebalancing(caller, moves))
            }
            Ix::WithdrawLiquidity { position } => self
                .withdraw_liquidity(caller, position)
                .map(|(amount_a, amount_b)| Outcome::Withdrawn { amount_a, amount_b }),
            Ix::WithdrawRestaking { position } => self
                .withdraw_restaking(caller, position)
                .map(|amount| Outcome::Released { amount }),
            Ix::AddLiquidity { pool, amount_a, amount_b, strategy } => {
                position(self.add_liquidity(caller, pool, amount_a, amount_b, strategy))
            }
            Ix::RemoveLiquidity { pool, position, liquidity } => self
                .remove_liquidity(caller, pool, position, liquidity)
                .map(|(amount_a, amount_b)| Outcome::Withdrawn { amount_a, amount_b }),
            Ix::HarvestYield { pool, position } => self
                .harvest_yield(caller, pool, position)
                .map(|amount| Outcome::Harvested { amount }),
            Ix::UpdateStrategy { pool, position, strategy } => {
                done(self.update_strategy(caller, pool, position, strategy))
            }
            Ix::SetYieldStrategy { name, target_pool, min_yield_bps, max_slippage_bps } => done(
                self.set_yield_strategy(caller, name, target_pool, min_yield_bps, max_slippage_bps),
            ),
            Ix::AddStrategy { name, protocols, weights_bps, min_yield_bps, max_slippage_bps } => {
                let legs = pair_legs(protocols, weights_bps)?;
                done(self.add_strategy(caller, name, legs, min_yield_bps, max_slippage_bps))
            }
            Ix::RemoveStrategy { name } => done(self.remove_strategy(caller, name)),
            Ix::ExecuteStrategy { name, amount } => {
                self.execute_strategy(caller, name, amount).map(Outcome::Executed)
            }
            Ix::TriggerRebalancing { from_protocols, to_protocols, amounts } => {
                let from = pair_amounts(from_protocols, amounts)?;
                done(self.trigger_rebalancing(caller, from, to_protocols))
            }
            Ix::ClaimYield { protocol } => self
                .claim_yield(caller, protocol)
                .map(|amount| Outcome::Released { amount }),
            Ix::UpdateProtocolFee { fee_bps } => done(self.update_protocol_fee(caller, fee_bps)),
            Ix::UpdateTaskFee { fee_bps } => done(self.update_task_fee(caller, fee_bps)),
            Ix::Pause => done(self.pause(caller)),
            Ix::Unpause => done(self.unpause(caller)),
            Ix::EmergencyWithdraw { token, amount } => {
                done(self.emergency_withdraw(caller, token, amount))
            }
        }
    }

    // ─── Registry (admin) ─────────────────────────────────────────────────────

    /// Allowlist a protocol. Fee is bounded by `max_protocol_fee_bps`.
    pub fn add_protocol(
        &mut self,
        caller: Pubkey,
        id: Pubkey,
        name: impl Into<String>,
        fee_bps: u16,
        router: Pubkey,
    ) -> Result<()> {
        let name = name.into();
        self.run(caller, "add_protocol", false, |ctx| {
            registry::add_protocol(ctx, id, name, fee_bps, router)
        })
    }

    pub fn add_token(
        &mut self,
        caller: Pubkey,
        id: Pubkey,
        symbol: impl Into<String>,
        decimals: u8,
        min_amount: u64,
    ) -> Result<()> {
        let symbol = symbol.into();
        self.run(caller, "add_token", false, |ctx| {
            registry::add_token(ctx, id, symbol, decimals, min_amount)
        })
    }

    pub fn add_pool(
        &mut self,
        caller: Pubkey,
        id: Pubkey,
        token_a: Pubkey,
        token_b: Pubkey,
        fee_tier: u32,
    ) -> Result<()> {
        self.run(caller, "add_pool", false, |ctx| {
            registry::add_pool(ctx, id, token_a, token_b, fee_tier)
        })
    }

    pub fn remove_protocol(&mut self, caller: Pubkey, id: Pubkey) -> Result<()> {
        self.run(caller, "remove_protocol", false, |ctx| registry::remove_protocol(ctx, id))
    }

    pub fn remove_token(&mut self, caller: Pubkey, id: Pubkey) -> Result<()> {
        self.run(caller, "remove_token", false, |ctx| registry::remove_token(ctx, id))
    }

    pub fn remove_pool(&mut self, caller: Pubkey, id: Pubkey) -> Result<()> {
        self.run(caller, "remove_pool", false, |ctx| registry::remove_pool(ctx, id))
    }

    /// Set the annual yield (≤ 10 000 bps) strategies price `protocol` at.
    pub fn set_protocol_yield(
        &mut self,
        caller: Pubkey,
        protocol: Pubkey,
        apy_bps: u16,
        liquidity: u64,
    ) -> Result<()> {
        self.run(caller, "set_protocol_yield", false, |ctx| {
            registry::set_protocol_yield(ctx, protocol, apy_bps, liquidity)
        })
    }

    // ─── Position ledger ──────────────────────────────────────────────────────

    /// Stake a token pair in a protocol. Returns the new position's index.
    pub fn provide_liquidity(
        &mut self,
        caller: Pubkey,
        protocol: Pubkey,
        token_a: Pubkey,
        token_b: Pubkey,
        amount_a: u64,
        amount_b: u64,
    ) -> Result<usize> {
        self.run(caller, "provide_liquidity", true, |ctx| {
            provide_liquidity::handler(ctx, protocol, token_a, token_b, amount_a, amount_b)
        })
    }

    pub fn execute_restaking(
        &mut self,
        caller: Pubkey,
        protocol: Pubkey,
        token: Pubkey,
        amount: u64,
        strategy: impl Into<String>,
    ) -> Result<usize> {
        let strategy = strategy.into();
        self.run(caller, "execute_restaking", true, |ctx| {
            execute_restaking::handler(ctx, protocol, token, amount, strategy)
        })
    }

    /// Validate and publish a rebalancing request; balances do not move.
    pub fn execute_rebalancing(&mut self, caller: Pubkey, moves: Vec<ProtocolAmount>) -> Result<()> {
        self.run(caller, "execute_rebalancing", false, |ctx| {
            execute_rebalancing::handler(ctx, moves)
        })
    }

    /// Close a liquidity position. Returns the released (amount_a, amount_b).
    pub fn withdraw_liquidity(&mut self, caller: Pubkey, position: usize) -> Result<(u64, u64)> {
        self.run(caller, "withdraw_liquidity", true, |ctx| {
            withdraw::withdraw_liquidity(ctx, position)
        })
    }

    pub fn withdraw_restaking(&mut self, caller: Pubkey, position: usize) -> Result<u64> {
        self.run(caller, "withdraw_restaking", true, |ctx| {
            withdraw::withdraw_restaking(ctx, position)
        })
    }

    // ─── Pool accounting ──────────────────────────────────────────────────────

    pub fn add_liquidity(
        &mut self,
        caller: Pubkey,
        pool: Pubkey,
        amount_a: u64,
        amount_b: u64,
        strategy: impl Into<String>,
    ) -> Result<usize> {
        let strategy = strategy.into();
        self.run(caller, "add_liquidity", true, |ctx| {
            pool_liquidity::add_liquidity(ctx, pool, amount_a, amount_b, strategy)
        })
    }

    /// Withdraw part of a pool position. Returns the released (amount_a, amount_b).
    pub fn remove_liquidity(
        &mut self,
        caller: Pubkey,
        pool: Pubkey,
        position: usize,
        liquidity: u64,
    ) -> Result<(u64, u64)> {
        self.run(caller, "remove_liquidity", true, |ctx| {
            pool_liquidity::remove_liquidity(ctx, pool, position, liquidity)
        })
    }

    pub fn harvest_yield(&mut self, caller: Pubkey, pool: Pubkey, position: usize) -> Result<u64> {
        self.run(caller, "harvest_yield", true, |ctx| {
            harvest_yield::handler(ctx, pool, position)
        })
    }

    pub fn update_strategy(
        &mut self,
        caller: Pubkey,
        pool: Pubkey,
        position: usize,
        strategy: impl Into<String>,
    ) -> Result<()> {
        let strategy = strategy.into();
        self.run(caller, "update_strategy", false, |ctx| {
            update_strategy::update_strategy(ctx, pool, position, strategy)
        })
    }

    pub fn set_yield_strategy(
        &mut self,
        caller: Pubkey,
        name: impl Into<String>,
        target_pool: Pubkey,
        min_yield_bps: u16,
        max_slippage_bps: u16,
    ) -> Result<()> {
        let name = name.into();
        self.run(caller, "set_yield_strategy", false, |ctx| {
            update_strategy::set_yield_strategy(ctx, name, target_pool, min_yield_bps, max_slippage_bps)
        })
    }

    // ─── Strategy engine ──────────────────────────────────────────────────────

    pub fn add_strategy(
        &mut self,
        caller: Pubkey,
        name: impl Into<String>,
        legs: Vec<StrategyLeg>,
        min_yield_bps: u16,
        max_slippage_bps: u16,
    ) -> Result<()> {
        let name = name.into();
        self.run(caller, "add_strategy", false, |ctx| {
            strategy_admin::add_strategy(ctx, name, legs, min_yield_bps, max_slippage_bps)
        })
    }

    pub fn remove_strategy(&mut self, caller: Pubkey, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.run(caller, "remove_strategy", false, |ctx| {
            strategy_admin::remove_strategy(ctx, name)
        })
    }

    /// Allocate `amount` across a strategy's protocols, replacing the
    /// caller's allocation snapshot.
    pub fn execute_strategy(
        &mut self,
        caller: Pubkey,
        name: impl Into<String>,
        amount: u64,
    ) -> Result<ExecutionReceipt> {
        let name = name.into();
        self.run(caller, "execute_strategy", true, |ctx| {
            execute_strategy::handler(ctx, name, amount)
        })
    }

    pub fn trigger_rebalancing(
        &mut self,
        caller: Pubkey,
        from: Vec<ProtocolAmount>,
        to: Vec<Pubkey>,
    ) -> Result<()> {
        self.run(caller, "trigger_rebalancing", false, |ctx| {
            trigger_rebalancing::handler(ctx, from, to)
        })
    }

    pub fn claim_yield(&mut self, caller: Pubkey, protocol: Pubkey) -> Result<u64> {
        self.run(caller, "claim_yield", true, |ctx| claim_yield::handler(ctx, protocol))
    }

    // ─── Fee / admin ──────────────────────────────────────────────────────────

    pub fn update_protocol_fee(&mut self, caller: Pubkey, fee_bps: u16) -> Result<()> {
        self.run(caller, "update_protocol_fee", false, |ctx| {
            admin::update_protocol_fee(ctx, fee_bps)
        })
    }

    pub fn update_task_fee(&mut self, caller: Pubkey, fee_bps: u16) -> Result<()> {
        self.run(caller, "update_task_fee", false, |ctx| admin::update_task_fee(ctx, fee_bps))
    }

    pub fn pause(&mut self, caller: Pubkey) -> Result<()> {
        self.run(caller, "pause", false, admin::pause)
    }

    pub fn unpause(&mut self, caller: Pubkey) -> Result<()> {
        self.run(caller, "unpause", false, admin::unpause)
    }

    pub fn emergency_withdraw(&mut self, caller: Pubkey, token: Pubkey, amount: u64) -> Result<()> {
        self.run(caller, "emergency_withdraw", true, |ctx| {
            admin::emergency_withdraw(ctx, token, amount)
        })
    }

    // ─── Read accessors ───────────────────────────────────────────────────────

    pub fn protocol(&self, id: &Pubkey) -> Option<&Protocol> {
        self.state.registry.protocols.get(id)
    }

    pub fn protocols(&self) -> &[Protocol] {
        self.state.registry.protocols.as_slice()
    }

    pub fn token(&self, id: &Pubkey) -> Option<&Token> {
        self.state.registry.tokens.get(id)
    }

    pub fn tokens(&self) -> &[Token] {
        self.state.registry.tokens.as_slice()
    }

    pub fn pool(&self, id: &Pubkey) -> Option<&Pool> {
        self.state.registry.pools.get(id)
    }

    pub fn pools(&self) -> &[Pool] {
        self.state.registry.pools.as_slice()
    }

    pub fn protocol_yield(&self, protocol: &Pubkey) -> Option<&ProtocolYield> {
        self.state.registry.yields.get(protocol)
    }

    pub fn strategy(&self, name: &str) -> Option<&YieldStrategy> {
        self.state.strategies.get(&name.to_string())
    }

    pub fn strategies(&self) -> &[YieldStrategy] {
        self.state.strategies.as_slice()
    }

    /// The whole per-user book, if the user ever called in.
    pub fn user(&self, user: &Pubkey) -> Option<&UserAccount> {
        self.state.users.get(user)
    }

    pub fn liquidity_positions(&self, user: &Pubkey) -> &[LiquidityPosition] {
        self.user(user).map(|u| u.liquidity_positions.as_slice()).unwrap_or_default()
    }

    pub fn restaking_positions(&self, user: &Pubkey) -> &[RestakingPosition] {
        self.user(user).map(|u| u.restaking_positions.as_slice()).unwrap_or_default()
    }

    pub fn pool_positions(&self, user: &Pubkey) -> &[UserPoolPosition] {
        self.user(user).map(|u| u.pool_positions.as_slice()).unwrap_or_default()
    }

    pub fn allocations(&self, user: &Pubkey) -> &[UserAllocation] {
        self.user(user).map(|u| u.allocations.as_slice()).unwrap_or_default()
    }

    pub fn claimable_yield(&self, user: &Pubkey, protocol: &Pubkey) -> u128 {
        self.user(user).map_or(0, |u| u.claimable(protocol))
    }

    pub fn custody_balance(&self, token: &Pubkey) -> u64 {
        self.state.custody_balance(token)
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn protocol_fee_bps(&self) -> u16 {
        self.state.protocol_fee_bps
    }

    pub fn task_fee_bps(&self) -> u16 {
        self.state.task_fee_bps
    }

    pub fn stats(&self) -> Stats {
        let registry = &self.state.registry;
        let totals = &self.state.totals;
        Stats {
            protocols: registry.protocols.len(),
            active_protocols: registry.protocols.iter().filter(|p| p.active).count(),
            tokens: registry.tokens.len(),
            pools: registry.pools.len(),
            strategies: self.state.strategies.len(),
            users: self.state.users.len(),
            total_liquidity: totals.liquidity,
            total_restaked: totals.restaked,
            total_pool_liquidity: totals.pool_liquidity,
            total_pool_yield: totals.pool_yield,
            total_strategy_deposits: totals.strategy_deposits,
            unclaimed_yield: totals.unclaimed_yield,
            protocol_fee_bps: self.state.protocol_fee_bps,
            task_fee_bps: self.state.task_fee_bps,
            paused: self.state.paused,
        }
    }
}
