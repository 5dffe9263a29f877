use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{LedgerError, Result};

/// Tunable bounds of a ledger instance.
///
/// Missing fields fall back to their defaults, so a partial TOML table is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Cap on a user's liquidity positions (active or not)
    pub max_positions_per_user: usize,

    /// Cap on a user's pool positions, separate from the one above
    pub max_pool_positions_per_user: usize,

    pub min_liquidity_amount: u64,
    pub min_restake_amount: u64,
    pub max_pools: usize,
    pub max_strategies: usize,
    pub max_protocols_per_strategy: usize,

    /// Ceiling for a registered protocol's fee
    pub max_protocol_fee_bps: u16,

    /// Bounds shared by the global fee and the task fee
    pub min_global_fee_bps: u16,
    pub max_global_fee_bps: u16,

    /// Initial global fee
    pub protocol_fee_bps: u16,

    /// Initial task fee
    pub task_fee_bps: u16,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_positions_per_user: DEFAULT_MAX_POSITIONS_PER_USER,
            max_pool_positions_per_user: DEFAULT_MAX_POOL_POSITIONS_PER_USER,
            min_liquidity_amount: DEFAULT_MIN_LIQUIDITY_AMOUNT,
            min_restake_amount: DEFAULT_MIN_RESTAKE_AMOUNT,
            max_pools: DEFAULT_MAX_POOLS,
            max_strategies: DEFAULT_MAX_STRATEGIES,
            max_protocols_per_strategy: DEFAULT_MAX_PROTOCOLS_PER_STRATEGY,
            max_protocol_fee_bps: DEFAULT_MAX_PROTOCOL_FEE_BPS,
            min_global_fee_bps: DEFAULT_MIN_GLOBAL_FEE_BPS,
            max_global_fee_bps: DEFAULT_MAX_GLOBAL_FEE_BPS,
            protocol_fee_bps: DEFAULT_PROTOCOL_FEE_BPS,
            task_fee_bps: DEFAULT_TASK_FEE_BPS,
        }
    }
}

impl LedgerConfig {
    /// Reject inconsistent bounds before a ledger is built on them.
    pub fn validate(&self) -> Result<()> {
        let caps = [
            ("max_positions_per_user", self.max_positions_per_user),
            ("max_pool_positions_per_user", self.max_pool_positions_per_user),
            ("max_pools", self.max_pools),
            ("max_strategies", self.max_strategies),
            ("max_protocols_per_strategy", self.max_protocols_per_strategy),
        ];
        if let Some((name, _)) = caps.iter().find(|(_, cap)| *cap == 0) {
            return Err(LedgerError::InvalidConfig(format!("{name} must be greater than 0")));
        }

        if self.max_protocol_fee_bps as u128 > BPS_DENOMINATOR {
            return Err(LedgerError::InvalidConfig(
                "max_protocol_fee_bps must not exceed 10000".into(),
            ));
        }
        if self.min_global_fee_bps > self.max_global_fee_bps {
            return Err(LedgerError::InvalidConfig(format!(
                "min_global_fee_bps ({}) exceeds max_global_fee_bps ({})",
                self.min_global_fee_bps, self.max_global_fee_bps
            )));
        }
        if self.max_global_fee_bps as u128 > BPS_DENOMINATOR {
            return Err(LedgerError::InvalidConfig(
                "max_global_fee_bps must not exceed 10000".into(),
            ));
        }

        let bounds = self.min_global_fee_bps..=self.max_global_fee_bps;
        for (name, fee) in [
            ("protocol_fee_bps", self.protocol_fee_bps),
            ("task_fee_bps", self.task_fee_bps),
        ] {
            if !bounds.contains(&fee) {
                return Err(LedgerError::InvalidConfig(format!(
                    "{name} ({fee}) is outside {}..={}",
                    self.min_global_fee_bps, self.max_global_fee_bps
                )));
            }
        }
        Ok(())
    }
}
