use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use super::table::Record;

/// One leg of a strategy: a protocol and its share of each deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyLeg {
    pub protocol: Pubkey,
    pub weight_bps: u16,
}

// ─── YieldStrategy ────────────────────────────────────────────────────────────
// Named weighted allocation over protocols. Weights sum to exactly 10 000 bps
// at creation; the leg order is preserved on execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldStrategy {
    pub name: String,
    pub legs: Vec<StrategyLeg>,
    pub min_yield_bps: u16,
    pub max_slippage_bps: u16,
    pub total_deposited: u128,
    pub total_yield: u128,
    /// Unix timestamp of the most recent execution; 0 before the first
    pub last_execution: i64,
    pub active: bool,
    pub created_at: i64,
}

impl Record for YieldStrategy {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }
}

/// A user's stake in one protocol as of their latest strategy execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAllocation {
    pub protocol: Pubkey,
    pub amount: u64,
    pub yield_earned: u64,
    pub last_update: i64,
}

/// What `execute_strategy` did with a deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub strategy: String,
    pub allocations: Vec<UserAllocation>,
    /// Σ amount_i; never more than the requested total
    pub allocated: u64,
    /// Requested total minus `allocated`, lost to truncation
    pub dust: u64,
    pub total_yield: u64,
}
