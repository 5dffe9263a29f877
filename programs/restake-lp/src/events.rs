//! Notifications appended by successful operations.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::state::{StrategyLeg, UserAllocation};

/// Amount moved to or from one protocol in a rebalancing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolAmount {
    pub protocol: Pubkey,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    // ─── Registry ─────────────────────────────────────────────────────────────
    ProtocolAdded { protocol: Pubkey, name: String, fee_bps: u16 },
    ProtocolRemoved { protocol: Pubkey },
    TokenAdded { token: Pubkey, symbol: String, decimals: u8 },
    TokenRemoved { token: Pubkey },
    PoolAdded { pool: Pubkey, token_a: Pubkey, token_b: Pubkey, fee_tier: u32 },
    PoolRemoved { pool: Pubkey },
    ProtocolYieldUpdated { protocol: Pubkey, apy_bps: u16, liquidity: u64 },

    // ─── Position ledger ──────────────────────────────────────────────────────
    LiquidityProvided {
        user: Pubkey,
        protocol: Pubkey,
        position: usize,
        amount_a: u64,
        amount_b: u64,
        liquidity: u64,
    },
    RestakingExecuted {
        user: Pubkey,
        protocol: Pubkey,
        token: Pubkey,
        position: usize,
        amount: u64,
        strategy: String,
    },
    RebalancingExecuted { user: Pubkey, moves: Vec<ProtocolAmount> },
    LiquidityWithdrawn { user: Pubkey, position: usize, liquidity: u64 },
    RestakingWithdrawn { user: Pubkey, position: usize, amount: u64 },

    // ─── Pool accounting ──────────────────────────────────────────────────────
    PoolLiquidityAdded {
        user: Pubkey,
        pool: Pubkey,
        position: usize,
        amount_a: u64,
        amount_b: u64,
        liquidity: u64,
    },
    PoolLiquidityRemoved {
        user: Pubkey,
        pool: Pubkey,
        position: usize,
        liquidity: u64,
        amount_a: u64,
        amount_b: u64,
    },
    YieldHarvested { user: Pubkey, pool: Pubkey, position: usize, amount: u64 },
    PositionStrategyUpdated { user: Pubkey, pool: Pubkey, position: usize, strategy: String },
    YieldPreferenceSet { user: Pubkey, name: String, target_pool: Pubkey },

    // ─── Strategy engine ──────────────────────────────────────────────────────
    StrategyAdded { name: String, legs: Vec<StrategyLeg> },
    StrategyRemoved { name: String },
    StrategyExecuted {
        user: Pubkey,
        strategy: String,
        amount: u64,
        allocations: Vec<UserAllocation>,
        total_yield: u64,
    },
    RebalancingTriggered { user: Pubkey, from: Vec<ProtocolAmount>, to: Vec<Pubkey> },
    YieldClaimed { user: Pubkey, protocol: Pubkey, amount: u64 },

    // ─── Fee / admin ──────────────────────────────────────────────────────────
    ProtocolFeeUpdated { old_fee_bps: u16, new_fee_bps: u16 },
    TaskFeeUpdated { old_fee_bps: u16, new_fee_bps: u16 },
    Paused { by: Pubkey },
    Unpaused { by: Pubkey },
    EmergencyWithdrawal { admin: Pubkey, token: Pubkey, amount: u64 },
}

/// What a payout transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "mint")]
pub enum Asset {
    Token(Pubkey),
    /// Native currency; strategy yield is paid in it
    Native,
}

/// Payout recorded by an operation, settled by the host after the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub recipient: Pubkey,
    pub asset: Asset,
    pub amount: u64,
}
