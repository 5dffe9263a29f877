use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use super::strategy::UserAllocation;
use super::table::{Record, Table};

// ─── LiquidityPosition ────────────────────────────────────────────────────────
// Position-ledger stake of a token pair in a protocol.
// liquidity = (amount_a + amount_b) / 2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPosition {
    pub protocol: Pubkey,
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub amount_a: u64,
    pub amount_b: u64,
    pub liquidity: u64,
    pub timestamp: i64,
    pub active: bool,
}

// ─── RestakingPosition ────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestakingPosition {
    pub protocol: Pubkey,
    pub token: Pubkey,
    pub amount: u64,
    /// Free-text strategy tag supplied by the user
    pub strategy: String,
    pub timestamp: i64,
    pub active: bool,
}

// ─── UserPoolPosition ─────────────────────────────────────────────────────────
// Pool-accounting stake; addressed by its index in the user's list.
// liquidity = floor(sqrt(amount_a * amount_b))
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoolPosition {
    pub pool: Pubkey,
    pub liquidity: u64,
    pub amount_a: u64,
    pub amount_b: u64,
    pub strategy: String,
    pub fees_earned: u64,
    pub active: bool,
    pub opened_at: i64,
}

/// Per-user yield preference recorded by `set_yield_strategy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldPreference {
    pub name: String,
    pub target_pool: Pubkey,
    pub min_yield_bps: u16,
    pub max_slippage_bps: u16,
    pub updated_at: i64,
}

/// Harvested pool yield, per pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolYield {
    pub pool: Pubkey,
    pub amount: u128,
}

impl Record for PoolYield {
    type Key = Pubkey;

    fn key(&self) -> Pubkey {
        self.pool
    }
}

/// Claimable strategy yield, per protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolBalance {
    pub protocol: Pubkey,
    pub amount: u128,
}

impl Record for ProtocolBalance {
    type Key = Pubkey;

    fn key(&self) -> Pubkey {
        self.protocol
    }
}

/// Everything the ledger records for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub owner: Pubkey,

    // Position ledger
    pub liquidity_positions: Vec<LiquidityPosition>,
    pub restaking_positions: Vec<RestakingPosition>,
    /// Sum of liquidity over the user's active liquidity positions
    pub liquidity_balance: u128,

    // Pool accounting
    pub pool_positions: Vec<UserPoolPosition>,
    pub pool_yield_total: u128,
    pub pool_yields: Table<PoolYield>,
    pub yield_preference: Option<YieldPreference>,

    // Strategy engine
    pub allocation_strategy: Option<String>,
    pub allocations: Vec<UserAllocation>,
    pub yield_balances: Table<ProtocolBalance>,
    pub total_yield_balance: u128,
}

impl Record for UserAccount {
    type Key = Pubkey;

    fn key(&self) -> Pubkey {
        self.owner
    }
}

impl UserAccount {
    pub fn new(owner: Pubkey) -> Self {
        Self {
            owner,
            liquidity_positions: Vec::new(),
            restaking_positions: Vec::new(),
            liquidity_balance: 0,
            pool_positions: Vec::new(),
            pool_yield_total: 0,
            pool_yields: Table::default(),
            yield_preference: None,
            allocation_strategy: None,
            allocations: Vec::new(),
            yield_balances: Table::default(),
            total_yield_balance: 0,
        }
    }

    /// Claimable strategy yield for `protocol`.
    pub fn claimable(&self, protocol: &Pubkey) -> u128 {
        self.yield_balances.get(protocol).map_or(0, |b| b.amount)
    }

    /// Harvested yield attributed to `pool`.
    pub fn pool_yield(&self, pool: &Pubkey) -> u128 {
        self.pool_yields.get(pool).map_or(0, |y| y.amount)
    }
}
