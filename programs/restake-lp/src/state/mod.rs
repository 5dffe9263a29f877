//! Everything the ledger owns. `LedgerState` is the unit of persistence.

mod positions;
mod registry;
mod strategy;
mod table;

pub use positions::*;
pub use registry::*;
pub use strategy::*;
pub use table::{Record, Table};

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};

/// Contract-held balance of one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyBalance {
    pub token: Pubkey,
    pub amount: u64,
}

impl Record for CustodyBalance {
    type Key = Pubkey;

    fn key(&self) -> Pubkey {
        self.token
    }
}

/// Aggregate counters. Each equals the sum of its still-counted constituents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Σ liquidity of active liquidity positions
    pub liquidity: u128,
    /// Σ amount of active restaking positions
    pub restaked: u128,
    /// Σ liquidity of pool positions
    pub pool_liquidity: u128,
    /// Harvested pool yield, cumulative
    pub pool_yield: u128,
    /// Σ total_deposited over strategies
    pub strategy_deposits: u128,
    /// Strategy yield credited to users and not yet claimed
    pub unclaimed_yield: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerState {
    pub registry: Registry,
    pub users: Table<UserAccount>,
    pub strategies: Table<YieldStrategy>,
    pub custody: Table<CustodyBalance>,
    pub totals: Totals,
    pub protocol_fee_bps: u16,
    pub task_fee_bps: u16,
    pub paused: bool,
}

impl LedgerState {
    /// Empty ledger with the fees taken from `config`.
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            registry: Registry::default(),
            users: Table::default(),
            strategies: Table::default(),
            custody: Table::default(),
            totals: Totals::default(),
            protocol_fee_bps: config.protocol_fee_bps,
            task_fee_bps: config.task_fee_bps,
            paused: false,
        }
    }

    pub fn user_mut(&mut self, owner: &Pubkey) -> &mut UserAccount {
        self.users.entry_or_insert_with(owner, || UserAccount::new(*owner))
    }

    pub fn custody_balance(&self, token: &Pubkey) -> u64 {
        self.custody.get(token).map_or(0, |c| c.amount)
    }

    /// Custody of `token` after depositing `amount`. Does not write.
    pub fn custody_after_credit(&self, token: &Pubkey, amount: u64) -> Result<u64> {
        self.custody_balance(token)
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)
    }

    /// Custody of `token` after paying out `amount`. Does not write.
    pub fn custody_after_debit(&self, token: &Pubkey, amount: u64) -> Result<u64> {
        let available = self.custody_balance(token);
        available.checked_sub(amount).ok_or(LedgerError::InsufficientCustody {
            token: *token,
            requested: amount,
            available,
        })
    }

    pub fn set_custody(&mut self, token: Pubkey, amount: u64) {
        self.custody.upsert(CustodyBalance { token, amount });
    }
}
