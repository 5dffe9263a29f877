//! Scenario tests, one file per ledger module, over a shared fixture.

mod admin;
mod position_ledger;

use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;

use crate::{AdminSet, LedgerConfig, ManualClock, RestakeLp};

pub const START: i64 = 1_700_000_000;

/// A ledger with one admin, one protocol (100 bps) and two 18-decimal tokens
/// with a 1 000 minimum.
pub struct Fixture {
    pub ledger: RestakeLp,
    pub clock: ManualClock,
    pub admin: Pubkey,
    pub user: Pubkey,
    pub protocol: Pubkey,
    pub token_a: Pubkey,
    pub token_b: Pubkey,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        let clock = ManualClock::new(START);
        let admin = Pubkey::new_unique();
        let mut ledger = RestakeLp::new(
            config,
            Arc::new(clock.clone()),
            Arc::new(AdminSet::single(admin)),
        )
        .unwrap();

        let protocol = Pubkey::new_unique();
        let token_a = Pubkey::new_unique();
        let token_b = Pubkey::new_unique();
        ledger.add_protocol(admin, protocol, "eigen", 100, Pubkey::new_unique()).unwrap();
        ledger.add_token(admin, token_a, "T0", 18, 1_000).unwrap();
        ledger.add_token(admin, token_b, "T1", 18, 1_000).unwrap();
        ledger.take_events();

        Self {
            ledger,
            clock,
            admin,
            user: Pubkey::new_unique(),
            protocol,
            token_a,
            token_b,
        }
    }

    /// Register another active protocol.
    pub fn add_protocol(&mut self, name: &str) -> Pubkey {
        let id = Pubkey::new_unique();
        self.ledger.add_protocol(self.admin, id, name, 50, Pubkey::default()).unwrap();
        id
    }

    /// Register a pool over the fixture's two tokens.
    pub fn add_pool(&mut self) -> Pubkey {
        let id = Pubkey::new_unique();
        self.ledger.add_pool(self.admin, id, self.token_a, self.token_b, 30).unwrap();
        id
    }
}
