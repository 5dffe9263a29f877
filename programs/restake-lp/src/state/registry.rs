use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use super::table::Record;

// ─── Protocol ─────────────────────────────────────────────────────────────────
// An external protocol capital can be routed to. Deactivation is a tombstone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    pub id: Pubkey,
    pub name: String,
    /// Protocol fee in basis points
    pub fee_bps: u16,
    /// Router / entrypoint the protocol is reached through (informational)
    pub router: Pubkey,
    pub active: bool,
    pub added_at: i64,
}

impl Record for Protocol {
    type Key = Pubkey;

    fn key(&self) -> Pubkey {
        self.id
    }
}

// ─── Token ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: Pubkey,
    pub symbol: String,
    pub decimals: u8,
    /// Smallest amount accepted in a single deposit
    pub min_amount: u64,
    pub active: bool,
}

impl Record for Token {
    type Key = Pubkey;

    fn key(&self) -> Pubkey {
        self.id
    }
}

// ─── Pool ─────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: Pubkey,
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub fee_tier: u32,
    /// Liquidity currently counted in the pool
    pub total_liquidity: u128,
    /// Fees harvested by the pool's positions, cumulative
    pub total_fees: u128,
    pub active: bool,
    pub created_at: i64,
}

impl Record for Pool {
    type Key = Pubkey;

    fn key(&self) -> Pubkey {
        self.id
    }
}

// ─── ProtocolYield ────────────────────────────────────────────────────────────
// Yield metadata the strategy engine reads when pricing an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolYield {
    pub protocol: Pubkey,
    /// Annual yield in basis points (≤ 10 000)
    pub apy_bps: u16,
    pub liquidity: u128,
    pub accrued_fees: u128,
    pub active: bool,
    pub updated_at: i64,
}

impl Record for ProtocolYield {
    type Key = Pubkey;

    fn key(&self) -> Pubkey {
        self.protocol
    }
}

/// Allowlists of protocols, tokens and pools, plus protocol yield metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    pub protocols: super::Table<Protocol>,
    pub tokens: super::Table<Token>,
    pub pools: super::Table<Pool>,
    pub yields: super::Table<ProtocolYield>,
}

impl Registry {
    pub fn is_protocol_active(&self, id: &Pubkey) -> bool {
        self.protocols.get(id).map_or(false, |p| p.active)
    }

    pub fn active_token(&self, id: &Pubkey) -> Option<&Token> {
        self.tokens.get(id).filter(|t| t.active)
    }

    /// Annual yield for `protocol`, or 0 when it has no active yield record.
    pub fn apy_bps(&self, protocol: &Pubkey) -> u16 {
        self.yields
            .get(protocol)
            .filter(|y| y.active)
            .map_or(0, |y| y.apy_bps)
    }
}
