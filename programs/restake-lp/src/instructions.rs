//! Instruction handlers, one module per operation group.
//!
//! Every handler validates all of its preconditions before the first write,
//! so a rejected call leaves the ledger untouched.

pub mod registry;
pub mod provide_liquidity;
pub mod execute_restaking;
pub mod execute_rebalancing;
pub mod withdraw;
pub mod pool_liquidity;
pub mod harvest_yield;
pub mod update_strategy;
pub mod strategy_admin;
pub mod execute_strategy;
pub mod trigger_rebalancing;
pub mod claim_yield;
pub mod admin;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::events::{LedgerEvent, ProtocolAmount, Transfer};
use crate::host::AccessControl;
use crate::state::{ExecutionReceipt, LedgerState, StrategyLeg};

// ─── Context ──────────────────────────────────────────────────────────────────
// Everything a handler may read or write during one invocation. Events and
// transfers are only published once the handler returns Ok.
pub struct Context<'a> {
    pub state: &'a mut LedgerState,
    pub config: &'a LedgerConfig,
    pub access: &'a dyn AccessControl,
    pub caller: Pubkey,
    pub now: i64,
    pub events: Vec<LedgerEvent>,
    pub transfers: Vec<Transfer>,
}

impl Context<'_> {
    pub fn require_admin(&self) -> Result<()> {
        crate::require!(self.access.is_admin(&self.caller), LedgerError::Unauthorized(self.caller));
        Ok(())
    }

    pub fn require_not_paused(&self) -> Result<()> {
        crate::require!(!self.state.paused, LedgerError::Paused);
        Ok(())
    }

    /// Depositing `amount` of a token requires at least this much.
    pub fn minimum_for(&self, config_minimum: u64, token: &Pubkey) -> u64 {
        let token_minimum = self.state.registry.tokens.get(token).map_or(0, |t| t.min_amount);
        config_minimum.max(token_minimum)
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn pay(&mut self, transfer: Transfer) {
        self.transfers.push(transfer);
    }
}

// ─── Instruction ──────────────────────────────────────────────────────────────
// Wire form of every mutating operation. Rebalancing and strategy calls keep
// the parallel-array shape here; `into_*` helpers pair them up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "instruction", rename_all = "snake_case")]
pub enum Instruction {
    AddProtocol { id: Pubkey, name: String, fee_bps: u16, router: Pubkey },
    AddToken { id: Pubkey, symbol: String, decimals: u8, min_amount: u64 },
    AddPool { id: Pubkey, token_a: Pubkey, token_b: Pubkey, fee_tier: u32 },
    RemoveProtocol { id: Pubkey },
    RemoveToken { id: Pubkey },
    RemovePool { id: Pubkey },
    SetProtocolYield { protocol: Pubkey, apy_bps: u16, liquidity: u64 },

    ProvideLiquidity {
        protocol: Pubkey,
        token_a: Pubkey,
        token_b: Pubkey,
        amount_a: u64,
        amount_b: u64,
    },
    ExecuteRestaking { protocol: Pubkey, token: Pubkey, amount: u64, strategy: String },
    ExecuteRebalancing { protocols: Vec<Pubkey>, amounts: Vec<u64> },
    WithdrawLiquidity { position: usize },
    WithdrawRestaking { position: usize },

    AddLiquidity { pool: Pubkey, amount_a: u64, amount_b: u64, strategy: String },
    RemoveLiquidity { pool: Pubkey, position: usize, liquidity: u64 },
    HarvestYield { pool: Pubkey, position: usize },
    UpdateStrategy { pool: Pubkey, position: usize, strategy: String },
    SetYieldStrategy {
        name: String,
        target_pool: Pubkey,
        min_yield_bps: u16,
        max_slippage_bps: u16,
    },

    AddStrategy {
        name: String,
        protocols: Vec<Pubkey>,
        weights_bps: Vec<u16>,
        min_yield_bps: u16,
        max_slippage_bps: u16,
    },
    RemoveStrategy { name: String },
    ExecuteStrategy { name: String, amount: u64 },
    TriggerRebalancing {
        from_protocols: Vec<Pubkey>,
        to_protocols: Vec<Pubkey>,
        amounts: Vec<u64>,
    },
    ClaimYield { protocol: Pubkey },

    UpdateProtocolFee { fee_bps: u16 },
    UpdateTaskFee { fee_bps: u16 },
    Pause,
    Unpause,
    EmergencyWithdraw { token: Pubkey, amount: u64 },
}

impl Instruction {
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::AddProtocol { .. } => "add_protocol",
            Instruction::AddToken { .. } => "add_token",
            Instruction::AddPool { .. } => "add_pool",
            Instruction::RemoveProtocol { .. } => "remove_protocol",
            Instruction::RemoveToken { .. } => "remove_token",
            Instruction::RemovePool { .. } => "remove_pool",
            Instruction::SetProtocolYield { .. } => "set_protocol_yield",
            Instruction::ProvideLiquidity { .. } => "provide_liquidity",
            Instruction::ExecuteRestaking { .. } => "execute_restaking",
            Instruction::ExecuteRebalancing { .. } => "execute_rebalancing",
            Instruction::WithdrawLiquidity { .. } => "withdraw_liquidity",
            Instruction::WithdrawRestaking { .. } => "withdraw_restaking",
            Instruction::AddLiquidity { .. } => "add_liquidity",
            Instruction::RemoveLiquidity { .. } => "remove_liquidity",
            Instruction::HarvestYield { .. } => "harvest_yield",
            Instruction::UpdateStrategy { .. } => "update_strategy",
            Instruction::SetYieldStrategy { .. } => "set_yield_strategy",
            Instruction::AddStrategy { .. } => "add_strategy",
            Instruction::RemoveStrategy { .. } => "remove_strategy",
            Instruction::ExecuteStrategy { .. } => "execute_strategy",
            Instruction::TriggerRebalancing { .. } => "trigger_rebalancing",
            Instruction::ClaimYield { .. } => "claim_yield",
            Instruction::UpdateProtocolFee { .. } => "update_protocol_fee",
            Instruction::UpdateTaskFee { .. } => "update_task_fee",
            Instruction::Pause => "pause",
            Instruction::Unpause => "unpause",
            Instruction::EmergencyWithdraw { .. } => "emergency_withdraw",
        }
    }
}

/// Zip `protocols[i]` with `amounts[i]`.
pub fn pair_amounts(protocols: Vec<Pubkey>, amounts: Vec<u64>) -> Result<Vec<ProtocolAmount>> {
    crate::require!(
        protocols.len() == amounts.len(),
        LedgerError::LengthMismatch { left: protocols.len(), right: amounts.len() }
    );
    Ok(protocols
        .into_iter()
        .zip(amounts)
        .map(|(protocol, amount)| ProtocolAmount { protocol, amount })
        .collect())
}

/// Zip `protocols[i]` with `weights_bps[i]`.
pub fn pair_legs(protocols: Vec<Pubkey>, weights_bps: Vec<u16>) -> Result<Vec<StrategyLeg>> {
    crate::require!(
        protocols.len() == weights_bps.len(),
        LedgerError::LengthMismatch { left: protocols.len(), right: weights_bps.len() }
    );
    Ok(protocols
        .into_iter()
        .zip(weights_bps)
        .map(|(protocol, weight_bps)| StrategyLeg { protocol, weight_bps })
        .collect())
}

// ─── Outcome ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Done,
    /// Index of the position the call appended
    Position { index: usize },
    /// Token amounts released by a pair withdrawal
    Withdrawn { amount_a: u64, amount_b: u64 },
    /// Single-asset amount released or claimed
    Released { amount: u64 },
    Harvested { amount: u64 },
    Executed(ExecutionReceipt),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairing_rejects_length_mismatch() {
        let p = vec![Pubkey::new_unique(), Pubkey::new_unique()];
        assert_eq!(
            pair_amounts(p.clone(), vec![1]).unwrap_err(),
            LedgerError::LengthMismatch { left: 2, right: 1 }
        );
        assert_eq!(pair_legs(p, vec![5_000, 5_000]).unwrap().len(), 2);
    }

    #[test]
    fn instruction_wire_form_is_tagged() {
        let ix: Instruction = serde_json::from_str(r#"{"instruction":"pause"}"#).unwrap();
        assert_eq!(ix, Instruction::Pause);

        let ix = Instruction::ExecuteStrategy { name: "s".into(), amount: 10 };
        let json = serde_json::to_value(&ix).unwrap();
        assert_eq!(json["instruction"], "execute_strategy");
    }
}
