//! Property-based tests for the ledger's arithmetic and allocation invariants.

use std::sync::Arc;

use proptest::prelude::*;
use restake_lp::{
    AdminSet, ErrorKind, LedgerConfig, LedgerError, ManualClock, RestakeLp, StrategyLeg,
};
use solana_sdk::pubkey::Pubkey;

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    ledger: RestakeLp,
    admin: Pubkey,
    user: Pubkey,
    protocols: Vec<Pubkey>,
    token_a: Pubkey,
    token_b: Pubkey,
}

fn harness(protocol_count: usize) -> Harness {
    let admin = Pubkey::new_unique();
    let mut ledger = RestakeLp::new(
        LedgerConfig::default(),
        Arc::new(ManualClock::new(1_700_000_000)),
        Arc::new(AdminSet::single(admin)),
    )
    .unwrap();

    let protocols: Vec<Pubkey> = (0..protocol_count)
        .map(|i| {
            let id = Pubkey::new_unique();
            ledger.add_protocol(admin, id, format!("p{i}"), 100, Pubkey::default()).unwrap();
            ledger.set_protocol_yield(admin, id, 500 + i as u16 * 100, 0).unwrap();
            id
        })
        .collect();
    let token_a = Pubkey::new_unique();
    let token_b = Pubkey::new_unique();
    ledger.add_token(admin, token_a, "T0", 18, 1_000).unwrap();
    ledger.add_token(admin, token_b, "T1", 18, 1_000).unwrap();

    Harness { ledger, admin, user: Pubkey::new_unique(), protocols, token_a, token_b }
}

fn legs(protocols: &[Pubkey], weights: &[u16]) -> Vec<StrategyLeg> {
    protocols
        .iter()
        .zip(weights)
        .map(|(&protocol, &weight_bps)| StrategyLeg { protocol, weight_bps })
        .collect()
}

// ============================================================================
// Strategies
// ============================================================================

/// 1..=5 weights that sum to exactly 10 000 bps
fn exact_weights() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(1u32..5_000, 1..=5).prop_map(|raw| {
        let sum: u32 = raw.iter().sum();
        let mut weights: Vec<u16> = raw.iter().map(|w| (w * 10_000 / sum) as u16).collect();
        let assigned: u32 = weights.iter().map(|&w| w as u32).sum();
        let last = weights.len() - 1;
        weights[last] += (10_000 - assigned) as u16;
        weights
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_exact_weight_sums_are_accepted(weights in exact_weights()) {
        let mut h = harness(weights.len());
        let legs = legs(&h.protocols, &weights);
        prop_assert!(h.ledger.add_strategy(h.admin, "s", legs, 0, 0).is_ok());
    }

    #[test]
    fn prop_other_weight_sums_are_rejected(
        weights in exact_weights(),
        delta in 1u16..500,
        up in any::<bool>(),
    ) {
        let mut weights = weights;
        let last = weights.len() - 1;
        if up || weights[last] <= delta {
            weights[last] += delta;
        } else {
            weights[last] -= delta;
        }
        let mut h = harness(weights.len());
        let legs = legs(&h.protocols, &weights);
        let err = h.ledger.add_strategy(h.admin, "s", legs, 0, 0).unwrap_err();
        let is_sum_error = matches!(err, LedgerError::WeightSumMismatch { .. });
        prop_assert!(is_sum_error);
        prop_assert_eq!(err.kind(), ErrorKind::Validation);
        prop_assert!(h.ledger.strategy("s").is_none());
    }

    #[test]
    fn prop_provide_liquidity_adds_the_mean(
        a in 1_000u64..1_000_000_000_000,
        b in 1_000u64..1_000_000_000_000,
    ) {
        let mut h = harness(1);
        let before = h.ledger.stats().total_liquidity;
        let index = h
            .ledger
            .provide_liquidity(h.user, h.protocols[0], h.token_a, h.token_b, a, b)
            .unwrap();
        let liquidity = h.ledger.liquidity_positions(&h.user)[index].liquidity;
        prop_assert_eq!(liquidity, (a + b) / 2);
        prop_assert!(liquidity > 0);
        prop_assert_eq!(h.ledger.stats().total_liquidity - before, liquidity as u128);
    }

    #[test]
    fn prop_removal_is_proportional_and_floors(
        amount_a in 1u64..10_000_000,
        amount_b in 1u64..10_000_000,
        fraction in 1u64..=100,
    ) {
        let mut h = harness(1);
        let pool = Pubkey::new_unique();
        h.ledger.add_pool(h.admin, pool, h.token_a, h.token_b, 30).unwrap();
        h.ledger.add_liquidity(h.user, pool, amount_a, amount_b, "").unwrap();

        let position = h.ledger.pool_positions(&h.user)[0].clone();
        let withdraw = (position.liquidity * fraction / 100).max(1);
        let (out_a, out_b) = h.ledger.remove_liquidity(h.user, pool, 0, withdraw).unwrap();

        let expect = |amount: u64| (withdraw as u128 * amount as u128 / position.liquidity as u128) as u64;
        prop_assert_eq!(out_a, expect(position.amount_a));
        prop_assert_eq!(out_b, expect(position.amount_b));
        let remaining = h.ledger.pool_positions(&h.user)[0].liquidity;
        prop_assert_eq!(remaining, position.liquidity - withdraw);
        if withdraw == position.liquidity {
            prop_assert_eq!(remaining, 0);
            prop_assert_eq!((out_a, out_b), (position.amount_a, position.amount_b));
        }
    }

    #[test]
    fn prop_allocation_snapshot_is_replaced(
        first in exact_weights(),
        amount_1 in 1u64..1_000_000_000,
        amount_2 in 1u64..1_000_000_000,
    ) {
        let mut h = harness(first.len() + 1);
        let n = first.len();
        h.ledger.add_strategy(h.admin, "wide", legs(&h.protocols[..n], &first), 0, 0).unwrap();
        h.ledger.add_strategy(h.admin, "narrow", legs(&h.protocols[n..], &[10_000]), 0, 0).unwrap();

        h.ledger.execute_strategy(h.user, "wide", amount_1).unwrap();
        let receipt = h.ledger.execute_strategy(h.user, "narrow", amount_2).unwrap();

        let protocols: Vec<Pubkey> = h.ledger.allocations(&h.user).iter().map(|a| a.protocol).collect();
        prop_assert_eq!(protocols, vec![h.protocols[n]]);
        prop_assert_eq!(receipt.allocated, amount_2);
        prop_assert_eq!(receipt.dust, 0);
    }

    #[test]
    fn prop_allocation_never_exceeds_the_deposit(
        weights in exact_weights(),
        amount in 1u64..u64::MAX / 2,
    ) {
        let mut h = harness(weights.len());
        h.ledger.add_strategy(h.admin, "s", legs(&h.protocols, &weights), 0, 0).unwrap();
        let receipt = h.ledger.execute_strategy(h.user, "s", amount).unwrap();
        prop_assert_eq!(receipt.allocated + receipt.dust, amount);
        prop_assert!(receipt.dust < weights.len() as u64);
        prop_assert_eq!(h.ledger.strategy("s").unwrap().total_deposited, receipt.allocated as u128);
    }
}
