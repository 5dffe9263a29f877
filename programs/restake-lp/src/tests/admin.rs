use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;

use super::Fixture;
use crate::{
    AdminSet, Asset, ErrorKind, Instruction, LedgerConfig, LedgerError, LedgerEvent, LedgerState,
    ManualClock, Outcome, ProtocolAmount, RestakeLp, StrategyLeg, Transfer,
};

#[test]
fn pause_gates_deposits_and_unpause_restores_them() {
    let mut f = Fixture::new();
    let (admin, user, p, a, b) = (f.admin, f.user, f.protocol, f.token_a, f.token_b);
    let moves = vec![ProtocolAmount { protocol: p, amount: 10 }];

    f.ledger.pause(admin).unwrap();
    assert!(f.ledger.is_paused());

    let results = [
        f.ledger.provide_liquidity(user, p, a, b, 1_000, 1_000).map(|_| ()),
        f.ledger.execute_restaking(user, p, a, 1_000, "x").map(|_| ()),
        f.ledger.execute_rebalancing(user, moves.clone()),
    ];
    for result in results {
        let err = result.unwrap_err();
        assert_eq!(err, LedgerError::Paused);
        assert_eq!(err.kind(), ErrorKind::Paused);
    }
    assert_eq!(f.ledger.stats().total_liquidity, 0);

    f.ledger.unpause(admin).unwrap();
    assert!(f.ledger.provide_liquidity(user, p, a, b, 1_000, 1_000).is_ok());
    assert!(f.ledger.execute_restaking(user, p, a, 1_000, "x").is_ok());
    assert!(f.ledger.execute_rebalancing(user, moves).is_ok());
}

#[test]
fn pause_leaves_reads_admin_and_claims_alone() {
    let mut f = Fixture::new();
    let (admin, user, p) = (f.admin, f.user, f.protocol);
    let pool = f.add_pool();
    f.ledger.add_liquidity(user, pool, 1_000, 1_000, "").unwrap();
    f.ledger
        .add_strategy(admin, "s", vec![StrategyLeg { protocol: p, weight_bps: 10_000 }], 0, 0)
        .unwrap();
    f.ledger.pause(admin).unwrap();

    assert_eq!(f.ledger.pool_positions(&user).len(), 1);
    assert!(f.ledger.harvest_yield(user, pool, 0).is_ok());
    assert!(f.ledger.update_strategy(user, pool, 0, "calm").is_ok());
    assert!(f.ledger.add_protocol(admin, Pubkey::new_unique(), "n", 1, Pubkey::default()).is_ok());
    assert!(f.ledger.update_protocol_fee(admin, 50).is_ok());

    assert_eq!(f.ledger.add_liquidity(user, pool, 1, 1, "").unwrap_err(), LedgerError::Paused);
    assert_eq!(f.ledger.remove_liquidity(user, pool, 0, 1).unwrap_err(), LedgerError::Paused);
    assert_eq!(f.ledger.execute_strategy(user, "s", 100).unwrap_err(), LedgerError::Paused);
    assert_eq!(f.ledger.withdraw_liquidity(user, 0).unwrap_err(), LedgerError::Paused);
}

#[test]
fn pause_switch_is_admin_only_and_not_idempotent() {
    let mut f = Fixture::new();
    let (admin, user) = (f.admin, f.user);

    assert_eq!(f.ledger.pause(user).unwrap_err(), LedgerError::Unauthorized(user));
    assert_eq!(f.ledger.unpause(admin).unwrap_err(), LedgerError::NotPaused);
    f.ledger.pause(admin).unwrap();
    assert_eq!(f.ledger.pause(admin).unwrap_err(), LedgerError::AlreadyPaused);
    assert_eq!(
        f.ledger.take_events(),
        vec![LedgerEvent::Paused { by: admin }]
    );
}

#[test]
fn fee_updates_are_bounded_and_emit_old_and_new() {
    let mut f = Fixture::new();
    let admin = f.admin;
    assert_eq!(f.ledger.protocol_fee_bps(), 30);

    f.ledger.update_protocol_fee(admin, 250).unwrap();
    assert_eq!(
        f.ledger.take_events(),
        vec![LedgerEvent::ProtocolFeeUpdated { old_fee_bps: 30, new_fee_bps: 250 }]
    );
    assert_eq!(
        f.ledger.update_protocol_fee(admin, 1_001).unwrap_err(),
        LedgerError::FeeOutOfBounds { fee_bps: 1_001, min_bps: 1, max_bps: 1_000 }
    );
    assert!(f.ledger.update_protocol_fee(admin, 0).is_err());
    assert_eq!(f.ledger.protocol_fee_bps(), 250);

    f.ledger.update_task_fee(admin, 1_000).unwrap();
    assert_eq!(f.ledger.task_fee_bps(), 1_000);
    assert!(f.ledger.update_task_fee(admin, 1_001).is_err());
    assert!(f.ledger.update_task_fee(f.user, 10).is_err());
}

#[test]
fn emergency_withdraw_moves_custody_to_the_admin() {
    let mut f = Fixture::new();
    let (admin, user, p, a) = (f.admin, f.user, f.protocol, f.token_a);
    f.ledger.execute_restaking(user, p, a, 5_000, "x").unwrap();

    let err = f.ledger.emergency_withdraw(admin, a, 5_001).unwrap_err();
    assert_eq!(err, LedgerError::InsufficientCustody { token: a, requested: 5_001, available: 5_000 });
    assert_eq!(err.kind(), ErrorKind::State);
    assert!(f.ledger.emergency_withdraw(user, a, 1).is_err());

    f.ledger.emergency_withdraw(admin, a, 4_000).unwrap();
    assert_eq!(f.ledger.custody_balance(&a), 1_000);
    assert_eq!(
        f.ledger.take_transfers(),
        vec![Transfer { recipient: admin, asset: Asset::Token(a), amount: 4_000 }]
    );
}

#[test]
fn nested_balance_mutating_call_is_rejected() {
    let mut f = Fixture::new();
    let (user, p, a, b) = (f.user, f.protocol, f.token_a, f.token_b);
    let lock = f.ledger.reentrancy_lock();

    {
        // A transfer callback still running holds the lock
        let _in_flight = lock.enter().unwrap();
        let err = f.ledger.provide_liquidity(user, p, a, b, 1_000, 1_000).unwrap_err();
        assert_eq!(err, LedgerError::ReentrantCall);
        assert_eq!(err.kind(), ErrorKind::State);
        assert!(f.ledger.claim_yield(user, p).is_err());
        // Metadata and admin calls are not guarded
        assert!(f.ledger.update_protocol_fee(f.admin, 40).is_ok());
    }

    assert!(f.ledger.provide_liquidity(user, p, a, b, 1_000, 1_000).is_ok());
    assert!(!lock.is_locked());
}

#[test]
fn guard_is_released_after_a_failed_call() {
    let mut f = Fixture::new();
    let (user, p, a, b) = (f.user, f.protocol, f.token_a, f.token_b);

    assert!(f.ledger.provide_liquidity(user, p, a, b, 1, 1).is_err());
    assert!(!f.ledger.reentrancy_lock().is_locked());
    assert!(f.ledger.provide_liquidity(user, p, a, b, 1_000, 1_000).is_ok());
}

#[test]
fn process_pairs_parallel_arrays() {
    let mut f = Fixture::new();
    let (admin, user, p) = (f.admin, f.user, f.protocol);
    let q = f.add_protocol("q");

    let err = f
        .ledger
        .process(
            user,
            Instruction::ExecuteRebalancing { protocols: vec![p, q], amounts: vec![1] },
        )
        .unwrap_err();
    assert_eq!(err, LedgerError::LengthMismatch { left: 2, right: 1 });
    assert_eq!(err.kind(), ErrorKind::Validation);

    let ix = Instruction::AddStrategy {
        name: "s".into(),
        protocols: vec![p, q],
        weights_bps: vec![6_000, 4_000],
        min_yield_bps: 500,
        max_slippage_bps: 100,
    };
    assert_eq!(f.ledger.process(admin, ix).unwrap(), Outcome::Done);

    let outcome = f
        .ledger
        .process(user, Instruction::ExecuteStrategy { name: "s".into(), amount: 10_000 })
        .unwrap();
    match outcome {
        Outcome::Executed(receipt) => assert_eq!(receipt.allocated, 10_000),
        other => panic!("unexpected outcome {other:?}"),
    }

    let outcome = f
        .ledger
        .process(
            user,
            Instruction::TriggerRebalancing {
                from_protocols: vec![p],
                to_protocols: vec![q],
                amounts: vec![2_000],
            },
        )
        .unwrap();
    assert_eq!(outcome, Outcome::Done);
}

#[test]
fn process_accepts_json_instructions() {
    let mut f = Fixture::new();
    let pool = f.add_pool();
    let user = f.user;

    let ix = serde_json::json!({
        "instruction": "add_liquidity",
        "pool": pool,
        "amount_a": 100,
        "amount_b": 400,
        "strategy": "wire",
    });
    let ix: Instruction = serde_json::from_value(ix).unwrap();
    assert_eq!(f.ledger.process(user, ix).unwrap(), Outcome::Position { index: 0 });
    assert_eq!(f.ledger.pool_positions(&user)[0].liquidity, 200);
}

#[test]
fn state_survives_a_save_and_reload() {
    let mut f = Fixture::new();
    let (admin, user, p, a, b) = (f.admin, f.user, f.protocol, f.token_a, f.token_b);
    let pool = f.add_pool();
    f.ledger.provide_liquidity(user, p, a, b, 1_000, 2_000).unwrap();
    f.ledger.add_liquidity(user, pool, 100, 400, "").unwrap();
    f.ledger.remove_protocol(admin, p).unwrap();

    let json = serde_json::to_string(f.ledger.state()).unwrap();
    let state: LedgerState = serde_json::from_str(&json).unwrap();
    let mut reloaded = RestakeLp::from_state(
        state,
        LedgerConfig::default(),
        Arc::new(ManualClock::new(0)),
        Arc::new(AdminSet::single(admin)),
    )
    .unwrap();

    assert_eq!(reloaded.stats(), f.ledger.stats());
    assert!(!reloaded.protocol(&p).unwrap().active);
    assert_eq!(reloaded.liquidity_positions(&user)[0].liquidity, 1_500);
    assert_eq!(reloaded.user(&user), f.ledger.user(&user));
    // Indexes are rebuilt: lookups and in-place updates still work
    assert_eq!(reloaded.remove_liquidity(user, pool, 0, 200).unwrap(), (100, 400));
    assert!(reloaded.add_protocol(admin, p, "back", 10, Pubkey::default()).is_ok());
    assert_eq!(reloaded.protocols().len(), 1);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = LedgerConfig { min_global_fee_bps: 10, protocol_fee_bps: 5, ..LedgerConfig::default() };
    let result = RestakeLp::new(
        config,
        Arc::new(ManualClock::new(0)),
        Arc::new(AdminSet::default()),
    );
    assert!(matches!(result, Err(LedgerError::InvalidConfig(_))));
}
