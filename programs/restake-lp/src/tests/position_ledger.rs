use solana_sdk::pubkey::Pubkey;

use super::{Fixture, START};
use crate::{Asset, ErrorKind, LedgerConfig, LedgerError, LedgerEvent, ProtocolAmount, Transfer};

#[test]
fn provide_liquidity_records_the_arithmetic_mean() {
    let mut f = Fixture::new();
    let (user, p, a, b) = (f.user, f.protocol, f.token_a, f.token_b);

    let index = f.ledger.provide_liquidity(user, p, a, b, 1_000, 2_000).unwrap();
    assert_eq!(index, 0);

    let position = &f.ledger.liquidity_positions(&user)[0];
    assert_eq!(position.liquidity, 1_500);
    assert_eq!(position.timestamp, START);
    assert!(position.active);
    assert_eq!(f.ledger.stats().total_liquidity, 1_500);
    assert_eq!(f.ledger.user(&user).unwrap().liquidity_balance, 1_500);
    assert_eq!(f.ledger.custody_balance(&a), 1_000);
    assert_eq!(f.ledger.custody_balance(&b), 2_000);

    assert_eq!(
        f.ledger.take_events(),
        vec![LedgerEvent::LiquidityProvided {
            user,
            protocol: p,
            position: 0,
            amount_a: 1_000,
            amount_b: 2_000,
            liquidity: 1_500,
        }]
    );
}

#[test]
fn provide_liquidity_rejects_bad_inputs_without_side_effects() {
    let mut f = Fixture::new();
    let (user, p, a, b) = (f.user, f.protocol, f.token_a, f.token_b);

    let unknown = Pubkey::new_unique();
    let cases = [
        (f.ledger.provide_liquidity(user, unknown, a, b, 1_000, 1_000), LedgerError::UnsupportedProtocol(unknown)),
        (f.ledger.provide_liquidity(user, p, a, a, 1_000, 1_000), LedgerError::IdenticalTokens),
        (f.ledger.provide_liquidity(user, p, a, unknown, 1_000, 1_000), LedgerError::UnsupportedToken(unknown)),
        (
            f.ledger.provide_liquidity(user, p, a, b, 999, 1_000),
            LedgerError::AmountBelowMinimum { amount: 999, minimum: 1_000 },
        ),
    ];
    for (result, expected) in cases {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err, expected);
    }

    assert!(f.ledger.liquidity_positions(&user).is_empty());
    assert_eq!(f.ledger.stats().total_liquidity, 0);
    assert_eq!(f.ledger.custody_balance(&a), 0);
    assert!(f.ledger.take_events().is_empty());
}

#[test]
fn token_minimum_raises_the_configured_floor() {
    let mut f = Fixture::new();
    let (admin, user, p, a) = (f.admin, f.user, f.protocol, f.token_a);
    let whale = Pubkey::new_unique();
    f.ledger.add_token(admin, whale, "WHL", 9, 5_000).unwrap();

    let err = f.ledger.provide_liquidity(user, p, a, whale, 1_000, 4_999).unwrap_err();
    assert_eq!(err, LedgerError::AmountBelowMinimum { amount: 4_999, minimum: 5_000 });
    assert!(f.ledger.provide_liquidity(user, p, a, whale, 1_000, 5_000).is_ok());
}

#[test]
fn position_cap_allows_exactly_cap_positions() {
    let config = LedgerConfig { max_positions_per_user: 3, ..LedgerConfig::default() };
    let mut f = Fixture::with_config(config);
    let (user, p, a, b) = (f.user, f.protocol, f.token_a, f.token_b);

    for _ in 0..3 {
        f.ledger.provide_liquidity(user, p, a, b, 1_000, 1_000).unwrap();
    }
    let err = f.ledger.provide_liquidity(user, p, a, b, 1_000, 1_000).unwrap_err();
    assert_eq!(err, LedgerError::PositionCapReached { max: 3 });
    assert_eq!(err.kind(), ErrorKind::State);

    // Withdrawn positions still occupy their slot
    f.ledger.withdraw_liquidity(user, 0).unwrap();
    assert!(f.ledger.provide_liquidity(user, p, a, b, 1_000, 1_000).is_err());

    // The cap is per user
    let other = Pubkey::new_unique();
    assert!(f.ledger.provide_liquidity(other, p, a, b, 1_000, 1_000).is_ok());
}

#[test]
fn execute_restaking_has_no_position_cap() {
    let config = LedgerConfig { max_positions_per_user: 1, ..LedgerConfig::default() };
    let mut f = Fixture::with_config(config);
    let (user, p, a) = (f.user, f.protocol, f.token_a);

    for i in 0..5 {
        let index = f.ledger.execute_restaking(user, p, a, 2_000, "steady").unwrap();
        assert_eq!(index, i);
    }
    assert_eq!(f.ledger.restaking_positions(&user).len(), 5);
    assert_eq!(f.ledger.stats().total_restaked, 10_000);
    assert_eq!(f.ledger.custody_balance(&a), 10_000);

    let err = f.ledger.execute_restaking(user, p, a, 999, "steady").unwrap_err();
    assert_eq!(err, LedgerError::AmountBelowMinimum { amount: 999, minimum: 1_000 });
}

#[test]
fn restaking_into_a_tombstoned_protocol_fails() {
    let mut f = Fixture::new();
    let (admin, user, p, a) = (f.admin, f.user, f.protocol, f.token_a);

    f.ledger.remove_protocol(admin, p).unwrap();
    assert_eq!(
        f.ledger.execute_restaking(user, p, a, 1_000, "x").unwrap_err(),
        LedgerError::UnsupportedProtocol(p)
    );
}

#[test]
fn execute_rebalancing_validates_and_notifies_only() {
    let mut f = Fixture::new();
    let (user, p, a, b) = (f.user, f.protocol, f.token_a, f.token_b);
    let q = f.add_protocol("symbiotic");
    f.ledger.provide_liquidity(user, p, a, b, 1_000, 3_000).unwrap();
    f.ledger.take_events();
    let before = f.ledger.stats();

    assert_eq!(
        f.ledger.execute_rebalancing(user, vec![]).unwrap_err(),
        LedgerError::EmptyList("protocols")
    );
    assert_eq!(
        f.ledger
            .execute_rebalancing(user, vec![ProtocolAmount { protocol: q, amount: 0 }])
            .unwrap_err(),
        LedgerError::ZeroAmount
    );

    let moves = vec![
        ProtocolAmount { protocol: p, amount: 500 },
        ProtocolAmount { protocol: q, amount: 500 },
    ];
    f.ledger.execute_rebalancing(user, moves.clone()).unwrap();

    assert_eq!(f.ledger.stats(), before);
    assert_eq!(f.ledger.liquidity_positions(&user)[0].liquidity, 2_000);
    assert_eq!(f.ledger.take_events(), vec![LedgerEvent::RebalancingExecuted { user, moves }]);
}

#[test]
fn withdraw_liquidity_closes_the_position_and_pays_out() {
    let mut f = Fixture::new();
    let (user, p, a, b) = (f.user, f.protocol, f.token_a, f.token_b);
    f.ledger.provide_liquidity(user, p, a, b, 1_000, 2_000).unwrap();
    f.ledger.provide_liquidity(user, p, a, b, 4_000, 4_000).unwrap();

    assert_eq!(f.ledger.withdraw_liquidity(user, 0).unwrap(), (1_000, 2_000));
    assert!(!f.ledger.liquidity_positions(&user)[0].active);
    assert_eq!(f.ledger.stats().total_liquidity, 4_000);
    assert_eq!(f.ledger.user(&user).unwrap().liquidity_balance, 4_000);
    assert_eq!(f.ledger.custody_balance(&a), 4_000);
    assert_eq!(
        f.ledger.take_transfers(),
        vec![
            Transfer { recipient: user, asset: Asset::Token(a), amount: 1_000 },
            Transfer { recipient: user, asset: Asset::Token(b), amount: 2_000 },
        ]
    );

    assert_eq!(
        f.ledger.withdraw_liquidity(user, 0).unwrap_err(),
        LedgerError::PositionInactive { index: 0 }
    );
    assert_eq!(
        f.ledger.withdraw_liquidity(user, 7).unwrap_err(),
        LedgerError::PositionNotFound { index: 7 }
    );
}

#[test]
fn withdraw_restaking_decrements_the_total() {
    let mut f = Fixture::new();
    let (user, p, a) = (f.user, f.protocol, f.token_a);
    f.ledger.execute_restaking(user, p, a, 3_000, "x").unwrap();
    f.ledger.execute_restaking(user, p, a, 2_000, "y").unwrap();

    assert_eq!(f.ledger.withdraw_restaking(user, 1).unwrap(), 2_000);
    assert_eq!(f.ledger.stats().total_restaked, 3_000);
    assert!(!f.ledger.restaking_positions(&user)[1].active);
    assert!(f.ledger.withdraw_restaking(user, 1).is_err());

    // Other users cannot reach someone else's positions
    let other = Pubkey::new_unique();
    assert_eq!(
        f.ledger.withdraw_restaking(other, 0).unwrap_err(),
        LedgerError::PositionNotFound { index: 0 }
    );
}
