//! Ledger error type.

use std::fmt;

use solana_sdk::pubkey::Pubkey;

/// Every condition an operation can reject with.
///
/// Variants are grouped by [`ErrorKind`]; use [`LedgerError::kind`] when only
/// the category matters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    // ── Validation ───────────────────────────────────────────────────────────
    #[error("{0} id must not be the zero identifier")]
    ZeroIdentifier(&'static str),

    #[error("{0} must not be empty")]
    EmptyName(&'static str),

    #[error("Fee {fee_bps} bps exceeds the {max_bps} bps maximum")]
    FeeTooHigh { fee_bps: u16, max_bps: u16 },

    #[error("Fee {fee_bps} bps is outside {min_bps}–{max_bps} bps")]
    FeeOutOfBounds { fee_bps: u16, min_bps: u16, max_bps: u16 },

    #[error("Token decimals {decimals} exceed {max}")]
    DecimalsTooHigh { decimals: u8, max: u8 },

    #[error("Annual yield {apy_bps} bps exceeds 10000 bps")]
    ApyTooHigh { apy_bps: u16 },

    #[error("Max slippage {slippage_bps} bps exceeds 10000 bps")]
    SlippageTooHigh { slippage_bps: u16 },

    #[error("Protocol {0} is already registered")]
    DuplicateProtocol(Pubkey),

    #[error("Token {0} is already registered")]
    DuplicateToken(Pubkey),

    #[error("Pool {0} is already registered")]
    DuplicatePool(Pubkey),

    #[error("Strategy '{0}' already exists")]
    DuplicateStrategy(String),

    #[error("Protocol {0} is not supported")]
    UnsupportedProtocol(Pubkey),

    #[error("Token {0} is not supported")]
    UnsupportedToken(Pubkey),

    #[error("Token A and token B must differ")]
    IdenticalTokens,

    #[error("Pool {0} was registered with a different token pair")]
    PoolTokensChanged(Pubkey),

    #[error("Amount {amount} is below the {minimum} minimum")]
    AmountBelowMinimum { amount: u64, minimum: u64 },

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("{0} must not be empty")]
    EmptyList(&'static str),

    #[error("Array length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Strategy weights sum to {sum} bps; expected exactly 10000")]
    WeightSumMismatch { sum: u64 },

    #[error("Strategy lists {count} protocols; at most {max} allowed")]
    TooManyProtocols { count: usize, max: usize },

    #[error("Math overflow")]
    MathOverflow,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Authorization ────────────────────────────────────────────────────────
    #[error("Unauthorized: {0} lacks the admin capability")]
    Unauthorized(Pubkey),

    // ── State ────────────────────────────────────────────────────────────────
    #[error("Position cap of {max} reached")]
    PositionCapReached { max: usize },

    #[error("No position at index {index}")]
    PositionNotFound { index: usize },

    #[error("Position {index} is not active")]
    PositionInactive { index: usize },

    #[error("Position {index} does not belong to pool {pool}")]
    PoolMismatch { index: usize, pool: Pubkey },

    #[error("Protocol {0} is not registered")]
    ProtocolNotFound(Pubkey),

    #[error("Protocol {0} is not active")]
    ProtocolInactive(Pubkey),

    #[error("Token {0} is not registered")]
    TokenNotFound(Pubkey),

    #[error("Token {0} is not active")]
    TokenInactive(Pubkey),

    #[error("Pool {0} is not registered")]
    PoolNotFound(Pubkey),

    #[error("Pool {0} is not active")]
    PoolInactive(Pubkey),

    #[error("Pool limit of {max} reached")]
    PoolLimitReached { max: usize },

    #[error("Strategy '{0}' does not exist")]
    StrategyNotFound(String),

    #[error("Strategy '{0}' is not active")]
    StrategyInactive(String),

    #[error("Strategy limit of {max} reached")]
    StrategyLimitReached { max: usize },

    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: u128, available: u128 },

    #[error("Nothing to claim")]
    NothingToClaim,

    #[error("Insufficient custody balance of {token}: requested {requested}, available {available}")]
    InsufficientCustody { token: Pubkey, requested: u64, available: u64 },

    #[error("Ledger is already paused")]
    AlreadyPaused,

    #[error("Ledger is not paused")]
    NotPaused,

    #[error("Re-entrant call rejected")]
    ReentrantCall,

    // ── Paused ───────────────────────────────────────────────────────────────
    #[error("Ledger is paused")]
    Paused,
}

/// Category of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    State,
    Paused,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Authorization => "AuthorizationError",
            ErrorKind::State => "StateError",
            ErrorKind::Paused => "PausedError",
        };
        f.write_str(name)
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        use LedgerError::*;
        match self {
            ZeroIdentifier(_)
            | EmptyName(_)
            | FeeTooHigh { .. }
            | FeeOutOfBounds { .. }
            | DecimalsTooHigh { .. }
            | ApyTooHigh { .. }
            | SlippageTooHigh { .. }
            | DuplicateProtocol(_)
            | DuplicateToken(_)
            | DuplicatePool(_)
            | DuplicateStrategy(_)
            | UnsupportedProtocol(_)
            | UnsupportedToken(_)
            | IdenticalTokens
            | PoolTokensChanged(_)
            | AmountBelowMinimum { .. }
            | ZeroAmount
            | EmptyList(_)
            | LengthMismatch { .. }
            | WeightSumMismatch { .. }
            | TooManyProtocols { .. }
            | MathOverflow
            | InvalidConfig(_) => ErrorKind::Validation,

            Unauthorized(_) => ErrorKind::Authorization,

            PositionCapReached { .. }
            | PositionNotFound { .. }
            | PositionInactive { .. }
            | PoolMismatch { .. }
            | ProtocolNotFound(_)
            | ProtocolInactive(_)
            | TokenNotFound(_)
            | TokenInactive(_)
            | PoolNotFound(_)
            | PoolInactive(_)
            | PoolLimitReached { .. }
            | StrategyNotFound(_)
            | StrategyInactive(_)
            | StrategyLimitReached { .. }
            | InsufficientLiquidity { .. }
            | NothingToClaim
            | InsufficientCustody { .. }
            | AlreadyPaused
            | NotPaused
            | ReentrantCall => ErrorKind::State,

            Paused => ErrorKind::Paused,
        }
    }
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// `require!`-style guard: bail out with `$err` unless `$cond` holds.
#[macro_export]
macro_rules! require {
    ($cond:expr, $err:expr $(,)?) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}
