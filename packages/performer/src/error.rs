//! Performer error type.

/// Why a task was rejected. Messages are part of the wire contract.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Decoding ─────────────────────────────────────────────────────────────
    #[error("invalid task payload format: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("unknown task type: {0}")]
    UnknownTaskType(String),

    // ── Restake ──────────────────────────────────────────────────────────────
    #[error("protocol is required for restake task")]
    RestakeProtocolRequired,

    #[error("amount is required for restake task")]
    RestakeAmountRequired,

    #[error("token is required for restake task")]
    RestakeTokenRequired,

    // ── Liquidity ────────────────────────────────────────────────────────────
    #[error("protocol is required for liquidity task")]
    LiquidityProtocolRequired,

    #[error("both tokens are required for liquidity task")]
    LiquidityTokensRequired,

    #[error("both amounts are required for liquidity task")]
    LiquidityAmountsRequired,
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
