/// Denominator for basis-point math (10_000 bps = 100 %)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Strategy weights must add up to exactly this many basis points.
pub const TOTAL_WEIGHT_BPS: u32 = 10_000;

/// Upper bound for a protocol's annual yield (100 %).
pub const MAX_APY_BPS: u16 = 10_000;

/// Strategy yield accrues one day of the annual rate per execution.
pub const DAYS_PER_YEAR: u128 = 365;

/// Pool harvest: flat 0.5 % of the position's current liquidity (5 / 1000).
pub const HARVEST_RATE_NUMERATOR: u128 = 5;
pub const HARVEST_RATE_DENOMINATOR: u128 = 1_000;

/// ERC-20 style decimal precision ceiling for registered tokens.
pub const MAX_TOKEN_DECIMALS: u8 = 18;

// ─── Config defaults ──────────────────────────────────────────────────────────

pub const DEFAULT_MAX_POSITIONS_PER_USER: usize = 100;
pub const DEFAULT_MAX_POOL_POSITIONS_PER_USER: usize = 50;
pub const DEFAULT_MIN_LIQUIDITY_AMOUNT: u64 = 1_000;
pub const DEFAULT_MIN_RESTAKE_AMOUNT: u64 = 1_000;
pub const DEFAULT_MAX_POOLS: usize = 100;
pub const DEFAULT_MAX_STRATEGIES: usize = 50;
pub const DEFAULT_MAX_PROTOCOLS_PER_STRATEGY: usize = 10;

/// Per-protocol fee ceiling: 10 %
pub const DEFAULT_MAX_PROTOCOL_FEE_BPS: u16 = 1_000;

/// Global fee bounds and initial value: 0.01 % ..= 10 %, starting at 0.30 %
pub const DEFAULT_MIN_GLOBAL_FEE_BPS: u16 = 1;
pub const DEFAULT_MAX_GLOBAL_FEE_BPS: u16 = 1_000;
pub const DEFAULT_PROTOCOL_FEE_BPS: u16 = 30;
pub const DEFAULT_TASK_FEE_BPS: u16 = 30;
