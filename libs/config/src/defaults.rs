//! Default configuration values

/// Environment variable prefix for overrides (`AMM_POOL__RESERVE_A=...`)
pub const ENV_PREFIX: &str = "AMM";

/// Pool genesis defaults
pub mod pool {
    /// Seed reserve of asset A
    pub const RESERVE_A: u64 = 1_000_000_000;

    /// Seed reserve of asset B (spot price 5 B per A)
    pub const RESERVE_B: u64 = 5_000_000_000;

    /// Starting discount divisor
    pub const INITIAL_DISCOUNT: u64 = 2;
}

/// Trading loop defaults
pub mod simulation {
    pub const ROUNDS: u64 = 1_000;

    /// Probability that a trader sells B for A; 0.5 is an unbiased market
    pub const MARKET_TREND: f64 = 0.5;

    pub const SEED: u64 = 42;

    /// Rounds between liquidity bot actions
    pub const LP_INTERVAL: u64 = 50;
}

/// Fee histogram defaults
pub mod stats {
    /// Number of fixed-width buckets before the overflow bucket
    pub const BINS: usize = 20;

    /// Bucket width in whole percent
    pub const BIN_WIDTH_PCT: u32 = 5;
}

/// Logging defaults
pub mod logging {
    pub const LEVEL: &str = "info";
}
