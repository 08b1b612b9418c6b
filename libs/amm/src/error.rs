//! Error types for pool state transitions and fixed-point arithmetic
//!
//! Every failure is local and synchronous. An operation that returns an
//! error has not mutated any pool state.

use thiserror::Error;

/// Errors raised by the adaptive AMM engine
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AmmError {
    /// Amount, lpt, or side selection is not acceptable for the operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A denominator (liquidity supply, reserve, or price) is zero
    #[error("Division by zero")]
    DivisionByZero,

    /// A value exceeds the representable fixed-point domain
    #[error("Value exceeds representable range")]
    RangeError,

    /// The quoted output is not positive, or the pool would be drained
    #[error("Insufficient liquidity for requested operation")]
    InsufficientLiquidity,
}

/// Result alias used across the engine
pub type Result<T> = std::result::Result<T, AmmError>;
