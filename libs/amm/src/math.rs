//! Fixed-point integer primitives
//!
//! All prices and deviations are integers scaled by [`PRECISION`]. Products
//! that can exceed 128 bits are carried in [`U256`] and narrowed back with a
//! range check, so the committed path never touches floating point.

use crate::error::{AmmError, Result};
use std::cmp::Ordering;

// The macro expansion names `Result<T, E>`, so it must not see the crate alias
mod wide_uint {
    use uint::construct_uint;

    construct_uint! {
        /// 256-bit unsigned integer for intermediate products
        pub struct U256(4);
    }
}

pub use wide_uint::U256;

/// Denominator for every ratio in the engine (10^18)
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Largest operand accepted by [`isqrt`]
pub const SQRT_DOMAIN_MAX: u128 = u128::MAX;

/// Widen a `u128` into the intermediate type
#[inline]
pub fn wide(value: u128) -> U256 {
    U256::from(value)
}

/// Narrow an intermediate back to `u128`
pub fn narrow(value: U256) -> Result<u128> {
    if value > wide(u128::MAX) {
        return Err(AmmError::RangeError);
    }
    Ok(value.low_u128())
}

/// Integer square root, `floor(sqrt(x))`
///
/// Brackets the root from the operand's bit length and then runs the
/// Babylonian iteration from above. Operands beyond 2^128 - 1 are rejected.
pub fn isqrt(x: U256) -> Result<u128> {
    if x > wide(SQRT_DOMAIN_MAX) {
        return Err(AmmError::RangeError);
    }
    let x = x.low_u128();
    if x < 2 {
        return Ok(x);
    }

    let bit_length = 128 - x.leading_zeros();
    let bits = (bit_length + 1) / 2;
    let mut start = 1u128 << (bits - 1);
    let mut end = 1u128 << (bits + 1);
    while start < end {
        end = (start + end) / 2;
        start = x / end;
    }
    Ok(end)
}

/// `floor(a * b / d)` with a 256-bit intermediate product
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128> {
    if d == 0 {
        return Err(AmmError::DivisionByZero);
    }
    narrow(wide(a) * wide(b) / wide(d))
}

/// `|a - b|` without leaving unsigned space
#[inline]
pub fn abs_diff(a: u128, b: u128) -> u128 {
    a.abs_diff(b)
}

#[inline]
pub fn min(a: u128, b: u128) -> u128 {
    a.min(b)
}

#[inline]
pub fn max(a: u128, b: u128) -> u128 {
    a.max(b)
}

/// Which side of `PRECISION` a deviation sits on
///
/// `Equal` counts as both directions, which matches treating a zero
/// factor in `(P - beta) * (P - alpha)` as non-negative.
#[inline]
pub fn same_direction(alpha: u128, beta: u128) -> bool {
    match (alpha.cmp(&PRECISION), beta.cmp(&PRECISION)) {
        (Ordering::Equal, _) | (_, Ordering::Equal) => true,
        (a, b) => a == b,
    }
}

/// Number of bits needed to represent `value` (0 for 0)
#[inline]
pub fn bit_length(value: u128) -> u32 {
    128 - value.leading_zeros()
}
