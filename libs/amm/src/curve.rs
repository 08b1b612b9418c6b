//! Constant product (x*y=k) quoting on integer reserves
//!
//! The fee is not applied here; callers pass the net bid amount that
//! actually enters the curve and settle fees separately.

use crate::error::{AmmError, Result};
use crate::math::{mul_div, wide};

/// Reserve movement for a single constant-product trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveQuote {
    /// Bid reserve after the net input lands
    pub next_reserve_bid: u128,
    /// Ask reserve implied by the invariant, floored
    pub next_reserve_ask: u128,
    /// `reserve_ask - next_reserve_ask`
    pub gross_out: u128,
}

/// Constant product math with integer rounding toward the pool
pub struct ConstantProduct;

impl ConstantProduct {
    /// Quote the ask-side movement for `amount_in` entering the bid side
    ///
    /// # Arguments
    /// * `amount_in` - Net bid amount entering the curve
    /// * `reserve_bid` - Current bid reserve
    /// * `reserve_ask` - Current ask reserve
    pub fn quote(amount_in: u128, reserve_bid: u128, reserve_ask: u128) -> Result<CurveQuote> {
        if reserve_bid == 0 || reserve_ask == 0 {
            return Err(AmmError::DivisionByZero);
        }

        let next_reserve_bid = reserve_bid
            .checked_add(amount_in)
            .ok_or(AmmError::RangeError)?;
        let next_reserve_ask = Self::next_reserve_ask(reserve_bid, reserve_ask, next_reserve_bid)?;

        Ok(CurveQuote {
            next_reserve_bid,
            next_reserve_ask,
            gross_out: reserve_ask - next_reserve_ask,
        })
    }

    /// `reserve_ask * reserve_bid / next_reserve_bid`
    pub fn next_reserve_ask(
        reserve_bid: u128,
        reserve_ask: u128,
        next_reserve_bid: u128,
    ) -> Result<u128> {
        mul_div(reserve_ask, reserve_bid, next_reserve_bid)
    }

    /// True when `x1 * y1 >= x0 * y0`
    pub fn invariant_holds(before: (u128, u128), after: (u128, u128)) -> bool {
        wide(after.0) * wide(after.1) >= wide(before.0) * wide(before.1)
    }
}
