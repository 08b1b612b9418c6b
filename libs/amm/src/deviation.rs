//! Spot-versus-anchor deviation
//!
//! `delta = isqrt(spot * P^2 / anchor_price)` where both prices are quoted
//! as ask per bid and scaled by `P`. The square root brings the ratio back to
//! a single `P` scale, so `delta == P` means spot sits exactly on the anchor.

use crate::error::{AmmError, Result};
use crate::math::{isqrt, wide, PRECISION, U256};

/// Prices are expressed as ask units per bid unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePoint {
    pub reserve_bid: u128,
    pub reserve_ask: u128,
    pub anchor_bid: u128,
    pub anchor_ask: u128,
}

/// Deviation calculations
pub struct DeviationModel;

impl DeviationModel {
    /// `ask * P / bid`
    pub fn price(bid: u128, ask: u128) -> Result<U256> {
        if bid == 0 {
            return Err(AmmError::DivisionByZero);
        }
        Ok(wide(ask) * wide(PRECISION) / wide(bid))
    }

    /// Fixed-point deviation of spot price from anchor price
    pub fn delta(point: &PricePoint) -> Result<u128> {
        let spot = Self::price(point.reserve_bid, point.reserve_ask)?;
        let anchor = Self::price(point.anchor_bid, point.anchor_ask)?;
        if anchor.is_zero() {
            return Err(AmmError::DivisionByZero);
        }

        let p2 = wide(PRECISION) * wide(PRECISION);
        let scaled = spot.checked_mul(p2).ok_or(AmmError::RangeError)?;
        isqrt(scaled / anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(reserve_bid: u128, reserve_ask: u128, anchor_bid: u128, anchor_ask: u128) -> PricePoint {
        PricePoint {
            reserve_bid,
            reserve_ask,
            anchor_bid,
            anchor_ask,
        }
    }

    #[test]
    fn test_delta_at_anchor() {
        let delta = DeviationModel::delta(&point(100, 400, 100, 400)).unwrap();
        assert_eq!(delta, PRECISION);
    }

    #[test]
    fn test_delta_quarter_price() {
        // Spot 1 vs anchor 4: ratio 1/4, sqrt 1/2
        let delta = DeviationModel::delta(&point(200, 200, 100, 400)).unwrap();
        assert_eq!(delta, PRECISION / 2);
    }

    #[test]
    fn test_delta_direction() {
        // Bid asset got cheaper (more bid in the pool)
        let cheaper = DeviationModel::delta(&point(110, 364, 100, 400)).unwrap();
        assert!(cheaper < PRECISION);

        // Bid asset got dearer
        let dearer = DeviationModel::delta(&point(90, 445, 100, 400)).unwrap();
        assert!(dearer > PRECISION);
    }

    #[test]
    fn test_zero_denominators() {
        assert_eq!(
            DeviationModel::delta(&point(0, 400, 100, 400)),
            Err(AmmError::DivisionByZero)
        );
        assert_eq!(
            DeviationModel::delta(&point(100, 400, 0, 400)),
            Err(AmmError::DivisionByZero)
        );
        // Anchor price rounds to zero
        assert_eq!(
            DeviationModel::delta(&point(100, 400, u128::MAX, 1)),
            Err(AmmError::DivisionByZero)
        );
    }

    #[test]
    fn test_extreme_ratio_out_of_range() {
        // Product overflows the intermediate
        let result = DeviationModel::delta(&point(1, u128::MAX, 1, 1));
        assert_eq!(result, Err(AmmError::RangeError));

        // Product fits but the root operand exceeds 128 bits
        let result = DeviationModel::delta(&point(1, 10u128.pow(21), 1, 1));
        assert_eq!(result, Err(AmmError::RangeError));
    }
}
