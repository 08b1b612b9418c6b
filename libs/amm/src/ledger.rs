//! Reserve, anchor, and liquidity bookkeeping
//!
//! Deposits and withdrawals move reserves and the anchor basket in
//! proportion, so the reserve-to-anchor ratio only changes through swaps and
//! fee retention. Every operation validates and computes into locals first
//! and writes the ledger in a single assignment.

use crate::error::{AmmError, Result};
use crate::math::{isqrt, mul_div, wide};
use crate::pool_traits::{AnchorPair, ReservePair};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Liquidity units minted by a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub lpt: u128,
}

/// Amounts released by a withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub a: u128,
    pub b: u128,
}

/// Owns the mutable pool balances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveLedger {
    reserves: ReservePair,
    anchor: AnchorPair,
    liquidity: u128,
    /// Basket the providers would hold had they never deposited
    hold: ReservePair,
}

impl ReserveLedger {
    /// Genesis ledger from two strictly positive seed amounts
    pub fn genesis(a: u128, b: u128) -> Result<Self> {
        if a == 0 || b == 0 {
            return Err(AmmError::InvalidArgument("seed reserves must be positive"));
        }
        let product = a.checked_mul(b).ok_or(AmmError::RangeError)?;
        let liquidity = isqrt(wide(product))?;
        let reserves = ReservePair::new(a, b);

        Ok(Self {
            reserves,
            anchor: reserves,
            liquidity,
            hold: reserves,
        })
    }

    pub fn reserves(&self) -> ReservePair {
        self.reserves
    }

    pub fn anchor(&self) -> AnchorPair {
        self.anchor
    }

    pub fn liquidity(&self) -> u128 {
        self.liquidity
    }

    pub fn hold_baseline(&self) -> ReservePair {
        self.hold
    }

    /// Add `a` and `b` to the pool and mint liquidity units
    ///
    /// The anchor grows by the same fraction as each reserve. Units are
    /// minted against the scarcer leg, `min(a * L / new_a, b * L / new_b)`,
    /// so an off-ratio deposit can never redeem more than it put in.
    /// Deposits too small to mint a single unit are rejected.
    pub fn deposit(&mut self, a: u128, b: u128) -> Result<Deposit> {
        if a == 0 || b == 0 {
            return Err(AmmError::InvalidArgument("deposit amounts must be positive"));
        }

        let anchor_a = mul_div(a, self.anchor.a, self.reserves.a)?;
        let anchor_b = mul_div(b, self.anchor.b, self.reserves.b)?;

        let reserves = ReservePair::new(
            self.reserves.a.checked_add(a).ok_or(AmmError::RangeError)?,
            self.reserves.b.checked_add(b).ok_or(AmmError::RangeError)?,
        );
        let anchor = AnchorPair::new(
            self.anchor.a.checked_add(anchor_a).ok_or(AmmError::RangeError)?,
            self.anchor.b.checked_add(anchor_b).ok_or(AmmError::RangeError)?,
        );
        let lpt = mul_div(a, self.liquidity, reserves.a)?
            .min(mul_div(b, self.liquidity, reserves.b)?);
        if lpt == 0 {
            return Err(AmmError::InvalidArgument("deposit too small to mint liquidity"));
        }
        let liquidity = self.liquidity.checked_add(lpt).ok_or(AmmError::RangeError)?;
        let hold = ReservePair::new(
            self.hold.a.checked_add(a).ok_or(AmmError::RangeError)?,
            self.hold.b.checked_add(b).ok_or(AmmError::RangeError)?,
        );

        *self = Self {
            reserves,
            anchor,
            liquidity,
            hold,
        };
        debug!(a = %a, b = %b, lpt = %lpt, liquidity = %liquidity, "deposit committed");
        Ok(Deposit { lpt })
    }

    /// Burn `lpt` liquidity units and release the proportional reserves
    pub fn withdraw(&mut self, lpt: u128) -> Result<Withdrawal> {
        if self.liquidity == 0 {
            return Err(AmmError::DivisionByZero);
        }
        if lpt == 0 {
            return Err(AmmError::InvalidArgument("withdrawn lpt must be positive"));
        }
        if lpt > self.liquidity {
            return Err(AmmError::InvalidArgument("withdrawn lpt exceeds supply"));
        }

        let a = mul_div(lpt, self.reserves.a, self.liquidity)?;
        let b = mul_div(lpt, self.reserves.b, self.liquidity)?;
        if a >= self.reserves.a || b >= self.reserves.b {
            return Err(AmmError::InsufficientLiquidity);
        }

        // a < reserve implies the burned anchor share is below the anchor
        let anchor_a = mul_div(a, self.anchor.a, self.reserves.a)?;
        let anchor_b = mul_div(b, self.anchor.b, self.reserves.b)?;

        let reserves = ReservePair::new(self.reserves.a - a, self.reserves.b - b);
        let anchor = AnchorPair::new(self.anchor.a - anchor_a, self.anchor.b - anchor_b);
        let liquidity = self.liquidity - lpt;
        let hold = ReservePair::new(
            self.hold.a.saturating_sub(a),
            self.hold.b.saturating_sub(b),
        );

        *self = Self {
            reserves,
            anchor,
            liquidity,
            hold,
        };
        debug!(lpt = %lpt, a = %a, b = %b, liquidity = %liquidity, "withdrawal committed");
        Ok(Withdrawal { a, b })
    }

    /// Replace reserves and anchor after a swap has been fully computed
    pub(crate) fn settle_swap(&mut self, reserves: ReservePair, anchor: AnchorPair) {
        debug_assert!(reserves.is_positive());
        self.reserves = reserves;
        self.anchor = anchor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis() {
        let ledger = ReserveLedger::genesis(100, 400).unwrap();
        assert_eq!(ledger.liquidity(), 200);
        assert_eq!(ledger.reserves(), ReservePair::new(100, 400));
        assert_eq!(ledger.anchor(), ReservePair::new(100, 400));
        assert_eq!(ledger.hold_baseline(), ReservePair::new(100, 400));
    }

    #[test]
    fn test_genesis_rejects_bad_seeds() {
        assert!(matches!(
            ReserveLedger::genesis(0, 400),
            Err(AmmError::InvalidArgument(_))
        ));
        assert_eq!(
            ReserveLedger::genesis(u128::MAX, 2),
            Err(AmmError::RangeError)
        );
    }

    #[test]
    fn test_deposit_withdraw_round_trip() {
        let mut ledger = ReserveLedger::genesis(100, 400).unwrap();

        let deposit = ledger.deposit(10, 40).unwrap();
        assert_eq!(deposit.lpt, 18);
        assert_eq!(ledger.liquidity(), 218);
        assert_eq!(ledger.reserves(), ReservePair::new(110, 440));
        assert_eq!(ledger.anchor(), ReservePair::new(110, 440));

        let withdrawal = ledger.withdraw(deposit.lpt).unwrap();
        assert_eq!(withdrawal, Withdrawal { a: 9, b: 36 });
        assert!(withdrawal.a <= 10 && withdrawal.b <= 40);
        assert_eq!(ledger.liquidity(), 200);
        assert_eq!(ledger.reserves(), ReservePair::new(101, 404));
    }

    #[test]
    fn test_short_leg_round_trip_never_gains() {
        let mut ledger = ReserveLedger::genesis(100, 400).unwrap();

        // Three B against ten A is far below the 1:4 pool ratio, so B sets the mint
        let deposit = ledger.deposit(10, 3).unwrap();
        assert_eq!(deposit.lpt, 1);

        let withdrawal = ledger.withdraw(deposit.lpt).unwrap();
        assert!(withdrawal.a <= 10);
        assert!(withdrawal.b <= 3);
    }

    #[test]
    fn test_dust_deposit_is_rejected() {
        let mut ledger = ReserveLedger::genesis(100, 400).unwrap();
        let before = ledger.clone();

        // 1 * 200 / 401 rounds to zero units
        assert!(matches!(
            ledger.deposit(10, 1),
            Err(AmmError::InvalidArgument(_))
        ));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_deposit_preserves_anchor_ratio() {
        let mut ledger = ReserveLedger::genesis(1_000, 2_000).unwrap();
        ledger.settle_swap(ReservePair::new(1_100, 1_820), ReservePair::new(1_000, 2_000));

        ledger.deposit(110, 182).unwrap();
        // Anchor grows by 10% on each side, same as the reserves
        assert_eq!(ledger.anchor(), ReservePair::new(1_100, 2_200));
        assert_eq!(ledger.reserves(), ReservePair::new(1_210, 2_002));
    }

    #[test]
    fn test_deposit_rejects_zero() {
        let mut ledger = ReserveLedger::genesis(100, 400).unwrap();
        let before = ledger.clone();
        assert!(matches!(ledger.deposit(0, 5), Err(AmmError::InvalidArgument(_))));
        assert!(matches!(ledger.deposit(5, 0), Err(AmmError::InvalidArgument(_))));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_withdraw_guards() {
        let mut ledger = ReserveLedger::genesis(100, 400).unwrap();
        let before = ledger.clone();

        assert!(matches!(ledger.withdraw(0), Err(AmmError::InvalidArgument(_))));
        assert!(matches!(ledger.withdraw(201), Err(AmmError::InvalidArgument(_))));
        // Burning the whole supply would empty the reserves
        assert_eq!(ledger.withdraw(200), Err(AmmError::InsufficientLiquidity));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_withdraw_without_supply() {
        let mut ledger = ReserveLedger::genesis(100, 400).unwrap();
        ledger.liquidity = 0;
        assert_eq!(ledger.withdraw(1), Err(AmmError::DivisionByZero));
    }

    #[test]
    fn test_hold_baseline_tracks_flows() {
        let mut ledger = ReserveLedger::genesis(100, 400).unwrap();
        ledger.deposit(10, 40).unwrap();
        assert_eq!(ledger.hold_baseline(), ReservePair::new(110, 440));
        ledger.withdraw(18).unwrap();
        assert_eq!(ledger.hold_baseline(), ReservePair::new(101, 404));
    }
}
