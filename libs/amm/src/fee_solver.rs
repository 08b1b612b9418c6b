//! Bisection search for a balanced bid/ask fee split
//!
//! The solver looks for `bid_fee` such that the ask-side fee, expressed in
//! bid units at the post-trade rate, matches it:
//!
//! ```text
//! ask_fee * new_reserve_bid == bid_fee * new_reserve_ask
//! ```
//!
//! `ask_fee` is derived from how far the trade moves spot price relative to
//! the anchor. The search halves its step from `amount / 2` down to zero, so
//! it evaluates at most `bit_length(amount / 2) + 1` candidates no matter
//! whether the balance is ever hit exactly.

use crate::curve::ConstantProduct;
use crate::deviation::{DeviationModel, PricePoint};
use crate::error::{AmmError, Result};
use crate::math::{abs_diff, bit_length, max, narrow, same_direction, wide, PRECISION, U256};
use crate::policy::DeviationFormula;
use std::cmp::Ordering;
use tracing::trace;

/// Outcome of a fee search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// Net amount entering the curve (`amount - bid_fee`)
    pub bid_amount: u128,
    /// Portion of the input retained by the pool
    pub bid_fee: u128,
    /// Portion of the output retained by the pool, never below 1
    pub ask_fee: u128,
    pub new_reserve_bid: u128,
    pub new_reserve_ask: u128,
    /// Pre-trade deviation
    pub alpha: u128,
    /// Post-trade deviation
    pub beta: u128,
    /// Candidates evaluated, including the returned one
    pub steps: u32,
}

impl FeeQuote {
    /// Sign of `ask_fee * new_reserve_bid - bid_fee * new_reserve_ask`
    pub fn balance(&self) -> Ordering {
        let ask_cost = wide(self.ask_fee) * wide(self.new_reserve_bid);
        let bid_cost = wide(self.bid_fee) * wide(self.new_reserve_ask);
        ask_cost.cmp(&bid_cost)
    }

    /// `|ask_fee * new_reserve_bid - bid_fee * new_reserve_ask|`
    pub fn imbalance(&self) -> U256 {
        let ask_cost = wide(self.ask_fee) * wide(self.new_reserve_bid);
        let bid_cost = wide(self.bid_fee) * wide(self.new_reserve_ask);
        if ask_cost >= bid_cost {
            ask_cost - bid_cost
        } else {
            bid_cost - ask_cost
        }
    }

    /// Largest imbalance the halving search can leave behind
    ///
    /// Floor halving can strand `bid_fee` up to `bit_length(amount) + 1`
    /// units from the balance point. Each unit shifts the bid side by about
    /// `new_reserve_ask`, and the ask fee floor adds one `new_reserve_bid`.
    /// Holds for trades no larger than the bid reserve.
    pub fn balance_tolerance(&self) -> U256 {
        let amount = self.bid_amount + self.bid_fee;
        let stranded = u128::from(bit_length(amount) + 1);
        wide(stranded) * wide(self.new_reserve_ask) + wide(self.new_reserve_bid)
    }

    /// Ask side still outweighs the bid side with the fee at the top of its range
    pub fn fee_capped(&self) -> bool {
        let amount = self.bid_amount + self.bid_fee;
        let stranded = u128::from(bit_length(amount) + 1);
        self.balance() == Ordering::Greater && self.bid_fee.saturating_add(stranded) >= amount
    }
}

/// Fee search over a fixed pre-trade state
#[derive(Debug, Clone, Copy)]
pub struct FeeSolver {
    point: PricePoint,
    discount: u128,
    formula: DeviationFormula,
}

impl FeeSolver {
    pub fn new(point: PricePoint, discount: u128, formula: DeviationFormula) -> Self {
        Self {
            point,
            discount,
            formula,
        }
    }

    /// Maximum number of candidates evaluated for `amount`
    pub fn step_bound(amount: u128) -> u32 {
        bit_length(amount / 2) + 1
    }

    /// Search for the balanced split of `amount`
    pub fn solve(&self, amount: u128) -> Result<FeeQuote> {
        if amount == 0 {
            return Err(AmmError::InvalidArgument("swap amount must be positive"));
        }
        if self.discount == 0 {
            return Err(AmmError::DivisionByZero);
        }

        let alpha = DeviationModel::delta(&self.point)?;
        let mut bid_fee = 0u128;
        let mut update = amount / 2;
        let rounds = bit_length(update);

        for step in 1..=rounds {
            let quote = self.evaluate(amount, bid_fee, alpha, step)?;
            trace!(
                step,
                bid_fee = %quote.bid_fee,
                ask_fee = %quote.ask_fee,
                update = %update,
                "fee search step"
            );

            match quote.balance() {
                Ordering::Greater => bid_fee += update,
                // Every later step is at most half the previous one, so the
                // running fee never drops below zero.
                Ordering::Less => bid_fee = bid_fee.saturating_sub(update),
                Ordering::Equal => return Ok(quote),
            }
            update /= 2;
        }

        self.evaluate(amount, bid_fee, alpha, rounds + 1)
    }

    /// Ask-side compensation for moving the deviation from `alpha` to `beta`
    pub fn ask_fee(&self, alpha: u128, beta: u128) -> Result<u128> {
        let da = wide(abs_diff(PRECISION, alpha));
        let db = wide(abs_diff(PRECISION, beta));
        let (sa, sb) = (da * da, db * db);

        let combined = if self.formula.adds(same_direction(alpha, beta)) {
            sb + sa
        } else if sb >= sa {
            sb - sa
        } else {
            sa - sb
        };

        let numerator = combined
            .checked_mul(wide(self.point.anchor_ask))
            .ok_or(AmmError::RangeError)?;
        let fee = numerator / (wide(PRECISION) * wide(PRECISION)) / wide(self.discount);
        Ok(max(narrow(fee)?, 1))
    }

    fn evaluate(&self, amount: u128, bid_fee: u128, alpha: u128, step: u32) -> Result<FeeQuote> {
        let bid_amount = amount - bid_fee;
        let curve = ConstantProduct::quote(bid_amount, self.point.reserve_bid, self.point.reserve_ask)?;
        let beta = DeviationModel::delta(&PricePoint {
            reserve_bid: curve.next_reserve_bid,
            reserve_ask: curve.next_reserve_ask,
            ..self.point
        })?;
        let ask_fee = self.ask_fee(alpha, beta)?;

        Ok(FeeQuote {
            bid_amount,
            bid_fee,
            ask_fee,
            new_reserve_bid: curve.next_reserve_bid,
            new_reserve_ask: curve.next_reserve_ask,
            alpha,
            beta,
            steps: step,
        })
    }
}
