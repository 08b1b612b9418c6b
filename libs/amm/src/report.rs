//! Diagnostic views over pool state and swap receipts
//!
//! Reports are read-only and use `Decimal` for human-facing ratios. Nothing
//! here feeds back into pool state.

use crate::error::{AmmError, Result};
use crate::pool::{Pool, SwapReceipt};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

fn to_decimal(value: u128) -> Result<Decimal> {
    Decimal::from_u128(value).ok_or(AmmError::RangeError)
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Result<Decimal> {
    numerator
        .checked_div(denominator)
        .ok_or(AmmError::DivisionByZero)
}

/// `|value - reference| / reference * 100`
fn pct_distance(value: Decimal, reference: Decimal) -> Result<Decimal> {
    Ok(ratio((value - reference).abs(), reference)? * dec!(100))
}

/// Snapshot of pool health valued in B units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolReport {
    /// B per A at current reserves
    pub spot_price: Decimal,
    /// B per A in the anchor basket
    pub anchor_price: Decimal,
    /// Distance of spot from anchor, percent
    pub deviation_pct: Decimal,
    /// `2 * B`
    pub pool_value: Decimal,
    /// Hold baseline valued at spot
    pub hold_value: Decimal,
    /// `hold_value - pool_value`; positive means providers lost versus holding
    pub impermanent_loss: Decimal,
}

impl PoolReport {
    pub fn from_pool(pool: &Pool) -> Result<Self> {
        let reserves = pool.reserves();
        let anchor = pool.anchor();
        let hold = pool.hold_baseline();

        let b = to_decimal(reserves.b)?;
        let spot_price = ratio(b, to_decimal(reserves.a)?)?;
        let anchor_price = ratio(to_decimal(anchor.b)?, to_decimal(anchor.a)?)?;
        let pool_value = b * dec!(2);
        let hold_value = to_decimal(hold.a)? * spot_price + to_decimal(hold.b)?;

        Ok(Self {
            spot_price,
            anchor_price,
            deviation_pct: pct_distance(spot_price, anchor_price)?,
            pool_value,
            hold_value,
            impermanent_loss: hold_value - pool_value,
        })
    }
}

/// Per-swap ratios, all in percent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapDiagnostics {
    /// Move in ask-per-bid spot price caused by the swap
    pub price_change_pct: Decimal,
    /// Distance of post-swap spot from the post-swap anchor price
    pub deviation_pct: Decimal,
    /// `bid_fee / (bid_amount + bid_fee)`
    pub bid_fee_pct: Decimal,
    /// `ask_fee / (ask_amount + ask_fee)`
    pub ask_fee_pct: Decimal,
    /// Combined haircut versus a fee-free trade of the same size
    pub effective_fee_pct: Decimal,
}

impl SwapDiagnostics {
    pub fn from_receipt(receipt: &SwapReceipt) -> Result<Self> {
        let (bid, ask) = (receipt.bid, receipt.ask);
        let before = receipt.reserves_before;
        let after = receipt.reserves_after;

        let prev_price = ratio(to_decimal(before[ask])?, to_decimal(before[bid])?)?;
        let next_price = ratio(to_decimal(after[ask])?, to_decimal(after[bid])?)?;
        let anchor_price = ratio(
            to_decimal(receipt.anchor_after[ask])?,
            to_decimal(receipt.anchor_after[bid])?,
        )?;

        let amount = to_decimal(receipt.amount)?;
        let bid_fee = to_decimal(receipt.bid_fee)?;
        let bid_amount = to_decimal(receipt.bid_amount)?;
        let ask_fee = to_decimal(receipt.ask_fee)?;
        let ask_amount = to_decimal(receipt.ask_amount)?;
        let gross_out = ask_amount + ask_fee;

        let kept = ratio(ask_amount, gross_out)? * ratio(bid_amount, amount)?;

        Ok(Self {
            price_change_pct: pct_distance(next_price, prev_price)?,
            deviation_pct: pct_distance(next_price, anchor_price)?,
            bid_fee_pct: ratio(bid_fee, bid_amount + bid_fee)? * dec!(100),
            ask_fee_pct: ratio(ask_fee, gross_out)? * dec!(100),
            effective_fee_pct: (Decimal::ONE - kept) * dec!(100),
        })
    }
}
