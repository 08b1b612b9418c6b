//! Variation points of the engine
//!
//! The experimental pools this engine consolidates differ in three places:
//! how retained fees flow into the anchor basket, whether the discount
//! divisor adapts, and how the two deviations are combined. Each is a
//! configuration value here rather than a separate engine.

use crate::error::{AmmError, Result};
use serde::{Deserialize, Serialize};

/// Smallest discount divisor
pub const MIN_DISCOUNT: u128 = 2;

/// Largest discount divisor
pub const MAX_DISCOUNT: u128 = 1024;

/// How a retained swap fee grows the anchor basket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPolicy {
    /// `anchor += fee * anchor / reserve`, using the post-swap reserve
    #[default]
    Proportional,
    /// `anchor += fee`
    Full,
}

/// Whether the discount divisor reacts to realized profit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountPolicy {
    /// Keep the initial divisor forever
    Static,
    /// Double on profit versus holding, halve on loss
    #[default]
    Adaptive,
}

/// How pre- and post-trade deviations combine into the ask fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationFormula {
    /// Subtract when both deviations lie on the same side of the anchor,
    /// add when the trade crosses it
    #[default]
    SignedAsymmetric,
    /// Always subtract the squared deviations
    SquaredSymmetric,
}

impl DeviationFormula {
    /// True when the squared deviations should be added
    pub fn adds(self, same_direction: bool) -> bool {
        match self {
            DeviationFormula::SignedAsymmetric => !same_direction,
            DeviationFormula::SquaredSymmetric => false,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub anchor_policy: AnchorPolicy,
    pub discount_policy: DiscountPolicy,
    pub initial_discount: u128,
    pub deviation_formula: DeviationFormula,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            anchor_policy: AnchorPolicy::Proportional,
            discount_policy: DiscountPolicy::Adaptive,
            initial_discount: MIN_DISCOUNT,
            deviation_formula: DeviationFormula::SignedAsymmetric,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_DISCOUNT..=MAX_DISCOUNT).contains(&self.initial_discount) {
            return Err(AmmError::InvalidArgument(
                "initial discount must lie within [2, 1024]",
            ));
        }
        Ok(())
    }
}

/// Next discount divisor given the sign of realized profit
pub fn adapt_discount(policy: DiscountPolicy, current: u128, profit: std::cmp::Ordering) -> u128 {
    use std::cmp::Ordering;

    match policy {
        DiscountPolicy::Static => current,
        DiscountPolicy::Adaptive => match profit {
            Ordering::Greater => (current * 2).min(MAX_DISCOUNT),
            Ordering::Less => (current / 2).max(MIN_DISCOUNT),
            Ordering::Equal => current,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_adaptive_discount_bounds() {
        let p = DiscountPolicy::Adaptive;
        assert_eq!(adapt_discount(p, 2, Ordering::Greater), 4);
        assert_eq!(adapt_discount(p, 1024, Ordering::Greater), 1024);
        assert_eq!(adapt_discount(p, 2, Ordering::Less), 2);
        assert_eq!(adapt_discount(p, 64, Ordering::Less), 32);
        assert_eq!(adapt_discount(p, 64, Ordering::Equal), 64);
    }

    #[test]
    fn test_static_discount_never_moves() {
        for profit in [Ordering::Less, Ordering::Equal, Ordering::Greater] {
            assert_eq!(adapt_discount(DiscountPolicy::Static, 8, profit), 8);
        }
    }

    #[test]
    fn test_formula_sign() {
        assert!(!DeviationFormula::SignedAsymmetric.adds(true));
        assert!(DeviationFormula::SignedAsymmetric.adds(false));
        assert!(!DeviationFormula::SquaredSymmetric.adds(false));
    }

    #[test]
    fn test_config_validation() {
        assert!(PoolConfig::default().validate().is_ok());

        let bad = PoolConfig {
            initial_discount: 1,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(AmmError::InvalidArgument(_))));
    }

    #[test]
    fn test_policy_names() {
        let json = serde_json::to_string(&AnchorPolicy::Full).unwrap();
        assert_eq!(json, "\"full\"");
        let parsed: DeviationFormula = serde_json::from_str("\"squared_symmetric\"").unwrap();
        assert_eq!(parsed, DeviationFormula::SquaredSymmetric);
    }
}
