//! Asset sides and the collaborator hook for pool observers

use crate::pool::SwapReceipt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// One of the two assets held by a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    A,
    B,
}

impl Asset {
    /// The other asset of the pair
    pub fn opposite(self) -> Self {
        match self {
            Asset::A => Asset::B,
            Asset::B => Asset::A,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::A => write!(f, "A"),
            Asset::B => write!(f, "B"),
        }
    }
}

/// Two quantities indexed by [`Asset`]
///
/// Used for reserves, the anchor basket, and the hold baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReservePair {
    pub a: u128,
    pub b: u128,
}

/// The anchor basket shares the reserve layout
pub type AnchorPair = ReservePair;

impl ReservePair {
    pub const fn new(a: u128, b: u128) -> Self {
        Self { a, b }
    }

    /// Return a copy with one side replaced
    pub fn with(mut self, asset: Asset, value: u128) -> Self {
        self[asset] = value;
        self
    }

    /// True when both sides are strictly positive
    pub fn is_positive(&self) -> bool {
        self.a > 0 && self.b > 0
    }
}

impl Index<Asset> for ReservePair {
    type Output = u128;

    fn index(&self, asset: Asset) -> &u128 {
        match asset {
            Asset::A => &self.a,
            Asset::B => &self.b,
        }
    }
}

impl IndexMut<Asset> for ReservePair {
    fn index_mut(&mut self, asset: Asset) -> &mut u128 {
        match asset {
            Asset::A => &mut self.a,
            Asset::B => &mut self.b,
        }
    }
}

/// Receives every committed swap
///
/// Observers are purely observational: they see a receipt after the pool
/// state has been committed and cannot influence it.
pub trait SwapObserver: Send {
    fn on_swap(&mut self, receipt: &SwapReceipt);
}

impl<F> SwapObserver for F
where
    F: FnMut(&SwapReceipt) + Send,
{
    fn on_swap(&mut self, receipt: &SwapReceipt) {
        self(receipt)
    }
}
