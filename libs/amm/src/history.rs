//! Append-only audit trail of pool states

use crate::pool_traits::{AnchorPair, ReservePair};
use serde::{Deserialize, Serialize};

/// Pool state captured after a committed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub a: u128,
    pub b: u128,
    pub anchor: AnchorPair,
}

impl HistorySnapshot {
    pub fn capture(reserves: ReservePair, anchor: AnchorPair) -> Self {
        Self {
            a: reserves.a,
            b: reserves.b,
            anchor,
        }
    }

    pub fn reserves(&self) -> ReservePair {
        ReservePair::new(self.a, self.b)
    }
}

/// Ordered snapshots; entries are never rewritten
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryLog {
    entries: Vec<HistorySnapshot>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, snapshot: HistorySnapshot) {
        self.entries.push(snapshot);
    }

    pub fn as_slice(&self) -> &[HistorySnapshot] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&HistorySnapshot> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistorySnapshot> {
        self.entries.iter()
    }
}
