//! Fee distribution statistics
//!
//! [`FeeHistogram`] buckets the bid-side and ask-side fee percentage of every
//! committed swap. Percentages come from [`SwapDiagnostics`] so the pool and
//! the histogram agree on the definitions.

use adaptive_amm::{SwapDiagnostics, SwapObserver, SwapReceipt};
use parking_lot::Mutex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::warn;

/// Which fee a histogram row describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeSide {
    Bid,
    Ask,
}

/// Fixed-width percentage buckets plus one overflow bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeHistogram {
    bin_width_pct: Decimal,
    bid: Vec<u64>,
    ask: Vec<u64>,
}

impl FeeHistogram {
    /// `bins` buckets of `bin_width_pct` percent each
    ///
    /// Callers validate `bins > 0` and a positive width through the
    /// simulation config.
    pub fn new(bins: usize, bin_width_pct: Decimal) -> Self {
        Self {
            bin_width_pct,
            bid: vec![0; bins + 1],
            ask: vec![0; bins + 1],
        }
    }

    /// Number of regular buckets, excluding overflow
    pub fn bins(&self) -> usize {
        self.bid.len() - 1
    }

    pub fn counts(&self, side: FeeSide) -> &[u64] {
        match side {
            FeeSide::Bid => &self.bid,
            FeeSide::Ask => &self.ask,
        }
    }

    pub fn total(&self) -> u64 {
        self.bid.iter().sum()
    }

    /// Bucket index for a percentage
    ///
    /// Negative percentages land in the first bucket. Anything at or past
    /// `bins * bin_width_pct` lands in the overflow bucket.
    pub fn bucket(&self, pct: Decimal) -> usize {
        let overflow = self.bins();
        if pct.is_sign_negative() {
            return 0;
        }
        if self.bin_width_pct <= Decimal::ZERO {
            return overflow;
        }
        (pct / self.bin_width_pct)
            .floor()
            .to_usize()
            .map_or(overflow, |index| index.min(overflow))
    }

    /// Count one swap's fee percentages
    pub fn record(&mut self, bid_fee_pct: Decimal, ask_fee_pct: Decimal) {
        let bid = self.bucket(bid_fee_pct);
        let ask = self.bucket(ask_fee_pct);
        self.bid[bid] += 1;
        self.ask[ask] += 1;
    }

    /// Count a committed swap
    pub fn record_receipt(&mut self, receipt: &SwapReceipt) -> adaptive_amm::Result<()> {
        let diagnostics = SwapDiagnostics::from_receipt(receipt)?;
        self.record(diagnostics.bid_fee_pct, diagnostics.ask_fee_pct);
        Ok(())
    }

    /// One text row per bucket, e.g. `% 5.00 - 10.00: 3`
    pub fn render(&self, side: FeeSide) -> String {
        let mut out = String::new();
        let overflow = self.bins();
        for (index, count) in self.counts(side).iter().enumerate() {
            let low = self.bin_width_pct * Decimal::from(index);
            if index == overflow {
                let _ = writeln!(out, "% >= {:.2}: {}", low, count);
            } else {
                let high = low + self.bin_width_pct;
                let _ = writeln!(out, "% {:.2} - {:.2}: {}", low, high, count);
            }
        }
        out
    }
}

impl fmt::Display for FeeHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bid fee distribution ({} swaps)", self.total())?;
        f.write_str(&self.render(FeeSide::Bid))?;
        writeln!(f, "Ask fee distribution ({} swaps)", self.total())?;
        f.write_str(&self.render(FeeSide::Ask))
    }
}

/// Shared handle installed on the pool as its swap observer
#[derive(Debug, Clone)]
pub struct HistogramHandle(Arc<Mutex<FeeHistogram>>);

impl HistogramHandle {
    pub fn new(histogram: FeeHistogram) -> Self {
        Self(Arc::new(Mutex::new(histogram)))
    }

    /// Copy of the current counts
    pub fn snapshot(&self) -> FeeHistogram {
        self.0.lock().clone()
    }
}

impl SwapObserver for HistogramHandle {
    fn on_swap(&mut self, receipt: &SwapReceipt) {
        if let Err(e) = self.0.lock().record_receipt(receipt) {
            warn!("Skipping swap in fee histogram: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adaptive_amm::{Asset, Pool};
    use rust_decimal_macros::dec;

    #[test]
    fn test_bucket_boundaries() {
        let histogram = FeeHistogram::new(20, dec!(5));
        assert_eq!(histogram.bucket(dec!(0)), 0);
        assert_eq!(histogram.bucket(dec!(4.99)), 0);
        assert_eq!(histogram.bucket(dec!(5)), 1);
        assert_eq!(histogram.bucket(dec!(99.9)), 19);
        assert_eq!(histogram.bucket(dec!(100)), 20);
        assert_eq!(histogram.bucket(dec!(250)), 20);
    }

    #[test]
    fn test_negative_percentage_lands_in_first_bucket() {
        let mut histogram = FeeHistogram::new(20, dec!(5));
        assert_eq!(histogram.bucket(dec!(-0.01)), 0);
        assert_eq!(histogram.bucket(dec!(-500)), 0);

        histogram.record(dec!(-1), dec!(101));
        assert_eq!(histogram.counts(FeeSide::Bid)[0], 1);
        assert_eq!(histogram.counts(FeeSide::Ask)[20], 1);
    }

    #[test]
    fn test_record_counts_both_sides() {
        let mut histogram = FeeHistogram::new(4, dec!(0.05));
        histogram.record(dec!(0.01), dec!(0.12));
        histogram.record(dec!(0.07), dec!(1));

        assert_eq!(histogram.counts(FeeSide::Bid), &[1, 1, 0, 0, 0]);
        assert_eq!(histogram.counts(FeeSide::Ask), &[0, 0, 1, 0, 1]);
        assert_eq!(histogram.total(), 2);
    }

    #[test]
    fn test_render_rows() {
        let mut histogram = FeeHistogram::new(2, dec!(5));
        histogram.record(dec!(6), dec!(1));
        let rows = histogram.render(FeeSide::Bid);
        assert_eq!(rows, "% 0.00 - 5.00: 0\n% 5.00 - 10.00: 1\n% >= 10.00: 0\n");
    }

    #[test]
    fn test_observer_counts_pool_swaps() {
        let handle = HistogramHandle::new(FeeHistogram::new(20, dec!(5)));
        let mut pool = Pool::new(1_000_000_000, 5_000_000_000).unwrap();
        pool.set_observer(Box::new(handle.clone()));

        pool.swap(10_000_000, Asset::A, Asset::B).unwrap();
        pool.swap(20_000_000, Asset::B, Asset::A).unwrap();

        let histogram = handle.snapshot();
        assert_eq!(histogram.total(), 2);
        // Small trades pay well under five percent
        assert_eq!(histogram.counts(FeeSide::Bid)[0], 2);
        assert_eq!(histogram.counts(FeeSide::Ask)[0], 2);
    }
}
