//! Swap engine
//!
//! A swap walks `Idle -> Quoting -> Solving -> Committed`. Everything up to
//! the commit works on copies of the ledger state; the commit itself cannot
//! fail, so a rejected swap leaves the pool exactly as it was.

use crate::curve::ConstantProduct;
use crate::deviation::PricePoint;
use crate::error::{AmmError, Result};
use crate::fee_solver::{FeeQuote, FeeSolver};
use crate::history::{HistoryLog, HistorySnapshot};
use crate::ledger::{Deposit, ReserveLedger, Withdrawal};
use crate::math::{mul_div, wide};
use crate::policy::{adapt_discount, AnchorPolicy, PoolConfig};
use crate::pool_traits::{AnchorPair, Asset, ReservePair, SwapObserver};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, info};

/// Stages of a single swap, reported in debug events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStage {
    Idle,
    Quoting,
    Solving,
    Committed,
}

impl SwapStage {
    pub fn as_str(self) -> &'static str {
        match self {
            SwapStage::Idle => "idle",
            SwapStage::Quoting => "quoting",
            SwapStage::Solving => "solving",
            SwapStage::Committed => "committed",
        }
    }
}

/// Priced but uncommitted swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    pub bid: Asset,
    pub ask: Asset,
    pub amount: u128,
    pub fee: FeeQuote,
    /// Ask reserve implied by the curve before the ask fee is retained
    pub next_ask_reserve: u128,
    /// Output delivered to the trader
    pub ask_amount: u128,
}

/// Everything a committed swap changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub bid: Asset,
    pub ask: Asset,
    pub amount: u128,
    pub bid_amount: u128,
    pub bid_fee: u128,
    pub ask_fee: u128,
    pub ask_amount: u128,
    pub steps: u32,
    pub reserves_before: ReservePair,
    pub reserves_after: ReservePair,
    pub anchor_after: AnchorPair,
    pub discount_before: u128,
    pub discount_after: u128,
}

/// Two-asset adaptive-fee pool
pub struct Pool {
    ledger: ReserveLedger,
    discount: u128,
    config: PoolConfig,
    history: HistoryLog,
    observer: Option<Box<dyn SwapObserver>>,
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("ledger", &self.ledger)
            .field("discount", &self.discount)
            .field("config", &self.config)
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl Pool {
    /// Genesis pool with the canonical configuration
    pub fn new(a: u128, b: u128) -> Result<Self> {
        Self::with_config(a, b, PoolConfig::default())
    }

    pub fn with_config(a: u128, b: u128, config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let ledger = ReserveLedger::genesis(a, b)?;

        let mut pool = Self {
            ledger,
            discount: config.initial_discount,
            config,
            history: HistoryLog::new(),
            observer: None,
        };
        pool.record();

        info!(
            a = %a,
            b = %b,
            liquidity = %pool.ledger.liquidity(),
            anchor_policy = ?config.anchor_policy,
            discount_policy = ?config.discount_policy,
            "pool created"
        );
        Ok(pool)
    }

    pub fn reserves(&self) -> ReservePair {
        self.ledger.reserves()
    }

    pub fn anchor(&self) -> AnchorPair {
        self.ledger.anchor()
    }

    pub fn liquidity(&self) -> u128 {
        self.ledger.liquidity()
    }

    pub fn discount(&self) -> u128 {
        self.discount
    }

    pub fn hold_baseline(&self) -> ReservePair {
        self.ledger.hold_baseline()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn history(&self) -> &[HistorySnapshot] {
        self.history.as_slice()
    }

    /// Install the collaborator notified after each committed swap
    pub fn set_observer(&mut self, observer: Box<dyn SwapObserver>) {
        self.observer = Some(observer);
    }

    pub fn take_observer(&mut self) -> Option<Box<dyn SwapObserver>> {
        self.observer.take()
    }

    pub fn deposit(&mut self, a: u128, b: u128) -> Result<Deposit> {
        let deposit = self.ledger.deposit(a, b)?;
        self.record();
        Ok(deposit)
    }

    pub fn withdraw(&mut self, lpt: u128) -> Result<Withdrawal> {
        let withdrawal = self.ledger.withdraw(lpt)?;
        self.record();
        Ok(withdrawal)
    }

    /// Price a swap of `amount` bid units without committing it
    pub fn quote(&self, amount: u128, bid: Asset, ask: Asset) -> Result<SwapQuote> {
        debug!(stage = SwapStage::Quoting.as_str(), amount = %amount, %bid, %ask);
        if amount == 0 {
            return Err(AmmError::InvalidArgument("swap amount must be positive"));
        }
        if bid == ask {
            return Err(AmmError::InvalidArgument("bid and ask must be different assets"));
        }

        let reserves = self.ledger.reserves();
        let anchor = self.ledger.anchor();
        let point = PricePoint {
            reserve_bid: reserves[bid],
            reserve_ask: reserves[ask],
            anchor_bid: anchor[bid],
            anchor_ask: anchor[ask],
        };

        debug!(stage = SwapStage::Solving.as_str(), discount = %self.discount);
        let fee = FeeSolver::new(point, self.discount, self.config.deviation_formula).solve(amount)?;

        let curve = ConstantProduct::quote(fee.bid_amount, reserves[bid], reserves[ask])?;
        let ask_amount = curve
            .gross_out
            .checked_sub(fee.ask_fee)
            .filter(|out| *out > 0)
            .ok_or(AmmError::InsufficientLiquidity)?;

        Ok(SwapQuote {
            bid,
            ask,
            amount,
            fee,
            next_ask_reserve: curve.next_reserve_ask,
            ask_amount,
        })
    }

    /// Swap `amount` of `bid` for `ask`, returning the delivered output
    pub fn swap(&mut self, amount: u128, bid: Asset, ask: Asset) -> Result<u128> {
        self.swap_with_receipt(amount, bid, ask)
            .map(|receipt| receipt.ask_amount)
    }

    /// Swap and report everything the commit changed
    ///
    /// The pool is back in [`SwapStage::Idle`] when this returns, whether or
    /// not the swap committed.
    pub fn swap_with_receipt(&mut self, amount: u128, bid: Asset, ask: Asset) -> Result<SwapReceipt> {
        let result = self.execute_swap(amount, bid, ask);
        debug!(stage = SwapStage::Idle.as_str(), committed = result.is_ok(), "swap finished");
        result
    }

    fn execute_swap(&mut self, amount: u128, bid: Asset, ask: Asset) -> Result<SwapReceipt> {
        let quote = self.quote(amount, bid, ask)?;
        let fee = quote.fee;

        let before = self.ledger.reserves();
        let next_bid = before[bid].checked_add(amount).ok_or(AmmError::RangeError)?;
        let next_ask = quote.next_ask_reserve + fee.ask_fee;
        let reserves = before.with(bid, next_bid).with(ask, next_ask);

        let anchor = self.grow_anchor(reserves, bid, fee.bid_fee, ask, fee.ask_fee)?;
        let profit = self.profit_versus_hold(reserves)?;
        let discount = adapt_discount(self.config.discount_policy, self.discount, profit);

        // Nothing below can fail
        let receipt = SwapReceipt {
            bid,
            ask,
            amount,
            bid_amount: fee.bid_amount,
            bid_fee: fee.bid_fee,
            ask_fee: fee.ask_fee,
            ask_amount: quote.ask_amount,
            steps: fee.steps,
            reserves_before: before,
            reserves_after: reserves,
            anchor_after: anchor,
            discount_before: self.discount,
            discount_after: discount,
        };
        self.ledger.settle_swap(reserves, anchor);
        self.discount = discount;
        self.record();

        debug!(
            stage = SwapStage::Committed.as_str(),
            bid_fee = %receipt.bid_fee,
            ask_fee = %receipt.ask_fee,
            ask_amount = %receipt.ask_amount,
            steps = receipt.steps,
            discount = %discount,
        );
        if let Some(observer) = self.observer.as_mut() {
            observer.on_swap(&receipt);
        }
        Ok(receipt)
    }

    /// Anchor basket after fee retention, per the configured policy
    fn grow_anchor(
        &self,
        reserves: ReservePair,
        bid: Asset,
        bid_fee: u128,
        ask: Asset,
        ask_fee: u128,
    ) -> Result<AnchorPair> {
        let anchor = self.ledger.anchor();
        let growth = |asset: Asset, fee: u128| -> Result<u128> {
            let added = match self.config.anchor_policy {
                AnchorPolicy::Proportional => mul_div(fee, anchor[asset], reserves[asset])?,
                AnchorPolicy::Full => fee,
            };
            anchor[asset].checked_add(added).ok_or(AmmError::RangeError)
        };

        let next_bid = growth(bid, bid_fee)?;
        let next_ask = growth(ask, ask_fee)?;
        Ok(anchor.with(bid, next_bid).with(ask, next_ask))
    }

    /// Sign of `2 * B - (hold_a * B / A + hold_b)`, valued in B at spot
    fn profit_versus_hold(&self, reserves: ReservePair) -> Result<Ordering> {
        if reserves.a == 0 {
            return Err(AmmError::DivisionByZero);
        }
        let hold = self.ledger.hold_baseline();
        let pooled = wide(2) * wide(reserves.b);
        let held = wide(hold.a) * wide(reserves.b) / wide(reserves.a) + wide(hold.b);
        Ok(pooled.cmp(&held))
    }

    fn record(&mut self) {
        let snapshot = HistorySnapshot::capture(self.ledger.reserves(), self.ledger.anchor());
        self.history.record(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{DeviationFormula, DiscountPolicy, MAX_DISCOUNT, MIN_DISCOUNT};
    use std::sync::{Arc, Mutex};

    const SEED_A: u128 = 1_000_000_000;
    const SEED_B: u128 = 5_000_000_000;

    #[test]
    fn test_genesis_state() {
        let pool = Pool::new(100, 400).unwrap();
        assert_eq!(pool.liquidity(), 200);
        assert_eq!(pool.anchor(), ReservePair::new(100, 400));
        assert_eq!(pool.discount(), MIN_DISCOUNT);
        assert_eq!(pool.history().len(), 1);
        assert_eq!(pool.history()[0].reserves(), ReservePair::new(100, 400));
    }

    #[test]
    fn test_swap_commits_fees_into_pool() {
        let mut pool = Pool::new(SEED_A, SEED_B).unwrap();
        let liquidity = pool.liquidity();
        let receipt = pool.swap_with_receipt(10_000_000, Asset::A, Asset::B).unwrap();

        assert_eq!(receipt.bid_amount + receipt.bid_fee, 10_000_000);
        assert!(receipt.ask_amount > 0);

        let after = pool.reserves();
        assert_eq!(after.a, SEED_A + 10_000_000);
        assert_eq!(after.b, SEED_B - receipt.ask_amount);
        assert!(ConstantProduct::invariant_holds((SEED_A, SEED_B), (after.a, after.b)));

        // Fees were retained, so the anchor grew on both sides
        assert!(pool.anchor().a > SEED_A);
        assert!(pool.anchor().b > SEED_B);
        assert_eq!(pool.history().len(), 2);
        assert_eq!(pool.liquidity(), liquidity);
    }

    #[test]
    fn test_swap_returns_quoted_output() {
        let mut pool = Pool::new(SEED_A, SEED_B).unwrap();
        let quote = pool.quote(25_000_000, Asset::B, Asset::A).unwrap();
        let out = pool.swap(25_000_000, Asset::B, Asset::A).unwrap();
        assert_eq!(out, quote.ask_amount);
    }

    #[test]
    fn test_swap_rejections_leave_state_untouched() {
        let mut pool = Pool::new(100, 400).unwrap();
        let reserves = pool.reserves();

        assert!(matches!(
            pool.swap(0, Asset::A, Asset::B),
            Err(AmmError::InvalidArgument(_))
        ));
        assert!(matches!(
            pool.swap(10, Asset::A, Asset::A),
            Err(AmmError::InvalidArgument(_))
        ));
        assert_eq!(pool.reserves(), reserves);
        assert_eq!(pool.history().len(), 1);
    }

    #[test]
    fn test_output_eaten_by_fee_floor() {
        // One unit of B out is exactly the one-unit ask fee floor
        let mut pool = Pool::new(1_000, 1).unwrap();
        assert_eq!(pool.swap(1, Asset::A, Asset::B), Err(AmmError::InsufficientLiquidity));
        assert_eq!(pool.reserves(), ReservePair::new(1_000, 1));
        assert_eq!(pool.anchor(), ReservePair::new(1_000, 1));
        assert_eq!(pool.history().len(), 1);
    }

    #[test]
    fn test_full_anchor_policy_grows_by_fee() {
        let config = PoolConfig {
            anchor_policy: AnchorPolicy::Full,
            ..Default::default()
        };
        let mut pool = Pool::with_config(SEED_A, SEED_B, config).unwrap();
        let receipt = pool.swap_with_receipt(10_000_000, Asset::A, Asset::B).unwrap();
        assert_eq!(pool.anchor().a, SEED_A + receipt.bid_fee);
        assert_eq!(pool.anchor().b, SEED_B + receipt.ask_fee);
    }

    #[test]
    fn test_static_discount_is_fixed() {
        let config = PoolConfig {
            discount_policy: DiscountPolicy::Static,
            initial_discount: 16,
            ..Default::default()
        };
        let mut pool = Pool::with_config(SEED_A, SEED_B, config).unwrap();
        for i in 0..10u128 {
            let (bid, ask) = if i % 2 == 0 { (Asset::A, Asset::B) } else { (Asset::B, Asset::A) };
            pool.swap(1_000_000 + i, bid, ask).unwrap();
        }
        assert_eq!(pool.discount(), 16);
    }

    #[test]
    fn test_adaptive_discount_stays_in_bounds() {
        let mut pool = Pool::new(SEED_A, SEED_B).unwrap();
        for i in 0..50u128 {
            let (bid, ask) = if i % 3 == 0 { (Asset::B, Asset::A) } else { (Asset::A, Asset::B) };
            let amount = 3_000_000 + i * 100_000;
            if pool.swap(amount, bid, ask).is_ok() {
                assert!((MIN_DISCOUNT..=MAX_DISCOUNT).contains(&pool.discount()));
            }
        }
    }

    #[test]
    fn test_observer_sees_committed_swaps() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut pool = Pool::new(SEED_A, SEED_B).unwrap();
        pool.set_observer(Box::new(move |receipt: &SwapReceipt| {
            sink.lock().unwrap().push(*receipt);
        }));

        let out = pool.swap(10_000_000, Asset::A, Asset::B).unwrap();
        let _ = pool.swap(0, Asset::A, Asset::B);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].ask_amount, out);
        assert!(pool.take_observer().is_some());
    }

    #[test]
    fn test_deposit_and_withdraw_recorded() {
        let mut pool = Pool::new(100, 400).unwrap();
        let deposit = pool.deposit(10, 40).unwrap();
        pool.withdraw(deposit.lpt).unwrap();
        assert_eq!(pool.history().len(), 3);
        assert_eq!(pool.history()[2].reserves(), ReservePair::new(101, 404));
    }

    #[test]
    fn test_symmetric_formula_runs() {
        let config = PoolConfig {
            deviation_formula: DeviationFormula::SquaredSymmetric,
            ..Default::default()
        };
        let mut pool = Pool::with_config(SEED_A, SEED_B, config).unwrap();
        assert!(pool.swap(10_000_000, Asset::A, Asset::B).unwrap() > 0);
        assert!(pool.swap(10_000_000, Asset::A, Asset::B).unwrap() > 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PoolConfig {
            initial_discount: 4096,
            ..Default::default()
        };
        assert!(matches!(
            Pool::with_config(1, 1, config),
            Err(AmmError::InvalidArgument(_))
        ));
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured_logs(run: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, run);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_swap_walks_every_stage() {
        let mut pool = Pool::new(SEED_A, SEED_B).unwrap();
        let logs = captured_logs(|| {
            pool.swap(10_000_000, Asset::A, Asset::B).unwrap();
        });

        let position = |stage: SwapStage| {
            logs.find(&format!("stage=\"{}\"", stage.as_str()))
                .unwrap_or_else(|| panic!("missing {:?} in {}", stage, logs))
        };
        assert!(position(SwapStage::Quoting) < position(SwapStage::Solving));
        assert!(position(SwapStage::Solving) < position(SwapStage::Committed));
        assert!(position(SwapStage::Committed) < position(SwapStage::Idle));
    }

    #[test]
    fn test_rejected_swap_returns_to_idle() {
        let mut pool = Pool::new(SEED_A, SEED_B).unwrap();
        let logs = captured_logs(|| {
            assert!(pool.swap(0, Asset::A, Asset::B).is_err());
        });
        assert!(logs.contains("stage=\"idle\""));
        assert!(!logs.contains("stage=\"committed\""));
    }
}
