//! # Adaptive AMM - Anchor-Relative Fee Engine
//!
//! ## Purpose
//!
//! Two-asset constant product pool whose fee is solved per trade instead of
//! being a fixed percentage. Each swap splits its cost between the incoming
//! (bid) and outgoing (ask) asset so that both sides pay the same amount at
//! the post-trade rate, and sizes that cost by how far the trade moves spot
//! price away from a slowly drifting anchor price.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Trading harnesses and liquidity bots calling
//!   [`Pool::swap`], [`Pool::deposit`], [`Pool::withdraw`]
//! - **Output Destinations**: Delivered amounts, [`SwapReceipt`]s pushed to a
//!   [`SwapObserver`], and the append-only [`HistorySnapshot`] trail
//! - **Configuration**: [`PoolConfig`] selects anchor growth, discount
//!   adaptation, and the deviation formula
//! - **Precision**: Integer-only committed path scaled by [`PRECISION`]
//!   (10^18) with 256-bit intermediates
//!
//! ## Architecture Role
//!
//! ```text
//! harness ──swap──▶ Pool ──▶ FeeSolver ──▶ DeviationModel ──▶ isqrt
//!                    │           │
//!                    │           └──▶ ConstantProduct
//!                    ├──▶ ReserveLedger (reserves, anchor, liquidity)
//!                    ├──▶ HistoryLog
//!                    └──▶ SwapObserver (statistics, reporting)
//! ```
//!
//! The pool is single-writer: every operation takes `&mut self`, runs to
//! completion, and either commits fully or returns an [`AmmError`] without
//! touching state. Identical call sequences reproduce identical histories.

pub mod curve;
pub mod deviation;
pub mod error;
pub mod fee_solver;
pub mod history;
pub mod ledger;
pub mod math;
pub mod policy;
pub mod pool;
pub mod pool_traits;
pub mod report;

pub use curve::{ConstantProduct, CurveQuote};
pub use deviation::{DeviationModel, PricePoint};
pub use error::{AmmError, Result};
pub use fee_solver::{FeeQuote, FeeSolver};
pub use history::{HistoryLog, HistorySnapshot};
pub use ledger::{Deposit, ReserveLedger, Withdrawal};
pub use math::{isqrt, mul_div, PRECISION, U256};
pub use policy::{AnchorPolicy, DeviationFormula, DiscountPolicy, PoolConfig};
pub use pool::{Pool, SwapQuote, SwapReceipt, SwapStage};
pub use pool_traits::{AnchorPair, Asset, ReservePair, SwapObserver};
pub use report::{PoolReport, SwapDiagnostics};

/// Common types for diagnostic reporting
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
