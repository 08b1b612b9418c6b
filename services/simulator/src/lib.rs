//! # AMM Simulator
//!
//! ## Purpose
//!
//! Drives an [`adaptive_amm::Pool`] with a random-walk trader and an optional
//! liquidity provider, then reports the fee distribution and how the pool
//! performed against holding the deposited basket.
//!
//! ## Integration Points
//!
//! - **Configuration**: [`amm_config::SimulationConfig`] (TOML file plus
//!   `AMM_*` environment overrides)
//! - **Observation**: [`HistogramHandle`] installed as the pool's swap
//!   observer
//! - **Output**: [`SimulationOutcome`] (serializable) and the rendered
//!   [`FeeHistogram`]
//!
//! Runs are deterministic for a given seed.

pub mod bots;
pub mod simulation;
pub mod stats;

pub use bots::{less, BotError, LpBot, SwapBot, Trade};
pub use simulation::{Simulation, SimulationOutcome};
pub use stats::{FeeHistogram, FeeSide, HistogramHandle};
