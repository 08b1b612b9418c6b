//! # Adaptive AMM Configuration
//!
//! Centralized configuration and defaults for the simulator and any other
//! harness that drives an adaptive AMM pool.
//!
//! ## Features
//!
//! - **Defaults**: Seed reserves, trader behaviour, histogram layout
//! - **Loading**: TOML file plus `AMM_`-prefixed environment overrides
//! - **Validation**: Bounds checks before any pool is built
//!
//! ## Usage
//!
//! ```rust,no_run
//! use amm_config::SimulationConfig;
//!
//! let config = SimulationConfig::load(None).unwrap();
//! let pool_config = config.pool.to_pool_config();
//! ```

pub mod defaults;
pub mod simulation_config;

// Re-export commonly used types
pub use simulation_config::{
    load_config, LoggingSettings, PoolSettings, SimulationConfig, SimulationSettings,
    StatsSettings,
};
