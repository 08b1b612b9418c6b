//! Simulation Configuration Module
//!
//! Provides configuration loading and validation for the AMM simulator.
//! Supports loading from TOML files with environment variable overrides.

use crate::defaults;
use adaptive_amm::{AnchorPolicy, DeviationFormula, DiscountPolicy, PoolConfig};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main simulator configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SimulationConfig {
    /// Pool genesis and engine policies
    pub pool: PoolSettings,

    /// Trading loop settings
    pub simulation: SimulationSettings,

    /// Fee histogram layout
    pub stats: StatsSettings,

    /// Log output
    pub logging: LoggingSettings,
}

/// Pool genesis amounts and variation points
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PoolSettings {
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub anchor_policy: AnchorPolicy,
    pub discount_policy: DiscountPolicy,
    pub initial_discount: u64,
    pub deviation_formula: DeviationFormula,
}

/// Trading loop settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationSettings {
    pub rounds: u64,
    /// Probability of selling B for A on each round
    pub market_trend: f64,
    pub seed: u64,
    /// Run the liquidity-provider bot alongside the trader
    pub lp_bot: bool,
    pub lp_interval: u64,
    /// Trader wallet, defaults to the pool seed amounts
    pub trader_a: Option<u64>,
    pub trader_b: Option<u64>,
}

/// Histogram layout
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct StatsSettings {
    pub bins: usize,
    pub bin_width_pct: Decimal,
}

/// Log output settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            reserve_a: defaults::pool::RESERVE_A,
            reserve_b: defaults::pool::RESERVE_B,
            anchor_policy: AnchorPolicy::default(),
            discount_policy: DiscountPolicy::default(),
            initial_discount: defaults::pool::INITIAL_DISCOUNT,
            deviation_formula: DeviationFormula::default(),
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            rounds: defaults::simulation::ROUNDS,
            market_trend: defaults::simulation::MARKET_TREND,
            seed: defaults::simulation::SEED,
            lp_bot: false,
            lp_interval: defaults::simulation::LP_INTERVAL,
            trader_a: None,
            trader_b: None,
        }
    }
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            bins: defaults::stats::BINS,
            bin_width_pct: Decimal::from(defaults::stats::BIN_WIDTH_PCT),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: defaults::logging::LEVEL.to_string(),
            json: false,
        }
    }
}

impl PoolSettings {
    /// Engine configuration for these settings
    pub fn to_pool_config(&self) -> PoolConfig {
        PoolConfig {
            anchor_policy: self.anchor_policy,
            discount_policy: self.discount_policy,
            initial_discount: u128::from(self.initial_discount),
            deviation_formula: self.deviation_formula,
        }
    }
}

impl SimulationSettings {
    /// Trader wallet as `(a, b)`, falling back to the pool seed
    pub fn trader_wallet(&self, pool: &PoolSettings) -> (u128, u128) {
        (
            u128::from(self.trader_a.unwrap_or(pool.reserve_a)),
            u128::from(self.trader_b.unwrap_or(pool.reserve_b)),
        )
    }
}

impl SimulationConfig {
    /// Load configuration from an optional file with environment overrides
    ///
    /// Environment variables use the `AMM_` prefix and `__` between nested
    /// keys, e.g. `AMM_SIMULATION__ROUNDS=500`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading simulation config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        } else {
            debug!("No config file given, using defaults");
        }

        builder = builder.add_source(
            Environment::with_prefix(defaults::ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let parsed: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Parse a TOML document without consulting the environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parsed: Self = toml::from_str(content).context("Failed to parse TOML configuration")?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration")
    }

    /// Check bounds that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.pool.reserve_a == 0 || self.pool.reserve_b == 0 {
            bail!("Pool seed reserves must be positive");
        }
        self.pool
            .to_pool_config()
            .validate()
            .context("Invalid pool policy settings")?;
        if !(0.0..=1.0).contains(&self.simulation.market_trend) {
            bail!(
                "market_trend must lie within [0, 1], got {}",
                self.simulation.market_trend
            );
        }
        if self.simulation.lp_interval == 0 {
            bail!("lp_interval must be positive");
        }
        if self.stats.bins == 0 {
            bail!("Histogram needs at least one bin");
        }
        if self.stats.bin_width_pct <= Decimal::ZERO {
            bail!("bin_width_pct must be positive");
        }
        Ok(())
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    SimulationConfig::load(path)
}
