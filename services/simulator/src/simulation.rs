//! Simulation loop
//!
//! Seeds a pool and a trader from [`SimulationConfig`], runs the configured
//! number of rounds, and tracks how the pool fares against simply holding
//! the deposited basket.

use crate::bots::{BotError, LpBot, SwapBot};
use crate::stats::{FeeHistogram, HistogramHandle};
use adaptive_amm::{AmmError, Decimal, Pool, PoolReport, ReservePair};
use amm_config::SimulationConfig;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Summary printed at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub rounds: u64,
    pub swaps_committed: u64,
    pub swaps_skipped: u64,
    pub swaps_rejected: u64,
    pub lp_actions: u64,
    pub discount: u128,
    pub reserves: ReservePair,
    pub anchor: ReservePair,
    pub trader_wallet: ReservePair,
    /// Largest `hold - 2B` seen after any round
    pub max_loss: Decimal,
    pub report: PoolReport,
}

pub struct Simulation {
    config: SimulationConfig,
    pool: Pool,
    trader: SwapBot,
    lp: Option<LpBot>,
    histogram: HistogramHandle,
    rng: StdRng,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut pool = Pool::with_config(
            u128::from(config.pool.reserve_a),
            u128::from(config.pool.reserve_b),
            config.pool.to_pool_config(),
        )
        .context("Failed to seed pool")?;

        let histogram =
            HistogramHandle::new(FeeHistogram::new(config.stats.bins, config.stats.bin_width_pct));
        pool.set_observer(Box::new(histogram.clone()));

        let (a, b) = config.simulation.trader_wallet(&config.pool);
        let lp = config.simulation.lp_bot.then(|| LpBot::new(a, b));

        Ok(Self {
            rng: StdRng::seed_from_u64(config.simulation.seed),
            trader: SwapBot::new(a, b),
            lp,
            histogram,
            pool,
            config,
        })
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn trader(&self) -> &SwapBot {
        &self.trader
    }

    pub fn lp(&self) -> Option<&LpBot> {
        self.lp.as_ref()
    }

    pub fn histogram(&self) -> FeeHistogram {
        self.histogram.snapshot()
    }

    /// Run every configured round
    pub fn run(&mut self) -> Result<SimulationOutcome> {
        let settings = self.config.simulation.clone();
        info!(
            rounds = settings.rounds,
            seed = settings.seed,
            market_trend = settings.market_trend,
            lp_bot = settings.lp_bot,
            "Starting simulation"
        );

        let mut committed = 0;
        let mut skipped = 0;
        let mut rejected = 0;
        let mut lp_actions = 0;
        let mut max_loss = Decimal::MIN;

        for round in 1..=settings.rounds {
            match self
                .trader
                .swap(&mut self.pool, &mut self.rng, settings.market_trend)
            {
                Ok(Some(trade)) => {
                    committed += 1;
                    debug!(round, ?trade, "Swap committed");
                }
                Ok(None) => skipped += 1,
                Err(BotError::Pool(AmmError::InsufficientLiquidity)) => {
                    rejected += 1;
                    debug!(round, "Swap output consumed by fees");
                }
                Err(e) => {
                    rejected += 1;
                    warn!(round, "Swap rejected: {}", e);
                }
            }

            if round % settings.lp_interval == 0 && self.step_lp(round) {
                lp_actions += 1;
            }

            let report = PoolReport::from_pool(&self.pool).context("Failed to value pool")?;
            max_loss = max_loss.max(report.impermanent_loss);
            debug!(
                round,
                loss = %report.impermanent_loss,
                deviation_pct = %report.deviation_pct.round_dp(4),
                discount = %self.pool.discount(),
                "Round settled"
            );
        }

        let report = PoolReport::from_pool(&self.pool).context("Failed to value pool")?;
        info!(
            committed,
            rejected,
            loss = %report.impermanent_loss,
            discount = %self.pool.discount(),
            "Simulation finished"
        );

        Ok(SimulationOutcome {
            rounds: settings.rounds,
            swaps_committed: committed,
            swaps_skipped: skipped,
            swaps_rejected: rejected,
            lp_actions,
            discount: self.pool.discount(),
            reserves: self.pool.reserves(),
            anchor: self.pool.anchor(),
            trader_wallet: self.trader.wallet(),
            max_loss: if settings.rounds == 0 {
                report.impermanent_loss
            } else {
                max_loss
            },
            report,
        })
    }

    /// Alternate the provider between entering and leaving the pool
    fn step_lp(&mut self, round: u64) -> bool {
        let Some(lp) = self.lp.as_mut() else {
            return false;
        };
        let result = if lp.lpt() == 0 {
            lp.deposit(&mut self.pool, &mut self.rng).map(|d| d.is_some())
        } else {
            lp.withdraw(&mut self.pool).map(|w| w.is_some())
        };
        match result {
            Ok(acted) => acted,
            Err(e) => {
                warn!(round, "Liquidity provider action failed: {}", e);
                false
            }
        }
    }
}
