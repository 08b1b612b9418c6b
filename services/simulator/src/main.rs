//! Adaptive AMM simulator entry point

use amm_config::{LoggingSettings, SimulationConfig};
use amm_simulator::Simulation;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "amm-sim")]
#[command(about = "Run a seeded trading simulation against the adaptive-fee AMM")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of trading rounds
    #[arg(short, long)]
    rounds: Option<u64>,

    /// RNG seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Probability of selling B for A on each round
    #[arg(short, long)]
    trend: Option<f64>,

    /// Log level, overridden by RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

fn init_tracing(logging: &LoggingSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = SimulationConfig::load(args.config.as_deref())
        .context("Failed to load simulation configuration")?;
    if let Some(rounds) = args.rounds {
        config.simulation.rounds = rounds;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(trend) = args.trend {
        config.simulation.market_trend = trend;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    init_tracing(&config.logging);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut simulation = Simulation::new(config)?;
    let outcome = simulation.run()?;

    println!("{}", simulation.histogram());
    println!(
        "{}",
        serde_json::to_string_pretty(&outcome).context("Failed to render outcome")?
    );
    Ok(())
}
