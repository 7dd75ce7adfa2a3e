//! Orbital CLI
//!
//! One-shot command surface over a persisted pool. Each invocation loads the
//! state file (or builds the configured initial pool), applies a single
//! operation, prints the result as JSON and saves the pool with its trade
//! statistics. Failed operations leave the pool as it was but still count
//! towards the statistics.
//!
//! Usage:
//!   orbital state
//!   orbital trade --from USDC --to USDT --amount 100
//!   orbital add-tick --plane-constant 50 --reserves 10,20,30
//!   orbital --config orbital.toml reset --default
//!
//! Created: 2026-10-18

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orbital_amm::pool::{PoolOperation, PoolStateManager};
use orbital_amm::{OperationResponse, OrbitalConfig, PoolStateFile};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Orbital AMM engine
#[derive(Parser)]
#[command(name = "orbital", about = "Multi-token sphere AMM with tick routing")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "ORBITAL_CONFIG")]
    config: Option<PathBuf>,

    /// Pool state file (overrides the configured path)
    #[arg(short, long)]
    state_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every tick and the global reserves
    State,
    /// Append a tick
    AddTick {
        #[arg(long)]
        plane_constant: f64,
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        reserves: Vec<f64>,
    },
    /// Route a trade across ticks and commit it
    Trade {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: f64,
    },
    /// Price a trade without committing it
    Quote {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: f64,
    },
    /// Overwrite a tick's reserves
    SetReserves {
        #[arg(long)]
        tick: usize,
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        reserves: Vec<f64>,
    },
    AddLiquidity {
        #[arg(long)]
        tick: usize,
        #[arg(long)]
        lp: String,
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        amounts: Vec<f64>,
    },
    RemoveLiquidity {
        #[arg(long)]
        tick: usize,
        #[arg(long)]
        lp: String,
        /// Fraction of the position to withdraw, 0..=1
        #[arg(long)]
        percentage: f64,
    },
    /// Drop every tick, optionally seeding a new one
    Reset {
        /// Reseed the configured initial tick
        #[arg(long, conflicts_with_all = ["reserves", "plane_constant"])]
        default: bool,
        #[arg(long, value_delimiter = ',', num_args = 1.., requires = "plane_constant")]
        reserves: Option<Vec<f64>>,
        #[arg(long, requires = "reserves")]
        plane_constant: Option<f64>,
    },
    /// Replace the token universe with a single fresh tick
    Reconfigure {
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        tokens: Vec<String>,
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        reserves: Vec<f64>,
        #[arg(long)]
        plane_constant: f64,
    },
    /// Aggregated price for every token pair
    Prices,
    /// Phase-space sample of the first two tokens
    Phase,
    /// Trade statistics
    Stats,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = OrbitalConfig::from_env(args.config.as_deref())?;

    // Logs go to stderr; stdout carries the JSON result
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let state_file = args
        .state_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.general.state_file));
    let manager = load_manager(&config, &state_file)?;

    let op = match args.command {
        Command::State => return print_json(&manager.read_state()),
        Command::Prices => return print_json(&manager.prices()),
        Command::Phase => return print_json(&manager.read_phase_sample()),
        Command::Stats => return print_json(&manager.stats()),
        Command::Quote { from, to, amount } => {
            return match manager.quote(&from, &to, amount) {
                Ok(receipt) => print_json(&receipt),
                Err(e) => fail(&OperationResponse::failure(&e)),
            };
        }
        Command::AddTick { plane_constant, reserves } => PoolOperation::AddTick { plane_constant, reserves },
        Command::Trade { from, to, amount } => PoolOperation::Trade { from, to, amount },
        Command::SetReserves { tick, reserves } => PoolOperation::SetReserves { tick_index: tick, reserves },
        Command::AddLiquidity { tick, lp, amounts } => PoolOperation::AddLiquidity {
            tick_index: tick,
            lp_id: lp,
            amounts,
        },
        Command::RemoveLiquidity { tick, lp, percentage } => PoolOperation::RemoveLiquidity {
            tick_index: tick,
            lp_id: lp,
            percentage,
        },
        Command::Reset { default: true, .. } => PoolOperation::Reset {
            reserves: Some(config.pool.resolved_reserves()),
            plane_constant: Some(config.pool.initial_plane_constant),
        },
        Command::Reset { reserves, plane_constant, .. } => PoolOperation::Reset { reserves, plane_constant },
        Command::Reconfigure { tokens, reserves, plane_constant } => PoolOperation::Reconfigure {
            token_names: tokens,
            initial_reserves: reserves,
            initial_plane_constant: plane_constant,
        },
    };

    let response = manager.apply(op);
    save_manager(&manager, &state_file)?;
    if !response.success {
        return fail(&response);
    }
    print_json(&response)
}

fn save_manager(manager: &PoolStateManager, state_file: &Path) -> Result<()> {
    PoolStateFile::capture(manager)
        .write_to_file(state_file)
        .with_context(|| format!("Failed to save pool state to {}", state_file.display()))?;
    info!("Pool state saved to {}", state_file.display());
    Ok(())
}

/// Resume from the state file, or start from the configured pool
fn load_manager(config: &OrbitalConfig, state_file: &Path) -> Result<PoolStateManager> {
    if state_file.exists() {
        let manager = PoolStateFile::read_from_file(state_file)?.into_manager(config.engine)?;
        info!("Loaded pool state from {}", state_file.display());
        Ok(manager)
    } else {
        warn!("No state file at {}; starting from configured pool", state_file.display());
        Ok(PoolStateManager::new(config.build_pool()?))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fail(response: &OperationResponse) -> Result<()> {
    print_json(response)?;
    std::process::exit(1);
}
