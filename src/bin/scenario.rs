//! Scenario Runner
//!
//! Replays a TOML list of pool operations against a fresh pool, logging
//! each response envelope. After every committed trade it checks that the
//! global reserves moved only in the traded pair, by exactly the input and
//! output amounts. Quotes must leave the pool untouched.
//!
//! Usage:
//!   orbital-scenario scenarios/basic.toml
//!   orbital-scenario --config orbital.toml scenarios/basic.toml
//!
//! Created: 2026-10-18

use anyhow::{Context, Result};
use clap::Parser;
use orbital_amm::config::PoolConfig;
use orbital_amm::pool::{PoolOperation, PoolStateManager};
use orbital_amm::OrbitalConfig;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Absolute slack allowed on the conservation check, scaled by reserve size
const CONSERVATION_TOLERANCE: f64 = 1e-9;

#[derive(Parser)]
#[command(name = "orbital-scenario", about = "Replay a list of pool operations")]
struct Args {
    /// Scenario TOML file
    scenario: PathBuf,

    /// Engine configuration (engine parameters and default pool)
    #[arg(short, long, env = "ORBITAL_CONFIG")]
    config: Option<PathBuf>,

    /// Stop at the first failed operation
    #[arg(long)]
    fail_fast: bool,
}

/// Scenario file: an optional starting pool and ordered steps
#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    pool: Option<PoolConfig>,
    #[serde(rename = "step", default)]
    steps: Vec<PoolOperation>,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = OrbitalConfig::from_env(args.config.as_deref())?;

    let content = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("Failed to read scenario file: {}", args.scenario.display()))?;
    let scenario: Scenario = toml::from_str(&content).context("Failed to parse scenario TOML")?;
    if let Some(pool) = scenario.pool {
        config.pool = pool;
    }

    let manager = PoolStateManager::new(config.build_pool()?);
    info!(
        "Replaying {} step(s) from {} over tokens {:?}",
        scenario.steps.len(),
        args.scenario.display(),
        config.pool.token_names
    );

    let mut failures = 0usize;
    let mut violations = 0usize;
    for (i, op) in scenario.steps.into_iter().enumerate() {
        let before = manager.read_state();
        let trade = match &op {
            PoolOperation::Trade { from, to, .. } => Some((from.clone(), to.clone())),
            _ => None,
        };
        let name = op.name();
        let mutation = op.is_mutation();
        let input = match &op {
            PoolOperation::Trade { amount, .. } => *amount,
            _ => 0.0,
        };

        let response = manager.apply(op);
        info!("Step {} [{}]: {}", i + 1, name, serde_json::to_string(&response)?);

        if !response.success {
            failures += 1;
            warn!("Step {} failed: {}", i + 1, response.message);
            if args.fail_fast {
                break;
            }
            continue;
        }

        if !mutation && manager.read_state() != before {
            violations += 1;
            error!("Step {}: {} changed the pool", i + 1, name);
        }

        if let (Some((from, to)), Some(output)) = (trade, response.output) {
            let after = manager.read_state();
            let position = |token: &str| before.token_names.iter().position(|t| t == token);
            let (Some(f), Some(t)) = (position(&from), position(&to)) else {
                continue;
            };
            for k in 0..before.global_reserves.len() {
                let expected = if k == f {
                    before.global_reserves[k] + input
                } else if k == t {
                    before.global_reserves[k] - output
                } else {
                    before.global_reserves[k]
                };
                let slack = CONSERVATION_TOLERANCE * expected.abs().max(1.0);
                if (after.global_reserves[k] - expected).abs() > slack {
                    violations += 1;
                    error!(
                        "Step {}: reserve of {} is {} but expected {}",
                        i + 1,
                        before.token_names[k],
                        after.global_reserves[k],
                        expected
                    );
                }
            }
        }
    }

    info!("Final state: {}", serde_json::to_string(&manager.read_state())?);
    info!("{}", manager.stats().summary());
    info!("{} failed step(s), {} conservation violation(s)", failures, violations);

    if violations > 0 {
        anyhow::bail!("{} conservation violation(s)", violations);
    }
    Ok(())
}
