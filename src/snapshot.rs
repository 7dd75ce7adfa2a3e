//! Pool State File
//!
//! JSON form of the current pool, written by the CLI after each successful
//! mutation and read back on the next invocation. Only the current state is
//! kept. Loading re-validates every tick through the same checks as
//! `add_tick`, so a hand-edited file cannot smuggle in a bad reserve.
//!
//! Created: 2026-10-18

use crate::pool::{PoolState, PoolStateManager};
use crate::stats::PoolStats;
use crate::types::{EngineParams, TokenSet};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Serializable tick for JSON storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub plane_constant: f64,
    pub reserves: Vec<f64>,
    #[serde(default)]
    pub lp_shares: BTreeMap<String, f64>,
}

/// State file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStateFile {
    pub saved_at: DateTime<Utc>,
    pub token_names: Vec<String>,
    pub ticks: Vec<TickRecord>,
    #[serde(default)]
    pub stats: Option<PoolStats>,
}

impl From<&PoolState> for PoolStateFile {
    fn from(pool: &PoolState) -> Self {
        Self {
            saved_at: Utc::now(),
            token_names: pool.tokens().names().to_vec(),
            ticks: pool
                .ticks()
                .iter()
                .map(|tick| TickRecord {
                    plane_constant: tick.plane_constant(),
                    reserves: tick.reserves().to_vec(),
                    lp_shares: tick.lp_shares().clone(),
                })
                .collect(),
            stats: None,
        }
    }
}

impl PoolStateFile {
    /// Capture the manager's pool and counters
    pub fn capture(manager: &PoolStateManager) -> Self {
        let mut file = manager.with_state(|pool| PoolStateFile::from(pool));
        file.stats = Some(manager.stats());
        file
    }

    /// Rebuild a pool from the stored ticks
    pub fn to_pool_state(&self, params: EngineParams) -> Result<PoolState> {
        params.validate().context("Invalid engine parameters")?;
        let tokens = TokenSet::new(self.token_names.clone()).context("Invalid token list in state file")?;
        let mut pool = PoolState::new(tokens, params);

        for (i, record) in self.ticks.iter().enumerate() {
            if record.lp_shares.values().any(|s| !s.is_finite() || *s < 0.0) {
                bail!("Tick {} in state file has a negative LP share", i);
            }
            let index = pool
                .add_tick(record.plane_constant, record.reserves.clone())
                .with_context(|| format!("Invalid tick {} in state file", i))?;
            pool.tick_mut(index)?.set_lp_shares(record.lp_shares.clone());
        }
        Ok(pool)
    }

    /// Rebuild a manager, restoring counters when they match the token set
    pub fn into_manager(self, params: EngineParams) -> Result<PoolStateManager> {
        let pool = self.to_pool_state(params)?;
        let n = pool.token_count();
        Ok(match self.stats {
            Some(stats) if stats.volume_in.len() == n && stats.volume_out.len() == n => {
                PoolStateManager::with_stats(pool, stats)
            }
            _ => PoolStateManager::new(pool),
        })
    }

    /// Write to JSON file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize pool state")?;

        // Write to temp file first, then rename (atomic)
        let temp_path = path.as_ref().with_extension("tmp");
        std::fs::write(&temp_path, &json).context("Failed to write temp file")?;
        std::fs::rename(&temp_path, path.as_ref()).context("Failed to rename temp file")?;

        Ok(())
    }

    /// Read from JSON file
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read state file {}", path.as_ref().display()))?;
        let state: Self = serde_json::from_str(&json).context("Failed to parse pool state JSON")?;
        Ok(state)
    }
}
