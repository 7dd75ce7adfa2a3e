//! Configuration management
//!
//! Reads the engine configuration from an optional TOML file, then applies
//! `ORBITAL_*` environment overrides (a `.env` file is honoured). Every
//! section and key is optional.
//!
//! Created: 2026-10-18

use crate::invariant;
use crate::pool::PoolState;
use crate::types::EngineParams;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level TOML configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrbitalConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub engine: EngineParams,
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_state_file() -> String { "orbital_state.json".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            log_level: default_log_level(),
        }
    }
}

/// Initial pool used when no state file exists and by `reset --default`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_token_names")]
    pub token_names: Vec<String>,
    /// Omitted: the balanced point of the initial tick's sphere
    #[serde(default)]
    pub initial_reserves: Option<Vec<f64>>,
    #[serde(default = "default_plane_constant")]
    pub initial_plane_constant: f64,
}

fn default_token_names() -> Vec<String> {
    vec!["USDC".to_string(), "USDT".to_string(), "DAI".to_string()]
}
fn default_plane_constant() -> f64 { 600.0 }

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            token_names: default_token_names(),
            initial_reserves: None,
            initial_plane_constant: default_plane_constant(),
        }
    }
}

impl PoolConfig {
    /// Configured reserves, or the equal-price point on the tick's sphere
    pub fn resolved_reserves(&self) -> Vec<f64> {
        match &self.initial_reserves {
            Some(reserves) => reserves.clone(),
            None => invariant::balanced_reserves(self.initial_plane_constant, self.token_names.len()),
        }
    }
}

impl OrbitalConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Load `.env`, the file named by `ORBITAL_CONFIG` (or `path`), then
    /// apply environment overrides
    pub fn from_env(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => std::env::var("ORBITAL_CONFIG").ok().map(Into::into),
        };
        let mut config = match file {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `ORBITAL_*` overrides from any key lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("ORBITAL_STATE_FILE") {
            self.general.state_file = v;
        }
        if let Some(v) = lookup("ORBITAL_LOG_LEVEL") {
            self.general.log_level = v;
        }
        if let Some(v) = lookup("ORBITAL_TOKENS") {
            self.pool.token_names = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("ORBITAL_RESERVES") {
            self.pool.initial_reserves = Some(parse_f64_list(&v).context("Invalid ORBITAL_RESERVES")?);
        }
        if let Some(v) = lookup("ORBITAL_PLANE_CONSTANT") {
            self.pool.initial_plane_constant = v
                .trim()
                .parse()
                .with_context(|| format!("Invalid ORBITAL_PLANE_CONSTANT: {}", v))?;
        }
        Ok(())
    }

    /// Build the configured initial pool, validated like `reconfigure`
    pub fn build_pool(&self) -> Result<PoolState> {
        let pool = PoolState::with_initial_tick(
            self.pool.token_names.clone(),
            self.pool.resolved_reserves(),
            self.pool.initial_plane_constant,
            self.engine,
        )
        .context("Invalid pool configuration")?;
        Ok(pool)
    }
}

/// Parse a comma-separated list of numbers
pub fn parse_f64_list(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("'{}' is not a number", part.trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[general]
state_file = "/tmp/orbital.json"

[pool]
token_names = ["A", "B"]
initial_reserves = [100.0, 200.0]
initial_plane_constant = 80.0

[engine]
grid_resolution = 8
"#;

        let config: OrbitalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.state_file, "/tmp/orbital.json");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.engine.grid_resolution, 8);
        assert_eq!(config.engine.epsilon, 1e-9);

        let pool = config.build_pool().unwrap();
        assert_eq!(pool.global_reserves(), vec![100.0, 200.0]);
    }

    #[test]
    fn test_defaults() {
        let config: OrbitalConfig = toml::from_str("").unwrap();
        assert_eq!(config.pool.token_names, vec!["USDC", "USDT", "DAI"]);
        assert_eq!(config.pool.initial_plane_constant, 600.0);

        // Without explicit reserves the initial tick starts on its sphere
        let pool = config.build_pool().unwrap();
        let tick = pool.tick(0).unwrap();
        assert!(invariant::satisfies_invariant(tick.reserves(), 600.0, 1e-9));
        assert!(tick.is_interior());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ORBITAL_TOKENS", "X, Y"),
            ("ORBITAL_RESERVES", "5,6"),
            ("ORBITAL_PLANE_CONSTANT", "3.5"),
            ("ORBITAL_STATE_FILE", "/tmp/other.json"),
        ]
        .into_iter()
        .collect();

        let mut config = OrbitalConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.pool.token_names, vec!["X", "Y"]);
        assert_eq!(config.pool.initial_reserves, Some(vec![5.0, 6.0]));
        assert_eq!(config.pool.initial_plane_constant, 3.5);
        assert_eq!(config.general.state_file, "/tmp/other.json");

        let mut config = OrbitalConfig::default();
        assert!(config
            .apply_overrides(|k| (k == "ORBITAL_RESERVES").then(|| "1,x".to_string()))
            .is_err());
    }

    #[test]
    fn test_invalid_pool_config() {
        let mut config = OrbitalConfig::default();
        config.pool.initial_reserves = Some(vec![1.0, 2.0]);
        assert!(config.build_pool().is_err());
    }
}
