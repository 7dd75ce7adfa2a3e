//! Pool State
//!
//! Owns the token universe and the ordered collection of ticks. Global
//! reserves are always derived from the ticks, never stored.
//!
//! Trade routing lives in `router.rs` and liquidity mutations in
//! `liquidity.rs`; both extend this type.
//!
//! Created: 2026-10-18

use super::tick::Tick;
use crate::error::{OrbitalError, Result};
use crate::types::{EngineParams, PoolSnapshot, Reserves, TokenSet};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Parameters for a tick created by `reset`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickConfig {
    pub reserves: Vec<f64>,
    pub plane_constant: f64,
}

/// The authoritative multi-tick pool
#[derive(Debug, Clone, PartialEq)]
pub struct PoolState {
    tokens: TokenSet,
    ticks: Vec<Tick>,
    params: EngineParams,
}

pub(crate) fn validate_plane_constant(plane_constant: f64) -> Result<f64> {
    if plane_constant.is_finite() && plane_constant > 0.0 {
        Ok(plane_constant)
    } else {
        Err(OrbitalError::invalid(format!(
            "plane constant must be positive, got {}",
            plane_constant
        )))
    }
}

impl PoolState {
    /// Empty pool over `tokens`
    pub fn new(tokens: TokenSet, params: EngineParams) -> Self {
        Self {
            tokens,
            ticks: Vec::new(),
            params,
        }
    }

    /// Pool with a single initial tick; validated like `reconfigure`
    pub fn with_initial_tick(
        token_names: Vec<String>,
        initial_reserves: Vec<f64>,
        initial_plane_constant: f64,
        params: EngineParams,
    ) -> Result<Self> {
        if token_names.len() != initial_reserves.len() {
            return Err(OrbitalError::DimensionMismatch {
                expected: token_names.len(),
                actual: initial_reserves.len(),
            });
        }
        params.validate()?;
        let tokens = TokenSet::new(token_names)?;
        let reserves = Reserves::validate(initial_reserves, &tokens)?;
        let plane_constant = validate_plane_constant(initial_plane_constant)?;

        let mut pool = Self::new(tokens, params);
        pool.push_tick(plane_constant, reserves);
        Ok(pool)
    }

    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn tick_count(&self) -> usize {
        self.ticks.len()
    }

    pub fn tick(&self, index: usize) -> Result<&Tick> {
        self.ticks.get(index).ok_or(OrbitalError::TickNotFound {
            index,
            tick_count: self.ticks.len(),
        })
    }

    pub(crate) fn tick_mut(&mut self, index: usize) -> Result<&mut Tick> {
        let tick_count = self.ticks.len();
        self.ticks
            .get_mut(index)
            .ok_or(OrbitalError::TickNotFound { index, tick_count })
    }

    /// Element-wise sum of every tick's reserves
    pub fn global_reserves(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.tokens.len()];
        for tick in &self.ticks {
            for (g, r) in totals.iter_mut().zip(tick.reserves()) {
                *g += *r;
            }
        }
        totals
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            ticks: self.ticks.iter().map(Tick::view).collect(),
            token_names: self.tokens.names().to_vec(),
            global_reserves: self.global_reserves(),
            tick_count: self.ticks.len(),
        }
    }

    /// Append a new tick. Returns its index.
    pub fn add_tick(&mut self, plane_constant: f64, reserves: Vec<f64>) -> Result<usize> {
        let plane_constant = validate_plane_constant(plane_constant)?;
        let reserves = Reserves::validate(reserves, &self.tokens)?;
        let index = self.push_tick(plane_constant, reserves);
        info!(
            "Added tick {}: plane_constant={} status={}",
            index,
            plane_constant,
            self.ticks[index].status()
        );
        Ok(index)
    }

    /// Discard every tick; optionally seed one new tick. Tokens are kept.
    pub fn reset(&mut self, config: Option<TickConfig>) -> Result<()> {
        // Validate before discarding anything
        let seed = match config {
            Some(cfg) => Some((
                validate_plane_constant(cfg.plane_constant)?,
                Reserves::validate(cfg.reserves, &self.tokens)?,
            )),
            None => None,
        };

        self.ticks.clear();
        if let Some((plane_constant, reserves)) = seed {
            self.push_tick(plane_constant, reserves);
        }
        info!("Pool reset: {} tick(s)", self.ticks.len());
        Ok(())
    }

    /// Replace the token universe and start over from a single tick
    pub fn reconfigure(
        &mut self,
        token_names: Vec<String>,
        initial_reserves: Vec<f64>,
        initial_plane_constant: f64,
    ) -> Result<()> {
        let fresh = Self::with_initial_tick(token_names, initial_reserves, initial_plane_constant, self.params)?;
        *self = fresh;
        info!("Pool reconfigured with tokens {:?}", self.tokens.names());
        Ok(())
    }

    pub(crate) fn push_tick(&mut self, plane_constant: f64, reserves: Reserves) -> usize {
        let index = self.ticks.len();
        self.ticks
            .push(Tick::new(index, plane_constant, reserves, self.params.epsilon));
        index
    }
}
