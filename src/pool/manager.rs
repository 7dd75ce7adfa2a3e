//! Pool State Management
//!
//! Thread-safe handle to the single authoritative `PoolState`. Each
//! operation takes the lock once, so readers never observe a partially
//! applied trade or liquidity change.
//!
//! Created: 2026-10-18

use super::ops::PoolOperation;
use super::router::PriceQuote;
use super::state::{PoolState, TickConfig};
use crate::error::{OrbitalError, Result};
use crate::geometry::{self, PhaseSample};
use crate::stats::PoolStats;
use crate::types::{OperationResponse, PoolSnapshot, TradeReceipt};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Thread-safe pool state manager
///
/// Cloning is cheap: every clone shares the same pool.
#[derive(Debug)]
pub struct PoolStateManager {
    inner: Arc<RwLock<PoolState>>,
    stats: Arc<RwLock<PoolStats>>,
}

impl PoolStateManager {
    pub fn new(pool: PoolState) -> Self {
        let stats = PoolStats::new(pool.token_count());
        Self {
            inner: Arc::new(RwLock::new(pool)),
            stats: Arc::new(RwLock::new(stats)),
        }
    }

    /// Manager resuming previously recorded counters
    pub fn with_stats(pool: PoolState, stats: PoolStats) -> Self {
        Self {
            inner: Arc::new(RwLock::new(pool)),
            stats: Arc::new(RwLock::new(stats)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, PoolState> {
        self.inner.read().unwrap_or_else(|poisoned| {
            warn!("Pool lock poisoned; continuing with last committed state");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, PoolState> {
        self.inner.write().unwrap_or_else(|poisoned| {
            warn!("Pool lock poisoned; continuing with last committed state");
            PoisonError::into_inner(poisoned)
        })
    }

    fn stats_mut(&self) -> RwLockWriteGuard<'_, PoolStats> {
        self.stats.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a read-only closure against a consistent view of the pool
    pub fn with_state<T>(&self, f: impl FnOnce(&PoolState) -> T) -> T {
        f(&*self.read())
    }

    /// Full structured snapshot
    pub fn read_state(&self) -> PoolSnapshot {
        self.read().snapshot()
    }

    pub fn read_phase_sample(&self) -> PhaseSample {
        geometry::sample_phase_space(&self.read())
    }

    pub fn stats(&self) -> PoolStats {
        self.stats.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn prices(&self) -> Vec<PriceQuote> {
        self.read().prices()
    }

    pub fn add_tick(&self, plane_constant: f64, reserves: Vec<f64>) -> Result<usize> {
        self.write().add_tick(plane_constant, reserves)
    }

    /// Route a trade by token name and record the outcome
    pub fn trade(&self, from: &str, to: &str, amount_in: f64) -> Result<TradeReceipt> {
        let result = self.write().trade_by_name(from, to, amount_in);
        let mut stats = self.stats_mut();
        match &result {
            Ok(receipt) => stats.record_trade(receipt),
            Err(e) => {
                debug!("Trade {} -> {} rejected: {}", from, to, e);
                stats.record_rejection();
            }
        }
        result
    }

    /// Price a trade without committing it
    pub fn quote(&self, from: &str, to: &str, amount_in: f64) -> Result<TradeReceipt> {
        let pool = self.read();
        let from = pool.tokens().index_of(from)?;
        let to = pool.tokens().index_of(to)?;
        Ok(pool.plan_trade(from, to, amount_in)?.into_receipt())
    }

    pub fn set_reserves(&self, tick_index: usize, reserves: Vec<f64>) -> Result<()> {
        self.write().set_reserves(tick_index, reserves)
    }

    pub fn add_liquidity(&self, tick_index: usize, lp_id: &str, amounts: Vec<f64>) -> Result<()> {
        self.write().add_liquidity(tick_index, lp_id, amounts)
    }

    pub fn remove_liquidity(&self, tick_index: usize, lp_id: &str, percentage: f64) -> Result<Vec<f64>> {
        self.write().remove_liquidity(tick_index, lp_id, percentage)
    }

    pub fn reset(&self, config: Option<TickConfig>) -> Result<()> {
        self.write().reset(config)
    }

    /// Replace the token universe; statistics restart with it
    pub fn reconfigure(
        &self,
        token_names: Vec<String>,
        initial_reserves: Vec<f64>,
        initial_plane_constant: f64,
    ) -> Result<()> {
        let mut pool = self.write();
        pool.reconfigure(token_names, initial_reserves, initial_plane_constant)?;
        *self.stats_mut() = PoolStats::new(pool.token_count());
        Ok(())
    }

    /// Apply an operation and wrap the outcome in a response envelope
    pub fn apply(&self, op: PoolOperation) -> OperationResponse {
        let name = op.name();
        let result = self.dispatch(op);
        match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Operation {} failed: {}", name, e);
                OperationResponse::failure(&e)
            }
        }
    }

    fn dispatch(&self, op: PoolOperation) -> Result<OperationResponse> {
        match op {
            PoolOperation::AddTick { plane_constant, reserves } => {
                let index = self.add_tick(plane_constant, reserves)?;
                Ok(OperationResponse::ok(format!("Added tick {}", index)))
            }
            PoolOperation::Trade { from, to, amount } => {
                let receipt = self.trade(&from, &to, amount)?;
                Ok(OperationResponse::ok(format!(
                    "Traded {} {} for {:.6} {} across {} tick(s)",
                    amount,
                    from,
                    receipt.amount_out,
                    to,
                    receipt.fills.len()
                ))
                .with_output(receipt.amount_out))
            }
            PoolOperation::Quote { from, to, amount } => {
                let receipt = self.quote(&from, &to, amount)?;
                Ok(OperationResponse::ok(format!(
                    "Quote: {} {} -> {:.6} {}",
                    amount, from, receipt.amount_out, to
                ))
                .with_output(receipt.amount_out))
            }
            PoolOperation::SetReserves { tick_index, reserves } => {
                self.set_reserves(tick_index, reserves)?;
                Ok(OperationResponse::ok(format!("Set reserves for tick {}", tick_index)))
            }
            PoolOperation::AddLiquidity { tick_index, lp_id, amounts } => {
                self.add_liquidity(tick_index, &lp_id, amounts)?;
                Ok(OperationResponse::ok(format!(
                    "Added liquidity to tick {} for {}",
                    tick_index, lp_id
                )))
            }
            PoolOperation::RemoveLiquidity { tick_index, lp_id, percentage } => {
                let withdrawn = self.remove_liquidity(tick_index, &lp_id, percentage)?;
                Ok(OperationResponse::ok(format!(
                    "Removed {:.2}% of {} from tick {}",
                    percentage * 100.0,
                    lp_id,
                    tick_index
                ))
                .with_withdrawn(withdrawn))
            }
            PoolOperation::Reset { reserves, plane_constant } => {
                let config = match (reserves, plane_constant) {
                    (Some(reserves), Some(plane_constant)) => Some(TickConfig { reserves, plane_constant }),
                    (None, None) => None,
                    _ => {
                        return Err(OrbitalError::invalid(
                            "reset needs both reserves and plane_constant, or neither",
                        ))
                    }
                };
                self.reset(config)?;
                Ok(OperationResponse::ok("Pool reset"))
            }
            PoolOperation::Reconfigure { token_names, initial_reserves, initial_plane_constant } => {
                self.reconfigure(token_names, initial_reserves, initial_plane_constant)?;
                Ok(OperationResponse::ok("Pool reconfigured"))
            }
        }
    }
}

impl Clone for PoolStateManager {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            stats: Arc::clone(&self.stats),
        }
    }
}
