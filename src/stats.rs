//! Pool Activity Statistics
//!
//! Counters describing what the pool has done since it was created or last
//! reconfigured. Kept apart from `PoolState` so that recording a rejected
//! trade never touches pool state.
//!
//! Created: 2026-10-18

use crate::types::TradeReceipt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    // Trade counts
    pub trades_executed: usize,
    pub trades_rejected: usize,
    /// Number of tick fills that left a tick on the boundary
    pub boundary_transitions: usize,

    // Per-token volume, indexed like the pool's tokens
    pub volume_in: Vec<f64>,
    pub volume_out: Vec<f64>,

    // Timing
    pub start_time: DateTime<Utc>,
    pub last_trade_time: Option<DateTime<Utc>>,
}

impl PoolStats {
    /// Fresh counters for a pool of `n_tokens`
    pub fn new(n_tokens: usize) -> Self {
        Self {
            trades_executed: 0,
            trades_rejected: 0,
            boundary_transitions: 0,
            volume_in: vec![0.0; n_tokens],
            volume_out: vec![0.0; n_tokens],
            start_time: Utc::now(),
            last_trade_time: None,
        }
    }

    /// Record a committed trade
    pub fn record_trade(&mut self, receipt: &TradeReceipt) {
        self.trades_executed += 1;
        self.last_trade_time = Some(Utc::now());
        if let Some(v) = self.volume_in.get_mut(receipt.from) {
            *v += receipt.amount_in;
        }
        if let Some(v) = self.volume_out.get_mut(receipt.to) {
            *v += receipt.amount_out;
        }
        self.boundary_transitions += receipt.fills.iter().filter(|f| f.becomes_boundary).count();
    }

    pub fn record_rejection(&mut self) {
        self.trades_rejected += 1;
    }

    pub fn total_trades(&self) -> usize {
        self.trades_executed + self.trades_rejected
    }

    /// Generate a summary string for logging
    pub fn summary(&self) -> String {
        format!(
            "{} trades ({} executed, {} rejected) | {} boundary transitions",
            self.total_trades(),
            self.trades_executed,
            self.trades_rejected,
            self.boundary_transitions
        )
    }
}
