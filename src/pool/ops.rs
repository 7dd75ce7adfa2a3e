//! Pool Operations
//!
//! Serializable description of every mutation and query the pool accepts.
//! The CLI and the scenario runner both go through
//! [`PoolStateManager::apply`](super::PoolStateManager::apply).
//!
//! Created: 2026-10-18

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum PoolOperation {
    AddTick {
        plane_constant: f64,
        reserves: Vec<f64>,
    },
    Trade {
        from: String,
        to: String,
        amount: f64,
    },
    /// Price a trade without committing it
    Quote {
        from: String,
        to: String,
        amount: f64,
    },
    SetReserves {
        tick_index: usize,
        reserves: Vec<f64>,
    },
    AddLiquidity {
        tick_index: usize,
        lp_id: String,
        amounts: Vec<f64>,
    },
    RemoveLiquidity {
        tick_index: usize,
        lp_id: String,
        percentage: f64,
    },
    /// Drop every tick, optionally seeding one
    Reset {
        #[serde(default)]
        reserves: Option<Vec<f64>>,
        #[serde(default)]
        plane_constant: Option<f64>,
    },
    Reconfigure {
        token_names: Vec<String>,
        initial_reserves: Vec<f64>,
        initial_plane_constant: f64,
    },
}

impl PoolOperation {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            PoolOperation::AddTick { .. } => "add-tick",
            PoolOperation::Trade { .. } => "trade",
            PoolOperation::Quote { .. } => "quote",
            PoolOperation::SetReserves { .. } => "set-reserves",
            PoolOperation::AddLiquidity { .. } => "add-liquidity",
            PoolOperation::RemoveLiquidity { .. } => "remove-liquidity",
            PoolOperation::Reset { .. } => "reset",
            PoolOperation::Reconfigure { .. } => "reconfigure",
        }
    }

    /// Whether applying the operation can change pool state
    pub fn is_mutation(&self) -> bool {
        !matches!(self, PoolOperation::Quote { .. })
    }
}
