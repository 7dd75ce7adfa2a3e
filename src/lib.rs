//! Orbital AMM Engine
//!
//! Multi-token stablecoin AMM: each tick holds reserves on its own sphere,
//! trades are routed across ticks in plane-constant order, and the whole
//! pool sits behind a thread-safe manager.
//!
//! Created: 2026-10-18

pub mod config;
pub mod error;
pub mod geometry;
pub mod invariant;
pub mod pool;
pub mod snapshot;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use config::OrbitalConfig;
pub use error::{OrbitalError, Result};
pub use pool::{PoolOperation, PoolState, PoolStateManager, TickConfig};
pub use snapshot::PoolStateFile;
pub use stats::PoolStats;
pub use types::{EngineParams, OperationResponse, PoolSnapshot, TradeReceipt};
