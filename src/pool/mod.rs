//! Pool module for the Orbital engine
//!
//! Ticks, the pool that owns them, trade routing, liquidity management and
//! the thread-safe manager that serializes access to a single pool.
//!
//! Created: 2026-10-18

mod liquidity;
pub mod manager;
pub mod ops;
pub mod router;
pub mod state;
pub mod tick;

pub use manager::PoolStateManager;
pub use ops::PoolOperation;
pub use router::{PriceQuote, TradePlan};
pub use state::{PoolState, TickConfig};
pub use tick::Tick;
