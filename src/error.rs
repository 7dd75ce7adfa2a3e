//! Engine Errors
//!
//! Every failure is local to the call that produced it and leaves the pool
//! untouched. Binaries wrap these in `anyhow` at the application layer.
//!
//! Created: 2026-10-18

use thiserror::Error;

/// Structured reason an engine operation was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitalError {
    /// A reserve/amount vector does not have one entry per token
    #[error("dimension mismatch: expected {expected} entries, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Non-positive plane constant, negative reserve, bad amount, from == to, ...
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("tick {index} not found (pool has {tick_count} ticks)")]
    TickNotFound { index: usize, tick_count: usize },

    /// The trade could not be fully filled across the eligible ticks
    #[error("insufficient liquidity: {unfilled} of {requested} could not be routed")]
    InsufficientLiquidity { requested: f64, unfilled: f64 },

    #[error("liquidity provider '{lp_id}' has no position in tick {tick_index}")]
    LiquidityProviderNotFound { tick_index: usize, lp_id: String },
}

impl OrbitalError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Short machine-readable kind, used in response envelopes and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DimensionMismatch { .. } => "DimensionMismatch",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::TickNotFound { .. } => "TickNotFound",
            Self::InsufficientLiquidity { .. } => "InsufficientLiquidity",
            Self::LiquidityProviderNotFound { .. } => "LiquidityProviderNotFound",
        }
    }
}

pub type Result<T> = std::result::Result<T, OrbitalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = OrbitalError::DimensionMismatch { expected: 3, actual: 2 };
        assert_eq!(err.to_string(), "dimension mismatch: expected 3 entries, got 2");
        assert_eq!(err.kind(), "DimensionMismatch");

        let err = OrbitalError::invalid("plane constant must be positive");
        assert_eq!(err.to_string(), "invalid argument: plane constant must be positive");
    }
}
