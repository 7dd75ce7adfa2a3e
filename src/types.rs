//! Shared types for the Orbital engine
//!
//! Token universe, validated reserve vectors, tick status, and the views
//! handed out to callers (state snapshots, trade receipts, response envelopes).
//!
//! Created: 2026-10-18

use crate::error::{OrbitalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Numeric tuning shared by the invariant solver, router and sampler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Relative tolerance for radicands, fills and boundary classification
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Phase sample steps per axis
    #[serde(default = "default_grid_resolution")]
    pub grid_resolution: usize,
    /// Fractional margin added on top of the largest observed reserve
    #[serde(default = "default_grid_margin")]
    pub grid_margin: f64,
}

fn default_epsilon() -> f64 { 1e-9 }
fn default_grid_resolution() -> usize { 20 }
fn default_grid_margin() -> f64 { 0.1 }

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            grid_resolution: default_grid_resolution(),
            grid_margin: default_grid_margin(),
        }
    }
}

impl EngineParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon > 0.0 && self.epsilon < 1e-3) {
            return Err(OrbitalError::invalid(format!(
                "epsilon must be in (0, 1e-3), got {}",
                self.epsilon
            )));
        }
        if self.grid_resolution == 0 {
            return Err(OrbitalError::invalid("grid_resolution must be at least 1"));
        }
        if !(self.grid_margin >= 0.0) || !self.grid_margin.is_finite() {
            return Err(OrbitalError::invalid("grid_margin must be a non-negative number"));
        }
        Ok(())
    }
}

/// Ordered token universe; position is the token's identity everywhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    names: Vec<String>,
}

impl TokenSet {
    /// Build a token set. Requires at least two distinct, non-empty names.
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.len() < 2 {
            return Err(OrbitalError::invalid(format!(
                "at least two tokens are required, got {}",
                names.len()
            )));
        }
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(OrbitalError::invalid(format!("token name at position {} is empty", i)));
            }
            if names[..i].contains(name) {
                return Err(OrbitalError::invalid(format!("duplicate token name '{}'", name)));
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Resolve a token by name
    pub fn index_of(&self, token: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|t| t == token)
            .ok_or_else(|| OrbitalError::invalid(format!("token '{}' not found in pool", token)))
    }

    /// Check that `index` names a token of this set
    pub fn check_index(&self, index: usize) -> Result<usize> {
        if index < self.names.len() {
            Ok(index)
        } else {
            Err(OrbitalError::invalid(format!(
                "token index {} out of range (pool has {} tokens)",
                index,
                self.names.len()
            )))
        }
    }
}

/// Reserve (or amount) vector validated against a token set: exactly one
/// finite, non-negative entry per token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reserves {
    values: Vec<f64>,
}

impl Reserves {
    pub fn validate(values: Vec<f64>, tokens: &TokenSet) -> Result<Self> {
        Self::validate_len(values, tokens.len())
    }

    pub(crate) fn validate_len(values: Vec<f64>, expected: usize) -> Result<Self> {
        if values.len() != expected {
            return Err(OrbitalError::DimensionMismatch {
                expected,
                actual: values.len(),
            });
        }
        if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite() || **v < 0.0) {
            return Err(OrbitalError::invalid(format!(
                "entry {} must be a non-negative number, got {}",
                i, v
            )));
        }
        Ok(Self { values })
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

impl Deref for Reserves {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

/// Interior/boundary state of a tick.
///
/// A boundary tick carries the indices that still hold positive reserve;
/// only those tokens take part in its invariant and in routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TickStatus {
    Interior,
    Boundary { active: Vec<usize> },
}

impl TickStatus {
    pub fn is_interior(&self) -> bool {
        matches!(self, Self::Interior)
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary { .. })
    }

    /// Whether token `index` still participates in this tick
    pub fn is_active(&self, index: usize) -> bool {
        match self {
            Self::Interior => true,
            Self::Boundary { active } => active.contains(&index),
        }
    }
}

impl fmt::Display for TickStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interior => write!(f, "interior"),
            Self::Boundary { active } => write!(f, "boundary{:?}", active),
        }
    }
}

/// Caller-facing view of one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickView {
    pub index: usize,
    pub plane_constant: f64,
    pub reserves: Vec<f64>,
    pub radius: f64,
    pub is_interior: bool,
    pub is_boundary: bool,
    pub liquidity: f64,
}

/// Consistent read of the whole pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub ticks: Vec<TickView>,
    pub token_names: Vec<String>,
    pub global_reserves: Vec<f64>,
    pub tick_count: usize,
}

/// One tick's share of a routed trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeFill {
    pub tick_index: usize,
    pub plane_constant: f64,
    pub amount_in: f64,
    pub amount_out: f64,
    pub becomes_boundary: bool,
}

/// Result of routing a trade (committed or quoted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub from: usize,
    pub to: usize,
    pub amount_in: f64,
    pub amount_out: f64,
    /// Fills in routing order (ascending plane constant)
    pub fills: Vec<TradeFill>,
}

impl TradeReceipt {
    /// Average output per unit input
    pub fn execution_price(&self) -> f64 {
        if self.amount_in > 0.0 {
            self.amount_out / self.amount_in
        } else {
            0.0
        }
    }
}

/// Uniform `{success, message}` envelope returned by the operation surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Trade output, when the operation produces one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<f64>,
    /// Withdrawn amounts, for liquidity removal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawn: Option<Vec<f64>>,
}

impl OperationResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error_kind: None,
            output: None,
            withdrawn: None,
        }
    }

    pub fn failure(err: &OrbitalError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            error_kind: Some(err.kind().to_string()),
            output: None,
            withdrawn: None,
        }
    }

    pub fn with_output(mut self, output: f64) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_withdrawn(mut self, withdrawn: Vec<f64>) -> Self {
        self.withdrawn = Some(withdrawn);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(names: &[&str]) -> TokenSet {
        TokenSet::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_token_set_rules() {
        assert!(TokenSet::new(vec!["USDC".into()]).is_err());
        assert!(TokenSet::new(vec!["USDC".into(), "USDC".into()]).is_err());
        assert!(TokenSet::new(vec!["USDC".into(), " ".into()]).is_err());

        let set = tokens(&["USDC", "USDT", "DAI"]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.index_of("DAI").unwrap(), 2);
        assert!(set.index_of("FRAX").is_err());
        assert!(set.check_index(3).is_err());
    }

    #[test]
    fn test_reserves_validation() {
        let set = tokens(&["A", "B"]);
        assert_eq!(
            Reserves::validate(vec![1.0], &set),
            Err(OrbitalError::DimensionMismatch { expected: 2, actual: 1 })
        );
        assert!(matches!(
            Reserves::validate(vec![1.0, -0.5], &set),
            Err(OrbitalError::InvalidArgument(_))
        ));
        assert!(Reserves::validate(vec![1.0, f64::NAN], &set).is_err());

        let reserves = Reserves::validate(vec![0.0, 2.5], &set).unwrap();
        assert_eq!(reserves.len(), 2);
        assert_eq!(reserves[1], 2.5);
    }

    #[test]
    fn test_tick_status_views() {
        let interior = TickStatus::Interior;
        assert!(interior.is_interior() && !interior.is_boundary());
        assert!(interior.is_active(7));

        let boundary = TickStatus::Boundary { active: vec![0, 2] };
        assert!(boundary.is_boundary() && !boundary.is_interior());
        assert!(boundary.is_active(2));
        assert!(!boundary.is_active(1));
    }

    #[test]
    fn test_engine_params_defaults() {
        let params: EngineParams = toml::from_str("grid_resolution = 8").unwrap();
        assert_eq!(params.grid_resolution, 8);
        assert_eq!(params.epsilon, 1e-9);
        assert!(params.validate().is_ok());

        let bad = EngineParams { grid_resolution: 0, ..EngineParams::default() };
        assert!(bad.validate().is_err());
    }
}
