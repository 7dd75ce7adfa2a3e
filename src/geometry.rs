//! Phase-Space Sampler
//!
//! Samples the price-equilibrium surface of the first two tokens for
//! visualisation: a regular grid of reserve points decomposed along the
//! equal-price diagonal x1 = x2, plus the projection of every tick.
//!
//! Created: 2026-10-18

use crate::invariant;
use crate::pool::PoolState;
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

/// One grid point of the (x1, x2) reserve plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhasePoint {
    pub x1: f64,
    pub x2: f64,
    /// Projection onto the equal-price diagonal
    pub parallel_magnitude: f64,
    /// Signed orthogonal deviation from the diagonal
    pub distance_from_equilibrium: f64,
    pub is_valid: bool,
}

impl PhasePoint {
    pub fn new(x1: f64, x2: f64) -> Self {
        let (parallel_magnitude, distance_from_equilibrium) = decompose_pair(x1, x2);
        Self {
            x1,
            x2,
            parallel_magnitude,
            distance_from_equilibrium,
            is_valid: x1 >= 0.0 && x2 >= 0.0,
        }
    }
}

/// A tick seen through its first two reserves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickProjection {
    pub index: usize,
    pub plane_constant: f64,
    pub reserves: [f64; 2],
    pub parallel_magnitude: f64,
    pub distance_from_equilibrium: f64,
    pub is_interior: bool,
    pub is_boundary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSample {
    pub token_names: [String; 2],
    pub equal_price_point: f64,
    pub radius: f64,
    /// Grid extent on both axes
    pub bound: f64,
    pub phase_points: Vec<PhasePoint>,
    pub current_ticks: Vec<TickProjection>,
}

/// (parallel, signed orthogonal) components of (x1, x2) w.r.t. x1 = x2
pub fn decompose_pair(x1: f64, x2: f64) -> (f64, f64) {
    ((x1 + x2) / SQRT_2, (x1 - x2) / SQRT_2)
}

/// Sample the phase space of the pool's first two tokens
pub fn sample_phase_space(pool: &PoolState) -> PhaseSample {
    let params = pool.params();
    let names = pool.tokens().names();
    let n = pool.token_count();

    // Reference tick: lowest-index interior tick, else lowest-index tick
    let reference = pool
        .ticks()
        .iter()
        .find(|t| t.is_interior())
        .or_else(|| pool.ticks().first());
    let (equal_price_point, radius) = match reference {
        Some(tick) => (tick.plane_constant(), invariant::radius(tick.plane_constant(), n)),
        None => (0.0, 0.0),
    };

    let max_reserve = pool
        .ticks()
        .iter()
        .flat_map(|t| t.reserves().iter().copied())
        .fold(0.0_f64, f64::max);
    let bound = (max_reserve * (1.0 + params.grid_margin)).max(1.0);

    let steps = params.grid_resolution;
    let spacing = bound / steps as f64;
    let mut phase_points = Vec::with_capacity((steps + 1) * (steps + 1));
    for i in 0..=steps {
        for j in 0..=steps {
            phase_points.push(PhasePoint::new(i as f64 * spacing, j as f64 * spacing));
        }
    }

    let current_ticks = pool
        .ticks()
        .iter()
        .map(|tick| {
            let (x1, x2) = (tick.reserves()[0], tick.reserves()[1]);
            let (parallel_magnitude, distance_from_equilibrium) = decompose_pair(x1, x2);
            TickProjection {
                index: tick.index(),
                plane_constant: tick.plane_constant(),
                reserves: [x1, x2],
                parallel_magnitude,
                distance_from_equilibrium,
                is_interior: tick.is_interior(),
                is_boundary: tick.is_boundary(),
            }
        })
        .collect();

    PhaseSample {
        token_names: [names[0].clone(), names[1].clone()],
        equal_price_point,
        radius,
        bound,
        phase_points,
        current_ticks,
    }
}
