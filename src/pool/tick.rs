//! Tick
//!
//! One liquidity band: a reserve vector held on its own sphere with plane
//! constant `r`. Status and liquidity are re-derived on every reserve change.
//!
//! Created: 2026-10-18

use crate::invariant;
use crate::types::{Reserves, TickStatus, TickView};
use std::collections::BTreeMap;

/// Share holder for liquidity the tick was created or reseeded with. No LP
/// may deposit or withdraw under this id.
pub const GENESIS_LP_ID: &str = "genesis";

/// A liquidity band owned by a [`PoolState`](super::PoolState)
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    index: usize,
    plane_constant: f64,
    reserves: Vec<f64>,
    status: TickStatus,
    /// Cached Σ reserves
    liquidity: f64,
    /// LP id -> shares of the tick's reserves
    lp_shares: BTreeMap<String, f64>,
    epsilon: f64,
}

impl Tick {
    /// Build a tick from already validated parts
    pub(crate) fn new(index: usize, plane_constant: f64, reserves: Reserves, epsilon: f64) -> Self {
        let mut tick = Self {
            index,
            plane_constant,
            reserves: reserves.into_vec(),
            status: TickStatus::Interior,
            liquidity: 0.0,
            lp_shares: BTreeMap::new(),
            epsilon,
        };
        tick.refresh();
        if tick.liquidity > 0.0 {
            tick.credit_shares(GENESIS_LP_ID, tick.liquidity);
        }
        tick
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn plane_constant(&self) -> f64 {
        self.plane_constant
    }

    pub fn reserves(&self) -> &[f64] {
        &self.reserves
    }

    pub fn status(&self) -> &TickStatus {
        &self.status
    }

    pub fn is_interior(&self) -> bool {
        self.status.is_interior()
    }

    pub fn is_boundary(&self) -> bool {
        self.status.is_boundary()
    }

    /// Sphere radius r·√(n−1)
    pub fn radius(&self) -> f64 {
        invariant::radius(self.plane_constant, self.reserves.len())
    }

    /// Total depth held by the tick (Σ reserves)
    pub fn liquidity(&self) -> f64 {
        self.liquidity
    }

    pub fn lp_shares(&self) -> &BTreeMap<String, f64> {
        &self.lp_shares
    }

    pub fn total_shares(&self) -> f64 {
        self.lp_shares.values().sum()
    }

    /// Shares worth `value` of the tick's current liquidity
    pub fn shares_for(&self, value: f64) -> f64 {
        let total = self.total_shares();
        if total > 0.0 && self.liquidity > 0.0 {
            value * total / self.liquidity
        } else {
            value
        }
    }

    /// Whether a trade between `from` and `to` may route through this tick
    pub fn can_route(&self, from: usize, to: usize) -> bool {
        self.status.is_active(from) && self.status.is_active(to)
    }

    pub fn view(&self) -> TickView {
        TickView {
            index: self.index,
            plane_constant: self.plane_constant,
            reserves: self.reserves.clone(),
            radius: self.radius(),
            is_interior: self.is_interior(),
            is_boundary: self.is_boundary(),
            liquidity: self.liquidity,
        }
    }

    /// Apply a committed swap: new values for the two traded coordinates.
    /// A saturated output reserve is pinned to exactly zero.
    pub(crate) fn apply_swap(&mut self, from: usize, to: usize, from_reserve: f64, to_reserve: f64, saturated: bool) {
        self.reserves[from] = from_reserve;
        self.reserves[to] = if saturated { 0.0 } else { to_reserve.max(0.0) };
        self.refresh();
    }

    pub(crate) fn deposit(&mut self, amounts: &[f64]) {
        for (r, a) in self.reserves.iter_mut().zip(amounts) {
            *r += *a;
        }
        self.refresh();
    }

    pub(crate) fn replace_reserves(&mut self, reserves: Reserves) {
        self.reserves = reserves.into_vec();
        self.refresh();
    }

    /// Remove `ratio` of every reserve, returning the withdrawn amounts
    pub(crate) fn withdraw_ratio(&mut self, ratio: f64) -> Vec<f64> {
        let withdrawn: Vec<f64> = self.reserves.iter().map(|r| r * ratio).collect();
        for (r, w) in self.reserves.iter_mut().zip(&withdrawn) {
            *r = (*r - w).max(0.0);
        }
        self.refresh();
        withdrawn
    }

    pub(crate) fn credit_shares(&mut self, lp_id: &str, shares: f64) {
        *self.lp_shares.entry(lp_id.to_string()).or_default() += shares;
    }

    /// Debit shares; the entry is dropped once it reaches zero
    pub(crate) fn debit_shares(&mut self, lp_id: &str, shares: f64, remove_entry: bool) {
        if remove_entry {
            self.lp_shares.remove(lp_id);
        } else if let Some(held) = self.lp_shares.get_mut(lp_id) {
            *held -= shares;
        }
    }

    pub(crate) fn set_lp_shares(&mut self, shares: BTreeMap<String, f64>) {
        self.lp_shares = shares;
    }

    fn refresh(&mut self) {
        self.status = invariant::classify(&self.reserves, self.epsilon);
        self.liquidity = self.reserves.iter().sum();
    }
}
