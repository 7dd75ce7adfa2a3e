//! Trade Router
//!
//! Splits a trade across ticks in ascending plane-constant order: the
//! tightest bands absorb flow first. Each tick's fill is solved against its
//! own invariant and staged; nothing touches tick state until the whole
//! input is known to be fillable, then every staged delta is committed
//! together.
//!
//! Also hosts the read-only pricing helpers (spot and aggregated price).
//!
//! Created: 2026-10-18

use super::state::PoolState;
use crate::error::{OrbitalError, Result};
use crate::invariant::{self, StepKind};
use crate::types::{TradeFill, TradeReceipt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// New values for the two traded coordinates of one tick
#[derive(Debug, Clone, PartialEq)]
struct StagedDelta {
    tick_index: usize,
    from_reserve: f64,
    to_reserve: f64,
    saturated: bool,
}

/// A fully routed trade whose reserve deltas have not been applied
#[derive(Debug, Clone, PartialEq)]
pub struct TradePlan {
    receipt: TradeReceipt,
    staged: Vec<StagedDelta>,
}

impl TradePlan {
    pub fn into_receipt(self) -> TradeReceipt {
        self.receipt
    }
}

/// Aggregated price of `to` per unit of `from`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub from: String,
    pub to: String,
    pub price: f64,
}

impl PoolState {
    /// Ticks that can carry a `from -> to` trade, in routing order.
    /// Ties keep insertion order.
    pub fn routing_order(&self, from: usize, to: usize) -> Vec<usize> {
        let mut order: Vec<usize> = self
            .ticks()
            .iter()
            .filter(|t| t.can_route(from, to))
            .map(|t| t.index())
            .collect();
        order.sort_by(|&a, &b| {
            self.ticks()[a]
                .plane_constant()
                .total_cmp(&self.ticks()[b].plane_constant())
        });
        order
    }

    fn validate_trade(&self, from: usize, to: usize, amount_in: f64) -> Result<()> {
        self.tokens().check_index(from)?;
        self.tokens().check_index(to)?;
        if from == to {
            return Err(OrbitalError::invalid("cannot trade a token for itself"));
        }
        if !(amount_in.is_finite() && amount_in > 0.0) {
            return Err(OrbitalError::invalid(format!(
                "trade amount must be positive, got {}",
                amount_in
            )));
        }
        Ok(())
    }

    /// Route a trade without applying it
    pub fn plan_trade(&self, from: usize, to: usize, amount_in: f64) -> Result<TradePlan> {
        self.validate_trade(from, to, amount_in)?;

        let epsilon = self.params().epsilon;
        let done = invariant::tolerance(amount_in, epsilon);
        let mut remaining = amount_in;
        let mut fills: Vec<TradeFill> = Vec::new();
        let mut staged: Vec<StagedDelta> = Vec::new();

        for index in self.routing_order(from, to) {
            if remaining <= done {
                break;
            }
            let tick = &self.ticks()[index];
            let reserves = tick.reserves();
            let step = invariant::solve_output(
                reserves,
                tick.plane_constant(),
                from,
                to,
                remaining,
                epsilon,
            );
            debug!(
                "Tick {} (r={}): offered {} -> {:?} in={} out={}",
                index,
                tick.plane_constant(),
                remaining,
                step.kind,
                step.consumed_in,
                step.amount_out
            );
            if step.kind == StepKind::NoFill {
                continue;
            }

            staged.push(StagedDelta {
                tick_index: index,
                from_reserve: reserves[from] + step.consumed_in,
                to_reserve: reserves[to] - step.amount_out,
                saturated: step.becomes_boundary(),
            });
            fills.push(TradeFill {
                tick_index: index,
                plane_constant: tick.plane_constant(),
                amount_in: step.consumed_in,
                amount_out: step.amount_out,
                becomes_boundary: step.becomes_boundary(),
            });
            remaining -= step.consumed_in;
        }

        if remaining > done || fills.is_empty() {
            return Err(OrbitalError::InsufficientLiquidity {
                requested: amount_in,
                unfilled: remaining,
            });
        }
        // Rounding dust goes to the last tick so consumed input sums to the request
        if remaining > 0.0 {
            if let (Some(delta), Some(fill)) = (staged.last_mut(), fills.last_mut()) {
                delta.from_reserve += remaining;
                fill.amount_in += remaining;
            }
        }

        let amount_out = fills.iter().map(|f| f.amount_out).sum();
        Ok(TradePlan {
            receipt: TradeReceipt {
                from,
                to,
                amount_in,
                amount_out,
                fills,
            },
            staged,
        })
    }

    fn commit(&mut self, plan: TradePlan) -> TradeReceipt {
        let TradePlan { receipt, staged } = plan;
        for delta in staged {
            if let Ok(tick) = self.tick_mut(delta.tick_index) {
                tick.apply_swap(
                    receipt.from,
                    receipt.to,
                    delta.from_reserve,
                    delta.to_reserve,
                    delta.saturated,
                );
            }
        }
        receipt
    }

    /// Execute a trade by token index. All-or-nothing.
    pub fn trade(&mut self, from: usize, to: usize, amount_in: f64) -> Result<TradeReceipt> {
        let plan = self.plan_trade(from, to, amount_in)?;
        let receipt = self.commit(plan);
        info!(
            "Traded {} {} -> {} {} across {} tick(s) at {:.6}",
            receipt.amount_in,
            self.tokens().name(from).unwrap_or("?"),
            receipt.amount_out,
            self.tokens().name(to).unwrap_or("?"),
            receipt.fills.len(),
            receipt.execution_price()
        );
        Ok(receipt)
    }

    pub fn trade_by_name(&mut self, from: &str, to: &str, amount_in: f64) -> Result<TradeReceipt> {
        let from = self.tokens().index_of(from)?;
        let to = self.tokens().index_of(to)?;
        self.trade(from, to, amount_in)
    }

    /// Price of `to` per unit of `from`, weighted across ticks by their
    /// `from` reserve. `None` when no tick quotes a positive price.
    pub fn aggregated_price(&self, from: usize, to: usize) -> Result<Option<f64>> {
        self.tokens().check_index(from)?;
        self.tokens().check_index(to)?;
        if from == to {
            return Err(OrbitalError::invalid("cannot price a token against itself"));
        }

        let epsilon = self.params().epsilon;
        let (mut num, mut denom) = (0.0, 0.0);
        for tick in self.ticks().iter().filter(|t| t.can_route(from, to)) {
            let weight = tick.reserves()[from];
            if let Some(price) =
                invariant::spot_price(tick.reserves(), tick.plane_constant(), from, to, epsilon)
            {
                num += price * weight;
                denom += weight;
            }
        }
        Ok((denom > 0.0).then(|| num / denom))
    }

    /// Aggregated price for every ordered token pair that has one
    pub fn prices(&self) -> Vec<PriceQuote> {
        let n = self.token_count();
        let mut quotes = Vec::new();
        for from in 0..n {
            for to in (0..n).filter(|&to| to != from) {
                if let Ok(Some(price)) = self.aggregated_price(from, to) {
                    quotes.push(PriceQuote {
                        from: self.tokens().names()[from].clone(),
                        to: self.tokens().names()[to].clone(),
                        price,
                    });
                }
            }
        }
        quotes
    }
}
