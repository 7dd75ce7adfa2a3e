//! Sphere Invariant Math
//!
//! Stateless functions over a tick's reserve vector `x` and plane constant `r`.
//! A tick keeps its reserves on the sphere
//!
//! ```text
//! Σᵢ (xᵢ − r)² = r²·(n − 1)
//! ```
//!
//! centred at (r, …, r). A swap moves only the `from` and `to` coordinates, so
//! it travels along the circle left in that plane once the other coordinates
//! are fixed. Ticks trade on the arc below the centre, where the curve is
//! convex and every extra unit sold buys less. The output reserve can be
//! drained to zero there, which saturates the tick into a boundary tick. A
//! tick pulled inside its sphere by a deposit trades along the smaller circle
//! through its current reserves, so the deposit alone never moves its price.
//!
//! Above the centre the arc is concave. An on-sphere tick never fills there;
//! a tick strictly inside its sphere is projected back onto it, and never
//! pays out more than it takes in.
//!
//! Created: 2026-10-18

use crate::types::TickStatus;

/// Tolerance scaled to the magnitude being compared
pub fn tolerance(scale: f64, epsilon: f64) -> f64 {
    epsilon * scale.abs().max(1.0)
}

/// Sphere radius r·√(n−1)
pub fn radius(plane_constant: f64, n_tokens: usize) -> f64 {
    plane_constant * (n_tokens.saturating_sub(1) as f64).sqrt()
}

/// Σ(xᵢ − r)² − r²(n−1); zero on the sphere
pub fn invariant_residual(reserves: &[f64], plane_constant: f64) -> f64 {
    let n = reserves.len();
    let lhs: f64 = reserves.iter().map(|x| (x - plane_constant).powi(2)).sum();
    lhs - radius(plane_constant, n).powi(2)
}

/// Whether the reserves satisfy the invariant within `rel_tol` of r²(n−1)
pub fn satisfies_invariant(reserves: &[f64], plane_constant: f64, rel_tol: f64) -> bool {
    let scale = radius(plane_constant, reserves.len()).powi(2).max(1.0);
    invariant_residual(reserves, plane_constant).abs() <= rel_tol * scale
}

/// The equal-price point on the tradeable arc: every reserve equal, all
/// prices 1:1.
pub fn balanced_reserves(plane_constant: f64, n_tokens: usize) -> Vec<f64> {
    if n_tokens == 0 {
        return Vec::new();
    }
    let n = n_tokens as f64;
    let offset = plane_constant * ((n - 1.0) / n).sqrt();
    vec![plane_constant - offset; n_tokens]
}

/// Interior when every reserve is positive, otherwise boundary over the
/// indices that still hold reserve.
pub fn classify(reserves: &[f64], epsilon: f64) -> TickStatus {
    let scale = reserves.iter().copied().fold(0.0_f64, f64::max);
    let tol = tolerance(scale, epsilon);
    if reserves.iter().all(|&x| x > tol) {
        TickStatus::Interior
    } else {
        TickStatus::Boundary {
            active: reserves
                .iter()
                .enumerate()
                .filter(|(_, &x)| x > tol)
                .map(|(i, _)| i)
                .collect(),
        }
    }
}

/// Marginal output of `to` per unit of `from` at the current point.
///
/// Undefined (None) where the curve has no positive price: the two
/// deviations from the centre disagree in sign or the output deviation
/// vanishes.
pub fn spot_price(reserves: &[f64], plane_constant: f64, from: usize, to: usize, epsilon: f64) -> Option<f64> {
    let d_from = reserves[from] - plane_constant;
    let d_to = reserves[to] - plane_constant;
    if d_to.abs() <= tolerance(plane_constant, epsilon) {
        return None;
    }
    let price = d_from / d_to;
    (price > 0.0 && price.is_finite()).then_some(price)
}

/// How a single tick absorbed the input offered to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// The whole offered amount was consumed
    Full,
    /// The tick ran out of capacity before the offered amount; the rest
    /// must be routed elsewhere
    ExceedsCapacity,
    /// The output reserve was driven to zero; the tick becomes boundary
    Saturated,
    /// The tick cannot produce output in this direction at its current point
    NoFill,
}

/// Outcome of solving the invariant for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapStep {
    pub kind: StepKind,
    pub amount_out: f64,
    pub consumed_in: f64,
}

impl SwapStep {
    fn no_fill() -> Self {
        Self { kind: StepKind::NoFill, amount_out: 0.0, consumed_in: 0.0 }
    }

    pub fn becomes_boundary(&self) -> bool {
        self.kind == StepKind::Saturated
    }

    pub fn is_fill(&self) -> bool {
        self.kind != StepKind::NoFill
    }
}

/// Largest offset `u = a − r` an off-sphere projection may reach before it
/// would pay out more than it takes in; the circle's edge if it never does.
///
/// `p` and `q` are the starting offsets of the input and output reserves.
/// Output matches input where `q − √(c² − u²) = u − p`.
fn break_even_offset(p: f64, q: f64, capacity_sq: f64, tol: f64) -> f64 {
    let edge = capacity_sq.sqrt();
    let s = p + q;
    let disc = 2.0 * capacity_sq - s * s;
    if disc < 0.0 {
        return edge;
    }
    let root = disc.sqrt();
    [(s - root) / 2.0, (s + root) / 2.0]
        .into_iter()
        .find(|&u| u > p + tol && s - u >= -tol && u <= edge)
        .unwrap_or(edge)
}

/// Solve the invariant for a swap of `amount_in` of token `from` into token
/// `to` against one tick.
///
/// Returns how much of the input the tick consumes and the output it pays.
/// Callers validate indices and the sign of `amount_in`.
pub fn solve_output(
    reserves: &[f64],
    plane_constant: f64,
    from: usize,
    to: usize,
    amount_in: f64,
    epsilon: f64,
) -> SwapStep {
    let r = plane_constant;
    let n = reserves.len();
    let x_from = reserves[from];
    let x_to = reserves[to];

    let tol = tolerance(r, epsilon);
    let a = x_from + amount_in;

    let step = if x_to > r + tol {
        // Concave side: only a tick strictly inside its sphere fills
        if invariant_residual(reserves, r) >= -tolerance(radius(r, n).powi(2), epsilon) {
            return SwapStep::no_fill();
        }
        let others_sq: f64 = reserves
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != from && *i != to)
            .map(|(_, x)| (x - r).powi(2))
            .sum();
        // Squared radius of the sphere's circle in the (from, to) plane
        let capacity_sq = r * r * (n - 1) as f64 - others_sq;
        if capacity_sq <= tolerance(r * r, epsilon) {
            return SwapStep::no_fill();
        }

        let cap = break_even_offset(x_from - r, x_to - r, capacity_sq, tol);
        if a - r > cap {
            SwapStep {
                kind: StepKind::ExceedsCapacity,
                amount_out: x_to - r - (capacity_sq - cap * cap).max(0.0).sqrt(),
                consumed_in: r + cap - x_from,
            }
        } else {
            let b = r + (capacity_sq - (a - r).powi(2)).max(0.0).sqrt();
            SwapStep { kind: StepKind::Full, amount_out: x_to - b, consumed_in: amount_in }
        }
    } else {
        // Circle through the current point: the sphere's own circle for an
        // on-sphere tick, a concentric one after an off-sphere deposit
        let capacity_sq = (x_from - r).powi(2) + (x_to - r).powi(2);
        // Past a = r the output would shrink again
        let (a, capped) = if a > r { (r, true) } else { (a, false) };
        let rem = capacity_sq - (a - r).powi(2);
        if rem < 0.0 {
            return SwapStep::no_fill();
        }
        let b = r - rem.sqrt();
        if b <= tol {
            // Back-solve the input that lands the output reserve exactly on 0
            let a_star = r - (capacity_sq - r * r).max(0.0).sqrt();
            SwapStep {
                kind: StepKind::Saturated,
                amount_out: x_to,
                consumed_in: (a_star - x_from).min(amount_in),
            }
        } else if capped {
            SwapStep {
                kind: StepKind::ExceedsCapacity,
                amount_out: x_to - b,
                consumed_in: a - x_from,
            }
        } else {
            SwapStep { kind: StepKind::Full, amount_out: x_to - b, consumed_in: amount_in }
        }
    };

    if step.amount_out <= tol || step.consumed_in <= tol {
        return SwapStep::no_fill();
    }
    step
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {} got {} (tol {})",
            expected,
            actual,
            tol
        );
    }

    #[test]
    fn test_radius_and_residual() {
        assert_close(radius(600.0, 2), 600.0, 1e-12);
        assert_close(radius(100.0, 5), 200.0, 1e-12);

        let balanced = balanced_reserves(600.0, 3);
        assert_eq!(balanced.len(), 3);
        assert!(satisfies_invariant(&balanced, 600.0, 1e-9));
        assert!(!satisfies_invariant(&[1000.0, 1000.0], 600.0, 1e-6));
    }

    #[test]
    fn test_full_fill_lands_on_sphere() {
        // 1000/1000 sits inside the sphere; the swap projects it onto it
        let reserves = [1000.0, 1000.0];
        let step = solve_output(&reserves, 600.0, 0, 1, 100.0, EPS);

        assert_eq!(step.kind, StepKind::Full);
        assert_eq!(step.consumed_in, 100.0);
        assert_close(step.amount_out, 400.0 - 110_000f64.sqrt(), 1e-9);
        assert!(step.amount_out > 0.0 && step.amount_out < 100.0);

        let after = [1100.0, 1000.0 - step.amount_out];
        assert!(satisfies_invariant(&after, 600.0, 1e-9));
    }

    #[test]
    fn test_off_sphere_projection_pays_at_most_its_input() {
        // Past 100√2 of input the projection would pay more than it takes
        let reserves = [1000.0, 1000.0];
        let step = solve_output(&reserves, 600.0, 0, 1, 1000.0, EPS);

        assert_eq!(step.kind, StepKind::ExceedsCapacity);
        assert_close(step.consumed_in, 20_000f64.sqrt(), 1e-9);
        assert_close(step.amount_out, step.consumed_in, 1e-9);
        assert!(!step.becomes_boundary());

        let after = [1000.0 + step.consumed_in, 1000.0 - step.amount_out];
        assert!(satisfies_invariant(&after, 600.0, 1e-9));
    }

    #[test]
    fn test_off_sphere_fill_needs_input_to_reach_the_sphere() {
        // At 1010 the circle sits above the current output reserve, so no
        // output lands the tick back on its sphere
        let reserves = [1000.0, 1000.0];
        assert_eq!(solve_output(&reserves, 600.0, 0, 1, 10.0, EPS).kind, StepKind::NoFill);

        let reach = 600.0 + 200_000f64.sqrt() - 1000.0;
        let step = solve_output(&reserves, 600.0, 0, 1, reach + 1.0, EPS);
        assert_eq!(step.kind, StepKind::Full);
        assert!(step.amount_out > 0.0 && step.amount_out < step.consumed_in);
    }

    #[test]
    fn test_on_sphere_tick_does_not_fill_on_concave_side() {
        // Upper arc point reached by the projection above
        let reserves = [1100.0, 600.0 + 110_000f64.sqrt()];
        assert!(satisfies_invariant(&reserves, 600.0, 1e-9));
        assert_eq!(solve_output(&reserves, 600.0, 0, 1, 10.0, EPS).kind, StepKind::NoFill);
        assert_eq!(solve_output(&reserves, 600.0, 1, 0, 10.0, EPS).kind, StepKind::NoFill);

        // Three tokens, two of them above the centre
        let r = 100.0;
        let high = r + r * (2.0f64 / 3.0).sqrt() * 1.2;
        let other_sq = 2.0 * r * r - 2.0 * (high - r).powi(2);
        let reserves = [high, high, r - other_sq.sqrt()];
        assert!(satisfies_invariant(&reserves, r, 1e-9));
        assert_eq!(solve_output(&reserves, r, 0, 1, 1.0, EPS).kind, StepKind::NoFill);
    }

    #[test]
    fn test_inner_arc_full_fill_is_convex() {
        let r = 100.0;
        let reserves = balanced_reserves(r, 2);
        assert_close(reserves[0], r - r / 2f64.sqrt(), 1e-12);
        assert!(satisfies_invariant(&reserves, r, 1e-9));

        let step = solve_output(&reserves, r, 0, 1, 5.0, EPS);
        assert_eq!(step.kind, StepKind::Full);
        // Balanced price is 1:1, so a finite trade pays strictly less
        assert!(step.amount_out > 0.0 && step.amount_out < 5.0);
    }

    #[test]
    fn test_repeated_trades_pay_less_each_time() {
        let mut reserves = balanced_reserves(600.0, 3);
        let mut last = f64::INFINITY;
        for _ in 0..4 {
            let step = solve_output(&reserves, 600.0, 0, 1, 10.0, EPS);
            assert_eq!(step.kind, StepKind::Full);
            assert!(step.amount_out < last);
            assert!(step.amount_out < 10.0);
            last = step.amount_out;
            reserves[0] += step.consumed_in;
            reserves[1] -= step.amount_out;
        }
        assert!(satisfies_invariant(&reserves, 600.0, 1e-9));
    }

    #[test]
    fn test_deposit_does_not_reprice_inner_arc() {
        let r = 100.0;
        let mut reserves = balanced_reserves(r, 2);
        reserves[0] += 10.0;
        reserves[1] += 10.0;
        assert!(invariant_residual(&reserves, r) < 0.0);

        let step = solve_output(&reserves, r, 0, 1, 5.0, EPS);
        assert_eq!(step.kind, StepKind::Full);
        assert!(step.amount_out < 5.0);

        // Trading straight back returns at most what went in
        reserves[0] += step.consumed_in;
        reserves[1] -= step.amount_out;
        let back = solve_output(&reserves, r, 1, 0, step.amount_out, EPS);
        assert_eq!(back.kind, StepKind::Full);
        assert!(back.amount_out <= 5.0 + 1e-9);
        assert_close(back.amount_out, 5.0, 1e-6);
    }

    #[test]
    fn test_inner_arc_saturates_with_back_solved_input() {
        let r = 100.0;
        let x = r - r * (2.0f64 / 3.0).sqrt();
        let reserves = [x, x, x];

        let step = solve_output(&reserves, r, 0, 1, 30.0, EPS);
        assert_eq!(step.kind, StepKind::Saturated);
        assert!(step.becomes_boundary());
        assert_close(step.amount_out, x, 1e-9);

        let capacity_sq = r * r * 2.0 - (x - r).powi(2);
        let a_star = r - (capacity_sq - r * r).sqrt();
        assert_close(step.consumed_in, a_star - x, 1e-9);
        assert!(step.consumed_in < 30.0);

        let after = [x + step.consumed_in, 0.0, x];
        assert!(satisfies_invariant(&after, r, 1e-9));
    }

    #[test]
    fn test_two_token_inner_arc_saturates_at_centre() {
        let r = 100.0;
        let x = r - r / 2f64.sqrt();
        let step = solve_output(&[x, x], r, 0, 1, 80.0, EPS);

        assert_eq!(step.kind, StepKind::Saturated);
        assert_close(step.consumed_in, r - x, 1e-9);
        assert_close(step.amount_out, x, 1e-9);
    }

    #[test]
    fn test_no_fill_when_price_is_inverted() {
        // Input token above the centre, output token below it
        let step = solve_output(&[700.0, 500.0], 600.0, 0, 1, 10.0, EPS);
        assert_eq!(step.kind, StepKind::NoFill);
        assert_eq!(step.amount_out, 0.0);
        assert_eq!(step.consumed_in, 0.0);
    }

    #[test]
    fn test_no_fill_when_other_tokens_use_up_the_sphere() {
        // Third coordinate alone already spans the full radius
        let r = 10.0;
        let reserves = [15.0, 15.0, r + radius(r, 3)];
        let step = solve_output(&reserves, r, 0, 1, 1.0, EPS);
        assert_eq!(step.kind, StepKind::NoFill);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&[1.0, 2.0, 3.0], EPS), TickStatus::Interior);
        assert_eq!(
            classify(&[1.0, 0.0, 3.0], EPS),
            TickStatus::Boundary { active: vec![0, 2] }
        );
        assert_eq!(classify(&[1e-12, 5.0], EPS), TickStatus::Boundary { active: vec![1] });
    }

    #[test]
    fn test_spot_price() {
        let balanced = balanced_reserves(600.0, 3);
        assert_close(spot_price(&balanced, 600.0, 0, 1, EPS).unwrap(), 1.0, 1e-12);

        // Selling token 0 into the tick lowers what it buys next
        let mut moved = balanced.clone();
        moved[0] += 10.0;
        moved[1] -= 9.8;
        let price = spot_price(&moved, 600.0, 0, 1, EPS).unwrap();
        assert!(price < 1.0);

        assert!(spot_price(&[700.0, 500.0], 600.0, 0, 1, EPS).is_none());
        assert!(spot_price(&[700.0, 600.0], 600.0, 0, 1, EPS).is_none());
    }
}
