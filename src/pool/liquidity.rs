//! Liquidity Manager
//!
//! Validated liquidity and administrative mutations on existing ticks.
//! Validation always runs before the tick is touched.
//!
//! Created: 2026-10-18

use super::state::PoolState;
use super::tick::GENESIS_LP_ID;
use crate::error::{OrbitalError, Result};
use crate::types::Reserves;
use tracing::info;

impl PoolState {
    /// Add `amounts` element-wise to a tick's reserves. Unbalanced deposits
    /// are allowed; the plane constant is unchanged. `lp_id` is credited
    /// shares worth Σ amounts at the tick's current liquidity.
    pub fn add_liquidity(&mut self, tick_index: usize, lp_id: &str, amounts: Vec<f64>) -> Result<()> {
        self.tick(tick_index)?;
        let amounts = Reserves::validate(amounts, self.tokens())?;
        check_lp_id(lp_id)?;

        let tick = self.tick_mut(tick_index)?;
        let shares = tick.shares_for(amounts.iter().sum());
        tick.deposit(&amounts);
        tick.credit_shares(lp_id, shares);
        info!(
            "Added liquidity to tick {} for LP {}: {:?} (status {})",
            tick_index,
            lp_id,
            &amounts[..],
            tick.status()
        );
        Ok(())
    }

    /// Administrative override of a tick's full reserve vector. Any added
    /// depth is owned by the genesis share holder, not by existing LPs.
    pub fn set_reserves(&mut self, tick_index: usize, reserves: Vec<f64>) -> Result<()> {
        self.tick(tick_index)?;
        let reserves = Reserves::validate(reserves, self.tokens())?;

        let tick = self.tick_mut(tick_index)?;
        let added = reserves.iter().sum::<f64>() - tick.liquidity();
        let minted = if added > 0.0 { tick.shares_for(added) } else { 0.0 };
        tick.replace_reserves(reserves);
        if minted > 0.0 {
            tick.credit_shares(GENESIS_LP_ID, minted);
        }
        info!("Set reserves for tick {}: status {}", tick_index, tick.status());
        Ok(())
    }

    /// Withdraw `percentage` (0..=1) of an LP's position in a tick.
    /// Returns the withdrawn amount of every token.
    pub fn remove_liquidity(&mut self, tick_index: usize, lp_id: &str, percentage: f64) -> Result<Vec<f64>> {
        let tick = self.tick(tick_index)?;
        check_lp_id(lp_id)?;
        if !(0.0..=1.0).contains(&percentage) {
            return Err(OrbitalError::invalid(format!(
                "percentage must be in [0, 1], got {}",
                percentage
            )));
        }
        let held = *tick.lp_shares().get(lp_id).ok_or_else(|| {
            OrbitalError::LiquidityProviderNotFound {
                tick_index,
                lp_id: lp_id.to_string(),
            }
        })?;
        if held <= 0.0 {
            return Err(OrbitalError::invalid(format!("LP '{}' has no shares", lp_id)));
        }

        let removed = held * percentage;
        let ratio = removed / tick.total_shares();
        let full_exit = percentage >= 1.0 - self.params().epsilon;

        let tick = self.tick_mut(tick_index)?;
        let withdrawn = tick.withdraw_ratio(ratio);
        tick.debit_shares(lp_id, removed, full_exit);
        info!(
            "Removed {:.2}% of LP {} from tick {}: {:?}",
            percentage * 100.0,
            lp_id,
            tick_index,
            withdrawn
        );
        Ok(withdrawn)
    }
}

fn check_lp_id(lp_id: &str) -> Result<()> {
    if lp_id.trim().is_empty() {
        return Err(OrbitalError::invalid("lp_id must not be empty"));
    }
    if lp_id == GENESIS_LP_ID {
        return Err(OrbitalError::invalid(format!("lp_id '{}' is reserved", GENESIS_LP_ID)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EngineParams;

    fn pool() -> PoolState {
        PoolState::with_initial_tick(
            vec!["USDC".into(), "USDT".into(), "DAI".into()],
            vec![100.0, 100.0, 100.0],
            60.0,
            EngineParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_add_liquidity_unbalanced() {
        let mut pool = pool();
        pool.add_liquidity(0, "alice", vec![10.0, 0.0, 5.0]).unwrap();

        let tick = pool.tick(0).unwrap();
        assert_eq!(tick.reserves(), &[110.0, 100.0, 105.0]);
        assert_eq!(tick.plane_constant(), 60.0);
        assert_eq!(tick.liquidity(), 315.0);
        assert_eq!(tick.lp_shares()["alice"], 15.0);
        assert_eq!(pool.global_reserves(), vec![110.0, 100.0, 105.0]);
    }

    #[test]
    fn test_add_liquidity_errors_leave_pool() {
        let mut pool = pool();
        let before = pool.clone();

        assert_eq!(
            pool.add_liquidity(3, "alice", vec![1.0; 3]).unwrap_err(),
            OrbitalError::TickNotFound { index: 3, tick_count: 1 }
        );
        assert_eq!(
            pool.add_liquidity(0, "alice", vec![1.0; 2]).unwrap_err(),
            OrbitalError::DimensionMismatch { expected: 3, actual: 2 }
        );
        assert!(pool.add_liquidity(0, "alice", vec![1.0, -1.0, 1.0]).is_err());
        assert!(pool.add_liquidity(0, "", vec![1.0; 3]).is_err());
        assert_eq!(pool, before);
    }

    #[test]
    fn test_set_reserves_rederives_status() {
        let mut pool = pool();
        pool.set_reserves(0, vec![50.0, 0.0, 20.0]).unwrap();
        let tick = pool.tick(0).unwrap();
        assert!(tick.is_boundary());
        assert_eq!(tick.liquidity(), 70.0);

        pool.set_reserves(0, vec![50.0, 1.0, 20.0]).unwrap();
        assert!(pool.tick(0).unwrap().is_interior());

        assert!(matches!(
            pool.set_reserves(0, vec![1.0]),
            Err(OrbitalError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            pool.set_reserves(9, vec![1.0; 3]),
            Err(OrbitalError::TickNotFound { .. })
        ));
    }

    #[test]
    fn test_liquidity_reintroduces_saturated_token() {
        let mut pool = pool();
        pool.set_reserves(0, vec![50.0, 0.0, 20.0]).unwrap();
        assert_eq!(pool.routing_order(0, 1), Vec::<usize>::new());

        pool.add_liquidity(0, "bob", vec![0.0, 10.0, 0.0]).unwrap();
        assert!(pool.tick(0).unwrap().is_interior());
        assert_eq!(pool.routing_order(0, 1), vec![0]);
    }

    #[test]
    fn test_remove_liquidity() {
        let mut pool = pool();
        pool.add_liquidity(0, "alice", vec![30.0, 30.0, 30.0]).unwrap();
        pool.add_liquidity(0, "bob", vec![10.0, 10.0, 10.0]).unwrap();

        // Genesis 300, alice 90, bob 30: half of alice is 45/420 of the tick
        let withdrawn = pool.remove_liquidity(0, "alice", 0.5).unwrap();
        for w in &withdrawn {
            assert!((w - 15.0).abs() < 1e-9);
        }
        assert!((pool.tick(0).unwrap().lp_shares()["alice"] - 45.0).abs() < 1e-9);

        pool.remove_liquidity(0, "bob", 1.0).unwrap();
        assert!(!pool.tick(0).unwrap().lp_shares().contains_key("bob"));
    }

    #[test]
    fn test_full_withdrawal_returns_the_deposit() {
        let mut pool = PoolState::with_initial_tick(
            vec!["A".into(), "B".into()],
            vec![1000.0, 1000.0],
            600.0,
            EngineParams::default(),
        )
        .unwrap();
        pool.add_liquidity(0, "mallory", vec![1.0, 1.0]).unwrap();

        let withdrawn = pool.remove_liquidity(0, "mallory", 1.0).unwrap();
        for w in &withdrawn {
            assert!((w - 1.0).abs() < 1e-9);
        }
        let tick = pool.tick(0).unwrap();
        assert!((tick.reserves()[0] - 1000.0).abs() < 1e-9);
        assert!(!tick.lp_shares().contains_key("mallory"));
    }

    #[test]
    fn test_genesis_shares_are_reserved() {
        let mut pool = pool();
        let before = pool.clone();

        assert!(matches!(
            pool.remove_liquidity(0, GENESIS_LP_ID, 1.0),
            Err(OrbitalError::InvalidArgument(_))
        ));
        assert!(matches!(
            pool.add_liquidity(0, GENESIS_LP_ID, vec![1.0; 3]),
            Err(OrbitalError::InvalidArgument(_))
        ));
        assert_eq!(pool, before);
    }

    #[test]
    fn test_set_reserves_credits_new_depth_to_genesis() {
        let mut pool = pool();
        pool.add_liquidity(0, "alice", vec![10.0; 3]).unwrap();
        pool.set_reserves(0, vec![1000.0; 3]).unwrap();

        // alice still owns 30 of 3000 shares
        let withdrawn = pool.remove_liquidity(0, "alice", 1.0).unwrap();
        for w in &withdrawn {
            assert!((w - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_remove_liquidity_errors() {
        let mut pool = pool();
        pool.add_liquidity(0, "alice", vec![1.0; 3]).unwrap();
        let before = pool.clone();

        assert!(matches!(
            pool.remove_liquidity(0, "carol", 0.5),
            Err(OrbitalError::LiquidityProviderNotFound { .. })
        ));
        assert!(matches!(
            pool.remove_liquidity(0, "alice", 1.5),
            Err(OrbitalError::InvalidArgument(_))
        ));
        assert!(matches!(
            pool.remove_liquidity(2, "alice", 0.5),
            Err(OrbitalError::TickNotFound { .. })
        ));
        assert_eq!(pool, before);
    }
}
