//! Payout Structure
//!
//! Handles payout percentage configuration and per-entry shares for a pool.
//! The configured tier percentages are totals that must sum to 100; every
//! entry eliminated in a tier splits that tier's total evenly.

use serde::{Deserialize, Serialize};

use super::error::{PoolError, PoolResult};
use super::graph::Round;

/// Tolerance when validating that the configured tiers sum to 100
pub const PAYOUT_SUM_EPSILON: f64 = 0.01;

/// Payout tier percentages for a pool, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutScheme {
    /// Total paid across the 8 entries eliminated in the Sweet Sixteen
    pub sweet16_pct: f64,
    /// Total paid across the 4 entries eliminated in the Elite Eight
    pub elite8_pct: f64,
    /// Total paid across the 2 entries eliminated in the Final Four
    pub final_four_pct: f64,
    /// Paid to the entry eliminated in the championship game
    pub runner_up_pct: f64,
    /// Paid to the never-eliminated champion
    pub champion_pct: f64,
}

impl PayoutScheme {
    /// Conventional distribution: the deeper the run, the bigger the share
    pub fn standard() -> Self {
        Self {
            sweet16_pct: 10.0,
            elite8_pct: 15.0,
            final_four_pct: 15.0,
            runner_up_pct: 20.0,
            champion_pct: 40.0,
        }
    }

    pub fn total(&self) -> f64 {
        self.sweet16_pct + self.elite8_pct + self.final_four_pct + self.runner_up_pct
            + self.champion_pct
    }

    /// Validates the configuration at pool-creation time. The engine itself
    /// never re-validates; a pool with a bad scheme cannot be created.
    pub fn validate(&self) -> PoolResult<()> {
        let tiers = [
            self.sweet16_pct,
            self.elite8_pct,
            self.final_four_pct,
            self.runner_up_pct,
            self.champion_pct,
        ];
        if tiers.iter().any(|pct| !pct.is_finite() || *pct < 0.0) {
            return Err(PoolError::InvalidPayouts { total: self.total() });
        }
        if (self.total() - 100.0).abs() > PAYOUT_SUM_EPSILON {
            return Err(PoolError::InvalidPayouts { total: self.total() });
        }
        Ok(())
    }

    /// Share earned by an entry eliminated in the given round.
    ///
    /// Payouts are not cumulative: an Elite Eight elimination earns only the
    /// Elite Eight share. First and second round eliminations earn nothing.
    pub fn elimination_share(&self, round: Round) -> f64 {
        match round {
            Round::First | Round::Second => 0.0,
            Round::Sweet16 => self.sweet16_pct / 8.0,
            Round::Elite8 => self.elite8_pct / 4.0,
            Round::FinalFour => self.final_four_pct / 2.0,
            Round::Championship => self.runner_up_pct,
        }
    }

    pub fn champion_share(&self) -> f64 {
        self.champion_pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scheme_validates() {
        assert!(PayoutScheme::standard().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_totals() {
        let mut scheme = PayoutScheme::standard();
        scheme.champion_pct = 50.0;
        assert!(matches!(
            scheme.validate().unwrap_err(),
            PoolError::InvalidPayouts { .. }
        ));

        scheme.champion_pct = -10.0;
        assert!(scheme.validate().is_err());
    }

    #[test]
    fn test_early_rounds_earn_nothing() {
        let scheme = PayoutScheme::standard();
        assert_eq!(scheme.elimination_share(Round::First), 0.0);
        assert_eq!(scheme.elimination_share(Round::Second), 0.0);
    }

    #[test]
    fn test_tier_totals_split_evenly() {
        let scheme = PayoutScheme::standard();
        assert_eq!(scheme.elimination_share(Round::Sweet16), 10.0 / 8.0);
        assert_eq!(scheme.elimination_share(Round::Elite8), 15.0 / 4.0);
        assert_eq!(scheme.elimination_share(Round::FinalFour), 7.5);
        assert_eq!(scheme.elimination_share(Round::Championship), 20.0);
        assert_eq!(scheme.champion_share(), 40.0);
    }

    #[test]
    fn test_full_field_pays_out_everything() {
        // 8 Sweet 16 + 4 Elite 8 + 2 Final Four eliminations, a runner-up,
        // and a champion must account for the entire configured total.
        let scheme = PayoutScheme::standard();
        let paid = 8.0 * scheme.elimination_share(Round::Sweet16)
            + 4.0 * scheme.elimination_share(Round::Elite8)
            + 2.0 * scheme.elimination_share(Round::FinalFour)
            + scheme.elimination_share(Round::Championship)
            + scheme.champion_share();
        assert!((paid - scheme.total()).abs() < 1e-9);
        assert!((paid - 100.0).abs() < 1e-9);
    }
}
