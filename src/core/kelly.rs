//! Kelly Criterion Bet Sizing
//!
//! Turns the capped Kelly fraction of a pick into a stake for a bankroll.
//!
//! ```text
//! stake = bankroll * min(f*, cap) * multiplier
//! ```
//!
//! The stake is then limited by `max_stake_pct`, floored to a whole unit and
//! checked against `min_stake`. Across a slate, the total is scaled down to
//! `max_total_exposure`.

use serde::{Deserialize, Serialize};

use super::edge::{calculate_ev, kelly_criterion, DEFAULT_KELLY_CAP};
use crate::error::EdgeError;

/// Bet sizing recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetSizing {
    pub probability: f64,
    pub odds: i32,
    pub expected_value: f64,
    pub kelly_fraction: f64,       // Capped Kelly
    pub recommended_fraction: f64, // After applying Kelly multiplier
    pub stake: f64,
}

/// Kelly criterion calculator for bet sizing
#[derive(Debug, Clone)]
pub struct KellyCalculator {
    pub bankroll: f64,
    pub kelly_cap: f64,
    pub kelly_multiplier: f64,
    pub min_stake: f64,
    pub max_stake_pct: f64,
    pub max_total_exposure: f64,
}

impl KellyCalculator {
    /// Create a new Kelly calculator
    ///
    /// # Arguments
    /// * `bankroll` - Current bankroll
    /// * `kelly_cap` - Upper bound on the Kelly fraction
    /// * `kelly_multiplier` - Fraction of Kelly to use (0.5 = half Kelly)
    /// * `min_stake` - Minimum bet size
    /// * `max_stake_pct` - Maximum single bet as fraction of bankroll
    /// * `max_total_exposure` - Maximum total exposure across all bets
    pub fn new(
        bankroll: f64,
        kelly_cap: f64,
        kelly_multiplier: f64,
        min_stake: f64,
        max_stake_pct: f64,
        max_total_exposure: f64,
    ) -> Self {
        Self {
            bankroll,
            kelly_cap,
            kelly_multiplier,
            min_stake,
            max_stake_pct,
            max_total_exposure,
        }
    }

    /// Full capped Kelly with no extra limits
    pub fn with_defaults(bankroll: f64) -> Self {
        Self {
            bankroll,
            kelly_cap: DEFAULT_KELLY_CAP,
            kelly_multiplier: 1.0,
            min_stake: 0.0,
            max_stake_pct: DEFAULT_KELLY_CAP,
            max_total_exposure: 1.0,
        }
    }

    /// Calculate bet sizing for a single bet
    pub fn calculate_single(&self, probability: f64, odds: i32) -> Result<BetSizing, EdgeError> {
        let expected_value = calculate_ev(probability, odds)?;
        let kelly_fraction = kelly_criterion(probability, odds, self.kelly_cap)?;
        let recommended_fraction = kelly_fraction * self.kelly_multiplier;

        Ok(BetSizing {
            probability,
            odds,
            expected_value,
            kelly_fraction,
            recommended_fraction,
            stake: self.stake_for_fraction(recommended_fraction),
        })
    }

    fn stake_for_fraction(&self, fraction: f64) -> f64 {
        if fraction <= 0.0 || self.bankroll <= 0.0 {
            return 0.0;
        }

        let raw_stake = self.bankroll * fraction;
        let max_stake = self.bankroll * self.max_stake_pct;
        let stake = raw_stake.min(max_stake).floor();

        if stake < self.min_stake {
            if raw_stake < self.min_stake / 2.0 {
                return 0.0;
            }
            return self.min_stake;
        }

        stake
    }

    /// Calculate bet sizing for multiple simultaneous bets
    ///
    /// Stakes are scaled down proportionally when their total would exceed
    /// `max_total_exposure` of the bankroll.
    pub fn calculate_multiple(&self, bets: &[(f64, i32)]) -> Result<Vec<BetSizing>, EdgeError> {
        if bets.is_empty() {
            return Ok(Vec::new());
        }

        let mut sizings: Vec<BetSizing> = bets
            .iter()
            .map(|&(p, o)| self.calculate_single(p, o))
            .collect::<Result<_, _>>()?;

        let total_stake: f64 = sizings.iter().map(|s| s.stake).sum();
        let max_exposure = self.bankroll * self.max_total_exposure;

        if total_stake > max_exposure {
            let scale_factor = max_exposure / total_stake;

            for sizing in &mut sizings {
                let new_stake = (sizing.stake * scale_factor).floor();
                sizing.stake = if new_stake < self.min_stake {
                    0.0
                } else {
                    new_stake
                };
                sizing.recommended_fraction *= scale_factor;
            }
        }

        Ok(sizings)
    }

    /// Update bankroll after bet result
    pub fn update_bankroll(&mut self, profit: f64) {
        self.bankroll += profit;
    }
}

impl Default for KellyCalculator {
    fn default() -> Self {
        Self::with_defaults(1_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculator_single() {
        let calc = KellyCalculator::with_defaults(1_000.0);
        // f* = 1/6 at 50% on +150
        let sizing = calc.calculate_single(0.50, 150).unwrap();

        assert!((sizing.expected_value - 0.25).abs() < 1e-9);
        assert!((sizing.kelly_fraction - 1.0 / 6.0).abs() < 1e-9);
        assert_eq!(sizing.stake, 166.0);
    }

    #[test]
    fn test_calculator_single_capped() {
        let calc = KellyCalculator::with_defaults(1_000.0);
        let sizing = calc.calculate_single(0.90, 200).unwrap();

        assert_eq!(sizing.kelly_fraction, 0.25);
        assert_eq!(sizing.stake, 250.0);
    }

    #[test]
    fn test_calculate_single_negative_ev() {
        let calc = KellyCalculator::with_defaults(1_000.0);
        let sizing = calc.calculate_single(0.30, 150).unwrap();

        assert!(sizing.expected_value < 0.0);
        assert_eq!(sizing.kelly_fraction, 0.0);
        assert_eq!(sizing.stake, 0.0);
    }

    #[test]
    fn test_fractional_kelly_and_max_stake() {
        let calc = KellyCalculator::new(10_000.0, 0.25, 0.5, 10.0, 0.05, 1.0);
        // Capped 0.25, half Kelly 0.125, limited to 5%
        let sizing = calc.calculate_single(0.90, 200).unwrap();

        assert!((sizing.recommended_fraction - 0.125).abs() < 1e-9);
        assert_eq!(sizing.stake, 500.0);
    }

    #[test]
    fn test_min_stake_rules() {
        let calc = KellyCalculator::new(100.0, 0.25, 1.0, 10.0, 1.0, 1.0);

        // f* = 0.06 at 53%/+100 -> raw 6.0, above half the minimum
        let sizing = calc.calculate_single(0.53, 100).unwrap();
        assert_eq!(sizing.stake, 10.0);

        // f* = 0.02 -> raw 2.0, below half the minimum
        let sizing = calc.calculate_single(0.51, 100).unwrap();
        assert_eq!(sizing.stake, 0.0);
    }

    #[test]
    fn test_calculator_multiple_exposure_limit() {
        let calc = KellyCalculator::new(1_000.0, 0.25, 1.0, 0.0, 0.25, 0.30);
        let bets = vec![(0.90, 200), (0.80, 150), (0.70, 120)];

        let sizings = calc.calculate_multiple(&bets).unwrap();
        let total: f64 = sizings.iter().map(|s| s.stake).sum();

        assert_eq!(sizings.len(), 3);
        assert!(total <= 300.0);
    }

    #[test]
    fn test_calculate_multiple_empty() {
        let calc = KellyCalculator::default();
        assert!(calc.calculate_multiple(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_calculate_multiple_propagates_errors() {
        let calc = KellyCalculator::default();
        assert!(calc.calculate_multiple(&[(0.5, 150), (0.5, 0)]).is_err());
    }

    #[test]
    fn test_update_bankroll() {
        let mut calc = KellyCalculator::with_defaults(1_000.0);

        calc.update_bankroll(150.0);
        assert_eq!(calc.bankroll, 1_150.0);

        calc.update_bankroll(-300.0);
        assert_eq!(calc.bankroll, 850.0);
    }
}
