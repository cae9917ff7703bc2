//! Expected value and Kelly criterion for American-odds bets
//!
//! With `b` the profit per unit staked and `p` the model probability:
//!
//! ```text
//! EV = p*b - (1 - p)
//! f* = (b*p - (1 - p)) / b = EV / b
//! ```
//!
//! EV and f* always share a sign, so a bet with no edge never gets a stake.

use super::odds::{odds_to_probability, payout_multiplier};
use crate::error::{validate_probability, EdgeError};
use crate::models::Pick;

/// Default upper bound on the Kelly fraction (quarter of bankroll)
pub const DEFAULT_KELLY_CAP: f64 = 0.25;

/// Expected profit per unit staked
///
/// # Examples
/// ```
/// use nba_edge::core::edge::calculate_ev;
/// let ev = calculate_ev(0.60, 150).unwrap();
/// assert!((ev - 0.5).abs() < 1e-9);
/// ```
pub fn calculate_ev(model_probability: f64, market_odds: i32) -> Result<f64, EdgeError> {
    validate_probability(model_probability, "model_probability")?;
    let payout = payout_multiplier(market_odds)?;

    Ok(model_probability * payout - (1.0 - model_probability))
}

/// Kelly stake fraction, floored at 0 and capped at `cap`
///
/// `cap` is a bankroll fraction and must lie in [0, 1].
pub fn kelly_criterion(
    model_probability: f64,
    market_odds: i32,
    cap: f64,
) -> Result<f64, EdgeError> {
    validate_probability(model_probability, "model_probability")?;
    validate_probability(cap, "kelly_cap")?;
    let b = payout_multiplier(market_odds)?;

    let kelly = (b * model_probability - (1.0 - model_probability)) / b;
    if kelly <= 0.0 {
        return Ok(0.0);
    }

    Ok(kelly.min(cap))
}

/// Model probability minus market-implied probability
pub fn implied_edge(model_probability: f64, market_odds: i32) -> Result<f64, EdgeError> {
    validate_probability(model_probability, "model_probability")?;
    Ok(model_probability - odds_to_probability(market_odds)?)
}

/// Attaches EV and capped Kelly fractions to picks
#[derive(Debug, Clone, Copy)]
pub struct EdgeCalculator {
    pub kelly_cap: f64,
}

impl EdgeCalculator {
    pub fn new(kelly_cap: f64) -> Result<Self, EdgeError> {
        validate_probability(kelly_cap, "kelly_cap")?;
        Ok(Self { kelly_cap })
    }

    /// Return a scored copy of `pick`
    pub fn score(&self, pick: &Pick) -> Result<Pick, EdgeError> {
        let expected_value = calculate_ev(pick.model_probability, pick.market_odds)?;
        let kelly_fraction =
            kelly_criterion(pick.model_probability, pick.market_odds, self.kelly_cap)?;

        Ok(Pick {
            expected_value,
            kelly_fraction,
            ..pick.clone()
        })
    }

    /// Score every pick, stopping at the first invalid one
    ///
    /// The error names the failing pick's 1-based position and game.
    pub fn score_all(&self, picks: &[Pick]) -> Result<Vec<Pick>, EdgeError> {
        picks
            .iter()
            .enumerate()
            .map(|(i, pick)| {
                self.score(pick).map_err(|e| EdgeError::InvalidPick {
                    row: i + 1,
                    game_id: pick.game_id.clone(),
                    source: Box::new(e),
                })
            })
            .collect()
    }
}

impl Default for EdgeCalculator {
    fn default() -> Self {
        Self {
            kelly_cap: DEFAULT_KELLY_CAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarketType;

    #[test]
    fn test_ev_positive_edge() {
        // 60% at +150, break-even is 40%
        assert!(calculate_ev(0.60, 150).unwrap() > 0.0);
    }

    #[test]
    fn test_ev_negative_edge() {
        assert!(calculate_ev(0.30, 150).unwrap() < 0.0);
    }

    #[test]
    fn test_ev_fair_odds() {
        let ev = calculate_ev(0.40, 150).unwrap();
        assert!(ev.abs() < 0.05);
        assert!(ev.abs() < 1e-9);
    }

    #[test]
    fn test_ev_favorite() {
        // -200 pays 0.5 per unit; 70% -> 0.35 - 0.30
        let ev = calculate_ev(0.70, -200).unwrap();
        assert!((ev - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_ev_invalid_inputs() {
        assert_eq!(
            calculate_ev(0.5, 0),
            Err(EdgeError::InvalidOdds { odds: 0 })
        );
        assert!(calculate_ev(1.2, 150).is_err());
        assert!(calculate_ev(-0.1, 150).is_err());
    }

    #[test]
    fn test_ev_sign_matches_implied_probability() {
        let odds_grid = [-1000, -300, -150, -110, -100, 100, 110, 150, 300, 1000];
        for &odds in &odds_grid {
            let implied = odds_to_probability(odds).unwrap();
            for i in 0..=100 {
                let p = i as f64 / 100.0;
                if (p - implied).abs() < 1e-9 {
                    continue;
                }
                let ev = calculate_ev(p, odds).unwrap();
                assert_eq!(ev > 0.0, p > implied, "p={} odds={} ev={}", p, odds, ev);
            }
        }
    }

    #[test]
    fn test_kelly_capped() {
        // Raw Kelly is 0.85
        assert_eq!(kelly_criterion(0.90, 200, DEFAULT_KELLY_CAP).unwrap(), 0.25);
    }

    #[test]
    fn test_kelly_no_edge() {
        assert_eq!(kelly_criterion(0.30, 150, DEFAULT_KELLY_CAP).unwrap(), 0.0);
        assert_eq!(kelly_criterion(0.40, 150, DEFAULT_KELLY_CAP).unwrap(), 0.0);
    }

    #[test]
    fn test_kelly_uncapped_value() {
        // b = 1.5, f* = (0.75 - 0.5) / 1.5
        let kelly = kelly_criterion(0.50, 150, DEFAULT_KELLY_CAP).unwrap();
        assert!((kelly - 1.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_kelly_bounds_and_zero_on_negative_ev() {
        let odds_grid = [-500, -150, -110, 100, 120, 250, 800];
        for cap in [0.0, 0.05, 0.25, 1.0] {
            for &odds in &odds_grid {
                for i in 0..=20 {
                    let p = i as f64 / 20.0;
                    let kelly = kelly_criterion(p, odds, cap).unwrap();
                    assert!((0.0..=cap).contains(&kelly));
                    if calculate_ev(p, odds).unwrap() <= 0.0 {
                        assert_eq!(kelly, 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_kelly_invalid_cap() {
        assert!(kelly_criterion(0.6, 150, 1.5).is_err());
        assert!(kelly_criterion(0.6, 150, -0.1).is_err());
        assert!(EdgeCalculator::new(2.0).is_err());
    }

    #[test]
    fn test_implied_edge() {
        let edge = implied_edge(0.55, -110).unwrap();
        assert!((edge - (0.55 - 110.0 / 210.0)).abs() < 1e-9);
    }

    #[test]
    fn test_calculator_score() {
        let calc = EdgeCalculator::default();
        let pick = Pick::new("G1", MarketType::Moneyline, "TeamA", None, 0.60, 150);

        let scored = calc.score(&pick).unwrap();

        assert!((scored.expected_value - 0.5).abs() < 1e-9);
        assert_eq!(scored.kelly_fraction, 0.25);
        assert_eq!(scored.game_id, pick.game_id);
        assert_eq!(pick.expected_value, 0.0);
    }

    #[test]
    fn test_calculator_score_all_fails_fast() {
        let calc = EdgeCalculator::default();
        let picks = vec![
            Pick::new("G1", MarketType::Moneyline, "TeamA", None, 0.60, 150),
            Pick::new("G2", MarketType::Moneyline, "TeamB", None, 0.60, 0),
        ];

        assert_eq!(
            calc.score_all(&picks),
            Err(EdgeError::InvalidPick {
                row: 2,
                game_id: "G2".to_string(),
                source: Box::new(EdgeError::InvalidOdds { odds: 0 }),
            })
        );
    }
}
