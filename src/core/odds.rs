//! American odds conversion
//!
//! Positive odds (+150) pay 150 profit on a 100 stake (underdog).
//! Negative odds (-150) require a 150 stake to profit 100 (favorite).

use crate::error::{validate_odds, validate_open_probability, EdgeError};

/// Convert American odds to the implied win probability
///
/// Odds with a magnitude below 100 are rejected; the result lies strictly
/// in (0, 1) otherwise.
///
/// # Examples
/// ```
/// use nba_edge::core::odds::odds_to_probability;
/// let p = odds_to_probability(150).unwrap();
/// assert!((p - 0.4).abs() < 1e-9);
/// ```
pub fn odds_to_probability(odds: i32) -> Result<f64, EdgeError> {
    validate_odds(odds)?;

    let odds = odds as f64;
    if odds > 0.0 {
        Ok(100.0 / (odds + 100.0))
    } else {
        Ok(-odds / (-odds + 100.0))
    }
}

/// Convert a win probability to American odds, rounded to the nearest integer
///
/// Probabilities at or above 0.5 map to negative (favorite) odds.
pub fn probability_to_odds(probability: f64) -> Result<i32, EdgeError> {
    validate_open_probability(probability, "probability_to_odds")?;

    let odds = if probability >= 0.5 {
        -probability / (1.0 - probability) * 100.0
    } else {
        (1.0 - probability) / probability * 100.0
    };

    Ok(odds.round() as i32)
}

/// Profit per unit staked if the bet wins
pub fn payout_multiplier(odds: i32) -> Result<f64, EdgeError> {
    validate_odds(odds)?;

    if odds > 0 {
        Ok(odds as f64 / 100.0)
    } else {
        Ok(100.0 / (odds as f64).abs())
    }
}

/// Decimal (European) odds: total return per unit staked
pub fn american_to_decimal(odds: i32) -> Result<f64, EdgeError> {
    Ok(1.0 + payout_multiplier(odds)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odds_to_probability_known_values() {
        assert!((odds_to_probability(150).unwrap() - 0.4).abs() < 1e-4);
        assert!((odds_to_probability(-150).unwrap() - 0.6).abs() < 1e-4);
        assert!((odds_to_probability(100).unwrap() - 0.5).abs() < 1e-9);
        assert!((odds_to_probability(-100).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_odds_to_probability_zero() {
        assert_eq!(
            odds_to_probability(0),
            Err(EdgeError::InvalidOdds { odds: 0 })
        );
    }

    #[test]
    fn test_probability_bounds() {
        for odds in [-100_000, -1000, -110, -100, 100, 110, 1000, 100_000] {
            let p = odds_to_probability(odds).unwrap();
            assert!(p > 0.0 && p < 1.0, "odds {} gave {}", odds, p);
        }
    }

    #[test]
    fn test_sub_hundred_odds_rejected() {
        // +50 would otherwise convert to 0.667 and back to -200
        assert_eq!(
            odds_to_probability(50),
            Err(EdgeError::InvalidOdds { odds: 50 })
        );
        assert!(odds_to_probability(-1).is_err());
        assert!(payout_multiplier(99).is_err());
        assert!(american_to_decimal(-99).is_err());
    }

    #[test]
    fn test_probability_to_odds() {
        assert_eq!(probability_to_odds(0.4).unwrap(), 150);
        assert_eq!(probability_to_odds(0.6).unwrap(), -150);
        assert_eq!(probability_to_odds(0.5).unwrap(), -100);
    }

    #[test]
    fn test_probability_to_odds_invalid() {
        assert!(probability_to_odds(0.0).is_err());
        assert!(probability_to_odds(1.0).is_err());
        assert!(probability_to_odds(-0.2).is_err());
        assert!(probability_to_odds(f64::NAN).is_err());
    }

    #[test]
    fn test_round_trip_within_one() {
        let mut odds = 100;
        while odds <= 5000 {
            for o in [odds, -odds] {
                let back = probability_to_odds(odds_to_probability(o).unwrap()).unwrap();
                // +100 and -100 both encode p = 0.5, which maps to -100
                if o.abs() == 100 {
                    assert_eq!(back.abs(), 100);
                } else {
                    assert!((back - o).abs() <= 1, "{} -> {}", o, back);
                }
            }
            odds += 5;
        }
    }

    #[test]
    fn test_payout_multiplier() {
        assert!((payout_multiplier(150).unwrap() - 1.5).abs() < 1e-9);
        assert!((payout_multiplier(-200).unwrap() - 0.5).abs() < 1e-9);
        assert!(payout_multiplier(0).is_err());
    }

    #[test]
    fn test_american_to_decimal() {
        assert!((american_to_decimal(150).unwrap() - 2.5).abs() < 1e-9);
        assert!((american_to_decimal(-110).unwrap() - 1.9091).abs() < 1e-4);
    }
}
