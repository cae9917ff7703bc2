use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the odds, edge and selection functions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EdgeError {
    /// Zero or otherwise non-representable American odds
    #[error("Invalid odds: {odds} is not a valid American odds value")]
    InvalidOdds { odds: i32 },

    /// Probability outside the range accepted by the operation
    #[error("Invalid probability for {context}: {value}")]
    InvalidProbability { value: f64, context: &'static str },

    /// Pick missing one of its identity fields
    #[error("Malformed pick at row {row}: {reason}")]
    MalformedPick { row: usize, reason: String },

    /// A pick that failed scoring, with its 1-based input row
    #[error("Invalid pick at row {row} (game {game_id}): {source}")]
    InvalidPick {
        row: usize,
        game_id: String,
        source: Box<EdgeError>,
    },

    /// Pipeline stage driven out of order
    #[error("Stage '{stage}' cannot {action} while {state}")]
    Lifecycle {
        stage: &'static str,
        state: &'static str,
        action: &'static str,
    },
}

/// Errors raised while loading or exporting pick tables
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error(transparent)]
    Pick(#[from] EdgeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validate American odds; magnitudes below 100 are not valid quotes
pub fn validate_odds(odds: i32) -> Result<(), EdgeError> {
    if odds.unsigned_abs() < 100 {
        return Err(EdgeError::InvalidOdds { odds });
    }
    Ok(())
}

/// Validate a probability in the closed interval [0, 1]
pub fn validate_probability(prob: f64, context: &'static str) -> Result<(), EdgeError> {
    if !prob.is_finite() || !(0.0..=1.0).contains(&prob) {
        return Err(EdgeError::InvalidProbability {
            value: prob,
            context,
        });
    }
    Ok(())
}

/// Validate a probability in the open interval (0, 1)
pub fn validate_open_probability(prob: f64, context: &'static str) -> Result<(), EdgeError> {
    if !prob.is_finite() || prob <= 0.0 || prob >= 1.0 {
        return Err(EdgeError::InvalidProbability {
            value: prob,
            context,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_odds_valid() {
        assert!(validate_odds(150).is_ok());
        assert!(validate_odds(-110).is_ok());
        assert!(validate_odds(100).is_ok());
    }

    #[test]
    fn test_validate_odds_zero() {
        assert_eq!(validate_odds(0), Err(EdgeError::InvalidOdds { odds: 0 }));
    }

    #[test]
    fn test_validate_odds_below_even_money() {
        assert!(validate_odds(-100).is_ok());
        assert_eq!(validate_odds(50), Err(EdgeError::InvalidOdds { odds: 50 }));
        assert_eq!(validate_odds(-99), Err(EdgeError::InvalidOdds { odds: -99 }));
        assert!(validate_odds(1).is_err());
        assert!(validate_odds(i32::MIN).is_ok());
    }

    #[test]
    fn test_validate_probability_valid() {
        assert!(validate_probability(0.0, "p").is_ok());
        assert!(validate_probability(0.5, "p").is_ok());
        assert!(validate_probability(1.0, "p").is_ok());
    }

    #[test]
    fn test_validate_probability_invalid() {
        assert!(validate_probability(-0.1, "p").is_err());
        assert!(validate_probability(1.1, "p").is_err());
        assert!(validate_probability(f64::NAN, "p").is_err());
    }

    #[test]
    fn test_validate_open_probability() {
        assert!(validate_open_probability(0.5, "p").is_ok());
        assert!(validate_open_probability(0.0, "p").is_err());
        assert!(validate_open_probability(1.0, "p").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = EdgeError::MalformedPick {
            row: 3,
            reason: "game_id is empty".to_string(),
        };
        assert_eq!(err.to_string(), "Malformed pick at row 3: game_id is empty");

        let err = EdgeError::InvalidProbability {
            value: 1.5,
            context: "model_probability",
        };
        assert!(err.to_string().contains("model_probability"));
    }

    #[test]
    fn test_invalid_pick_display() {
        let err = EdgeError::InvalidPick {
            row: 2,
            game_id: "0022400123".to_string(),
            source: Box::new(EdgeError::InvalidProbability {
                value: 1.7,
                context: "model_probability",
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 2"));
        assert!(msg.contains("0022400123"));
        assert!(msg.contains("1.7"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_load_error_wraps_edge_error() {
        let err: LoadError = EdgeError::InvalidOdds { odds: 0 }.into();
        assert!(err.to_string().contains("Invalid odds"));
    }
}
