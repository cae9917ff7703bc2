//! Scoring run configuration
//!
//! Sources, lowest precedence first: defaults, JSON file, environment,
//! command-line flags (applied by the binary).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::core::edge::DEFAULT_KELLY_CAP;
use crate::core::kelly::KellyCalculator;

pub const ENV_KELLY_CAP: &str = "NBA_EDGE_KELLY_CAP";
pub const ENV_MIN_EV: &str = "NBA_EDGE_MIN_EV";
pub const ENV_BANKROLL: &str = "NBA_EDGE_BANKROLL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Upper bound on the Kelly fraction
    pub kelly_cap: f64,
    /// Picks with EV below this are dropped before selection
    pub min_ev: f64,
    /// Bankroll used to turn Kelly fractions into stakes
    pub bankroll: Option<f64>,
    pub kelly_multiplier: f64,
    pub max_stake_pct: f64,
    pub min_stake: f64,
    pub max_total_exposure: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            kelly_cap: DEFAULT_KELLY_CAP,
            min_ev: 0.0,
            bankroll: None,
            kelly_multiplier: 1.0,
            max_stake_pct: DEFAULT_KELLY_CAP,
            min_stake: 0.0,
            max_total_exposure: 1.0,
        }
    }
}

impl ScoringConfig {
    /// Load from an optional JSON file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Override fields from `NBA_EDGE_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_KELLY_CAP) {
            self.kelly_cap = parse_f64(ENV_KELLY_CAP, &value)?;
        }
        if let Some(value) = lookup(ENV_MIN_EV) {
            self.min_ev = parse_f64(ENV_MIN_EV, &value)?;
        }
        if let Some(value) = lookup(ENV_BANKROLL) {
            self.bankroll = Some(parse_f64(ENV_BANKROLL, &value)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name: &'static str, value: f64| ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        };

        if !self.kelly_cap.is_finite() || self.kelly_cap <= 0.0 || self.kelly_cap > 1.0 {
            return Err(invalid("kelly_cap", self.kelly_cap));
        }
        if !self.min_ev.is_finite() {
            return Err(invalid("min_ev", self.min_ev));
        }
        if let Some(bankroll) = self.bankroll {
            if !bankroll.is_finite() || bankroll <= 0.0 {
                return Err(invalid("bankroll", bankroll));
            }
        }
        if !self.kelly_multiplier.is_finite() || self.kelly_multiplier <= 0.0 {
            return Err(invalid("kelly_multiplier", self.kelly_multiplier));
        }
        for (name, value) in [
            ("max_stake_pct", self.max_stake_pct),
            ("max_total_exposure", self.max_total_exposure),
        ] {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(invalid(name, value));
            }
        }
        if !self.min_stake.is_finite() || self.min_stake < 0.0 {
            return Err(invalid("min_stake", self.min_stake));
        }
        Ok(())
    }

    /// Stake sizing for the configured bankroll, if any
    pub fn kelly_calculator(&self) -> Option<KellyCalculator> {
        self.bankroll.map(|bankroll| {
            KellyCalculator::new(
                bankroll,
                self.kelly_cap,
                self.kelly_multiplier,
                self.min_stake,
                self.max_stake_pct,
                self.max_total_exposure,
            )
        })
    }
}

fn parse_f64(name: &'static str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        })
}
