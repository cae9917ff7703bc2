//! Backtest Simulator
//!
//! Settle selected picks against known outcomes to validate the EV strategy

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::metrics::{calculate_metrics, BacktestMetrics};
use crate::config::ScoringConfig;
use crate::core::kelly::KellyCalculator;
use crate::core::odds::payout_multiplier;
use crate::error::EdgeError;
use crate::models::{MarketType, Pick};

/// Individual settled bet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetRecord {
    pub game_id: String,
    pub market_type: MarketType,
    pub recommendation: String,
    pub point: Option<f64>,
    pub probability: f64,
    pub odds: i32,
    pub expected_value: f64,
    pub stake: f64,
    pub won: bool,
    pub profit: f64,
}

/// Backtest result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub bets: Vec<BetRecord>,
    /// Picks offered to the simulator
    pub total_picks: usize,
    /// Picks skipped because no outcome was known
    pub unsettled: usize,
    pub total_stake: f64,
    pub total_payout: f64,
    pub metrics: Option<BacktestMetrics>,
}

impl BacktestResult {
    pub fn new() -> Self {
        Self {
            bets: Vec::new(),
            total_picks: 0,
            unsettled: 0,
            total_stake: 0.0,
            total_payout: 0.0,
            metrics: None,
        }
    }

    pub fn total_profit(&self) -> f64 {
        self.total_payout - self.total_stake
    }

    pub fn roi(&self) -> f64 {
        if self.total_stake == 0.0 {
            0.0
        } else {
            self.total_profit() / self.total_stake
        }
    }

    pub fn finalize(&mut self) {
        self.metrics = Some(calculate_metrics(&self.bets, self.total_stake));
    }
}

impl Default for BacktestResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Backtest simulator configuration
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// Only picks with EV strictly above this are bet
    pub ev_threshold: f64,
    /// Flat stake per bet, used when `use_kelly` is false
    pub stake: f64,
    pub use_kelly: bool,
    pub bankroll: f64,
    pub kelly_cap: f64,
    pub kelly_multiplier: f64,
    pub min_stake: f64,
    pub max_stake_pct: f64,
    pub max_total_exposure: f64,
}

impl BacktestConfig {
    /// Threshold and Kelly sizing taken from a scoring configuration
    pub fn from_scoring(config: &ScoringConfig) -> Self {
        let defaults = Self::default();
        Self {
            ev_threshold: config.min_ev,
            bankroll: config.bankroll.unwrap_or(defaults.bankroll),
            kelly_cap: config.kelly_cap,
            kelly_multiplier: config.kelly_multiplier,
            min_stake: config.min_stake,
            max_stake_pct: config.max_stake_pct,
            max_total_exposure: config.max_total_exposure,
            ..defaults
        }
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            ev_threshold: 0.0,
            stake: 100.0,
            use_kelly: false,
            bankroll: 10_000.0,
            kelly_cap: crate::core::edge::DEFAULT_KELLY_CAP,
            kelly_multiplier: 1.0,
            min_stake: 0.0,
            max_stake_pct: crate::core::edge::DEFAULT_KELLY_CAP,
            max_total_exposure: 1.0,
        }
    }
}

/// Backtest simulator
pub struct BacktestSimulator {
    pub config: BacktestConfig,
    kelly: Option<KellyCalculator>,
}

impl BacktestSimulator {
    /// Create a new backtest simulator
    pub fn new(config: BacktestConfig) -> Self {
        let kelly = if config.use_kelly {
            Some(KellyCalculator::new(
                config.bankroll,
                config.kelly_cap,
                config.kelly_multiplier,
                config.min_stake,
                config.max_stake_pct,
                config.max_total_exposure,
            ))
        } else {
            None
        };

        Self { config, kelly }
    }

    /// Settle scored picks in order
    ///
    /// With Kelly staking the bankroll is updated after every bet, so later
    /// stakes depend on earlier results.
    pub fn run(&mut self, picks: &[Pick]) -> Result<BacktestResult, EdgeError> {
        let mut result = BacktestResult::new();
        result.total_picks = picks.len();

        for pick in picks {
            let won = match pick.outcome {
                Some(won) => won,
                None => {
                    result.unsettled += 1;
                    continue;
                }
            };

            if pick.expected_value <= self.config.ev_threshold {
                continue;
            }

            let stake = self.calculate_stake(pick)?;
            if stake <= 0.0 {
                continue;
            }

            let payout = if won {
                stake * (1.0 + payout_multiplier(pick.market_odds)?)
            } else {
                0.0
            };
            let profit = payout - stake;

            if let Some(ref mut kelly) = self.kelly {
                kelly.update_bankroll(profit);
            }

            debug!(game_id = %pick.game_id, stake, profit, "Settled pick");

            result.bets.push(BetRecord {
                game_id: pick.game_id.clone(),
                market_type: pick.market_type,
                recommendation: pick.recommendation.clone(),
                point: pick.point,
                probability: pick.model_probability,
                odds: pick.market_odds,
                expected_value: pick.expected_value,
                stake,
                won,
                profit,
            });
            result.total_stake += stake;
            result.total_payout += payout;
        }

        result.finalize();
        Ok(result)
    }

    /// Current bankroll when staking with Kelly
    pub fn bankroll(&self) -> Option<f64> {
        self.kelly.as_ref().map(|k| k.bankroll)
    }

    fn calculate_stake(&self, pick: &Pick) -> Result<f64, EdgeError> {
        match self.kelly {
            Some(ref kelly) => Ok(kelly
                .calculate_single(pick.model_probability, pick.market_odds)?
                .stake),
            None => Ok(self.config.stake),
        }
    }
}
