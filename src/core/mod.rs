//! Core betting math: odds conversion, edge, sizing and pick selection

pub mod edge;
pub mod kelly;
pub mod odds;
pub mod selector;

// Re-export commonly used types
pub use edge::{calculate_ev, implied_edge, kelly_criterion, EdgeCalculator, DEFAULT_KELLY_CAP};
pub use kelly::{BetSizing, KellyCalculator};
pub use odds::{american_to_decimal, odds_to_probability, payout_multiplier, probability_to_odds};
pub use selector::{select_best_picks, validate_pick, BestPickSelector, BetIdentity};
