//! NBA Edge - betting edge calculation and pick selection
//!
//! This library provides:
//! - American odds to implied probability conversion
//! - Expected value and capped Kelly criterion sizing
//! - Best pick selection across duplicate bet variants
//! - CSV loading, a staged scoring pipeline, report export and backtesting
//!
//! # Example
//!
//! ```
//! use nba_edge::core::{select_best_picks, EdgeCalculator};
//! use nba_edge::models::{MarketType, Pick};
//!
//! let picks = vec![
//!     Pick::new("G1", MarketType::Spread, "TeamA -11.5", Some(-11.5), 0.56, -110),
//!     Pick::new("G1", MarketType::Spread, "TeamA -11.5", Some(-11.5), 0.56, -102),
//! ];
//!
//! let scored = EdgeCalculator::default().score_all(&picks).unwrap();
//! let best = select_best_picks(&scored).unwrap();
//! assert_eq!(best.len(), 1);
//! assert_eq!(best[0].market_odds, -102);
//! ```

pub mod backtesting;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;

// Re-export commonly used types
pub use config::ScoringConfig;
pub use data::PickTable;
pub use error::{EdgeError, LoadError};
pub use models::{MarketType, Pick, PickRecord};
pub use pipeline::{ScoringPipeline, Stage, StageState};
