//! Backtesting engine for validating pick selection against settled outcomes

pub mod metrics;
pub mod simulator;

pub use metrics::{analyze_by_market, calculate_metrics, BacktestMetrics};
pub use simulator::{BacktestConfig, BacktestResult, BacktestSimulator, BetRecord};
