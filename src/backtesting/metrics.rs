//! Backtest Metrics
//!
//! Calculate metrics such as ROI, hit rate, drawdown, etc.

use super::simulator::BetRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Backtest evaluation metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestMetrics {
    // Basic metrics
    pub total_bets: usize,
    pub winning_bets: usize,
    pub hit_rate: f64,
    pub roi: f64,

    // Expected value related
    pub avg_ev: f64,
    pub avg_odds: f64,
    pub avg_probability: f64,

    // Risk metrics
    pub profit_factor: f64,
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,

    // Win/Loss
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub net_profit: f64,
}

/// Calculate metrics from bet records
pub fn calculate_metrics(bets: &[BetRecord], total_stake: f64) -> BacktestMetrics {
    if bets.is_empty() {
        return BacktestMetrics::default();
    }

    let total_bets = bets.len();
    let n = total_bets as f64;
    let winning_bets = bets.iter().filter(|b| b.won).count();
    let hit_rate = winning_bets as f64 / n;

    let avg_ev = bets.iter().map(|b| b.expected_value).sum::<f64>() / n;
    let avg_odds = bets.iter().map(|b| b.odds as f64).sum::<f64>() / n;
    let avg_probability = bets.iter().map(|b| b.probability).sum::<f64>() / n;

    let gross_profit: f64 = bets.iter().map(|b| b.profit).filter(|&p| p > 0.0).sum();
    let gross_loss: f64 = bets
        .iter()
        .map(|b| b.profit)
        .filter(|&p| p < 0.0)
        .map(f64::abs)
        .sum();
    let net_profit: f64 = bets.iter().map(|b| b.profit).sum();

    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    // Drawdown over the cumulative profit curve, starting from zero
    let mut cumulative = 0.0;
    let mut peak = 0.0_f64;
    let mut max_drawdown = 0.0_f64;
    for bet in bets {
        cumulative += bet.profit;
        peak = peak.max(cumulative);
        max_drawdown = max_drawdown.max(peak - cumulative);
    }

    let max_drawdown_pct = if total_stake > 0.0 {
        max_drawdown / total_stake
    } else {
        0.0
    };

    let roi = if total_stake > 0.0 {
        net_profit / total_stake
    } else {
        0.0
    };

    BacktestMetrics {
        total_bets,
        winning_bets,
        hit_rate,
        roi,
        avg_ev,
        avg_odds,
        avg_probability,
        profit_factor,
        max_drawdown,
        max_drawdown_pct,
        gross_profit,
        gross_loss,
        net_profit,
    }
}

/// Calculate Sharpe ratio of per-bet returns
pub fn calculate_sharpe_ratio(bets: &[BetRecord], risk_free_rate: f64) -> f64 {
    if bets.is_empty() {
        return 0.0;
    }

    let returns: Vec<f64> = bets.iter().map(|b| b.profit / b.stake).collect();
    let mean_return: f64 = returns.iter().sum::<f64>() / returns.len() as f64;

    let variance: f64 = returns
        .iter()
        .map(|r| (r - mean_return).powi(2))
        .sum::<f64>()
        / returns.len() as f64;

    let std_return = variance.sqrt();
    if std_return == 0.0 {
        return 0.0;
    }

    (mean_return - risk_free_rate) / std_return
}

/// Analysis results by dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionAnalysis {
    pub key: String,
    pub bets: usize,
    pub wins: usize,
    pub hit_rate: f64,
    pub stake: f64,
    pub profit: f64,
    pub roi: f64,
}

fn analyze_groups<F>(bets: &[BetRecord], key_of: F) -> Vec<DimensionAnalysis>
where
    F: Fn(&BetRecord) -> String,
{
    let mut grouped: HashMap<String, Vec<&BetRecord>> = HashMap::new();
    for bet in bets {
        grouped.entry(key_of(bet)).or_default().push(bet);
    }

    let mut results: Vec<DimensionAnalysis> = grouped
        .into_iter()
        .map(|(key, group)| {
            let total = group.len();
            let wins = group.iter().filter(|b| b.won).count();
            let stake: f64 = group.iter().map(|b| b.stake).sum();
            let profit: f64 = group.iter().map(|b| b.profit).sum();

            DimensionAnalysis {
                key,
                bets: total,
                wins,
                hit_rate: wins as f64 / total as f64,
                stake,
                profit,
                roi: if stake > 0.0 { profit / stake } else { 0.0 },
            }
        })
        .collect();

    results.sort_by(|a, b| a.key.cmp(&b.key));
    results
}

/// Analyze bet results by market type
pub fn analyze_by_market(bets: &[BetRecord]) -> Vec<DimensionAnalysis> {
    analyze_groups(bets, |b| b.market_type.to_string())
}

/// Analyze bet results by odds range
pub fn analyze_by_odds_range(bets: &[BetRecord]) -> Vec<DimensionAnalysis> {
    analyze_groups(bets, |b| {
        if b.odds <= -200 {
            "heavy favorite (<=-200)".to_string()
        } else if b.odds < 0 {
            "favorite (-199..-100)".to_string()
        } else {
            "underdog (>=+100)".to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarketType;

    fn bet(market: MarketType, odds: i32, won: bool, profit: f64) -> BetRecord {
        BetRecord {
            game_id: "G1".to_string(),
            market_type: market,
            recommendation: "TeamA".to_string(),
            point: None,
            probability: 0.55,
            odds,
            expected_value: 0.05,
            stake: 100.0,
            won,
            profit,
        }
    }

    fn create_test_bets() -> Vec<BetRecord> {
        vec![
            bet(MarketType::Moneyline, 150, true, 150.0),
            bet(MarketType::Spread, -110, false, -100.0),
            bet(MarketType::Spread, -110, true, 90.0),
        ]
    }

    #[test]
    fn test_calculate_metrics() {
        let metrics = calculate_metrics(&create_test_bets(), 300.0);

        assert_eq!(metrics.total_bets, 3);
        assert_eq!(metrics.winning_bets, 2);
        assert!((metrics.hit_rate - 0.6667).abs() < 0.01);
        assert!((metrics.gross_profit - 240.0).abs() < 1e-9);
        assert!((metrics.gross_loss - 100.0).abs() < 1e-9);
        assert!((metrics.net_profit - 140.0).abs() < 1e-9);
        assert!((metrics.profit_factor - 2.4).abs() < 1e-9);
        assert!((metrics.roi - 140.0 / 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_metrics_empty() {
        let metrics = calculate_metrics(&[], 0.0);
        assert_eq!(metrics.total_bets, 0);
        assert_eq!(metrics.hit_rate, 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        let bets = vec![
            bet(MarketType::Moneyline, 800, true, 800.0),
            bet(MarketType::Moneyline, 800, false, -100.0),
            bet(MarketType::Moneyline, 800, false, -100.0),
        ];

        // Cumulative: 800, 700, 600
        let metrics = calculate_metrics(&bets, 300.0);
        assert!((metrics.max_drawdown - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_drawdown_from_start() {
        let bets = vec![bet(MarketType::Moneyline, 150, false, -100.0)];
        let metrics = calculate_metrics(&bets, 100.0);
        assert!((metrics.max_drawdown - 100.0).abs() < 1e-9);
        assert_eq!(metrics.profit_factor, 0.0);
    }

    #[test]
    fn test_calculate_sharpe_ratio() {
        // Returns: 1.5, -1.0, 0.9
        let sharpe = calculate_sharpe_ratio(&create_test_bets(), 0.0);
        assert!(sharpe > 0.0);
        assert_eq!(calculate_sharpe_ratio(&[], 0.0), 0.0);
    }

    #[test]
    fn test_analyze_by_market() {
        let analysis = analyze_by_market(&create_test_bets());

        assert_eq!(analysis.len(), 2);
        assert_eq!(analysis[0].key, "moneyline");
        assert_eq!(analysis[1].key, "spread");
        assert_eq!(analysis[1].bets, 2);
        assert_eq!(analysis[1].wins, 1);
        assert!((analysis[1].profit - (-10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_by_odds_range() {
        let mut bets = create_test_bets();
        bets.push(bet(MarketType::Moneyline, -250, true, 40.0));

        let analysis = analyze_by_odds_range(&bets);
        assert_eq!(analysis.len(), 3);
        let underdog = analysis.iter().find(|a| a.key.starts_with("underdog")).unwrap();
        assert_eq!(underdog.bets, 1);
        let favorite = analysis.iter().find(|a| a.key.starts_with("favorite")).unwrap();
        assert_eq!(favorite.bets, 2);
    }
}
