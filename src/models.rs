use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Betting market a pick belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Moneyline,
    Spread,
    Total,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Moneyline => "moneyline",
            MarketType::Spread => "spread",
            MarketType::Total => "total",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "moneyline" | "h2h" => Ok(MarketType::Moneyline),
            "spread" | "spreads" => Ok(MarketType::Spread),
            "total" | "totals" => Ok(MarketType::Total),
            other => Err(format!("unknown market type '{}'", other)),
        }
    }
}

/// One candidate bet for a scoring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub game_id: String,
    pub market_type: MarketType,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<f64>,
    pub model_probability: f64,
    pub market_odds: i32,
    /// Set by the edge calculator
    #[serde(default)]
    pub expected_value: f64,
    /// Capped Kelly fraction, set by the edge calculator
    #[serde(default)]
    pub kelly_fraction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmaker: Option<String>,
    /// Settled result, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<bool>,
}

impl Pick {
    /// Create an unscored pick
    pub fn new(
        game_id: impl Into<String>,
        market_type: MarketType,
        recommendation: impl Into<String>,
        point: Option<f64>,
        model_probability: f64,
        market_odds: i32,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            market_type,
            recommendation: recommendation.into(),
            point,
            model_probability,
            market_odds,
            expected_value: 0.0,
            kelly_fraction: 0.0,
            bookmaker: None,
            outcome: None,
        }
    }

    pub fn with_bookmaker(mut self, bookmaker: impl Into<String>) -> Self {
        self.bookmaker = Some(bookmaker.into());
        self
    }

    pub fn with_outcome(mut self, won: bool) -> Self {
        self.outcome = Some(won);
        self
    }

    /// Short label for tables, e.g. "spread TeamA -11.5"
    pub fn label(&self) -> String {
        match self.point {
            Some(point) => format!("{} {} ({:+.1})", self.market_type, self.recommendation, point),
            None => format!("{} {}", self.market_type, self.recommendation),
        }
    }
}

/// Ranked pick as written to reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickRecord {
    pub game_id: String,
    pub market_type: MarketType,
    pub recommendation: String,
    pub point: Option<f64>,
    pub bookmaker: Option<String>,
    pub model_probability: f64,
    pub market_odds: i32,
    pub implied_probability: f64,
    pub expected_value: f64,
    pub kelly_fraction: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stake: Option<f64>,
}

/// JSON report envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct PickReport {
    pub generated_at: String,
    pub kelly_cap: f64,
    pub min_ev: f64,
    pub picks: Vec<PickRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_type_from_str() {
        assert_eq!("moneyline".parse::<MarketType>(), Ok(MarketType::Moneyline));
        assert_eq!("Spread".parse::<MarketType>(), Ok(MarketType::Spread));
        assert_eq!(" TOTALS ".parse::<MarketType>(), Ok(MarketType::Total));
        assert_eq!("h2h".parse::<MarketType>(), Ok(MarketType::Moneyline));
        assert!("parlay".parse::<MarketType>().is_err());
    }

    #[test]
    fn test_market_type_serde() {
        let json = serde_json::to_string(&MarketType::Spread).unwrap();
        assert_eq!(json, "\"spread\"");
        let parsed: MarketType = serde_json::from_str("\"total\"").unwrap();
        assert_eq!(parsed, MarketType::Total);
    }

    #[test]
    fn test_pick_label() {
        let pick = Pick::new("G1", MarketType::Spread, "TeamA", Some(-11.5), 0.55, -110);
        assert_eq!(pick.label(), "spread TeamA (-11.5)");

        let pick = Pick::new("G1", MarketType::Moneyline, "TeamB", None, 0.45, 150);
        assert_eq!(pick.label(), "moneyline TeamB");
    }

    #[test]
    fn test_pick_deserialize_defaults() {
        let json = r#"{
            "game_id": "0022400123",
            "market_type": "moneyline",
            "recommendation": "BOS",
            "model_probability": 0.62,
            "market_odds": -140
        }"#;

        let pick: Pick = serde_json::from_str(json).unwrap();
        assert_eq!(pick.point, None);
        assert_eq!(pick.expected_value, 0.0);
        assert_eq!(pick.outcome, None);
        assert_eq!(pick.market_odds, -140);
    }
}
