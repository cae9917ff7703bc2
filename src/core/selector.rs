//! Best pick selection across redundant bet variants
//!
//! The same wager often shows up several times in one run (one row per
//! bookmaker, or re-fetched lines). Picks are grouped by [`BetIdentity`] and
//! only the highest-EV pick of each group is kept.
//!
//! Ties on EV keep the pick seen first in the input, and the output is sorted
//! by EV descending with a stable sort, so equal EVs across identities also
//! keep input order.

use std::collections::HashMap;

use crate::error::EdgeError;
use crate::models::{MarketType, Pick};

/// Key identifying the underlying wager of a pick
///
/// The point line is stored in tenths so that -11.5 and -12.0 stay distinct
/// while float noise (-11.49999) collapses onto the same line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BetIdentity {
    pub game_id: String,
    pub market_type: MarketType,
    pub recommendation: String,
    pub point_tenths: Option<i64>,
}

impl BetIdentity {
    pub fn of(pick: &Pick) -> Self {
        Self {
            game_id: pick.game_id.clone(),
            market_type: pick.market_type,
            recommendation: pick.recommendation.clone(),
            point_tenths: pick.point.map(point_to_tenths),
        }
    }

    /// Point line rounded to one decimal
    pub fn point(&self) -> Option<f64> {
        self.point_tenths.map(|t| t as f64 / 10.0)
    }
}

fn point_to_tenths(point: f64) -> i64 {
    (point * 10.0).round() as i64
}

/// Reject picks that cannot be grouped
///
/// `row` is the 1-based position used in the error message.
pub fn validate_pick(pick: &Pick, row: usize) -> Result<(), EdgeError> {
    let malformed = |reason: &str| EdgeError::MalformedPick {
        row,
        reason: reason.to_string(),
    };

    if pick.game_id.trim().is_empty() {
        return Err(malformed("game_id is empty"));
    }
    if pick.recommendation.trim().is_empty() {
        return Err(malformed("recommendation is empty"));
    }
    if let Some(point) = pick.point {
        if !point.is_finite() {
            return Err(malformed("point is not a finite number"));
        }
    }
    if !pick.expected_value.is_finite() {
        return Err(malformed("expected_value is not a finite number"));
    }

    Ok(())
}

/// Keep the highest-EV pick per bet identity, sorted by EV descending
///
/// Every pick is validated before any grouping happens; one malformed pick
/// aborts the whole run.
///
/// # Examples
/// ```
/// use nba_edge::core::selector::select_best_picks;
/// use nba_edge::models::{MarketType, Pick};
///
/// let mut a = Pick::new("G1", MarketType::Spread, "TeamA -11.5", Some(-11.5), 0.55, -110);
/// a.expected_value = 0.02;
/// let mut b = a.clone();
/// b.expected_value = 0.05;
///
/// let best = select_best_picks(&[a, b]).unwrap();
/// assert_eq!(best.len(), 1);
/// assert_eq!(best[0].expected_value, 0.05);
/// ```
pub fn select_best_picks(picks: &[Pick]) -> Result<Vec<Pick>, EdgeError> {
    for (i, pick) in picks.iter().enumerate() {
        validate_pick(pick, i + 1)?;
    }

    // Index of the current best pick per identity, in first-seen order
    let mut best_by_identity: HashMap<BetIdentity, usize> = HashMap::new();
    let mut order: Vec<usize> = Vec::new();

    for (i, pick) in picks.iter().enumerate() {
        let identity = BetIdentity::of(pick);
        match best_by_identity.get(&identity) {
            Some(&slot) => {
                if pick.expected_value > picks[order[slot]].expected_value {
                    order[slot] = i;
                }
            }
            None => {
                best_by_identity.insert(identity, order.len());
                order.push(i);
            }
        }
    }

    let mut selected: Vec<Pick> = order.into_iter().map(|i| picks[i].clone()).collect();
    selected.sort_by(|a, b| b.expected_value.total_cmp(&a.expected_value));

    Ok(selected)
}

/// Stateless selector over one scoring run
#[derive(Debug, Clone, Copy, Default)]
pub struct BestPickSelector;

impl BestPickSelector {
    pub fn new() -> Self {
        Self
    }

    pub fn select(&self, picks: &[Pick]) -> Result<Vec<Pick>, EdgeError> {
        select_best_picks(picks)
    }
}
