//! CSV loading for odds and model probability rows

use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{EdgeError, LoadError};
use crate::models::{MarketType, Pick};

const REQUIRED_COLUMNS: [&str; 5] = [
    "game_id",
    "market_type",
    "recommendation",
    "model_probability",
    "market_odds",
];

/// Unscored picks loaded from one input file, in file order
#[derive(Debug, Clone, Default)]
pub struct PickTable {
    picks: Vec<Pick>,
}

impl PickTable {
    /// Load picks from a CSV file with a header row
    ///
    /// Every column is read as text and cast afterwards, so ids such as
    /// `0022400123` keep their leading zeros.
    pub fn load<P: AsRef<Path>>(csv_path: P) -> Result<Self, LoadError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(csv_path.as_ref().to_path_buf()))?
            .finish()?;

        Self::from_dataframe(&df)
    }

    pub fn from_dataframe(df: &DataFrame) -> Result<Self, LoadError> {
        let picks = dataframe_to_picks(df)?;
        Ok(Self { picks })
    }

    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    pub fn into_picks(self) -> Vec<Pick> {
        self.picks
    }

    /// Distinct game ids, sorted
    pub fn games(&self) -> Vec<&str> {
        let games: BTreeSet<&str> = self.picks.iter().map(|p| p.game_id.as_str()).collect();
        games.into_iter().collect()
    }

    /// Whether any row carries a settled outcome
    pub fn has_outcomes(&self) -> bool {
        self.picks.iter().any(|p| p.outcome.is_some())
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }
}

fn cast_column(df: &DataFrame, name: &str, dtype: &DataType) -> Result<Column, LoadError> {
    let column = df
        .column(name)
        .map_err(|_| LoadError::MissingColumn(name.to_string()))?;
    Ok(column.cast(dtype)?)
}

fn optional_column(df: &DataFrame, name: &str, dtype: &DataType) -> Result<Option<Column>, LoadError> {
    match df.column(name) {
        Ok(column) => Ok(Some(column.cast(dtype)?)),
        Err(_) => Ok(None),
    }
}

/// Settled outcomes per row; accepts booleans, 0/1 or `true`/`false` text
fn outcome_values(df: &DataFrame) -> Result<Option<Vec<Option<bool>>>, LoadError> {
    let name = if df.column("outcome").is_ok() {
        "outcome"
    } else if df.column("won").is_ok() {
        "won"
    } else {
        return Ok(None);
    };

    let column = df.column(name)?;
    let values: Vec<Option<bool>> = match column.dtype() {
        DataType::Boolean => column.bool()?.into_iter().collect(),
        DataType::String => {
            let mut values = Vec::with_capacity(column.len());
            for (i, raw) in column.str()?.into_iter().enumerate() {
                values.push(parse_outcome(raw).map_err(|reason| EdgeError::MalformedPick {
                    row: i + 1,
                    reason,
                })?);
            }
            values
        }
        _ => {
            let column = column.cast(&DataType::Float64)?;
            column.f64()?.into_iter().map(|v| v.map(|v| v != 0.0)).collect()
        }
    };
    Ok(Some(values))
}

fn parse_outcome(raw: Option<&str>) -> Result<Option<bool>, String> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(v) => v,
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "won" | "win" => Ok(Some(true)),
        "0" | "0.0" | "false" | "lost" | "loss" => Ok(Some(false)),
        _ => Err(format!("unknown outcome '{}'", value)),
    }
}

/// Convert a DataFrame to picks, rejecting rows with missing identity fields
fn dataframe_to_picks(df: &DataFrame) -> Result<Vec<Pick>, LoadError> {
    for name in REQUIRED_COLUMNS {
        if df.column(name).is_err() {
            return Err(LoadError::MissingColumn(name.to_string()));
        }
    }

    let game_col = cast_column(df, "game_id", &DataType::String)?;
    let market_col = cast_column(df, "market_type", &DataType::String)?;
    let rec_col = cast_column(df, "recommendation", &DataType::String)?;
    let prob_col = cast_column(df, "model_probability", &DataType::Float64)?;
    let odds_col = cast_column(df, "market_odds", &DataType::Int64)?;
    let point_col = optional_column(df, "point", &DataType::Float64)?;
    let book_col = optional_column(df, "bookmaker", &DataType::String)?;
    let outcomes = outcome_values(df)?;

    let game_col = game_col.str()?;
    let market_col = market_col.str()?;
    let rec_col = rec_col.str()?;
    let prob_col = prob_col.f64()?;
    let odds_col = odds_col.i64()?;
    let point_col = point_col.as_ref().map(|c| c.f64()).transpose()?;
    let book_col = book_col.as_ref().map(|c| c.str()).transpose()?;

    let mut picks = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let row = i + 1;
        let malformed = |reason: String| EdgeError::MalformedPick { row, reason };

        let game_id = game_col
            .get(i)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed("missing game_id".to_string()))?;
        let market_raw = market_col
            .get(i)
            .ok_or_else(|| malformed("missing market_type".to_string()))?;
        let market_type: MarketType = market_raw.parse().map_err(malformed)?;
        let recommendation = rec_col
            .get(i)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed("missing recommendation".to_string()))?;
        let model_probability = prob_col
            .get(i)
            .ok_or_else(|| malformed("missing or non-numeric model_probability".to_string()))?;
        let market_odds = odds_col
            .get(i)
            .ok_or_else(|| malformed("missing or non-integer market_odds".to_string()))?;
        let market_odds = i32::try_from(market_odds)
            .map_err(|_| malformed(format!("market_odds {} out of range", market_odds)))?;

        let mut pick = Pick::new(
            game_id,
            market_type,
            recommendation,
            point_col.and_then(|c| c.get(i)),
            model_probability,
            market_odds,
        );
        pick.bookmaker = book_col
            .and_then(|c| c.get(i))
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);
        pick.outcome = outcomes.as_ref().and_then(|o| o.get(i).copied().flatten());

        picks.push(pick);
    }

    Ok(picks)
}
