//! Export of ranked picks as CSV or JSON

use chrono::Utc;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

use crate::config::ScoringConfig;
use crate::core::odds::odds_to_probability;
use crate::error::LoadError;
use crate::models::{Pick, PickRecord, PickReport};

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    /// Guess from the file extension, defaulting to CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ReportFormat::Json,
            _ => ReportFormat::Csv,
        }
    }
}

/// Build report rows; `stakes` must be empty or match `picks` in length
pub fn to_records(picks: &[Pick], stakes: &[f64]) -> Result<Vec<PickRecord>, LoadError> {
    picks
        .iter()
        .enumerate()
        .map(|(i, pick)| -> Result<PickRecord, LoadError> {
            Ok(PickRecord {
                game_id: pick.game_id.clone(),
                market_type: pick.market_type,
                recommendation: pick.recommendation.clone(),
                point: pick.point,
                bookmaker: pick.bookmaker.clone(),
                model_probability: pick.model_probability,
                market_odds: pick.market_odds,
                implied_probability: odds_to_probability(pick.market_odds)?,
                expected_value: pick.expected_value,
                kelly_fraction: pick.kelly_fraction,
                stake: stakes.get(i).copied(),
            })
        })
        .collect()
}

pub fn records_to_dataframe(records: &[PickRecord]) -> PolarsResult<DataFrame> {
    df!(
        "game_id" => records.iter().map(|r| r.game_id.as_str()).collect::<Vec<_>>(),
        "market_type" => records.iter().map(|r| r.market_type.as_str()).collect::<Vec<_>>(),
        "recommendation" => records.iter().map(|r| r.recommendation.as_str()).collect::<Vec<_>>(),
        "point" => records.iter().map(|r| r.point).collect::<Vec<_>>(),
        "bookmaker" => records.iter().map(|r| r.bookmaker.as_deref()).collect::<Vec<_>>(),
        "model_probability" => records.iter().map(|r| r.model_probability).collect::<Vec<_>>(),
        "market_odds" => records.iter().map(|r| r.market_odds).collect::<Vec<_>>(),
        "implied_probability" => records.iter().map(|r| r.implied_probability).collect::<Vec<_>>(),
        "expected_value" => records.iter().map(|r| r.expected_value).collect::<Vec<_>>(),
        "kelly_fraction" => records.iter().map(|r| r.kelly_fraction).collect::<Vec<_>>(),
        "stake" => records.iter().map(|r| r.stake).collect::<Vec<_>>(),
    )
}

pub fn write_csv(records: &[PickRecord], path: &Path) -> Result<(), LoadError> {
    let mut df = records_to_dataframe(records)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

pub fn write_json(records: Vec<PickRecord>, config: &ScoringConfig, path: &Path) -> Result<(), LoadError> {
    let report = PickReport {
        generated_at: Utc::now().to_rfc3339(),
        kelly_cap: config.kelly_cap,
        min_ev: config.min_ev,
        picks: records,
    };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Write `records` to `path` in the given format
pub fn write_report(
    records: Vec<PickRecord>,
    config: &ScoringConfig,
    path: &Path,
    format: ReportFormat,
) -> Result<(), LoadError> {
    match format {
        ReportFormat::Csv => write_csv(&records, path),
        ReportFormat::Json => write_json(records, config, path),
    }
}
