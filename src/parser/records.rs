//! Trend record file readers
//!
//! Files are named after the stock reference they describe, e.g.
//! `BRK-PAD-220.json` or `BRK-PAD-220.csv`. Everything read here passes
//! through [`normalize_records`] before being returned.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::{ParserError, ParserResult};
use crate::models::StockTrendRecord;
use crate::trends::normalize_records;

/// Supported trend file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendFileKind {
    Json,
    Csv,
}

impl TrendFileKind {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Parse a date cell
///
/// Handles formats like:
/// - "2026-02-05T10:30:00.000Z"
/// - "2026-02-05T10:30:00+01:00"
/// - "2026-02-05" (taken as midnight UTC)
pub fn parse_record_date(value: &str) -> ParserResult<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ParserError::InvalidDate(value.to_string()))
}

/// Parse a JSON array of trend records
pub fn parse_json_records(content: &str) -> ParserResult<Vec<StockTrendRecord>> {
    let records: Vec<StockTrendRecord> = serde_json::from_str(content)?;
    Ok(normalize_records(records)?)
}

/// One CSV row before date parsing
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    quantity: i64,
    #[serde(default)]
    min_quantity: Option<i64>,
    #[serde(default)]
    alert_threshold: Option<i64>,
}

/// Parse CSV trend records
///
/// Threshold columns may be empty or missing; they default to 0.
pub fn parse_csv_records<R: Read>(reader: R) -> ParserResult<Vec<StockTrendRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<CsvRow>() {
        let row = row?;
        records.push(StockTrendRecord {
            date: parse_record_date(&row.date)?,
            quantity: row.quantity,
            min_quantity: row.min_quantity.unwrap_or(0),
            alert_threshold: row.alert_threshold.unwrap_or(0),
        });
    }

    Ok(normalize_records(records)?)
}

/// Load a trend file, dispatching on its extension
pub fn load_records_file(path: &Path) -> ParserResult<Vec<StockTrendRecord>> {
    let kind = TrendFileKind::from_path(path)
        .ok_or_else(|| ParserError::UnsupportedFile(path.to_path_buf()))?;

    let records = match kind {
        TrendFileKind::Json => parse_json_records(&std::fs::read_to_string(path)?)?,
        TrendFileKind::Csv => parse_csv_records(std::fs::File::open(path)?)?,
    };

    tracing::debug!("Parsed {} trend records from {:?}", records.len(), path);
    Ok(records)
}

/// Extract the stock reference from a trend file path (the file stem)
pub fn reference_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?.trim();
    if stem.is_empty() || stem.starts_with('.') {
        return None;
    }
    Some(stem.to_string())
}

/// List importable trend files directly inside `dir`, sorted by path
pub fn scan_trend_files(dir: &Path) -> ParserResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    let base = glob::Pattern::escape(&dir.to_string_lossy());

    for ext in ["json", "csv"] {
        let pattern = format!("{}/*.{}", base, ext);
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping unreadable path: {}", e),
            }
        }
    }

    files.sort();
    Ok(files)
}
