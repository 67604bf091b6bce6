//! Trend file parsing module
//!
//! This module reads stock trend records from files dropped into the import
//! directory:
//! - JSON arrays of records
//! - CSV with a `date,quantity,min_quantity,alert_threshold` header
//! - Directory scanning for importable files

pub mod records;

use std::path::PathBuf;

use thiserror::Error;

use crate::trends::TrendError;

pub use records::{
    load_records_file, parse_csv_records, parse_json_records, parse_record_date,
    reference_from_path, scan_trend_files, TrendFileKind,
};

/// Parser errors
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(PathBuf),

    #[error(transparent)]
    Trend(#[from] TrendError),
}

/// Result type for parser operations
pub type ParserResult<T> = Result<T, ParserError>;
