//! Export module for CSV and JSON export functionality
//!
//! Writes the filtered trend records of a stock line, its analysis, and the
//! stock report to files in CSV or JSON format.

pub mod csv_export;
pub mod json_export;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{StockStatus, StockTrendRecord};
use crate::recommendations::ItemRecommendation;
use crate::stock::classify_levels;

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write CSV record: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid export format: {0}. Use 'csv' or 'json'")]
    InvalidFormat(String),
}

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::InvalidFormat(s.to_string())),
        }
    }
}

impl ExportFormat {
    /// Get file extension for format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Exportable trend record for CSV/JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportableRecord {
    pub date: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub alert_threshold: i64,
    pub status: StockStatus,
}

impl From<&StockTrendRecord> for ExportableRecord {
    fn from(record: &StockTrendRecord) -> Self {
        Self {
            date: record.date.to_rfc3339(),
            quantity: record.quantity,
            min_quantity: record.min_quantity,
            alert_threshold: record.alert_threshold,
            status: classify_levels(record.quantity, record.min_quantity, record.alert_threshold),
        }
    }
}

/// Flattened stock report row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportableReportRow {
    pub reference: String,
    pub part_name: String,
    pub current_stock: i64,
    /// Empty when depletion cannot be projected
    pub days_until_depletion: Option<f64>,
    pub severity: String,
    pub message: String,
}

impl From<&ItemRecommendation> for ExportableReportRow {
    fn from(item: &ItemRecommendation) -> Self {
        Self {
            reference: item.reference.clone(),
            part_name: item.part_name.clone(),
            current_stock: item.current_stock,
            days_until_depletion: item.days_until_depletion.days(),
            severity: item.recommendation.severity.label().to_string(),
            message: item.recommendation.message.clone(),
        }
    }
}

/// Get the default export directory (Downloads folder or temp dir)
pub fn get_export_directory() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::document_dir)
        .unwrap_or_else(std::env::temp_dir)
}

/// Generate a timestamped filename for exports
pub fn generate_export_filename(prefix: &str, extension: &str) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}.{}", sanitize_prefix(prefix), timestamp, extension)
}

/// Keep filename-safe characters of a stock reference
fn sanitize_prefix(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

// Re-export writers
pub use csv_export::*;
pub use json_export::*;
