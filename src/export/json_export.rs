//! JSON export functionality
//!
//! Provides JSON serialization for a stock line's analysis and for the stock
//! report, with full structure preservation.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::{ExportError, ExportableRecord};
use crate::recommendations::{Recommendation, RecommendationSummary};
use crate::trends::{DerivedStatistics, TimeWindow, TrendAnalysis};

const EXPORT_VERSION: &str = "1.0.0";

/// Trend analysis export structure
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisExportJson {
    pub export_date: String,
    pub export_version: &'static str,
    pub reference: String,
    pub window: TimeWindow,
    pub record_count: usize,
    pub records: Vec<ExportableRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<DerivedStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

/// Stock report export structure
#[derive(Debug, Clone, Serialize)]
pub struct ReportExportJson<'a> {
    pub export_date: String,
    pub export_version: &'static str,
    pub window: TimeWindow,
    pub report: &'a RecommendationSummary,
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(value)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Write a stock line's analysis to JSON format
pub fn write_analysis_json(
    analysis: &TrendAnalysis,
    reference: &str,
    path: &Path,
) -> Result<(), ExportError> {
    let export = AnalysisExportJson {
        export_date: chrono::Utc::now().to_rfc3339(),
        export_version: EXPORT_VERSION,
        reference: reference.to_string(),
        window: analysis.window,
        record_count: analysis.filtered.len(),
        records: analysis.filtered.iter().map(ExportableRecord::from).collect(),
        statistics: analysis.statistics.clone(),
        recommendation: analysis.recommendation.clone(),
    };

    write_json(&export, path)
}

/// Write the stock report to JSON format
pub fn write_report_json(
    report: &RecommendationSummary,
    window: TimeWindow,
    path: &Path,
) -> Result<(), ExportError> {
    let export = ReportExportJson {
        export_date: chrono::Utc::now().to_rfc3339(),
        export_version: EXPORT_VERSION,
        window,
        report,
    };

    write_json(&export, path)
}
