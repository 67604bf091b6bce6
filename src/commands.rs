//! Command handlers
//!
//! Every operation exposed by the command line. Handlers take an explicit
//! [`AppContext`] (settings plus the open store) and return plain data; the
//! CLI decides how to render it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::ApiClient;
use crate::config::Settings;
use crate::db::{queries, Database};
use crate::export::{
    csv_export, generate_export_filename, json_export, ExportFormat, ExportableRecord,
    ExportableReportRow,
};
use crate::models::{StockItem, StockStatus, StockSummary, StockTrendRecord};
use crate::parser::{self, reference_from_path};
use crate::recommendations::{ItemRecommendation, RecommendationSummary};
use crate::stock;
use crate::trends::{self, change_series, ChartPoint, TimeWindow, TrendAnalysis};
use crate::watcher::{ImportWatcher, WatchEvent};
use crate::AppError;

// ============================================================================
// Context
// ============================================================================

/// Everything a command needs, passed explicitly
pub struct AppContext {
    pub settings: Settings,
    pub db: Database,
}

impl AppContext {
    pub fn new(settings: Settings, db: Database) -> Self {
        Self { settings, db }
    }

    /// Open the store named in `settings`, creating its directory if needed
    pub fn open(settings: Settings) -> Result<Self, AppError> {
        if let Some(parent) = settings.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::open(settings.db_path.clone())?;
        tracing::info!("Database opened at {:?}", db.path());

        Ok(Self::new(settings, db))
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Stock line with its classification, for list views
#[derive(Debug, Clone, Serialize)]
pub struct StockOverview {
    #[serde(flatten)]
    pub item: StockItem,
    pub status: StockStatus,
}

/// Trend view of one stock line
#[derive(Debug, Clone, Serialize)]
pub struct StockTrendReport {
    pub item: StockItem,
    pub analysis: TrendAnalysis,
    pub chart: Vec<ChartPoint>,
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub files: usize,
    pub records: usize,
    /// Files that could not be imported, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// Outcome of a sync with the stock API
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    pub items: usize,
    pub records: usize,
    /// References whose trend records could not be fetched
    pub failed: Vec<String>,
}

// ============================================================================
// Stock list
// ============================================================================

fn overview(items: Vec<&StockItem>) -> Vec<StockOverview> {
    items
        .into_iter()
        .map(|item| StockOverview {
            status: item.status(),
            item: item.clone(),
        })
        .collect()
}

/// List stock lines, optionally filtered by text and status
pub fn list_stock(
    ctx: &AppContext,
    query: Option<&str>,
    status: Option<StockStatus>,
) -> Result<Vec<StockOverview>, AppError> {
    let items = ctx.db.with_connection(queries::get_stock_items)?;
    Ok(overview(stock::filter_items(&items, query, status)))
}

/// Stock lines needing attention, emptiest first
pub fn attention_stock(ctx: &AppContext) -> Result<Vec<StockOverview>, AppError> {
    let items = ctx.db.with_connection(queries::get_stock_items)?;
    Ok(overview(stock::low_stock_items(&items)))
}

/// Delete a stock line with its trend history
///
/// Returns the number of trend records removed with it.
pub fn delete_stock(ctx: &AppContext, reference: &str) -> Result<i64, AppError> {
    let item = find_item(ctx, reference)?;

    let removed = ctx.db.with_connection(|conn| {
        let count = queries::count_trend_records(conn, item.id)?;
        queries::delete_stock_item(conn, reference)?;
        Ok(count)
    })?;

    tracing::info!("Deleted {} and {} trend records", reference, removed);
    Ok(removed)
}

/// Aggregate figures over all stock lines
pub fn stock_summary(ctx: &AppContext) -> Result<StockSummary, AppError> {
    let items = ctx.db.with_connection(queries::get_stock_items)?;
    Ok(stock::summarize(&items))
}

// ============================================================================
// Trends
// ============================================================================

fn find_item(ctx: &AppContext, reference: &str) -> Result<StockItem, AppError> {
    ctx.db
        .with_connection(|conn| queries::get_stock_item_by_reference(conn, reference))?
        .ok_or_else(|| AppError::StockNotFound(reference.to_string()))
}

/// Load a stock line and its trend records inside `window`
pub fn load_trends(
    ctx: &AppContext,
    reference: &str,
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Result<(StockItem, Vec<StockTrendRecord>), AppError> {
    let item = find_item(ctx, reference)?;
    let records = ctx
        .db
        .with_connection(|conn| queries::get_trend_records(conn, item.id, window.cutoff(now)))?;
    Ok((item, records))
}

/// Analyse one stock line over a window
pub fn analyze_stock(
    ctx: &AppContext,
    reference: &str,
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Result<StockTrendReport, AppError> {
    let (item, records) = load_trends(ctx, reference, window, now)?;
    let analysis = trends::analyze(&records, window, now);
    let chart = change_series(&analysis.filtered, ctx.settings.moving_average_window);

    tracing::debug!(
        "Analysed {} over {}: {} records",
        reference,
        window,
        analysis.filtered.len()
    );

    Ok(StockTrendReport {
        item,
        analysis,
        chart,
    })
}

/// Recommendations for every stock line over a window
pub fn stock_report(
    ctx: &AppContext,
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Result<RecommendationSummary, AppError> {
    let items = ctx.db.with_connection(queries::get_stock_items)?;
    let mut recommendations = Vec::new();
    let mut without_data = Vec::new();

    for item in items {
        let records = ctx
            .db
            .with_connection(|conn| queries::get_trend_records(conn, item.id, window.cutoff(now)))?;
        let analysis = trends::analyze(&records, window, now);

        match (analysis.statistics, analysis.recommendation) {
            (Some(statistics), Some(recommendation)) => recommendations.push(ItemRecommendation {
                reference: item.reference,
                part_name: item.part_name,
                current_stock: statistics.current_stock,
                days_until_depletion: statistics.days_until_depletion,
                recommendation,
            }),
            _ => without_data.push(item.reference),
        }
    }

    Ok(RecommendationSummary::from_items(recommendations, without_data))
}

// ============================================================================
// Import
// ============================================================================

/// Import one trend file; the file stem names the stock reference
///
/// Unknown references create a stock line from the latest record. Known
/// lines take the latest record's levels when it is newer than their last
/// update. A file without records changes nothing. Returns the number of
/// records stored.
pub fn import_file(ctx: &AppContext, path: &Path) -> Result<usize, AppError> {
    let reference = reference_from_path(path)
        .ok_or_else(|| AppError::InvalidInput(format!("No stock reference in {:?}", path)))?;
    let records = parser::load_records_file(path)?;

    let Some(latest) = records.last() else {
        tracing::debug!("No trend records in {:?}, skipping", path);
        return Ok(0);
    };

    let stored = ctx.db.with_connection(|conn| {
        let item = merge_latest(
            queries::get_stock_item_by_reference(conn, &reference)?,
            &reference,
            latest,
        );
        let id = queries::upsert_stock_item(conn, &item)?;
        queries::insert_trend_records(conn, id, &records)
    })?;

    tracing::info!("Imported {} trend records for {} from {:?}", stored, reference, path);
    Ok(stored)
}

/// Apply the newest trend record to a stock line, creating it if missing
fn merge_latest(
    existing: Option<StockItem>,
    reference: &str,
    latest: &StockTrendRecord,
) -> StockItem {
    match existing {
        Some(mut item) if latest.date >= item.updated_at => {
            item.quantity = latest.quantity;
            item.min_quantity = latest.min_quantity;
            item.alert_threshold = latest.alert_threshold;
            item.updated_at = latest.date;
            item
        }
        Some(item) => item,
        None => StockItem {
            id: 0,
            reference: reference.to_string(),
            part_name: reference.to_string(),
            location: None,
            quantity: latest.quantity,
            min_quantity: latest.min_quantity,
            alert_threshold: latest.alert_threshold,
            updated_at: latest.date,
        },
    }
}

/// Import a trend file or every trend file in a directory
///
/// Per-file failures are logged and reported, not fatal.
pub fn import_path(ctx: &AppContext, path: &Path) -> Result<ImportSummary, AppError> {
    let files = if path.is_dir() {
        parser::scan_trend_files(path)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut summary = ImportSummary::default();
    for file in files {
        match import_file(ctx, &file) {
            Ok(count) => {
                summary.files += 1;
                summary.records += count;
            }
            Err(e) => {
                tracing::warn!("Failed to import {:?}: {}", file, e);
                summary.failed.push((file, e.to_string()));
            }
        }
    }

    Ok(summary)
}

// ============================================================================
// Export
// ============================================================================

fn resolve_output(
    ctx: &AppContext,
    output: Option<PathBuf>,
    prefix: &str,
    format: ExportFormat,
) -> Result<PathBuf, AppError> {
    match output {
        Some(path) => Ok(path),
        None => {
            std::fs::create_dir_all(&ctx.settings.export_dir)?;
            Ok(ctx
                .settings
                .export_dir
                .join(generate_export_filename(prefix, format.extension())))
        }
    }
}

/// Export one stock line's filtered records (CSV) or full analysis (JSON)
///
/// Returns the path written.
pub fn export_stock(
    ctx: &AppContext,
    reference: &str,
    window: TimeWindow,
    format: ExportFormat,
    output: Option<PathBuf>,
    now: DateTime<Utc>,
) -> Result<PathBuf, AppError> {
    let (_, records) = load_trends(ctx, reference, window, now)?;
    let analysis = trends::analyze(&records, window, now);
    let path = resolve_output(ctx, output, reference, format)?;

    match format {
        ExportFormat::Csv => {
            let rows: Vec<ExportableRecord> =
                analysis.filtered.iter().map(ExportableRecord::from).collect();
            csv_export::write_records_csv(&rows, &path)?;
        }
        ExportFormat::Json => {
            json_export::write_analysis_json(&analysis, reference, &path)?;
        }
    }

    tracing::info!(
        "Exported {} records of {} to {}",
        analysis.filtered.len(),
        reference,
        path.display()
    );
    Ok(path)
}

/// Export the stock report
pub fn export_report(
    ctx: &AppContext,
    window: TimeWindow,
    format: ExportFormat,
    output: Option<PathBuf>,
    now: DateTime<Utc>,
) -> Result<PathBuf, AppError> {
    let report = stock_report(ctx, window, now)?;
    let path = resolve_output(ctx, output, "stock_report", format)?;

    match format {
        ExportFormat::Csv => {
            let rows: Vec<ExportableReportRow> =
                report.items.iter().map(ExportableReportRow::from).collect();
            csv_export::write_report_csv(&rows, &path)?;
        }
        ExportFormat::Json => {
            json_export::write_report_json(&report, window, &path)?;
        }
    }

    tracing::info!("Exported stock report to {}", path.display());
    Ok(path)
}

// ============================================================================
// Sync
// ============================================================================

/// Pull stock lines and their full trend history from the stock API
pub async fn sync_from_api(ctx: &AppContext, client: &ApiClient) -> Result<SyncSummary, AppError> {
    tracing::info!("Syncing stock from {}", client.base_url());

    let items = client.fetch_stock_items().await?;
    let remote_ids: Vec<i64> = items.iter().map(|i| i.id).collect();
    let results = client.fetch_trends_for(&remote_ids, TimeWindow::All).await;

    let mut summary = SyncSummary::default();
    for (item, (_, result)) in items.iter().zip(results) {
        let local_id = ctx.db.with_connection(|conn| queries::upsert_stock_item(conn, item))?;
        summary.items += 1;

        match result {
            Ok(records) => {
                summary.records += ctx
                    .db
                    .with_connection(|conn| queries::insert_trend_records(conn, local_id, &records))?;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch trends for {}: {}", item.reference, e);
                summary.failed.push(item.reference.clone());
            }
        }
    }

    tracing::info!(
        "Synced {} stock lines and {} trend records",
        summary.items,
        summary.records
    );
    Ok(summary)
}

// ============================================================================
// Watch
// ============================================================================

/// React to one watcher event
///
/// A changed file is re-imported and its stock line re-analysed; the fresh
/// analysis is returned. Removals only get logged.
pub fn handle_watch_event(
    ctx: &AppContext,
    event: &WatchEvent,
    now: DateTime<Utc>,
) -> Result<Option<StockTrendReport>, AppError> {
    match event {
        WatchEvent::TrendFileChanged { reference, path } => {
            import_file(ctx, path)?;
            let report = analyze_stock(ctx, reference, ctx.settings.default_window, now)?;
            Ok(Some(report))
        }
        WatchEvent::TrendFileRemoved { path } => {
            tracing::info!("Trend file removed: {:?}; stored records are kept", path);
            Ok(None)
        }
    }
}

/// Watch the import directory and recompute on every change
///
/// Runs until the watcher channel closes. `on_report` receives each fresh
/// analysis.
pub fn watch_imports<F>(ctx: &AppContext, dir: &Path, mut on_report: F) -> Result<(), AppError>
where
    F: FnMut(&StockTrendReport),
{
    let mut watcher = ImportWatcher::new(dir.to_path_buf())?;
    watcher.start()?;

    loop {
        for event in watcher.wait(Duration::from_secs(1))? {
            match handle_watch_event(ctx, &event, Utc::now()) {
                Ok(Some(report)) => on_report(&report),
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to process {:?}: {}", event, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendations::Severity;
    use crate::trends::DepletionHorizon;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::fs;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn test_context(name: &str) -> AppContext {
        let mut settings = Settings::default();
        settings.export_dir = std::env::temp_dir().join(format!("partsdesk_test_exports_{}", name));
        AppContext::new(settings, Database::in_memory().unwrap())
    }

    fn item(reference: &str, quantity: i64) -> StockItem {
        StockItem {
            id: 0,
            reference: reference.to_string(),
            part_name: format!("Part {}", reference),
            location: None,
            quantity,
            min_quantity: 5,
            alert_threshold: 10,
            updated_at: now(),
        }
    }

    /// Store a stock line with daily records ending at `now()`
    fn seed(ctx: &AppContext, reference: &str, quantities: &[i64]) {
        let n = quantities.len() as i64;
        let records: Vec<StockTrendRecord> = quantities
            .iter()
            .enumerate()
            .map(|(i, &q)| StockTrendRecord::new(now() - ChronoDuration::days(n - 1 - i as i64), q, 5, 10))
            .collect();
        let current = quantities.last().copied().unwrap_or(0);

        ctx.db
            .with_connection(|conn| {
                let id = queries::upsert_stock_item(conn, &item(reference, current))?;
                queries::insert_trend_records(conn, id, &records)
            })
            .unwrap();
    }

    #[test]
    fn test_list_and_summary() {
        let ctx = test_context("list");
        seed(&ctx, "OIL-5W30", &[0]);
        seed(&ctx, "BRK-PAD-220", &[20, 8]);
        seed(&ctx, "SPK-PLG-4", &[40]);

        let all = list_stock(&ctx, None, None).unwrap();
        assert_eq!(all.len(), 3);

        let flagged = list_stock(&ctx, None, Some(StockStatus::Alert)).unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].item.reference, "BRK-PAD-220");

        let summary = stock_summary(&ctx).unwrap();
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.out_of_stock, 1);
        assert_eq!(summary.in_stock, 1);
    }

    #[test]
    fn test_analyze_stock() {
        let ctx = test_context("analyze");
        seed(&ctx, "BRK-PAD-220", &[100, 90, 80]);

        let report = analyze_stock(&ctx, "BRK-PAD-220", TimeWindow::Last7Days, now()).unwrap();
        let stats = report.analysis.statistics.as_ref().unwrap();
        assert_eq!(stats.days_until_depletion, DepletionHorizon::Days(8.0));
        assert_eq!(
            report.analysis.recommendation.as_ref().unwrap().severity,
            Severity::Warning
        );
        assert_eq!(report.chart.len(), 3);
    }

    #[test]
    fn test_analyze_unknown_reference() {
        let ctx = test_context("unknown");
        assert!(matches!(
            analyze_stock(&ctx, "NOPE", TimeWindow::All, now()),
            Err(AppError::StockNotFound(_))
        ));
    }

    #[test]
    fn test_analyze_empty_window() {
        let ctx = test_context("empty_window");
        seed(&ctx, "OLD", &[]);

        let report = analyze_stock(&ctx, "OLD", TimeWindow::Last24Hours, now()).unwrap();
        assert!(report.analysis.is_empty());
        assert!(report.analysis.statistics.is_none());
        assert!(report.chart.is_empty());
    }

    #[test]
    fn test_stock_report() {
        let ctx = test_context("report");
        seed(&ctx, "FAST", &[10, 6, 2]);
        seed(&ctx, "IDLE", &[30, 30]);
        seed(&ctx, "EMPTY", &[]);

        let report = stock_report(&ctx, TimeWindow::Last30Days, now()).unwrap();
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].reference, "FAST");
        assert_eq!(report.items[0].recommendation.severity, Severity::Error);
        assert_eq!(report.without_data, vec!["EMPTY".to_string()]);
        assert_eq!(report.error_count, 1);
    }

    #[test]
    fn test_import_file_creates_and_updates_item() {
        let ctx = test_context("import");
        let dir = std::env::temp_dir().join("partsdesk_test_import_dir");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("FLT-AIR-01.csv");
        fs::write(
            &path,
            "date,quantity,min_quantity,alert_threshold\n2026-03-10,12,3,6\n2026-03-11,9,3,6\n",
        )
        .unwrap();

        assert_eq!(import_file(&ctx, &path).unwrap(), 2);
        let (item, records) = load_trends(&ctx, "FLT-AIR-01", TimeWindow::All, now()).unwrap();
        assert_eq!(item.quantity, 9);
        assert_eq!(item.min_quantity, 3);
        assert_eq!(records.len(), 2);

        fs::write(&path, "date,quantity,min_quantity,alert_threshold\n2026-03-12,4,3,6\n").unwrap();
        let summary = import_path(&ctx, &dir).unwrap();
        assert_eq!(summary.files, 1);
        assert_eq!(summary.records, 1);

        let (item, records) = load_trends(&ctx, "FLT-AIR-01", TimeWindow::All, now()).unwrap();
        assert_eq!(item.quantity, 4);
        assert_eq!(records.len(), 3);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_import_then_real_import() {
        let ctx = test_context("import_empty");
        let dir = std::env::temp_dir().join("partsdesk_test_import_empty_dir");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("FLT-OIL-9.csv");

        fs::write(&path, "").unwrap();
        assert_eq!(import_file(&ctx, &path).unwrap(), 0);
        assert!(matches!(
            load_trends(&ctx, "FLT-OIL-9", TimeWindow::All, now()),
            Err(AppError::StockNotFound(_))
        ));

        fs::write(
            &path,
            "date,quantity,min_quantity,alert_threshold\n2026-03-10,40,3,6\n2026-03-11,35,3,6\n",
        )
        .unwrap();
        assert_eq!(import_file(&ctx, &path).unwrap(), 2);

        let (item, records) = load_trends(&ctx, "FLT-OIL-9", TimeWindow::All, now()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(item.quantity, 35);
        assert_eq!(item.min_quantity, 3);
        assert_eq!(item.status(), StockStatus::InStock);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_import_older_than_synced_line_keeps_levels() {
        let ctx = test_context("import_older");
        let synced = StockItem {
            updated_at: Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap(),
            ..item("BRK-DSC-300", 18)
        };
        ctx.db
            .with_connection(|conn| queries::upsert_stock_item(conn, &synced))
            .unwrap();

        let dir = std::env::temp_dir().join("partsdesk_test_import_older_dir");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("BRK-DSC-300.csv");
        fs::write(
            &path,
            "date,quantity,min_quantity,alert_threshold\n2026-03-10,40,3,6\n2026-03-11,2,3,6\n",
        )
        .unwrap();

        assert_eq!(import_file(&ctx, &path).unwrap(), 2);
        let (item, records) = load_trends(&ctx, "BRK-DSC-300", TimeWindow::All, now()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(item.quantity, 18);
        assert_eq!(item.part_name, "Part BRK-DSC-300");
        assert_eq!(item.updated_at, synced.updated_at);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_import_updates_line_synced_without_stamp() {
        let ctx = test_context("import_unstamped");
        let synced: StockItem = serde_json::from_str(
            r#"{"id": 7, "reference": "SPK-PLG-4", "partName": "Spark plug", "quantity": 50}"#,
        )
        .unwrap();
        ctx.db
            .with_connection(|conn| queries::upsert_stock_item(conn, &synced))
            .unwrap();

        let dir = std::env::temp_dir().join("partsdesk_test_import_unstamped_dir");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("SPK-PLG-4.json");
        fs::write(&path, r#"[{"date": "2026-03-12T00:00:00Z", "quantity": 9, "min_quantity": 4}]"#).unwrap();

        import_file(&ctx, &path).unwrap();
        let (item, _) = load_trends(&ctx, "SPK-PLG-4", TimeWindow::All, now()).unwrap();
        assert_eq!(item.quantity, 9);
        assert_eq!(item.part_name, "Spark plug");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_attention_stock() {
        let ctx = test_context("attention");
        seed(&ctx, "SPK-PLG-4", &[40]);
        seed(&ctx, "BRK-PAD-220", &[20, 8]);
        seed(&ctx, "OIL-5W30", &[0]);

        let flagged: Vec<String> = attention_stock(&ctx)
            .unwrap()
            .into_iter()
            .map(|o| o.item.reference)
            .collect();
        assert_eq!(flagged, vec!["OIL-5W30".to_string(), "BRK-PAD-220".to_string()]);
    }

    #[test]
    fn test_delete_stock() {
        let ctx = test_context("delete");
        seed(&ctx, "BRK-PAD-220", &[100, 90, 80]);

        assert_eq!(delete_stock(&ctx, "BRK-PAD-220").unwrap(), 3);
        assert!(list_stock(&ctx, None, None).unwrap().is_empty());
        assert!(matches!(
            delete_stock(&ctx, "BRK-PAD-220"),
            Err(AppError::StockNotFound(_))
        ));
    }

    #[test]
    fn test_import_path_reports_bad_files() {
        let ctx = test_context("import_bad");
        let dir = std::env::temp_dir().join("partsdesk_test_import_bad_dir");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("BAD.json"), r#"[{"date": "2026-03-10T00:00:00Z", "quantity": -1}]"#).unwrap();
        fs::write(dir.join("GOOD.json"), r#"[{"date": "2026-03-10T00:00:00Z", "quantity": 1}]"#).unwrap();

        let summary = import_path(&ctx, &dir).unwrap();
        assert_eq!(summary.files, 1);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].0.ends_with("BAD.json"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_merge_latest_ignores_older_records() {
        let existing = item("A", 50);
        let older = StockTrendRecord::new(now() - ChronoDuration::days(3), 1, 1, 1);

        let merged = merge_latest(Some(existing.clone()), "A", &older);
        assert_eq!(merged, existing);
    }

    #[test]
    fn test_export_stock_csv_and_json() {
        let ctx = test_context("export");
        seed(&ctx, "BRK-PAD-220", &[100, 90, 80]);

        let csv_path = export_stock(&ctx, "BRK-PAD-220", TimeWindow::Last7Days, ExportFormat::Csv, None, now()).unwrap();
        assert!(csv_path.starts_with(&ctx.settings.export_dir));
        let content = fs::read_to_string(&csv_path).unwrap();
        assert_eq!(content.lines().count(), 4);

        let json_path = std::env::temp_dir().join("partsdesk_test_export_stock.json");
        export_stock(
            &ctx,
            "BRK-PAD-220",
            TimeWindow::Last7Days,
            ExportFormat::Json,
            Some(json_path.clone()),
            now(),
        )
        .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value["record_count"], 3);

        fs::remove_dir_all(&ctx.settings.export_dir).ok();
        fs::remove_file(&json_path).ok();
    }

    #[test]
    fn test_export_report_csv() {
        let ctx = test_context("export_report");
        seed(&ctx, "FAST", &[10, 6, 2]);

        let path = std::env::temp_dir().join("partsdesk_test_export_report.csv");
        export_report(&ctx, TimeWindow::All, ExportFormat::Csv, Some(path.clone()), now()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("FAST"));
        assert!(content.contains("error"));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_handle_watch_event() {
        let mut ctx = test_context("watch");
        ctx.settings.default_window = TimeWindow::All;
        let dir = std::env::temp_dir().join("partsdesk_test_watch_event_dir");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("OIL-5W30.json");
        fs::write(
            &path,
            r#"[{"date": "2026-03-10T00:00:00Z", "quantity": 10}, {"date": "2026-03-11T00:00:00Z", "quantity": 10}]"#,
        )
        .unwrap();

        let event = WatchEvent::TrendFileChanged {
            reference: "OIL-5W30".to_string(),
            path: path.clone(),
        };
        let report = handle_watch_event(&ctx, &event, now()).unwrap().unwrap();
        assert_eq!(report.analysis.filtered.len(), 2);
        assert!(report
            .analysis
            .statistics
            .unwrap()
            .days_until_depletion
            .is_unbounded());

        let removed = WatchEvent::TrendFileRemoved { path };
        assert!(handle_watch_event(&ctx, &removed, now()).unwrap().is_none());

        fs::remove_dir_all(&dir).ok();
    }
}
