//! Command line front end
//!
//! Parses arguments, builds the [`AppContext`] and renders command results
//! as text or JSON.

use std::path::PathBuf;

use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use crate::api::ApiClient;
use crate::commands::{self, AppContext, StockOverview, StockTrendReport};
use crate::config::Settings;
use crate::export::ExportFormat;
use crate::models::{StockStatus, StockSummary};
use crate::recommendations::RecommendationSummary;
use crate::trends::TimeWindow;
use crate::AppError;

#[derive(Parser, Debug)]
#[command(name = "partsdesk")]
#[command(about = "Stock trend analytics and reorder recommendations")]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to <config_dir>/partsdesk/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Database file, overriding settings
    #[arg(long, global = true, env = "PARTSDESK_DB_PATH")]
    pub db: Option<PathBuf>,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// Print JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List stock lines
    List {
        /// Case-insensitive match on reference or part name
        #[arg(long, short)]
        query: Option<String>,
        /// out_of_stock, low, alert or in_stock
        #[arg(long, short)]
        status: Option<StockStatus>,
        /// Only lines needing attention, emptiest first
        #[arg(long, conflicts_with_all = ["query", "status"])]
        attention: bool,
    },
    /// Stock totals per status
    Summary,
    /// Trend statistics and recommendation for one stock line
    Analyze {
        reference: String,
        /// 24h, 7d, 30d, 90d or all
        #[arg(long, short)]
        window: Option<TimeWindow>,
    },
    /// Recommendations for every stock line
    Report {
        #[arg(long, short)]
        window: Option<TimeWindow>,
        /// Show only the first N lines
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Import a trend file or a directory of trend files
    Import { path: PathBuf },
    /// Delete a stock line and its trend history
    Delete { reference: String },
    /// Export one stock line, or the stock report with --report
    Export {
        /// Stock reference; omit with --report
        #[arg(required_unless_present = "report")]
        reference: Option<String>,
        #[arg(long, conflicts_with = "reference")]
        report: bool,
        #[arg(long, short)]
        window: Option<TimeWindow>,
        #[arg(long, short, default_value = "csv")]
        format: ExportFormat,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Pull stock lines and trends from the stock API
    Sync,
    /// Watch a directory and re-analyse on every trend file change
    Watch { dir: Option<PathBuf> },
}

fn load_settings(cli: &Cli) -> Result<Settings, AppError> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        settings.db_path = db.clone();
    }
    Ok(settings)
}

/// Run a parsed command line
pub fn execute(cli: Cli) -> Result<(), AppError> {
    let settings = load_settings(&cli)?;
    let json = cli.json;
    let ctx = AppContext::open(settings)?;
    let now = Utc::now();
    let default_window = ctx.settings.default_window;

    match cli.command {
        Command::List {
            query,
            status,
            attention,
        } => {
            let items = if attention {
                commands::attention_stock(&ctx)?
            } else {
                commands::list_stock(&ctx, query.as_deref(), status)?
            };
            output(json, &items, |items| print_stock_list(items))
        }
        Command::Summary => {
            let summary = commands::stock_summary(&ctx)?;
            output(json, &summary, print_summary)
        }
        Command::Analyze { reference, window } => {
            let window = window.unwrap_or(default_window);
            let report = commands::analyze_stock(&ctx, &reference, window, now)?;
            output(json, &report, print_trend_report)
        }
        Command::Report { window, limit } => {
            let window = window.unwrap_or(default_window);
            let mut report = commands::stock_report(&ctx, window, now)?;
            if let Some(n) = limit {
                report = report.limit(n);
            }
            output(json, &report, print_recommendations)
        }
        Command::Import { path } => {
            let summary = commands::import_path(&ctx, &path)?;
            output(json, &summary, |s| {
                println!("Imported {} records from {} files", s.records, s.files);
                for (path, reason) in &s.failed {
                    println!("  failed {}: {}", path.display(), reason);
                }
            })
        }
        Command::Delete { reference } => {
            let removed = commands::delete_stock(&ctx, &reference)?;
            output(json, &removed, |n| {
                println!("Deleted {} and {} trend records", reference, n)
            })
        }
        Command::Export {
            reference,
            report,
            window,
            format,
            output: target,
        } => {
            let window = window.unwrap_or(default_window);
            let path = match reference {
                Some(reference) if !report => {
                    commands::export_stock(&ctx, &reference, window, format, target, now)?
                }
                _ => commands::export_report(&ctx, window, format, target, now)?,
            };
            output(json, &path, |p| println!("Exported to {}", p.display()))
        }
        Command::Sync => {
            let client = ApiClient::new(&ctx.settings.api)?;
            let runtime = tokio::runtime::Runtime::new()?;
            let summary = runtime.block_on(commands::sync_from_api(&ctx, &client))?;
            output(json, &summary, |s| {
                println!("Synced {} stock lines, {} trend records", s.items, s.records);
                if !s.failed.is_empty() {
                    println!("  trends unavailable for: {}", s.failed.join(", "));
                }
            })
        }
        Command::Watch { dir } => {
            let dir = dir.unwrap_or_else(|| ctx.settings.import_dir.clone());
            std::fs::create_dir_all(&dir)?;
            println!("Watching {} (Ctrl-C to stop)", dir.display());
            commands::watch_imports(&ctx, &dir, |report| {
                if let Err(e) = output(json, report, print_trend_report) {
                    tracing::warn!("Failed to print analysis of {}: {}", report.item.reference, e);
                }
            })
        }
    }
}

fn output<T, F>(json: bool, value: &T, print: F) -> Result<(), AppError>
where
    T: Serialize,
    F: FnOnce(&T),
{
    if json {
        let rendered = serde_json::to_string_pretty(value)
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        println!("{}", rendered);
    } else {
        print(value);
    }
    Ok(())
}

// ============================================================================
// Text rendering
// ============================================================================

fn print_stock_list(items: &[StockOverview]) {
    if items.is_empty() {
        println!("No stock lines");
        return;
    }

    println!(
        "{:<16} {:<28} {:>8} {:>6} {:>6}  {}",
        "REFERENCE", "PART", "QTY", "MIN", "ALERT", "STATUS"
    );
    for overview in items {
        let item = &overview.item;
        println!(
            "{:<16} {:<28} {:>8} {:>6} {:>6}  {}",
            item.reference,
            item.part_name,
            item.quantity,
            item.min_quantity,
            item.alert_threshold,
            overview.status.label()
        );
    }
}

fn print_summary(summary: &StockSummary) {
    println!("Stock lines:    {}", summary.total_items);
    println!("Total quantity: {}", summary.total_quantity);
    println!("Out of stock:   {}", summary.out_of_stock);
    println!("Low stock:      {}", summary.low_stock);
    println!("Alert:          {}", summary.alert);
    println!("In stock:       {}", summary.in_stock);
}

fn print_trend_report(report: &StockTrendReport) {
    let item = &report.item;
    println!("{} - {} ({})", item.reference, item.part_name, report.analysis.window);

    let (Some(stats), Some(recommendation)) =
        (&report.analysis.statistics, &report.analysis.recommendation)
    else {
        println!("No data for this period");
        return;
    };

    println!("  Records:              {}", report.analysis.filtered.len());
    println!("  Current stock:        {}", stats.current_stock);
    println!("  Min / max:            {} / {}", stats.min_stock, stats.max_stock);
    println!("  Average consumption:  {:.2}", stats.avg_consumption);
    println!("  Trend:                {:+.2}", stats.trend);
    println!("  Last change:          {:+}", stats.last_change);
    println!("  Days until depletion: {}", stats.days_until_depletion);
    println!(
        "  [{}] {}",
        recommendation.severity.label(),
        recommendation.message
    );
}

fn print_recommendations(report: &RecommendationSummary) {
    if report.items.is_empty() && report.without_data.is_empty() {
        println!("No stock lines");
        return;
    }

    for item in &report.items {
        println!(
            "[{:<7}] {:<16} {:>8}  {:<16} {}",
            item.recommendation.severity.label(),
            item.reference,
            item.current_stock,
            item.days_until_depletion.to_string(),
            item.recommendation.message
        );
    }
    let to_order = report
        .items
        .iter()
        .filter(|item| item.recommendation.requires_order())
        .count();
    println!(
        "{} to order ({} urgent, {} to watch)",
        to_order, report.error_count, report.warning_count
    );
    if !report.without_data.is_empty() {
        println!("No data for: {}", report.without_data.join(", "));
    }
}
