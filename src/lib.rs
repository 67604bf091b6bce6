//! Partsdesk - stock trend analytics backend
//!
//! This library provides the analytics behind the stock screen of an
//! auto-parts dashboard. It handles:
//! - Time-window filtering and derived statistics over stock trend records
//! - Reorder recommendations
//! - Stock list classification
//! - SQLite storage, file import, HTTP sync and CSV/JSON export
//! - Import directory watching for live recomputation

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod parser;
pub mod recommendations;
pub mod stock;
pub mod trends;
pub mod watcher;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Error type for commands
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] db::DbError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Parser error: {0}")]
    Parser(#[from] parser::ParserError),

    #[error("Export error: {0}")]
    Export(#[from] export::ExportError),

    #[error("API error: {0}")]
    Api(#[from] api::ApiError),

    #[error("Watcher error: {0}")]
    Watcher(#[from] watcher::WatcherError),

    #[error(transparent)]
    Trend(#[from] trends::TrendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stock line not found: {0}")]
    StockNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// Errors are reported as plain strings in JSON output
impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `-v`.
pub fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed when embedded; keep it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

// ============================================================================
// Application entry point
// ============================================================================

pub fn run() -> ExitCode {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    tracing::debug!("Starting partsdesk");

    match cli::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
