//! Trend analysis module
//!
//! This module turns a stock line's trend records into the figures shown on
//! the trend view:
//! - Lookback filtering (24h / 7d / 30d / 90d / all)
//! - Derived statistics and depletion horizon
//! - Chart series with a moving average of changes
//!
//! Everything here is pure and synchronous; records are supplied by the
//! store, the file importer or the HTTP source.

pub mod series;
pub mod stats;
pub mod window;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::StockTrendRecord;
use crate::recommendations::{recommend, Recommendation};

pub use series::{change_series, ChartPoint, DEFAULT_MOVING_AVERAGE_WINDOW};
pub use stats::{compute_statistics, successive_differences, DepletionHorizon, DerivedStatistics};
pub use window::{filter_records, TimeWindow};

/// Trend errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrendError {
    #[error("Invalid time window: {0}. Use 24h, 7d, 30d, 90d or all")]
    InvalidWindow(String),

    #[error("Negative quantity {quantity} recorded at {date}")]
    NegativeQuantity { date: DateTime<Utc>, quantity: i64 },
}

/// Result of analysing one stock line over a time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub window: TimeWindow,
    /// Records inside the window, ascending by date
    pub filtered: Vec<StockTrendRecord>,
    /// `None` exactly when `filtered` is empty
    pub statistics: Option<DerivedStatistics>,
    /// `None` exactly when `filtered` is empty
    pub recommendation: Option<Recommendation>,
}

impl TrendAnalysis {
    /// True when the window holds no records
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

/// Analyse a series ordered by ascending date
pub fn analyze(
    records: &[StockTrendRecord],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> TrendAnalysis {
    let filtered = filter_records(records, window, now);

    if filtered.is_empty() {
        tracing::debug!("No trend records inside the {} window", window);
        return TrendAnalysis {
            window,
            filtered,
            statistics: None,
            recommendation: None,
        };
    }

    let statistics = compute_statistics(&filtered);
    let recommendation = statistics
        .as_ref()
        .map(|s| recommend(s.days_until_depletion, s.trend));

    TrendAnalysis {
        window,
        filtered,
        statistics,
        recommendation,
    }
}

/// Validate and order records at an ingestion boundary
///
/// Rejects negative quantities and sorts by date. The sort is stable, so
/// records sharing a timestamp keep their input order.
pub fn normalize_records(
    mut records: Vec<StockTrendRecord>,
) -> Result<Vec<StockTrendRecord>, TrendError> {
    if let Some(bad) = records.iter().find(|r| r.quantity < 0) {
        return Err(TrendError::NegativeQuantity {
            date: bad.date,
            quantity: bad.quantity,
        });
    }

    records.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(records)
}
