//! Chart series
//!
//! Per-record points for the trend chart, with the change since the previous
//! record and a trailing moving average of those changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::StockTrendRecord;

/// Number of changes averaged when the caller has no preference
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 7;

/// One point of the trend chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: DateTime<Utc>,
    pub quantity: i64,
    pub min_quantity: i64,
    pub alert_threshold: i64,
    /// Change since the previous point, 0 for the first point
    pub change: i64,
    /// Mean of the last `window` changes ending at this point
    pub moving_avg_change: f64,
}

/// Build chart points for a series ordered by ascending date
pub fn change_series(records: &[StockTrendRecord], window: usize) -> Vec<ChartPoint> {
    let window = window.max(1);
    let mut changes: Vec<i64> = Vec::with_capacity(records.len());
    let mut points = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let change = if i == 0 {
            0
        } else {
            record.quantity - records[i - 1].quantity
        };
        if i > 0 {
            changes.push(change);
        }

        let start = changes.len().saturating_sub(window);
        let recent = &changes[start..];
        let moving_avg_change = if recent.is_empty() {
            0.0
        } else {
            recent.iter().sum::<i64>() as f64 / recent.len() as f64
        };

        points.push(ChartPoint {
            date: record.date,
            quantity: record.quantity,
            min_quantity: record.min_quantity,
            alert_threshold: record.alert_threshold,
            change,
            moving_avg_change,
        });
    }

    points
}
