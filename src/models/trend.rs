//! Stock trend record types
//!
//! A trend record is one time-stamped snapshot of a stock line: the on-hand
//! quantity together with the thresholds configured at that moment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of a stock line's quantity and thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockTrendRecord {
    /// Observation timestamp (RFC 3339 on the wire)
    pub date: DateTime<Utc>,
    /// On-hand quantity at `date`
    pub quantity: i64,
    /// Reorder floor configured at `date`
    #[serde(alias = "minQuantity", default)]
    pub min_quantity: i64,
    /// Alert line configured at `date`
    #[serde(alias = "alertThreshold", default)]
    pub alert_threshold: i64,
}

impl StockTrendRecord {
    pub fn new(date: DateTime<Utc>, quantity: i64, min_quantity: i64, alert_threshold: i64) -> Self {
        Self {
            date,
            quantity,
            min_quantity,
            alert_threshold,
        }
    }
}
