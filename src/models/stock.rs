//! Stock line types
//!
//! Types backing the stock list: one row per part reference with its current
//! quantity and configured thresholds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stock line for one part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: i64,
    /// Part reference, unique across the catalogue
    pub reference: String,
    #[serde(alias = "partName")]
    pub part_name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub quantity: i64,
    #[serde(alias = "minQuantity", default)]
    pub min_quantity: i64,
    #[serde(alias = "alertThreshold", default)]
    pub alert_threshold: i64,
    /// Unix epoch when the source omits it, so any dated record is newer
    #[serde(alias = "updatedAt", default = "unknown_update")]
    pub updated_at: DateTime<Utc>,
}

fn unknown_update() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

impl StockItem {
    /// Classify the line against its thresholds
    pub fn status(&self) -> StockStatus {
        crate::stock::classify(self)
    }
}

/// Availability of a stock line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// Nothing on hand
    OutOfStock,
    /// At or below the reorder floor
    Low,
    /// At or below the alert line
    Alert,
    InStock,
}

impl StockStatus {
    /// Get display label for the status
    pub fn label(&self) -> &'static str {
        match self {
            Self::OutOfStock => "Out of stock",
            Self::Low => "Low stock",
            Self::Alert => "Alert",
            Self::InStock => "In stock",
        }
    }

    /// Whether the line needs attention on the stock screen
    pub fn needs_attention(&self) -> bool {
        !matches!(self, Self::InStock)
    }
}

impl std::str::FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "out_of_stock" | "out" => Ok(Self::OutOfStock),
            "low" => Ok(Self::Low),
            "alert" => Ok(Self::Alert),
            "in_stock" | "ok" => Ok(Self::InStock),
            _ => Err(format!(
                "Invalid stock status: {}. Use out_of_stock, low, alert or in_stock",
                s
            )),
        }
    }
}

/// Aggregate view over a set of stock lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub total_items: u32,
    pub total_quantity: i64,
    pub out_of_stock: u32,
    pub low_stock: u32,
    pub alert: u32,
    pub in_stock: u32,
}

impl StockSummary {
    /// Count one line into the summary
    pub fn add(&mut self, item: &StockItem) {
        self.total_items += 1;
        self.total_quantity += item.quantity.max(0);
        match item.status() {
            StockStatus::OutOfStock => self.out_of_stock += 1,
            StockStatus::Low => self.low_stock += 1,
            StockStatus::Alert => self.alert += 1,
            StockStatus::InStock => self.in_stock += 1,
        }
    }
}
