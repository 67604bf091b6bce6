//! Trend statistics
//!
//! Derived figures for a filtered trend series: extrema, average movement,
//! signed trend and the depletion horizon.

use serde::{Deserialize, Serialize};

use crate::models::StockTrendRecord;

/// Estimated time until the stock line runs dry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum DepletionHorizon {
    /// No movement recorded, depletion cannot be projected
    Unbounded,
    /// Days at the current average consumption rate
    Days(f64),
}

impl DepletionHorizon {
    /// Number of days, `None` when unbounded
    pub fn days(&self) -> Option<f64> {
        match self {
            Self::Unbounded => None,
            Self::Days(days) => Some(*days),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl std::fmt::Display for DepletionHorizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unbounded => f.write_str("not calculable"),
            Self::Days(days) => write!(f, "{:.1} days", days),
        }
    }
}

/// Figures derived from a trend series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStatistics {
    /// Quantity of the most recent record
    pub current_stock: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    /// Mean absolute change between successive records
    pub avg_consumption: f64,
    pub days_until_depletion: DepletionHorizon,
    /// Mean signed change, positive when stock is rising
    pub trend: f64,
    /// Most recent change, 0 for a single record
    pub last_change: i64,
}

/// Changes between successive quantities, `quantity[i] - quantity[i-1]`
pub fn successive_differences(records: &[StockTrendRecord]) -> Vec<i64> {
    records
        .windows(2)
        .map(|pair| pair[1].quantity - pair[0].quantity)
        .collect()
}

/// Compute statistics for a series ordered by ascending date
///
/// Returns `None` for an empty series; callers show a "no data" state
/// instead.
pub fn compute_statistics(records: &[StockTrendRecord]) -> Option<DerivedStatistics> {
    let last = records.last()?;
    let min_stock = records.iter().map(|r| r.quantity).min()?;
    let max_stock = records.iter().map(|r| r.quantity).max()?;

    let diffs = successive_differences(records);
    let (avg_consumption, trend) = if diffs.is_empty() {
        (0.0, 0.0)
    } else {
        let n = diffs.len() as f64;
        let absolute: f64 = diffs.iter().map(|d| d.abs() as f64).sum();
        let signed: f64 = diffs.iter().map(|&d| d as f64).sum();
        (absolute / n, signed / n)
    };

    let current_stock = last.quantity;
    let days_until_depletion = if avg_consumption > 0.0 {
        DepletionHorizon::Days(current_stock as f64 / avg_consumption)
    } else {
        DepletionHorizon::Unbounded
    };

    Some(DerivedStatistics {
        current_stock,
        min_stock,
        max_stock,
        avg_consumption,
        days_until_depletion,
        trend,
        last_change: diffs.last().copied().unwrap_or(0),
    })
}
