//! Stock list logic
//!
//! Classification of stock lines against their thresholds and the aggregate
//! figures shown above the stock table.

use crate::models::{StockItem, StockStatus, StockSummary};

/// Classify a stock line
///
/// Checks run from most to least severe: nothing on hand, at or below the
/// reorder floor, at or below the alert line.
pub fn classify(item: &StockItem) -> StockStatus {
    classify_levels(item.quantity, item.min_quantity, item.alert_threshold)
}

/// Classify a raw quantity against a reorder floor and an alert line
pub fn classify_levels(quantity: i64, min_quantity: i64, alert_threshold: i64) -> StockStatus {
    if quantity <= 0 {
        StockStatus::OutOfStock
    } else if quantity <= min_quantity {
        StockStatus::Low
    } else if quantity <= alert_threshold {
        StockStatus::Alert
    } else {
        StockStatus::InStock
    }
}

/// Aggregate a set of stock lines
pub fn summarize(items: &[StockItem]) -> StockSummary {
    let mut summary = StockSummary::default();
    for item in items {
        summary.add(item);
    }
    summary
}

/// Filter stock lines by a free-text query and an optional status
///
/// The query matches reference or part name, case-insensitively. An empty
/// query matches everything.
pub fn filter_items<'a>(
    items: &'a [StockItem],
    query: Option<&str>,
    status: Option<StockStatus>,
) -> Vec<&'a StockItem> {
    let needle = query.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty());

    items
        .iter()
        .filter(|item| match &needle {
            Some(q) => {
                item.reference.to_lowercase().contains(q)
                    || item.part_name.to_lowercase().contains(q)
            }
            None => true,
        })
        .filter(|item| status.map_or(true, |s| classify(item) == s))
        .collect()
}

/// Lines needing attention, emptiest first
pub fn low_stock_items(items: &[StockItem]) -> Vec<&StockItem> {
    let mut flagged: Vec<&StockItem> = items
        .iter()
        .filter(|item| classify(item).needs_attention())
        .collect();
    flagged.sort_by(|a, b| a.quantity.cmp(&b.quantity).then_with(|| a.reference.cmp(&b.reference)));
    flagged
}
