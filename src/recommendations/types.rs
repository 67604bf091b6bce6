//! Recommendation types
//!
//! Data structures for reorder recommendations and the per-line report.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::trends::DepletionHorizon;

/// Severity of a recommendation, drives alert colouring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Ordinal rank: info and success share the lowest level
    pub fn rank(&self) -> u8 {
        match self {
            Self::Info | Self::Success => 0,
            Self::Warning => 1,
            Self::Error => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Which bracket of the engine produced a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    NoConsumption,
    ImminentStockout,
    CriticalStock,
    RisingTrend,
    LowStock,
    Sufficient,
}

impl RecommendationKind {
    /// Severity attached to this bracket
    pub fn severity(&self) -> Severity {
        match self {
            Self::NoConsumption | Self::RisingTrend => Severity::Info,
            Self::ImminentStockout => Severity::Error,
            Self::CriticalStock | Self::LowStock => Severity::Warning,
            Self::Sufficient => Severity::Success,
        }
    }

    /// Human message for this bracket
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoConsumption => "No consumption recorded.",
            Self::ImminentStockout => "Imminent stockout: order urgently.",
            Self::CriticalStock => "Critical stock: order soon.",
            Self::RisingTrend => "Sufficient stock, rising trend: monitor.",
            Self::LowStock => "Low stock: consider ordering.",
            Self::Sufficient => "Stock sufficient.",
        }
    }
}

/// A single recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub kind: RecommendationKind,
    pub message: String,
}

impl Recommendation {
    pub fn new(kind: RecommendationKind) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            message: kind.message().to_string(),
        }
    }

    /// Whether the recommendation asks for a purchase order
    pub fn requires_order(&self) -> bool {
        matches!(
            self.kind,
            RecommendationKind::ImminentStockout
                | RecommendationKind::CriticalStock
                | RecommendationKind::LowStock
        )
    }
}

/// Recommendation for one stock line in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecommendation {
    pub reference: String,
    pub part_name: String,
    pub current_stock: i64,
    pub days_until_depletion: DepletionHorizon,
    pub recommendation: Recommendation,
}

/// Summary of recommendations across stock lines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationSummary {
    /// Most severe first, then soonest depletion
    pub items: Vec<ItemRecommendation>,
    pub error_count: u32,
    pub warning_count: u32,
    /// Lines whose window held no records
    pub without_data: Vec<String>,
}

impl RecommendationSummary {
    /// Create a summary from per-line recommendations
    pub fn from_items(mut items: Vec<ItemRecommendation>, without_data: Vec<String>) -> Self {
        items.sort_by(compare_items);

        let error_count = items
            .iter()
            .filter(|i| i.recommendation.severity == Severity::Error)
            .count() as u32;
        let warning_count = items
            .iter()
            .filter(|i| i.recommendation.severity == Severity::Warning)
            .count() as u32;

        Self {
            items,
            error_count,
            warning_count,
            without_data,
        }
    }

    /// Limit to top N lines
    pub fn limit(mut self, n: usize) -> Self {
        self.items.truncate(n);
        Self::from_items(self.items, self.without_data)
    }
}

fn compare_items(a: &ItemRecommendation, b: &ItemRecommendation) -> Ordering {
    b.recommendation
        .severity
        .rank()
        .cmp(&a.recommendation.severity.rank())
        .then_with(|| compare_horizons(&a.days_until_depletion, &b.days_until_depletion))
        .then_with(|| a.reference.cmp(&b.reference))
}

/// Soonest first, unbounded last
fn compare_horizons(a: &DepletionHorizon, b: &DepletionHorizon) -> Ordering {
    match (a.days(), b.days()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(reference: &str, days: Option<f64>, kind: RecommendationKind) -> ItemRecommendation {
        ItemRecommendation {
            reference: reference.to_string(),
            part_name: format!("Part {}", reference),
            current_stock: 10,
            days_until_depletion: days.map_or(DepletionHorizon::Unbounded, DepletionHorizon::Days),
            recommendation: Recommendation::new(kind),
        }
    }

    #[test]
    fn test_severity_rank() {
        assert_eq!(Severity::Info.rank(), Severity::Success.rank());
        assert!(Severity::Warning.rank() > Severity::Success.rank());
        assert!(Severity::Error.rank() > Severity::Warning.rank());
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
        let parsed: Severity = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, Severity::Error);
    }

    #[test]
    fn test_recommendation_new_uses_bracket() {
        let rec = Recommendation::new(RecommendationKind::CriticalStock);
        assert_eq!(rec.severity, Severity::Warning);
        assert_eq!(rec.message, "Critical stock: order soon.");
        assert!(rec.requires_order());
        assert!(!Recommendation::new(RecommendationKind::RisingTrend).requires_order());
    }

    #[test]
    fn test_summary_sorting() {
        let summary = RecommendationSummary::from_items(
            vec![
                item("SAFE", Some(40.0), RecommendationKind::Sufficient),
                item("IDLE", None, RecommendationKind::NoConsumption),
                item("LOW", Some(9.0), RecommendationKind::LowStock),
                item("CRIT", Some(4.0), RecommendationKind::CriticalStock),
                item("NOW", Some(1.5), RecommendationKind::ImminentStockout),
            ],
            vec!["EMPTY".to_string()],
        );

        let order: Vec<&str> = summary.items.iter().map(|i| i.reference.as_str()).collect();
        assert_eq!(order, vec!["NOW", "CRIT", "LOW", "SAFE", "IDLE"]);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.warning_count, 2);
        assert_eq!(summary.without_data, vec!["EMPTY".to_string()]);
    }

    #[test]
    fn test_summary_limit() {
        let summary = RecommendationSummary::from_items(
            vec![
                item("A", Some(1.0), RecommendationKind::ImminentStockout),
                item("B", Some(20.0), RecommendationKind::Sufficient),
            ],
            vec![],
        )
        .limit(1);

        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.items[0].reference, "A");
        assert_eq!(summary.error_count, 1);
    }
}
