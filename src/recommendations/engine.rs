//! Recommendation engine
//!
//! Fixed-threshold mapping from depletion horizon and trend to a reorder
//! recommendation.

use super::types::{Recommendation, RecommendationKind};
use crate::trends::DepletionHorizon;

/// Cut-points of the depletion brackets, in days
mod thresholds {
    /// Below this, stockout is imminent
    pub const IMMINENT_DAYS: f64 = 3.0;
    /// Below this, stock is critical
    pub const CRITICAL_DAYS: f64 = 7.0;
    /// Below this, stock is low unless the trend is rising
    pub const LOW_DAYS: f64 = 14.0;
}

/// Recommend an action for a depletion horizon and signed trend
///
/// Each bracket includes its lower bound and excludes its upper bound.
pub fn recommend(horizon: DepletionHorizon, trend: f64) -> Recommendation {
    Recommendation::new(classify(horizon, trend))
}

fn classify(horizon: DepletionHorizon, trend: f64) -> RecommendationKind {
    let days = match horizon {
        DepletionHorizon::Unbounded => return RecommendationKind::NoConsumption,
        DepletionHorizon::Days(days) => days,
    };

    if days < thresholds::IMMINENT_DAYS {
        RecommendationKind::ImminentStockout
    } else if days < thresholds::CRITICAL_DAYS {
        RecommendationKind::CriticalStock
    } else if days < thresholds::LOW_DAYS {
        if trend > 0.0 {
            RecommendationKind::RisingTrend
        } else {
            RecommendationKind::LowStock
        }
    } else {
        RecommendationKind::Sufficient
    }
}
