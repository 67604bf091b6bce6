//! Recommendations module
//!
//! Maps a stock line's depletion horizon and trend to a reorder
//! recommendation, and collects recommendations across lines for the stock
//! report.

pub mod engine;
pub mod types;

// Re-export commonly used types
pub use engine::recommend;
pub use types::{ItemRecommendation, Recommendation, RecommendationKind, RecommendationSummary, Severity};
