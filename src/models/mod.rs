//! Data models module
//!
//! Contains the data structures shared across the application:
//! - Stock items as listed on the stock screen
//! - Time-stamped stock trend records

pub mod stock;
pub mod trend;

pub use stock::{StockItem, StockStatus, StockSummary};
pub use trend::StockTrendRecord;
