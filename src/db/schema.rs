//! Database schema definitions
//!
//! Contains SQL for creating all tables and indexes

use rusqlite::Connection;
use super::DbError;

/// SQL schema for all tables
const SCHEMA: &str = r#"
-- Stock lines, one per part reference
CREATE TABLE IF NOT EXISTS stock_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reference TEXT NOT NULL UNIQUE,
    part_name TEXT NOT NULL,
    location TEXT,
    quantity INTEGER NOT NULL DEFAULT 0,
    min_quantity INTEGER NOT NULL DEFAULT 0,
    alert_threshold INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_stock_items_quantity ON stock_items(quantity);

-- Time-stamped quantity snapshots
CREATE TABLE IF NOT EXISTS stock_trends (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    stock_id INTEGER NOT NULL REFERENCES stock_items(id) ON DELETE CASCADE,
    recorded_at TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    min_quantity INTEGER NOT NULL DEFAULT 0,
    alert_threshold INTEGER NOT NULL DEFAULT 0,
    UNIQUE(stock_id, recorded_at)
);

CREATE INDEX IF NOT EXISTS idx_stock_trends_time ON stock_trends(stock_id, recorded_at);
"#;

/// Create all database tables
pub fn create_tables(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
