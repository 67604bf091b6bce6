//! Database query implementations
//!
//! Contains functions for storing and querying stock lines and their trend
//! records. Timestamps are stored as RFC 3339 text in UTC with millisecond
//! precision so that lexical order matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::DbError;
use crate::models::{StockItem, StockTrendRecord};

/// Format a timestamp for storage
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(column: &'static str, value: String) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DbError::InvalidTimestamp { column, value })
}

/// Raw stock row before timestamp conversion
struct StockRow {
    id: i64,
    reference: String,
    part_name: String,
    location: Option<String>,
    quantity: i64,
    min_quantity: i64,
    alert_threshold: i64,
    updated_at: String,
}

impl StockRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            reference: row.get(1)?,
            part_name: row.get(2)?,
            location: row.get(3)?,
            quantity: row.get(4)?,
            min_quantity: row.get(5)?,
            alert_threshold: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_item(self) -> Result<StockItem, DbError> {
        Ok(StockItem {
            id: self.id,
            reference: self.reference,
            part_name: self.part_name,
            location: self.location,
            quantity: self.quantity,
            min_quantity: self.min_quantity,
            alert_threshold: self.alert_threshold,
            updated_at: parse_timestamp("updated_at", self.updated_at)?,
        })
    }
}

const STOCK_COLUMNS: &str =
    "id, reference, part_name, location, quantity, min_quantity, alert_threshold, updated_at";

/// Insert a stock line or update the one sharing its reference
///
/// The `id` field of `item` is ignored. Returns the stored row id.
pub fn upsert_stock_item(conn: &Connection, item: &StockItem) -> Result<i64, DbError> {
    conn.execute(
        r#"
        INSERT INTO stock_items
            (reference, part_name, location, quantity, min_quantity, alert_threshold, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(reference) DO UPDATE SET
            part_name = excluded.part_name,
            location = excluded.location,
            quantity = excluded.quantity,
            min_quantity = excluded.min_quantity,
            alert_threshold = excluded.alert_threshold,
            updated_at = excluded.updated_at
        "#,
        params![
            item.reference,
            item.part_name,
            item.location,
            item.quantity,
            item.min_quantity,
            item.alert_threshold,
            format_timestamp(&item.updated_at),
        ],
    )?;

    let id = conn.query_row(
        "SELECT id FROM stock_items WHERE reference = ?1",
        params![item.reference],
        |row| row.get(0),
    )?;

    Ok(id)
}

/// Get all stock lines ordered by reference
pub fn get_stock_items(conn: &Connection) -> Result<Vec<StockItem>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM stock_items ORDER BY reference",
        STOCK_COLUMNS
    ))?;

    let rows = stmt
        .query_map([], StockRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(StockRow::into_item).collect()
}

/// Get a single stock line by part reference
pub fn get_stock_item_by_reference(
    conn: &Connection,
    reference: &str,
) -> Result<Option<StockItem>, DbError> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM stock_items WHERE reference = ?1", STOCK_COLUMNS),
            params![reference],
            StockRow::from_row,
        )
        .optional()?;

    row.map(StockRow::into_item).transpose()
}

/// Delete a stock line and, through the cascade, its trend records
pub fn delete_stock_item(conn: &Connection, reference: &str) -> Result<bool, DbError> {
    let deleted = conn.execute(
        "DELETE FROM stock_items WHERE reference = ?1",
        params![reference],
    )?;
    Ok(deleted > 0)
}

/// Store trend records for a stock line in a single transaction
///
/// A record with the same timestamp as an existing one replaces it.
pub fn insert_trend_records(
    conn: &Connection,
    stock_id: i64,
    records: &[StockTrendRecord],
) -> Result<usize, DbError> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            r#"
            INSERT OR REPLACE INTO stock_trends
                (stock_id, recorded_at, quantity, min_quantity, alert_threshold)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )?;

        for record in records {
            stmt.execute(params![
                stock_id,
                format_timestamp(&record.date),
                record.quantity,
                record.min_quantity,
                record.alert_threshold,
            ])?;
        }
    }
    tx.commit()?;

    Ok(records.len())
}

/// Get trend records for a stock line in ascending date order
///
/// With `since`, only records strictly after that instant are returned.
pub fn get_trend_records(
    conn: &Connection,
    stock_id: i64,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<StockTrendRecord>, DbError> {
    let since = since.map(|ts| format_timestamp(&ts));

    let mut stmt = conn.prepare(
        r#"
        SELECT recorded_at, quantity, min_quantity, alert_threshold
        FROM stock_trends
        WHERE stock_id = ?1 AND (?2 IS NULL OR recorded_at > ?2)
        ORDER BY recorded_at ASC, id ASC
        "#,
    )?;

    let rows = stmt
        .query_map(params![stock_id, since], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(recorded_at, quantity, min_quantity, alert_threshold)| {
            Ok(StockTrendRecord {
                date: parse_timestamp("recorded_at", recorded_at)?,
                quantity,
                min_quantity,
                alert_threshold,
            })
        })
        .collect()
}

/// Count trend records stored for a stock line
pub fn count_trend_records(conn: &Connection, stock_id: i64) -> Result<i64, DbError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM stock_trends WHERE stock_id = ?1",
        params![stock_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
