//! CSV export functionality
//!
//! Provides CSV serialization for trend records and the stock report.

use std::path::Path;

use csv::Writer;
use serde::Serialize;

use super::{ExportError, ExportableRecord, ExportableReportRow};

fn write_rows<T: Serialize>(rows: &[T], path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    let mut writer = Writer::from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write trend records to CSV format
pub fn write_records_csv(records: &[ExportableRecord], path: &Path) -> Result<(), ExportError> {
    write_rows(records, path)
}

/// Write the stock report to CSV format
pub fn write_report_csv(rows: &[ExportableReportRow], path: &Path) -> Result<(), ExportError> {
    write_rows(rows, path)
}
