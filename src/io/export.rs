//! Export records and aggregates to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts, so money fields carry the same two-decimal form the tables show.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::types::{DateAggregate, RecordView};
use crate::error::AppError;
use crate::report::format::fmt_amount;

/// Write the individual record list to a CSV file.
pub fn write_records_csv(path: &Path, records: &[RecordView]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::config(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(
        file,
        "id,from_date,to_date,from_value,to_value,tax_type,tax_rate,tax_amount"
    )
    .map_err(|e| AppError::runtime(format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{}",
            r.id,
            r.from_date,
            r.to_date,
            fmt_amount(r.from_value),
            fmt_amount(r.to_value),
            r.tax_type,
            fmt_amount(r.tax_rate),
            fmt_amount(r.tax_amount),
        )
        .map_err(|e| AppError::runtime(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write the per-date aggregate table to a CSV file.
pub fn write_aggregates_csv(path: &Path, aggregates: &[DateAggregate]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::config(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(
        file,
        "date,record_count,total_from_value,total_to_value,cgst,sgst,igst,total_tax"
    )
    .map_err(|e| AppError::runtime(format!("Failed to write export CSV header: {e}")))?;

    for a in aggregates {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{}",
            a.date,
            a.record_count(),
            fmt_amount(a.total_from_value),
            fmt_amount(a.total_to_value),
            fmt_amount(a.by_type.cgst),
            fmt_amount(a.by_type.sgst),
            fmt_amount(a.by_type.igst),
            fmt_amount(a.total_tax),
        )
        .map_err(|e| AppError::runtime(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
