//! Normalization of raw API records into [`RecordView`]s.
//!
//! The backend is lenient about what it stores, so this layer is strict on
//! our behalf: dates must parse, values must be finite, the tax type must
//! be one we know. A record that fails any of those checks is reported and
//! skipped instead of aborting the whole fetch.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;

use crate::domain::types::{RecordView, TaxRecord, TaxType};

/// A record that could not be normalized, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordError {
    pub id: String,
    pub message: String,
}

/// Outcome of normalizing one fetched batch.
#[derive(Debug, Clone, Default)]
pub struct NormalizedRecords {
    pub records: Vec<RecordView>,
    pub errors: Vec<RecordError>,
}

/// Normalize a fetched batch, collecting per-record failures separately.
pub fn normalize_records(raw: &[TaxRecord]) -> NormalizedRecords {
    let mut out = NormalizedRecords::default();
    for record in raw {
        match normalize_record(record) {
            Ok(view) => out.records.push(view),
            Err(message) => out.errors.push(RecordError {
                id: record.id.clone(),
                message,
            }),
        }
    }
    out
}

fn normalize_record(raw: &TaxRecord) -> Result<RecordView, String> {
    let from_date = parse_wire_date(&raw.from_date)
        .ok_or_else(|| format!("unparseable fromDate {:?}", raw.from_date))?;
    let to_date = parse_wire_date(&raw.to_date)
        .ok_or_else(|| format!("unparseable toDate {:?}", raw.to_date))?;
    let tax_type = TaxType::parse_wire(&raw.tax_type)
        .ok_or_else(|| format!("unknown tax type {:?}", raw.tax_type))?;
    Ok(RecordView {
        id: raw.id.clone(),
        from_date,
        to_date,
        from_value: decimal_field(raw.from_value, "fromValue")?,
        to_value: decimal_field(raw.to_value, "toValue")?,
        tax_type,
        tax_rate: decimal_field(raw.tax_rate, "taxRate")?,
        tax_amount: decimal_field(raw.tax_amount, "taxAmount")?,
    })
}

/// Parse a date the API may serve either as plain `YYYY-MM-DD` or as a
/// full RFC 3339 datetime. Only the calendar date is kept.
pub fn parse_wire_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

fn decimal_field(value: f64, field: &str) -> Result<Decimal, String> {
    if !value.is_finite() {
        return Err(format!("non-finite {field} {value}"));
    }
    Decimal::try_from(value).map_err(|_| format!("{field} {value} out of range"))
}
