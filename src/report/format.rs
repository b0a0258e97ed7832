//! Formatted terminal output and JSON payloads.
//!
//! We keep formatting code in one place so:
//! - the domain code stays clean and testable
//! - output changes are localized (important for future snapshot tests)
//!
//! Money renders with exactly two decimals everywhere; the underlying
//! [`Decimal`] values stay untouched.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::domain::types::{DateAggregate, GstSummary, RecordView};
use crate::error::AppError;

/// Render a monetary or rate value with two decimals, rounding halves
/// away from zero.
pub fn fmt_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// Format the per-record table, one row per stored record.
pub fn format_records_table(records: &[RecordView]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<26} {:<10} {:<10} {:>12} {:>12} {:<5} {:>8} {:>12}\n",
        "id", "from", "to", "from_value", "to_value", "type", "rate", "tax"
    ));
    out.push_str(&format!(
        "{:-<26} {:-<10} {:-<10} {:-<12} {:-<12} {:-<5} {:-<8} {:-<12}\n",
        "", "", "", "", "", "", "", ""
    ));
    for r in records {
        out.push_str(&format!(
            "{:<26} {:<10} {:<10} {:>12} {:>12} {:<5} {:>8} {:>12}\n",
            truncate(&r.id, 26),
            r.from_date,
            r.to_date,
            fmt_amount(r.from_value),
            fmt_amount(r.to_value),
            r.tax_type,
            fmt_amount(r.tax_rate),
            fmt_amount(r.tax_amount),
        ));
    }
    out
}

/// Format the per-date aggregate table, newest date first.
pub fn format_aggregates_table(aggregates: &[DateAggregate]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:>7} {:>12} {:>12} {:>10} {:>10} {:>10} {:>12}\n",
        "date", "records", "from_value", "to_value", "CGST", "SGST", "IGST", "total_tax"
    ));
    out.push_str(&format!(
        "{:-<10} {:-<7} {:-<12} {:-<12} {:-<10} {:-<10} {:-<10} {:-<12}\n",
        "", "", "", "", "", "", "", ""
    ));
    for a in aggregates {
        out.push_str(&format!(
            "{:<10} {:>7} {:>12} {:>12} {:>10} {:>10} {:>10} {:>12}\n",
            a.date,
            a.record_count(),
            fmt_amount(a.total_from_value),
            fmt_amount(a.total_to_value),
            fmt_amount(a.by_type.cgst),
            fmt_amount(a.by_type.sgst),
            fmt_amount(a.by_type.igst),
            fmt_amount(a.total_tax),
        ));
    }
    out
}

/// Format the GST summary block shown under the tables.
pub fn format_summary(summary: &GstSummary) -> String {
    let mut out = String::new();
    out.push_str("=== GST Summary ===\n");
    out.push_str(&format!("Total records: {}\n", summary.record_count));
    out.push_str(&format!("CGST:      \u{20b9}{}\n", fmt_amount(summary.by_type.cgst)));
    out.push_str(&format!("SGST:      \u{20b9}{}\n", fmt_amount(summary.by_type.sgst)));
    out.push_str(&format!("IGST:      \u{20b9}{}\n", fmt_amount(summary.by_type.igst)));
    out.push_str(&format!("Total tax: \u{20b9}{}\n", fmt_amount(summary.total_tax)));
    out
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordJson {
    id: String,
    from_date: String,
    to_date: String,
    from_value: String,
    to_value: String,
    tax_type: String,
    tax_rate: String,
    tax_amount: String,
}

impl RecordJson {
    fn from_view(r: &RecordView) -> Self {
        RecordJson {
            id: r.id.clone(),
            from_date: r.from_date.to_string(),
            to_date: r.to_date.to_string(),
            from_value: fmt_amount(r.from_value),
            to_value: fmt_amount(r.to_value),
            tax_type: r.tax_type.to_string(),
            tax_rate: fmt_amount(r.tax_rate),
            tax_amount: fmt_amount(r.tax_amount),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordsJson {
    count: usize,
    records: Vec<RecordJson>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DateJson {
    date: String,
    record_count: usize,
    total_from_value: String,
    total_to_value: String,
    cgst: String,
    sgst: String,
    igst: String,
    total_tax: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryJson {
    record_count: usize,
    cgst: String,
    sgst: String,
    igst: String,
    total_tax: String,
    dates: Vec<DateJson>,
}

/// JSON form of the record list, amounts pre-formatted to two decimals.
pub fn records_json(records: &[RecordView]) -> Result<String, AppError> {
    let payload = RecordsJson {
        count: records.len(),
        records: records.iter().map(RecordJson::from_view).collect(),
    };
    serde_json::to_string_pretty(&payload)
        .map_err(|e| AppError::runtime(format!("Failed to serialize records: {e}")))
}

/// JSON form of the summary plus per-date aggregates.
pub fn summary_json(summary: &GstSummary, aggregates: &[DateAggregate]) -> Result<String, AppError> {
    let payload = SummaryJson {
        record_count: summary.record_count,
        cgst: fmt_amount(summary.by_type.cgst),
        sgst: fmt_amount(summary.by_type.sgst),
        igst: fmt_amount(summary.by_type.igst),
        total_tax: fmt_amount(summary.total_tax),
        dates: aggregates
            .iter()
            .map(|a| DateJson {
                date: a.date.to_string(),
                record_count: a.record_count(),
                total_from_value: fmt_amount(a.total_from_value),
                total_to_value: fmt_amount(a.total_to_value),
                cgst: fmt_amount(a.by_type.cgst),
                sgst: fmt_amount(a.by_type.sgst),
                igst: fmt_amount(a.by_type.igst),
                total_tax: fmt_amount(a.total_tax),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&payload)
        .map_err(|e| AppError::runtime(format!("Failed to serialize summary: {e}")))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
