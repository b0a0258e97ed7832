//! Shared domain types for GST records.
//!
//! Two record shapes exist on purpose. [`TaxRecord`] is the raw wire form
//! exactly as the API returns it (string dates, float values), while
//! [`RecordView`] is the normalized form the rest of the crate works with
//! (parsed dates, [`Decimal`] values). Conversion between the two lives in
//! [`crate::domain::normalize`] so that one malformed record never poisons
//! a whole fetch.

use chrono::NaiveDate;
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GST component a record is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaxType {
    /// Central GST.
    Cgst,
    /// State GST.
    Sgst,
    /// Integrated GST.
    Igst,
}

impl TaxType {
    pub const ALL: [TaxType; 3] = [TaxType::Cgst, TaxType::Sgst, TaxType::Igst];

    /// Spelling used by the API and in every user-facing surface.
    pub fn display_name(self) -> &'static str {
        match self {
            TaxType::Cgst => "CGST",
            TaxType::Sgst => "SGST",
            TaxType::Igst => "IGST",
        }
    }

    /// Parse the wire spelling, tolerating case and surrounding whitespace.
    pub fn parse_wire(s: &str) -> Option<TaxType> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CGST" => Some(TaxType::Cgst),
            "SGST" => Some(TaxType::Sgst),
            "IGST" => Some(TaxType::Igst),
            _ => None,
        }
    }

    pub fn next(self) -> TaxType {
        match self {
            TaxType::Cgst => TaxType::Sgst,
            TaxType::Sgst => TaxType::Igst,
            TaxType::Igst => TaxType::Cgst,
        }
    }

    pub fn prev(self) -> TaxType {
        match self {
            TaxType::Cgst => TaxType::Igst,
            TaxType::Sgst => TaxType::Cgst,
            TaxType::Igst => TaxType::Sgst,
        }
    }
}

impl std::fmt::Display for TaxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A tax record exactly as the API serves it.
///
/// Dates arrive as strings (plain `YYYY-MM-DD` or a full RFC 3339 datetime,
/// depending on how the backend stored them) and the tax type is left as
/// free text. Nothing here is validated beyond JSON well-formedness.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub from_date: String,
    pub to_date: String,
    pub from_value: f64,
    pub to_value: f64,
    pub tax_type: String,
    pub tax_rate: f64,
    pub tax_amount: f64,
}

/// A normalized tax record, ready for aggregation and display.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordView {
    pub id: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub from_value: Decimal,
    pub to_value: Decimal,
    pub tax_type: TaxType,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
}

/// A validated record that has not been submitted yet.
///
/// Serializes to the exact shape the `POST /tax` endpoint expects:
/// camelCase keys, ISO dates, numeric values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub from_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub to_value: Decimal,
    pub tax_type: TaxType,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
}

/// Unsubmitted form input, kept as the raw strings the user typed.
///
/// Turning a draft into a [`NewRecord`] is the job of
/// [`crate::domain::validate::validate_draft`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub from_date: String,
    pub to_date: String,
    pub from_value: String,
    pub to_value: String,
    pub tax_type: TaxType,
    pub tax_rate: String,
}

impl Default for RecordDraft {
    fn default() -> Self {
        RecordDraft {
            from_date: String::new(),
            to_date: String::new(),
            from_value: String::new(),
            to_value: String::new(),
            tax_type: TaxType::Cgst,
            // The form opens pre-filled with the standard GST rate.
            tax_rate: "18".to_string(),
        }
    }
}

/// Tax amounts split by GST component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeTotals {
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
}

impl TypeTotals {
    pub fn add(&mut self, tax_type: TaxType, amount: Decimal) {
        match tax_type {
            TaxType::Cgst => self.cgst += amount,
            TaxType::Sgst => self.sgst += amount,
            TaxType::Igst => self.igst += amount,
        }
    }

    pub fn get(&self, tax_type: TaxType) -> Decimal {
        match tax_type {
            TaxType::Cgst => self.cgst,
            TaxType::Sgst => self.sgst,
            TaxType::Igst => self.igst,
        }
    }
}

/// Every record sharing one period start date, with running totals.
///
/// Totals accumulate at full precision; rounding to two decimals happens
/// only when a value is formatted for display or export.
#[derive(Debug, Clone, PartialEq)]
pub struct DateAggregate {
    pub date: NaiveDate,
    pub records: Vec<RecordView>,
    pub total_tax: Decimal,
    pub total_from_value: Decimal,
    pub total_to_value: Decimal,
    pub by_type: TypeTotals,
}

impl DateAggregate {
    pub fn empty(date: NaiveDate) -> Self {
        DateAggregate {
            date,
            records: Vec::new(),
            total_tax: Decimal::ZERO,
            total_from_value: Decimal::ZERO,
            total_to_value: Decimal::ZERO,
            by_type: TypeTotals::default(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// Whole-dataset totals shown in the GST summary block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GstSummary {
    pub record_count: usize,
    pub by_type: TypeTotals,
    pub total_tax: Decimal,
}
