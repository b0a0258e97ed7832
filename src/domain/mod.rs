//! Core domain logic: record types, normalization, aggregation, validation.
//!
//! Everything in this module is pure. Network access stays in
//! [`crate::data`] and presentation in [`crate::report`] and
//! [`crate::tui`], so the rules in here can be tested without either.

pub mod aggregate;
pub mod normalize;
pub mod types;
pub mod validate;

pub use aggregate::{aggregate_by_date, summarize};
pub use normalize::{normalize_records, NormalizedRecords, RecordError};
pub use types::{
    DateAggregate, GstSummary, NewRecord, RecordDraft, RecordView, TaxRecord, TaxType, TypeTotals,
};
pub use validate::{validate_draft, DraftError};
