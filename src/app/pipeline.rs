//! Shared fetch-and-aggregate workflow used by the CLI front-end.
//!
//! Keeping this in one place avoids duplicating the core flow:
//! fetch -> normalize -> aggregate -> summarize
//!
//! The subcommands then focus on presentation (tables vs JSON vs CSV).
//! The TUI runs the same domain steps through [`crate::session`] instead,
//! because it re-fetches incrementally rather than once per invocation.

use crate::data::api::TaxApiClient;
use crate::domain::aggregate::{aggregate_by_date, summarize};
use crate::domain::normalize::{normalize_records, RecordError};
use crate::domain::types::{DateAggregate, GstSummary, RecordView};
use crate::error::AppError;
use crate::session::{failure_message, ApiOp};

/// Everything one fetch yields, normalized and rolled up.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub records: Vec<RecordView>,
    pub aggregates: Vec<DateAggregate>,
    pub summary: GstSummary,
    pub skipped: Vec<RecordError>,
}

/// Fetch the record list and compute every derived view of it.
pub fn load_workspace(client: &TaxApiClient) -> Result<Workspace, AppError> {
    let raw = client
        .list()
        .map_err(|e| AppError::runtime(failure_message(ApiOp::Fetch, &e)))?;
    let normalized = normalize_records(&raw);
    for skipped in &normalized.errors {
        log::warn!("skipping record {}: {}", skipped.id, skipped.message);
    }
    let aggregates = aggregate_by_date(&normalized.records);
    let summary = summarize(&normalized.records);
    Ok(Workspace {
        records: normalized.records,
        aggregates,
        summary,
        skipped: normalized.errors,
    })
}
