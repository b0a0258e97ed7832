//! Session state machine shared by the TUI and exercised directly in tests.
//!
//! All state lives in [`SessionState`]; every change flows through
//! [`apply`] as an [`Action`]. `apply` never touches the network itself.
//! It returns the [`Effect`]s the caller must perform (fetch, create,
//! delete), and the caller feeds each outcome back in as another action.
//! That keeps the update rules pure and testable without a server.

use crate::data::api::ApiError;
use crate::domain::aggregate::{aggregate_by_date, summarize};
use crate::domain::normalize::{normalize_records, RecordError};
use crate::domain::types::{DateAggregate, GstSummary, NewRecord, RecordDraft, RecordView, TaxRecord};
use crate::domain::validate::validate_draft;

/// Message shown when a fetch fails and the server offered no wording.
pub const FETCH_FAILED: &str = "Failed to fetch tax records. Please try again later.";
/// Message shown when a submit fails for reasons other than bad input.
pub const CREATE_FAILED: &str = "Failed to calculate tax. Please try again.";
/// Message shown for a 4xx submit rejection without a server message.
pub const INVALID_DATA: &str = "Invalid data submitted. Please check your inputs.";
/// Message shown when a delete fails and the server offered no wording.
pub const DELETE_FAILED: &str = "Failed to delete tax calculation. Please try again.";

/// Confirmation shown after a successful submit.
pub const ADDED_OK: &str = "Tax calculation added successfully!";
/// Confirmation shown after a successful delete.
pub const DELETED_OK: &str = "Tax calculation deleted successfully!";

/// Which request is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Busy {
    Fetching,
    Submitting,
    Deleting,
}

impl Busy {
    pub fn label(self) -> &'static str {
        match self {
            Busy::Fetching => "Fetching tax records...",
            Busy::Submitting => "Submitting tax calculation...",
            Busy::Deleting => "Deleting tax calculation...",
        }
    }
}

/// Everything the screen needs to render, in one place.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Normalized records from the last successful fetch.
    pub records: Vec<RecordView>,
    /// Per-date rollup of `records`, newest date first.
    pub aggregates: Vec<DateAggregate>,
    /// Whole-dataset totals.
    pub summary: GstSummary,
    /// Records the last fetch returned but we could not normalize.
    pub skipped: Vec<RecordError>,
    /// Current error banner, if any.
    pub error: Option<String>,
    /// Current success banner, if any.
    pub notice: Option<String>,
    /// In-flight request, if any.
    pub busy: Option<Busy>,
    /// True once at least one fetch has succeeded.
    pub loaded: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One thing that happened: a key the user pressed resolved into intent,
/// or a request finished.
#[derive(Debug)]
pub enum Action {
    /// Reload the record list from the server.
    Refresh,
    FetchFinished(Result<Vec<TaxRecord>, ApiError>),
    /// Validate the draft and, if clean, submit it.
    Submit(RecordDraft),
    SubmitFinished(Result<(), ApiError>),
    /// Delete a record the user has already confirmed.
    Delete(String),
    DeleteFinished(Result<(), ApiError>),
    /// Drop the current error/notice banners.
    Dismiss,
}

/// Work the caller must perform after an [`apply`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchRecords,
    CreateRecord(NewRecord),
    DeleteRecord(String),
}

/// Advance the session by one action.
pub fn apply(state: &mut SessionState, action: Action) -> Vec<Effect> {
    match action {
        Action::Refresh => {
            if state.busy.is_some() {
                return Vec::new();
            }
            state.busy = Some(Busy::Fetching);
            state.notice = None;
            vec![Effect::FetchRecords]
        }
        Action::FetchFinished(result) => {
            state.busy = None;
            match result {
                Ok(raw) => {
                    let normalized = normalize_records(&raw);
                    state.records = normalized.records;
                    state.aggregates = aggregate_by_date(&state.records);
                    state.summary = summarize(&state.records);
                    state.skipped = normalized.errors;
                    state.error = None;
                    state.loaded = true;
                }
                Err(err) => {
                    // Keep whatever was on screen; only the banner changes.
                    state.error = Some(failure_message(ApiOp::Fetch, &err));
                }
            }
            Vec::new()
        }
        Action::Submit(draft) => {
            if state.busy.is_some() {
                return Vec::new();
            }
            state.notice = None;
            match validate_draft(&draft, &state.records) {
                Ok(record) => {
                    state.error = None;
                    state.busy = Some(Busy::Submitting);
                    vec![Effect::CreateRecord(record)]
                }
                Err(err) => {
                    state.error = Some(err.to_string());
                    Vec::new()
                }
            }
        }
        Action::SubmitFinished(result) => match result {
            Ok(()) => {
                state.notice = Some(ADDED_OK.to_string());
                state.error = None;
                state.busy = Some(Busy::Fetching);
                vec![Effect::FetchRecords]
            }
            Err(err) => {
                state.busy = None;
                state.error = Some(failure_message(ApiOp::Create, &err));
                Vec::new()
            }
        },
        Action::Delete(id) => {
            if state.busy.is_some() {
                return Vec::new();
            }
            state.notice = None;
            state.error = None;
            state.busy = Some(Busy::Deleting);
            vec![Effect::DeleteRecord(id)]
        }
        Action::DeleteFinished(result) => match result {
            Ok(()) => {
                state.notice = Some(DELETED_OK.to_string());
                state.error = None;
                state.busy = Some(Busy::Fetching);
                vec![Effect::FetchRecords]
            }
            Err(err) => {
                state.busy = None;
                state.error = Some(failure_message(ApiOp::Delete, &err));
                Vec::new()
            }
        },
        Action::Dismiss => {
            state.error = None;
            state.notice = None;
            Vec::new()
        }
    }
}

/// Which API call a failure came from, for choosing the fallback wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOp {
    Fetch,
    Create,
    Delete,
}

/// Turn an [`ApiError`] into the banner text for one operation.
///
/// A message the server attached wins and is shown verbatim. Otherwise a
/// 4xx submit rejection becomes the "invalid data" hint, and everything
/// else falls back to a per-operation generic message.
pub fn failure_message(op: ApiOp, err: &ApiError) -> String {
    if let Some(message) = err.server_message() {
        return message.to_string();
    }
    match op {
        ApiOp::Fetch => FETCH_FAILED.to_string(),
        ApiOp::Create => match err.status() {
            Some(code) if (400..500).contains(&code) => INVALID_DATA.to_string(),
            _ => CREATE_FAILED.to_string(),
        },
        ApiOp::Delete => DELETE_FAILED.to_string(),
    }
}
