//! Remote data access for the tax-record service.

pub mod api;

pub use api::{ApiError, TaxApiClient, DEFAULT_TIMEOUT_SECS};
