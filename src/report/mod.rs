//! Terminal and JSON rendering of records, aggregates, and totals.

pub mod format;

pub use format::*;
