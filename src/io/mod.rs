//! Input/output helpers.
//!
//! - CSV exports of records and per-date aggregates (`export`)

pub mod export;

pub use export::*;
