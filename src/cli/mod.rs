//! Command-line parsing for the GST entry console.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the domain code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::api::DEFAULT_TIMEOUT_SECS;
use crate::domain::TaxType;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gst", version, about = "GST entry console for a remote tax-record service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive console (the default when no subcommand is given).
    ///
    /// The console combines the entry form, both record tables, and the GST
    /// summary in one screen, talking to the same API as the subcommands.
    Tui(ApiArgs),
    /// Fetch and print the individual record table.
    Records(RecordsArgs),
    /// Fetch and print per-date aggregates plus the GST summary.
    Summary(SummaryArgs),
    /// Validate a new tax record and submit it.
    Add(AddArgs),
    /// Delete a record by id.
    Rm(RmArgs),
}

/// Options shared by every command that talks to the API.
#[derive(Debug, Parser, Clone)]
pub struct ApiArgs {
    /// Base URL of the tax API (overrides TAX_API_URL from the environment/.env).
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

/// Options for `gst records`.
#[derive(Debug, Parser)]
pub struct RecordsArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Also write the records to a CSV file.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Options for `gst summary`.
#[derive(Debug, Parser)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// Print JSON instead of tables.
    #[arg(long)]
    pub json: bool,

    /// Also write the per-date aggregates to a CSV file.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Options for `gst add`.
///
/// Values are taken as raw strings and run through the same validation as
/// the interactive form, so both surfaces reject input identically.
#[derive(Debug, Parser)]
pub struct AddArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// Period start (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub from_date: String,

    /// Period end (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub to_date: String,

    /// Value at the start of the period.
    #[arg(long, value_name = "AMOUNT")]
    pub from_value: String,

    /// Value at the end of the period; must exceed the from value.
    #[arg(long, value_name = "AMOUNT")]
    pub to_value: String,

    /// GST component (cgst, sgst, igst).
    #[arg(long, value_enum)]
    pub tax_type: TaxType,

    /// Tax rate percentage (0-100).
    #[arg(long, value_name = "RATE", default_value = "18")]
    pub tax_rate: String,
}

/// Options for `gst rm`.
#[derive(Debug, Parser)]
pub struct RmArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// Id of the record to delete.
    pub id: String,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long)]
    pub yes: bool,
}
