//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the API client
//! - dispatches to the interactive console or the one-shot subcommands

use std::io::{self, Write};
use std::time::Duration;

use clap::Parser;

use crate::cli::{AddArgs, ApiArgs, Cli, Command, RecordsArgs, RmArgs, SummaryArgs};
use crate::data::api::TaxApiClient;
use crate::domain::types::RecordDraft;
use crate::domain::validate::validate_draft;
use crate::error::AppError;
use crate::session::{failure_message, ApiOp, ADDED_OK, DELETED_OK};

pub mod pipeline;

/// Entry point for the `gst` binary.
pub fn run() -> Result<(), AppError> {
    // We want bare `gst` and `gst --api-url ...` to behave like `gst tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    // The console owns the terminal, so the logger only runs for one-shot
    // commands. RUST_LOG=debug traces each request.
    if !matches!(cli.command, Command::Tui(_)) {
        pretty_env_logger::init();
    }

    match cli.command {
        Command::Tui(args) => crate::tui::run(args),
        Command::Records(args) => handle_records(args),
        Command::Summary(args) => handle_summary(args),
        Command::Add(args) => handle_add(args),
        Command::Rm(args) => handle_rm(args),
    }
}

/// Build the API client a command will use, preferring the explicit flag
/// over the environment.
pub fn client_from(args: &ApiArgs) -> Result<TaxApiClient, AppError> {
    let timeout = Duration::from_secs(args.timeout_secs);
    match &args.api_url {
        Some(url) => TaxApiClient::new(url.clone(), timeout),
        None => TaxApiClient::from_env(timeout),
    }
}

fn handle_records(args: RecordsArgs) -> Result<(), AppError> {
    let client = client_from(&args.api)?;
    let workspace = pipeline::load_workspace(&client)?;

    if args.json {
        println!("{}", crate::report::records_json(&workspace.records)?);
    } else {
        print!("{}", crate::report::format_records_table(&workspace.records));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_records_csv(path, &workspace.records)?;
    }

    Ok(())
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let client = client_from(&args.api)?;
    let workspace = pipeline::load_workspace(&client)?;

    if args.json {
        println!(
            "{}",
            crate::report::summary_json(&workspace.summary, &workspace.aggregates)?
        );
    } else {
        print!(
            "{}",
            crate::report::format_aggregates_table(&workspace.aggregates)
        );
        println!();
        print!("{}", crate::report::format_summary(&workspace.summary));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_aggregates_csv(path, &workspace.aggregates)?;
    }

    Ok(())
}

fn handle_add(args: AddArgs) -> Result<(), AppError> {
    let client = client_from(&args.api)?;
    // The duplicate check runs against what the server already holds, so
    // fetch before validating.
    let workspace = pipeline::load_workspace(&client)?;

    let draft = RecordDraft {
        from_date: args.from_date,
        to_date: args.to_date,
        from_value: args.from_value,
        to_value: args.to_value,
        tax_type: args.tax_type,
        tax_rate: args.tax_rate,
    };
    let record =
        validate_draft(&draft, &workspace.records).map_err(|e| AppError::config(e.to_string()))?;

    client
        .create(&record)
        .map_err(|e| AppError::runtime(failure_message(ApiOp::Create, &e)))?;
    println!("{ADDED_OK}");
    Ok(())
}

fn handle_rm(args: RmArgs) -> Result<(), AppError> {
    let client = client_from(&args.api)?;

    if !args.yes {
        let proceed = confirm(&format!("Delete tax record {}? [y/N]: ", args.id))?;
        if !proceed {
            println!("Canceled.");
            return Ok(());
        }
    }

    client
        .delete(&args.id)
        .map_err(|e| AppError::runtime(failure_message(ApiOp::Delete, &e)))?;
    println!("{DELETED_OK}");
    Ok(())
}

/// One-line yes/no prompt; only an explicit `y` proceeds.
fn confirm(prompt: &str) -> Result<bool, AppError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|e| AppError::config(format!("Failed to write prompt: {e}")))?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| AppError::config(format!("Failed to read input: {e}")))?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Rewrite argv so `gst` defaults to `gst tui`.
///
/// Rules:
/// - `gst`                       -> `gst tui`
/// - `gst --api-url URL ...`     -> `gst tui --api-url URL ...`
/// - `gst --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "records" | "summary" | "add" | "rm");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_becomes_tui() {
        assert_eq!(rewrite_args(args(&["gst"])), args(&["gst", "tui"]));
    }

    #[test]
    fn leading_flag_is_routed_to_tui() {
        assert_eq!(
            rewrite_args(args(&["gst", "--api-url", "http://x"])),
            args(&["gst", "tui", "--api-url", "http://x"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(args(&["gst", "records", "--json"])),
            args(&["gst", "records", "--json"])
        );
        assert_eq!(rewrite_args(args(&["gst", "--help"])), args(&["gst", "--help"]));
    }
}
