//! intact - File Integrity Checker
//!
//! A cross-platform Rust CLI that detects modification of tracked files by
//! recording a SHA-256 digest per file in a human-readable YAML store and
//! recomparing on demand. Three modes: `init` records, `check` verifies
//! without mutating, `update` accepts changed content as the new
//! known-good state.

pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod logging;
pub mod reconcile;
pub mod report;
pub mod store;
pub mod walker;

use anyhow::Result;

use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::Settings;
use crate::error::ExitCode;
use crate::reconcile::{CheckReport, Reconciler, RecordOutcome};
use crate::report::RecordMode;
use crate::walker::WalkerConfig;

/// Run the application logic for parsed CLI arguments.
///
/// Prints reports to stdout and returns the exit code the process should
/// end with. Fatal failures (bad root path, corrupt store, lock
/// contention) come back as errors for `main` to render.
///
/// # Errors
///
/// Returns an error for any failure that aborts the whole command.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    if cli.no_color {
        yansi::disable();
    }

    match cli.command {
        Commands::Init(args) => {
            let settings = Settings::new(
                &cli.store,
                WalkerConfig {
                    follow_symlinks: args.follow_symlinks,
                },
            )?;
            let outcome = Reconciler::new(settings).init(&args.path)?;
            finish_record(&outcome, RecordMode::Init, cli.quiet)
        }
        Commands::Update(args) => {
            let settings = Settings::new(
                &cli.store,
                WalkerConfig {
                    follow_symlinks: args.follow_symlinks,
                },
            )?;
            let outcome = Reconciler::new(settings).update(&args.path)?;
            finish_record(&outcome, RecordMode::Update, cli.quiet)
        }
        Commands::Check(args) => {
            let settings = Settings::new(
                &cli.store,
                WalkerConfig {
                    follow_symlinks: args.follow_symlinks,
                },
            )?;
            let report = Reconciler::new(settings).check(&args.path)?;

            if !cli.quiet {
                match args.output {
                    OutputFormat::Text => print!("{}", report::render_check_text(&report)),
                    OutputFormat::Json => println!("{}", report::render_check_json(&report)?),
                }
            }
            Ok(check_exit_code(&report))
        }
    }
}

fn finish_record(outcome: &RecordOutcome, mode: RecordMode, quiet: bool) -> Result<ExitCode> {
    if !quiet {
        print!("{}", report::render_record_text(outcome, mode));
    }
    if outcome.is_complete() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::PartialSuccess)
    }
}

/// Exit-code policy for a check: drift beats partial success.
fn check_exit_code(report: &CheckReport) -> ExitCode {
    if report.has_drift() {
        ExitCode::DriftDetected
    } else if report.has_unreadable() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    }
}
