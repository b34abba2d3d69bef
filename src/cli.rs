//! Command-line interface definitions for intact.
//!
//! This module defines all CLI arguments, subcommands, and options using
//! the clap derive API: global options (verbosity, color, store location)
//! and one subcommand per operating mode.
//!
//! # Example
//!
//! ```bash
//! # Record digests for everything under a directory
//! intact init ./docs
//!
//! # Verify later; non-zero exit on any modified/unknown/missing file
//! intact check ./docs
//!
//! # Accept a legitimate change
//! intact update ./docs/report.txt
//!
//! # Machine-readable check output, custom store location
//! intact --store /backups/.file_hashes.yml check ./docs --output json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::DEFAULT_STORE_FILE;

/// File integrity checker.
///
/// intact records a SHA-256 digest per tracked file in a human-readable
/// YAML store and recompares on demand, flagging modified, unknown, and
/// missing files.
#[derive(Debug, Parser)]
#[command(name = "intact")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Location of the hash store file
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        env = "INTACT_STORE",
        default_value = DEFAULT_STORE_FILE
    )]
    pub store: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for intact.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record digests for all files at or under a path
    Init(RecordArgs),
    /// Compare current digests against the recorded state
    Check(CheckArgs),
    /// Recompute and overwrite recorded digests after a legitimate change
    Update(RecordArgs),
}

/// Arguments shared by the init and update subcommands.
#[derive(Debug, Args)]
pub struct RecordArgs {
    /// File or directory to record
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Follow symbolic links during traversal (without this, symlinks are
    /// skipped, including a PATH that is itself a symlink)
    #[arg(long)]
    pub follow_symlinks: bool,
}

/// Arguments for the check subcommand.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// File or directory to verify
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Follow symbolic links during traversal (without this, symlinks are
    /// skipped, including a PATH that is itself a symlink)
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Output format (text for humans, json for scripting)
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output format for check reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable status lines
    Text,
    /// JSON report for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from(["intact", "init", "./docs"]).unwrap();
        match cli.command {
            Commands::Init(args) => {
                assert_eq!(args.path, PathBuf::from("./docs"));
                assert!(!args.follow_symlinks);
            }
            other => panic!("expected init, got {other:?}"),
        }
        assert_eq!(cli.store, PathBuf::from(DEFAULT_STORE_FILE));
    }

    #[test]
    fn test_parse_check_with_json_output() {
        let cli =
            Cli::try_parse_from(["intact", "check", "file.txt", "--output", "json"]).unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.output, OutputFormat::Json);
                assert_eq!(args.path, PathBuf::from("file.txt"));
            }
            other => panic!("expected check, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_store_override() {
        let cli =
            Cli::try_parse_from(["intact", "--store", "/tmp/h.yml", "update", "a.txt"]).unwrap();
        assert_eq!(cli.store, PathBuf::from("/tmp/h.yml"));
        assert!(matches!(cli.command, Commands::Update(_)));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["intact", "-q", "-v", "check", "a"]).is_err());
    }

    #[test]
    fn test_path_is_required() {
        assert!(Cli::try_parse_from(["intact", "init"]).is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
