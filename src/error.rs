//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the intact CLI.
///
/// - 0: Success (all checked files unmodified, or recording completed)
/// - 1: General error (unexpected failure, bad root path, corrupt store)
/// - 2: Drift detected (some file was modified, unknown, or missing)
/// - 3: Partial success (completed, but some files could not be read)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the command completed and nothing drifted.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// Drift: a checked file was modified, unknown, or missing.
    DriftDetected = 2,
    /// Partial success: completed with some unreadable files.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "IC000",
            Self::GeneralError => "IC001",
            Self::DriftDetected => "IC002",
            Self::PartialSuccess => "IC003",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "IC001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
