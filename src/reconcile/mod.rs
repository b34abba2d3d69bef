//! Reconciliation of current file digests against the hash store.
//!
//! # Overview
//!
//! This module implements the three operating modes:
//!
//! 1. **init**: digest every file under a path and record the results
//! 2. **check**: digest every file under a path and compare against the
//!    recorded state, without mutating it
//! 3. **update**: recompute and overwrite recorded digests after a
//!    legitimate change
//!
//! Each mode is a complete, stateless command invocation: nothing persists
//! between runs except the store file itself.
//!
//! The types here ([`FileStatus`], [`FileReport`], [`CheckReport`],
//! [`RecordOutcome`]) are the structured results the reporting layer
//! renders; the orchestration lives in [`reconciler`].

pub mod reconciler;

use std::path::PathBuf;

use serde::Serialize;

use crate::store::path::StorePathError;
use crate::store::{StoreError, StorePath};
use crate::walker::WalkError;

pub use reconciler::Reconciler;

/// Outcome of comparing one file against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Current digest matches the recorded digest.
    Unmodified,
    /// Current digest differs from the recorded digest.
    Modified,
    /// No recorded digest exists for this file (never initialized).
    /// Deliberately distinct from [`FileStatus::Modified`].
    Unknown,
    /// A recorded entry whose file no longer exists on disk.
    Missing,
    /// The file exists but could not be digested (read failure).
    Unreadable,
}

impl FileStatus {
    /// Human-readable label used in report lines.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unmodified => "Unmodified",
            Self::Modified => "Modified",
            Self::Unknown => "Unknown",
            Self::Missing => "Missing",
            Self::Unreadable => "Unreadable",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-file result of a check.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Normalized store key of the file.
    pub path: StorePath,
    /// Comparison outcome.
    pub status: FileStatus,
    /// Failure detail for [`FileStatus::Unreadable`] entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl FileReport {
    fn new(path: StorePath, status: FileStatus) -> Self {
        Self {
            path,
            status,
            detail: None,
        }
    }

    fn unreadable(path: StorePath, detail: String) -> Self {
        Self {
            path,
            status: FileStatus::Unreadable,
            detail: Some(detail),
        }
    }
}

/// Per-status tallies for a check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Files whose digests matched.
    pub unmodified: usize,
    /// Files whose digests differed.
    pub modified: usize,
    /// Files with no recorded digest.
    pub unknown: usize,
    /// Recorded entries absent from disk.
    pub missing: usize,
    /// Files that could not be read.
    pub unreadable: usize,
}

impl StatusCounts {
    fn record(&mut self, status: FileStatus) {
        match status {
            FileStatus::Unmodified => self.unmodified += 1,
            FileStatus::Modified => self.modified += 1,
            FileStatus::Unknown => self.unknown += 1,
            FileStatus::Missing => self.missing += 1,
            FileStatus::Unreadable => self.unreadable += 1,
        }
    }

    /// Total files reported.
    #[must_use]
    pub fn total(&self) -> usize {
        self.unmodified + self.modified + self.unknown + self.missing + self.unreadable
    }
}

/// Structured result of a check invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    /// Per-file results: walked files in path order, then missing entries.
    pub files: Vec<FileReport>,
    /// Per-status tallies.
    pub counts: StatusCounts,
}

impl CheckReport {
    fn push(&mut self, report: FileReport) {
        self.counts.record(report.status);
        self.files.push(report);
    }

    /// Whether every reported file was unmodified.
    #[must_use]
    pub fn all_unmodified(&self) -> bool {
        self.counts.total() == self.counts.unmodified
    }

    /// Whether any file drifted from the recorded state: modified, never
    /// initialized, or missing from disk.
    #[must_use]
    pub fn has_drift(&self) -> bool {
        self.counts.modified + self.counts.unknown + self.counts.missing > 0
    }

    /// Whether any file could not be read during the check.
    #[must_use]
    pub fn has_unreadable(&self) -> bool {
        self.counts.unreadable > 0
    }
}

/// A file that could not be recorded during init/update.
#[derive(Debug)]
pub struct RecordFailure {
    /// Path of the file that failed.
    pub path: PathBuf,
    /// Why it failed.
    pub reason: String,
}

/// Structured result of an init or update invocation.
#[derive(Debug, Default)]
pub struct RecordOutcome {
    /// Store keys recorded, in path order.
    pub recorded: Vec<StorePath>,
    /// Files that could not be digested; reported, never fatal.
    pub failures: Vec<RecordFailure>,
}

impl RecordOutcome {
    /// Whether every resolved file was recorded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Errors that abort a whole reconcile command.
///
/// Per-file digest failures never surface here; they are recovered into
/// [`RecordOutcome::failures`] or [`FileStatus::Unreadable`] entries.
#[derive(thiserror::Error, Debug)]
pub enum ReconcileError {
    /// The root path could not be resolved to a file set.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// The store could not be loaded, saved, or locked.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A path could not be turned into a store key.
    #[error(transparent)]
    Path(#[from] StorePathError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> StorePath {
        StorePath::from_key(s).unwrap()
    }

    #[test]
    fn test_counts_and_aggregates() {
        let mut report = CheckReport::default();
        report.push(FileReport::new(key("a"), FileStatus::Unmodified));
        report.push(FileReport::new(key("b"), FileStatus::Modified));
        report.push(FileReport::new(key("c"), FileStatus::Unknown));

        assert_eq!(report.counts.total(), 3);
        assert!(!report.all_unmodified());
        assert!(report.has_drift());
        assert!(!report.has_unreadable());
    }

    #[test]
    fn test_all_unmodified() {
        let mut report = CheckReport::default();
        report.push(FileReport::new(key("a"), FileStatus::Unmodified));
        assert!(report.all_unmodified());
        assert!(!report.has_drift());
    }

    #[test]
    fn test_unreadable_is_not_drift() {
        let mut report = CheckReport::default();
        report.push(FileReport::new(key("a"), FileStatus::Unmodified));
        report.push(FileReport::unreadable(key("b"), "boom".into()));

        assert!(!report.has_drift());
        assert!(report.has_unreadable());
        assert!(!report.all_unmodified());
    }

    #[test]
    fn test_missing_is_drift() {
        let mut report = CheckReport::default();
        report.push(FileReport::new(key("gone"), FileStatus::Missing));
        assert!(report.has_drift());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(FileStatus::Unmodified.to_string(), "Unmodified");
        assert_eq!(FileStatus::Unreadable.to_string(), "Unreadable");
    }

    #[test]
    fn test_report_serializes_to_json() {
        let mut report = CheckReport::default();
        report.push(FileReport::new(key("a.txt"), FileStatus::Modified));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"status\":\"modified\""));
        assert!(json.contains("\"a.txt\""));
        // No detail field for non-unreadable entries
        assert!(!json.contains("detail"));
    }
}
