//! Rendering of per-file status lines and command summaries.
//!
//! Text output is one line per file (status label, then path), followed by
//! a summary line. Status labels are colored through `yansi` unless color
//! is disabled for the process. Check reports can also be rendered as JSON
//! for pipelines.

use std::fmt::Write as _;

use yansi::{Paint, Style};

use crate::reconcile::{CheckReport, FileStatus, RecordOutcome};

/// Which mutating command produced a [`RecordOutcome`].
///
/// Init and update are mechanically identical; only the user-facing
/// phrasing differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordMode {
    /// First-time recording of digests.
    Init,
    /// Accepting changed content as the new known-good state.
    Update,
}

fn status_style(status: FileStatus) -> Style {
    match status {
        FileStatus::Unmodified => Style::new().green(),
        FileStatus::Modified | FileStatus::Missing => Style::new().red(),
        FileStatus::Unknown | FileStatus::Unreadable => Style::new().yellow(),
    }
}

/// Render a check report as human-readable text.
#[must_use]
pub fn render_check_text(report: &CheckReport) -> String {
    let mut out = String::new();

    for file in &report.files {
        let label = file.status.label().paint(status_style(file.status));
        match &file.detail {
            Some(detail) => {
                let _ = writeln!(out, "{label:<10}  {} ({detail})", file.path);
            }
            None => {
                let _ = writeln!(out, "{label:<10}  {}", file.path);
            }
        }
    }

    let counts = &report.counts;
    let _ = writeln!(
        out,
        "Checked {} file(s): {} unmodified, {} modified, {} unknown, {} missing, {} unreadable",
        counts.total(),
        counts.unmodified,
        counts.modified,
        counts.unknown,
        counts.missing,
        counts.unreadable
    );

    if report.all_unmodified() {
        let _ = writeln!(out, "{}", "All files unmodified.".paint(Style::new().green()));
    } else if report.has_drift() {
        let _ = writeln!(out, "{}", "Integrity drift detected.".paint(Style::new().red()));
    }

    out
}

/// Render a check report as pretty-printed JSON.
///
/// # Errors
///
/// Fails only if serialization fails, which a well-formed report never
/// does.
pub fn render_check_json(report: &CheckReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render an init/update outcome as human-readable text.
#[must_use]
pub fn render_record_text(outcome: &RecordOutcome, mode: RecordMode) -> String {
    let mut out = String::new();

    let recorded_label = "Recorded".paint(Style::new().green());
    for key in &outcome.recorded {
        let _ = writeln!(out, "{recorded_label:<10}  {key}");
    }
    let unreadable_label = "Unreadable".paint(Style::new().yellow());
    for failure in &outcome.failures {
        let _ = writeln!(
            out,
            "{unreadable_label:<10}  {} ({})",
            failure.path.display(),
            failure.reason
        );
    }

    let summary = match mode {
        RecordMode::Init => "Hashes stored successfully.",
        RecordMode::Update => "Hash updated successfully.",
    };
    let _ = writeln!(out, "{summary} ({} file(s) recorded)", outcome.recorded.len());

    if !outcome.failures.is_empty() {
        let _ = writeln!(
            out,
            "{} file(s) could not be read and were not recorded.",
            outcome.failures.len()
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::reconcile::Reconciler;
    use crate::walker::WalkerConfig;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn reconciler_in(dir: &TempDir) -> Reconciler {
        let settings =
            Settings::new(&dir.path().join(".file_hashes.yml"), WalkerConfig::default()).unwrap();
        Reconciler::new(settings)
    }

    fn write_file(path: &std::path::Path, content: &str) {
        File::create(path)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
    }

    #[test]
    fn test_check_text_contains_status_and_path() {
        yansi::disable();
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("a.txt"), "a");

        let reconciler = reconciler_in(&dir);
        reconciler.init(dir.path()).unwrap();
        let report = reconciler.check(dir.path()).unwrap();

        let text = render_check_text(&report);
        assert!(text.contains("Unmodified"));
        assert!(text.contains("a.txt"));
        assert!(text.contains("Checked 1 file(s)"));
        assert!(text.contains("All files unmodified."));
    }

    #[test]
    fn test_check_text_flags_drift() {
        yansi::disable();
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        write_file(&file, "a");

        let reconciler = reconciler_in(&dir);
        reconciler.init(&file).unwrap();
        write_file(&file, "changed");
        let report = reconciler.check(&file).unwrap();

        let text = render_check_text(&report);
        assert!(text.contains("Modified"));
        assert!(text.contains("Integrity drift detected."));
    }

    #[test]
    fn test_check_json_is_machine_readable() {
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("a.txt"), "a");

        let reconciler = reconciler_in(&dir);
        reconciler.init(dir.path()).unwrap();
        let report = reconciler.check(dir.path()).unwrap();

        let json = render_check_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["counts"]["unmodified"], 1);
        assert_eq!(value["files"][0]["status"], "unmodified");
    }

    #[test]
    fn test_record_text_phrasing_differs_by_mode() {
        yansi::disable();
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("a.txt"), "a");

        let reconciler = reconciler_in(&dir);
        let outcome = reconciler.init(dir.path()).unwrap();

        let init_text = render_record_text(&outcome, RecordMode::Init);
        assert!(init_text.contains("Hashes stored successfully."));
        assert!(init_text.contains("a.txt"));

        let update_text = render_record_text(&outcome, RecordMode::Update);
        assert!(update_text.contains("Hash updated successfully."));
    }
}
