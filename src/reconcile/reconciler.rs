//! Reconciler: orchestrates walker, digest engine, and hash store.
//!
//! # Failure semantics
//!
//! Root resolution failures and store load/save/lock failures abort the
//! whole command before any mutation is persisted. Per-file digest failures
//! inside a directory walk never abort the batch: they become
//! [`RecordFailure`] entries (init/update) or `Unreadable` statuses
//! (check) and the remaining files are still processed.
//!
//! The store is persisted exactly once, at the end of init/update, via an
//! atomic replace. An interrupted run therefore leaves the prior store
//! intact.

use std::collections::BTreeSet;
use std::path::Path;

use crate::config::Settings;
use crate::digest::digest_file;
use crate::store::{key_prefix, HashStore, StoreLock, StorePath};
use crate::walker::Walker;

use super::{CheckReport, FileReport, FileStatus, ReconcileError, RecordFailure, RecordOutcome};

/// Implements the init, check, and update modes against one store.
///
/// Owns the in-memory store exclusively for the duration of one command;
/// mutating commands additionally hold the advisory store lock.
#[derive(Debug)]
pub struct Reconciler {
    settings: Settings,
}

impl Reconciler {
    /// Create a reconciler for the given settings.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Record digests for every file at or under `root`.
    ///
    /// Overwrites prior entries for the walked files; entries outside the
    /// walked subtree are preserved. Idempotent for an unchanged file set.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when the root cannot be resolved or the
    /// store cannot be locked, loaded, or saved.
    pub fn init(&self, root: &Path) -> Result<RecordOutcome, ReconcileError> {
        log::info!("Initializing hashes under {}", root.display());
        self.record(root)
    }

    /// Recompute and overwrite digests for every file at or under `root`.
    ///
    /// Mechanically identical to [`Reconciler::init`]; semantically this
    /// accepts the current content as the new known-good state.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Reconciler::init`].
    pub fn update(&self, root: &Path) -> Result<RecordOutcome, ReconcileError> {
        log::info!("Updating hashes under {}", root.display());
        self.record(root)
    }

    /// Compare current digests under `root` against the recorded state.
    ///
    /// Never mutates or persists the store. Walked files are reported in
    /// path order; recorded entries under `root` whose files no longer
    /// exist follow as `Missing`, so a deleted file is never silently
    /// dropped from the report.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when the root cannot be resolved or the
    /// store cannot be loaded.
    pub fn check(&self, root: &Path) -> Result<CheckReport, ReconcileError> {
        log::info!("Checking hashes under {}", root.display());

        let files = self.walker(root).resolve()?;
        let store = HashStore::load(&self.settings.store_path)?;
        let own_keys = self.own_keys();

        let mut report = CheckReport::default();
        let mut walked = BTreeSet::new();

        for file in files {
            let key = self.store_key(&file);
            if own_keys.contains(&key) {
                log::debug!("Skipping store state file: {key}");
                continue;
            }
            walked.insert(key.clone());

            match digest_file(&file) {
                Ok(current) => {
                    let status = match store.get(&key) {
                        None => FileStatus::Unknown,
                        Some(recorded) if *recorded == current => FileStatus::Unmodified,
                        Some(_) => FileStatus::Modified,
                    };
                    report.push(FileReport::new(key, status));
                }
                Err(e) => {
                    log::warn!("Could not digest {}: {}", file.display(), e);
                    report.push(FileReport::unreadable(key, e.to_string()));
                }
            }
        }

        // Recorded entries under the checked root that were not walked:
        // their files are gone from disk.
        let prefix = key_prefix(&self.settings.base_dir, root)?;
        for key in store.keys_under(&prefix) {
            if !walked.contains(key) {
                log::debug!("Tracked file missing from disk: {key}");
                report.push(FileReport::new(key.clone(), FileStatus::Missing));
            }
        }

        Ok(report)
    }

    /// Shared implementation of init and update.
    fn record(&self, root: &Path) -> Result<RecordOutcome, ReconcileError> {
        let _lock = StoreLock::acquire(&self.settings.store_path)?;

        // Resolve before touching the store so a bad root fails fast
        // with no mutation.
        let files = self.walker(root).resolve()?;
        let mut store = HashStore::load(&self.settings.store_path)?;
        let own_keys = self.own_keys();

        let mut outcome = RecordOutcome::default();
        for file in files {
            let key = self.store_key(&file);
            if own_keys.contains(&key) {
                log::debug!("Skipping store state file: {key}");
                continue;
            }
            match digest_file(&file) {
                Ok(digest) => {
                    store.insert(key.clone(), digest);
                    outcome.recorded.push(key);
                }
                Err(e) => {
                    log::warn!("Could not digest {}: {}", file.display(), e);
                    outcome.failures.push(RecordFailure {
                        path: file,
                        reason: e.to_string(),
                    });
                }
            }
        }

        store.save(&self.settings.store_path)?;
        Ok(outcome)
    }

    fn walker(&self, root: &Path) -> Walker {
        Walker::new(root, self.settings.walker)
    }

    /// Keys of the tool's own state files (store and lock sidecar).
    ///
    /// These are never tracked: recording the store inside itself would
    /// change the store on every run and break init idempotence.
    fn own_keys(&self) -> Vec<StorePath> {
        let store_path = &self.settings.store_path;
        [
            store_path.clone(),
            crate::store::io::lock_path(store_path),
        ]
        .iter()
        .filter_map(|p| StorePath::from_base(&self.settings.base_dir, p).ok())
        .collect()
    }

    /// Store key for a walked file, with a lossy fallback for paths the
    /// normalizer rejects (non-Unicode names still get reported).
    fn store_key(&self, file: &Path) -> StorePath {
        StorePath::from_base(&self.settings.base_dir, file).unwrap_or_else(|e| {
            log::warn!("Falling back to lossy key for {}: {}", file.display(), e);
            let lossy = file.to_string_lossy().replace('\\', "/");
            StorePath::from_key(&lossy).unwrap_or_else(|_| {
                // A walked file always has a non-empty name
                StorePath::from_key("<invalid>").expect("literal key is non-empty")
            })
        })
    }
}
