//! Store persistence: YAML load/save and advisory locking.
//!
//! The persisted form is a single YAML mapping, one `path: digest` line per
//! entry, key-sorted. It is meant to be read, diffed, and reviewed by
//! humans as well as machines.
//!
//! Saves are atomic: the new content is written to a temporary file in the
//! store's directory and renamed over the old file, so an interrupted save
//! never leaves a partially-written store behind.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use super::{HashStore, StoreError, StorePath};
use crate::digest::Digest;

impl HashStore {
    /// Load the store from `path`.
    ///
    /// A missing file is the first-run case and yields an empty store. A
    /// file that exists but does not parse as a path→digest mapping is a
    /// hard [`StoreError::Corrupt`] error; treating it as empty would mask
    /// data loss.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for unreadable or malformed store files.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No store at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(map_io_error(path, e)),
        };

        // Treat an all-whitespace file like a missing one; YAML would
        // otherwise parse it as null rather than an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let entries: BTreeMap<StorePath, Digest> =
            serde_yaml::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        log::debug!("Loaded {} entries from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    /// Persist the full mapping to `path`, replacing any prior content.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the temporary file cannot be written or
    /// renamed into place.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let yaml = serde_yaml::to_string(&self.entries).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other(e.to_string()),
        })?;

        let dir = store_dir(path);
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| map_io_error(path, e))?;
        tmp.write_all(yaml.as_bytes())
            .map_err(|e| map_io_error(path, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| map_io_error(path, e))?;
        tmp.persist(path)
            .map_err(|e| map_io_error(path, e.error))?;

        log::debug!("Saved {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }
}

/// Parent directory of the store file, defaulting to the current directory.
fn store_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn map_io_error(path: &Path, error: std::io::Error) -> StoreError {
    if error.kind() == std::io::ErrorKind::PermissionDenied {
        StoreError::PermissionDenied(path.to_path_buf())
    } else {
        StoreError::Io {
            path: path.to_path_buf(),
            source: error,
        }
    }
}

/// Advisory exclusive lock held for the load-mutate-save span of a
/// mutating command.
///
/// Locks a `<store>.lock` sidecar rather than the store file itself, so
/// the atomic rename in [`HashStore::save`] does not invalidate the locked
/// file handle. Released on drop, on every exit path.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Acquire the lock for the store at `store_path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] when another invocation holds the
    /// lock, or an I/O error if the lock file cannot be created.
    pub fn acquire(store_path: &Path) -> Result<Self, StoreError> {
        let path = lock_path(store_path);
        let file = File::options()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| map_io_error(&path, e))?;

        file.try_lock_exclusive().map_err(|e| {
            if e.kind() == std::io::ErrorKind::WouldBlock {
                StoreError::Locked(path.clone())
            } else {
                map_io_error(&path, e)
            }
        })?;

        log::trace!("Acquired store lock at {}", path.display());
        Ok(Self { file, path })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            log::warn!("Failed to release store lock {}: {}", self.path.display(), e);
        }
    }
}

/// Location of the lock sidecar for a store file.
pub(crate) fn lock_path(store_path: &Path) -> PathBuf {
    let mut name = store_path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    store_path.with_file_name(name)
}
