//! The persisted path→digest mapping.
//!
//! # Overview
//!
//! [`HashStore`] is the last-known-good state of tracked files: a mapping
//! from a normalized [`StorePath`] key to its recorded [`Digest`]. The
//! store is the sole persisted state of the tool. Its lifecycle within one
//! command is load-at-start, mutate-in-memory, persist-at-end; `check`
//! never mutates or persists.
//!
//! The mapping is a `BTreeMap`, so iteration and the persisted YAML file
//! are key-sorted: saves are byte-deterministic and the file stays
//! diffable.
//!
//! Persistence lives in the [`io`] submodule (atomic save, advisory lock);
//! key normalization lives in [`path`].

pub mod io;
pub mod path;

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::digest::Digest;

pub use io::StoreLock;
pub use path::{key_prefix, StorePath, StorePathError};

/// In-memory mapping from normalized relative path to recorded digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashStore {
    entries: BTreeMap<StorePath, Digest>,
}

impl HashStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the recorded digest for a key.
    #[must_use]
    pub fn get(&self, path: &StorePath) -> Option<&Digest> {
        self.entries.get(path)
    }

    /// Record a digest for a key, overwriting any prior entry.
    pub fn insert(&mut self, path: StorePath, digest: Digest) -> Option<Digest> {
        self.entries.insert(path, digest)
    }

    /// Remove an entry, returning its digest if present.
    pub fn remove(&mut self, path: &StorePath) -> Option<Digest> {
        self.entries.remove(path)
    }

    /// Number of tracked entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StorePath, &Digest)> {
        self.entries.iter()
    }

    /// Keys at or below a normalized prefix, in key order.
    ///
    /// An empty prefix (the store base directory itself) matches every
    /// base-relative key; absolute keys for files outside the base are
    /// never included.
    pub fn keys_under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a StorePath> {
        self.entries
            .keys()
            .filter(move |key| key.is_under(prefix))
    }
}

impl FromIterator<(StorePath, Digest)> for HashStore {
    fn from_iter<I: IntoIterator<Item = (StorePath, Digest)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Errors from loading, saving, or locking the store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The store file exists but is not a well-formed path→digest mapping.
    #[error("Store file {path} is corrupt: {reason}")]
    Corrupt {
        /// Location of the malformed store file
        path: PathBuf,
        /// What failed to parse or validate
        reason: String,
    },

    /// Permission was denied when reading or writing the store.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Another invocation holds the store lock.
    #[error("Store is locked by another process: {0}")]
    Locked(PathBuf),

    /// An I/O error occurred while reading or writing the store.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
