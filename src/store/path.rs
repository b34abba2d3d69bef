//! Normalized store keys.
//!
//! # Overview
//!
//! [`StorePath`] is the key type of the hash store. Keys are normalized so
//! that init, check, and update agree on the identity of a file across
//! invocations and across hosts:
//!
//! - relative to the store base directory (the store file's parent), so the
//!   store stays portable when the tracked tree moves along with it;
//! - forward-slash separators regardless of host path convention;
//! - Unicode NFC form (macOS reports NFD filenames, Linux and Windows
//!   typically NFC; the same visual name must produce the same key).
//!
//! Paths outside the base directory cannot be expressed relative to it and
//! are kept in absolute form, normalized the same way.
//!
//! Normalization is lexical (`.` removed, `..` collapsed) rather than
//! symlink-resolving, so a tracked symlinked file keeps its name under the
//! base instead of silently becoming its target.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use unicode_normalization::UnicodeNormalization;

/// Errors from constructing a store key.
#[derive(thiserror::Error, Debug)]
pub enum StorePathError {
    /// The path is not valid Unicode and cannot be stored portably.
    #[error("Path is not valid Unicode: {0}")]
    NonUnicode(PathBuf),

    /// Normalization produced an empty key.
    #[error("Path normalizes to an empty store key: {0}")]
    Empty(PathBuf),

    /// The current directory could not be determined for a relative path.
    #[error("Failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// A validated, normalized store key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorePath(String);

impl StorePath {
    /// Build a store key for `path`, normalized relative to `base`.
    ///
    /// `base` must be an absolute directory path (the store file's parent,
    /// resolved once per invocation). `path` may be relative; it is resolved
    /// against the current directory first.
    ///
    /// # Errors
    ///
    /// Returns [`StorePathError`] for non-Unicode paths, keys that
    /// normalize to nothing, or an unresolvable current directory.
    pub fn from_base(base: &Path, path: &Path) -> Result<Self, StorePathError> {
        let rel = relative_to_base(base, path)?;
        if rel.as_os_str().is_empty() {
            return Err(StorePathError::Empty(path.to_path_buf()));
        }
        let key = to_slash_string(&rel).ok_or_else(|| {
            StorePathError::NonUnicode(path.to_path_buf())
        })?;
        Self::validate(key, path)
    }

    /// Build a store key from an already-normalized string.
    ///
    /// Used when deserializing the persisted store; re-applies NFC so keys
    /// written on a host with different conventions still compare equal.
    ///
    /// # Errors
    ///
    /// Returns [`StorePathError::Empty`] for an empty key.
    pub fn from_key(key: &str) -> Result<Self, StorePathError> {
        Self::validate(key.nfc().collect(), Path::new(key))
    }

    fn validate(key: String, origin: &Path) -> Result<Self, StorePathError> {
        if key.is_empty() {
            return Err(StorePathError::Empty(origin.to_path_buf()));
        }
        Ok(Self(key))
    }

    /// The normalized key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key kept its absolute form because the file lives
    /// outside the store base directory.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        // Unix root, or a Windows drive prefix like "c:/..."
        self.0.starts_with('/') || self.0.as_bytes().get(1) == Some(&b':')
    }

    /// Whether this key denotes `prefix` itself or a path below it.
    ///
    /// An empty prefix (the base directory itself) matches every
    /// base-relative key; absolute keys denote files outside the base and
    /// never match it.
    #[must_use]
    pub fn is_under(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return !self.is_absolute();
        }
        self.0 == prefix
            || self
                .0
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for StorePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StorePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_key(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute the normalized key prefix for a root path under `base`.
///
/// Returns an empty string when `root` is the base directory itself, which
/// [`StorePath::is_under`] treats as matching every key.
///
/// # Errors
///
/// Same failure modes as [`StorePath::from_base`].
pub fn key_prefix(base: &Path, root: &Path) -> Result<String, StorePathError> {
    let rel = relative_to_base(base, root)?;
    if rel.as_os_str().is_empty() {
        return Ok(String::new());
    }
    to_slash_string(&rel).ok_or_else(|| StorePathError::NonUnicode(root.to_path_buf()))
}

/// Resolve `path` against `base`: absolute + lexically normalized, then
/// made base-relative when possible.
fn relative_to_base(base: &Path, path: &Path) -> Result<PathBuf, StorePathError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(StorePathError::CurrentDir)?
            .join(path)
    };
    let normalized = lexical_normalize(&absolute);
    let normalized_base = lexical_normalize(base);

    match normalized.strip_prefix(&normalized_base) {
        Ok(rel) => Ok(rel.to_path_buf()),
        Err(_) => Ok(normalized),
    }
}

/// Remove `.` components and collapse `..` lexically.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Only pop a real name; keep roots and prefixes intact
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Render a path with forward-slash separators and NFC normalization.
fn to_slash_string(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::RootDir => parts.push(String::new()),
            other => parts.push(other.as_os_str().to_str()?.nfc().collect()),
        }
    }
    Some(parts.join("/"))
}
