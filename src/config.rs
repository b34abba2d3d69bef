//! Invocation settings.
//!
//! The store location is explicit configuration rather than a process-wide
//! constant: it flows from the CLI (flag, environment variable, or the
//! default hidden file in the invocation directory) into [`Settings`], and
//! from there into the reconciler and store. The normalization base for
//! store keys is derived from it: the store file's parent directory, so a
//! tracked tree stays verifiable when it moves together with its store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::walker::WalkerConfig;

/// Default store file name, relative to the invocation directory.
pub const DEFAULT_STORE_FILE: &str = ".file_hashes.yml";

/// Resolved settings for one command invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Absolute path of the store file.
    pub store_path: PathBuf,
    /// Base directory for key normalization (the store file's parent).
    pub base_dir: PathBuf,
    /// Walk options.
    pub walker: WalkerConfig,
}

impl Settings {
    /// Resolve settings from a possibly-relative store path.
    ///
    /// # Errors
    ///
    /// Fails when the current directory cannot be determined.
    pub fn new(store_path: &Path, walker: WalkerConfig) -> Result<Self> {
        let store_path = if store_path.is_absolute() {
            store_path.to_path_buf()
        } else {
            std::env::current_dir()
                .context("Failed to resolve current directory")?
                .join(store_path)
        };

        let base_dir = store_path
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);

        Ok(Self {
            store_path,
            base_dir,
            walker,
        })
    }
}
