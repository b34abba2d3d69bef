//! Path resolution: turn a root path into the set of files to process.
//!
//! # Overview
//!
//! [`Walker`] resolves a path to the regular files it denotes: the path
//! itself when it is a file, or every regular file under it when it is a
//! directory. Results are sorted so repeated runs (and test output) are
//! deterministic.
//!
//! Symlink policy: symlinks are skipped unless
//! [`WalkerConfig::follow_symlinks`] is set; when following, walkdir's
//! ancestor check prevents infinite recursion through symlink cycles. A
//! root that is itself a symlink resolves to an empty file set under the
//! skip policy, with a warning naming the skipped root.
//!
//! # Example
//!
//! ```no_run
//! use intact::walker::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for file in walker.resolve().unwrap() {
//!     println!("{}", file.display());
//! }
//! ```

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Configuration for path resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Cycles are detected by walkdir and reported as errors.
    pub follow_symlinks: bool,
}

/// Errors that can occur while resolving a path to its file set.
#[derive(thiserror::Error, Debug)]
pub enum WalkError {
    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when listing a directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred during traversal.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Resolves a root path into a deterministic list of regular files.
#[derive(Debug)]
pub struct Walker {
    /// Root path to resolve
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path.
    #[must_use]
    pub fn new(root: &Path, config: WalkerConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    /// Resolve the root into the list of regular files to process.
    ///
    /// Returns exactly the root when it is a regular file, or every regular
    /// file reachable by recursive descent when it is a directory. The list
    /// is sorted and exhaustive.
    ///
    /// # Errors
    ///
    /// Fails fast with [`WalkError::NotFound`] when the root does not exist
    /// and [`WalkError::PermissionDenied`] when a directory cannot be
    /// listed. Resolution is all-or-nothing: callers never see a partial
    /// file set alongside an error.
    pub fn resolve(&self) -> Result<Vec<PathBuf>, WalkError> {
        let metadata = std::fs::symlink_metadata(&self.root)
            .map_err(|e| self.map_io_error(&self.root, e))?;

        if metadata.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        // An explicitly named symlink root still honors the skip policy,
        // but silently; say so instead of reporting an empty walk.
        if metadata.file_type().is_symlink() && !self.config.follow_symlinks {
            log::warn!(
                "Root {} is a symlink and symlink following is disabled; nothing to process",
                self.root.display()
            );
            return Ok(Vec::new());
        }

        let walk = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walk {
            let entry = entry.map_err(|e| self.map_walkdir_error(e))?;
            let file_type = entry.file_type();

            if file_type.is_symlink() && !self.config.follow_symlinks {
                log::trace!("Skipping symlink: {}", entry.path().display());
                continue;
            }
            if !file_type.is_file() {
                continue;
            }
            files.push(entry.into_path());
        }

        // sort_by_file_name orders siblings; a full sort fixes the
        // interleaving of files and subdirectory contents as well.
        files.sort();
        Ok(files)
    }

    fn map_io_error(&self, path: &Path, error: std::io::Error) -> WalkError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => WalkError::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                WalkError::PermissionDenied(path.to_path_buf())
            }
            _ => WalkError::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    fn map_walkdir_error(&self, error: walkdir::Error) -> WalkError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        match error.into_io_error() {
            Some(io) => self.map_io_error(&path, io),
            None => {
                // Only non-I/O walkdir error is a symlink loop
                log::warn!("Symlink cycle detected at {}", path.display());
                WalkError::Io {
                    path: path.clone(),
                    source: std::io::Error::other("symlink cycle detected"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    /// Create a test directory with three files, one nested.
    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        let file1 = dir.path().join("file1.txt");
        writeln!(File::create(&file1).unwrap(), "Hello, world!").unwrap();

        let file2 = dir.path().join("file2.txt");
        writeln!(File::create(&file2).unwrap(), "Another file").unwrap();

        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        writeln!(File::create(subdir.join("nested.txt")).unwrap(), "Nested").unwrap();

        dir
    }

    #[test]
    fn test_resolve_directory_recursive() {
        let dir = create_test_dir();
        let walker = Walker::new(dir.path(), WalkerConfig::default());

        let files = walker.resolve().unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.iter().any(|p| p.ends_with("subdir/nested.txt")));
    }

    #[test]
    fn test_resolve_single_file() {
        let dir = create_test_dir();
        let target = dir.path().join("file1.txt");
        let walker = Walker::new(&target, WalkerConfig::default());

        let files = walker.resolve().unwrap();
        assert_eq!(files, vec![target]);
    }

    #[test]
    fn test_resolve_sorted_and_deterministic() {
        let dir = create_test_dir();
        let walker = Walker::new(dir.path(), WalkerConfig::default());

        let first = walker.resolve().unwrap();
        let second = walker.resolve().unwrap();
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(first, sorted);
    }

    #[test]
    fn test_resolve_missing_path() {
        let walker = Walker::new(
            Path::new("/nonexistent/path/12345"),
            WalkerConfig::default(),
        );
        let err = walker.resolve().unwrap_err();
        assert!(matches!(err, WalkError::NotFound(_)));
    }

    #[test]
    fn test_resolve_skips_empty_directories() {
        let dir = create_test_dir();
        fs::create_dir(dir.path().join("empty_dir")).unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files = walker.resolve().unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|p| p.is_file()));
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_skips_symlinks_by_default() {
        use std::os::unix::fs::symlink;

        let dir = create_test_dir();
        symlink(dir.path().join("file1.txt"), dir.path().join("link.txt")).unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files = walker.resolve().unwrap();
        assert_eq!(files.len(), 3);
        assert!(!files.iter().any(|p| p.ends_with("link.txt")));
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_follows_symlinks_when_configured() {
        use std::os::unix::fs::symlink;

        let dir = create_test_dir();
        symlink(dir.path().join("file1.txt"), dir.path().join("link.txt")).unwrap();

        let config = WalkerConfig {
            follow_symlinks: true,
        };
        let walker = Walker::new(dir.path(), config);
        let files = walker.resolve().unwrap();
        assert_eq!(files.len(), 4);
        assert!(files.iter().any(|p| p.ends_with("link.txt")));
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_root_yields_empty_set_by_default() {
        use std::os::unix::fs::symlink;

        let dir = create_test_dir();
        let link = dir.path().join("link.txt");
        symlink(dir.path().join("file1.txt"), &link).unwrap();

        let skipped = Walker::new(&link, WalkerConfig::default());
        assert!(skipped.resolve().unwrap().is_empty());

        let config = WalkerConfig {
            follow_symlinks: true,
        };
        let followed = Walker::new(&link, config);
        assert_eq!(followed.resolve().unwrap(), vec![link]);
    }

    #[test]
    fn test_resolve_includes_empty_files() {
        let dir = create_test_dir();
        File::create(dir.path().join("empty.txt")).unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files = walker.resolve().unwrap();
        assert_eq!(files.len(), 4);
    }
}
