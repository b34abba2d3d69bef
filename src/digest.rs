//! SHA-256 content digests with streaming file hashing.
//!
//! # Overview
//!
//! This module provides the [`Digest`] value type (a validated 256-bit
//! digest, rendered as 64 lowercase hex characters) and [`digest_file`],
//! which streams a file through SHA-256 in fixed-size blocks. Streaming is
//! purely a memory bound: the result is identical to hashing the whole file
//! in one pass, for any file size including zero bytes.
//!
//! # Example
//!
//! ```no_run
//! use intact::digest::digest_file;
//! use std::path::Path;
//!
//! let digest = digest_file(Path::new("Cargo.toml")).unwrap();
//! println!("{digest}");
//! ```

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};

/// Size of the read buffer used when streaming file content.
pub const BLOCK_SIZE: usize = 4096;

/// Number of bytes in a digest (SHA-256).
pub const DIGEST_LEN: usize = 32;

/// A SHA-256 content digest.
///
/// Validated at construction: the hex form must be exactly 64 characters
/// from the hex alphabet. Displays and serializes as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Create a digest from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a digest from its 64-character lowercase hex form.
    ///
    /// Uppercase hex is accepted and normalized; anything else is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`DigestParseError`] if the string has the wrong length or
    /// contains a non-hex character.
    pub fn from_hex(s: &str) -> Result<Self, DigestParseError> {
        if s.len() != DIGEST_LEN * 2 {
            return Err(DigestParseError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; DIGEST_LEN];
        for (i, chunk) in s.as_bytes().chunks_exact(2).enumerate() {
            let hi = hex_value(chunk[0]).ok_or(DigestParseError::InvalidCharacter(chunk[0] as char))?;
            let lo = hex_value(chunk[1]).ok_or(DigestParseError::InvalidCharacter(chunk[1] as char))?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }

    /// The raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// The 64-character lowercase hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(DIGEST_LEN * 2);
        for byte in self.0 {
            out.push(char::from_digit(u32::from(byte >> 4), 16).unwrap_or('0'));
            out.push(char::from_digit(u32::from(byte & 0x0f), 16).unwrap_or('0'));
        }
        out
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Errors from parsing a hex digest string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestParseError {
    /// The string is not exactly 64 characters long.
    #[error("digest must be {} hex characters, got {0}", DIGEST_LEN * 2)]
    InvalidLength(usize),

    /// The string contains a character outside the hex alphabet.
    #[error("invalid hex character '{0}' in digest")]
    InvalidCharacter(char),
}

/// Errors from digesting a file's content.
#[derive(thiserror::Error, Debug)]
pub enum DigestError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl DigestError {
    fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Compute the SHA-256 digest of a file's full byte content.
///
/// The file is read as an opaque byte sequence in [`BLOCK_SIZE`] blocks;
/// no text or encoding interpretation is applied. A read failure mid-stream
/// (for example, permission revoked between open and read) propagates as an
/// error without leaking partial state.
///
/// # Errors
///
/// Returns [`DigestError`] if the file cannot be opened or read.
pub fn digest_file(path: &Path) -> Result<Digest, DigestError> {
    let mut file = File::open(path).map_err(|e| DigestError::from_io(path, e))?;
    let mut hasher = Sha256::new();
    let mut block = [0u8; BLOCK_SIZE];

    loop {
        let read = file
            .read(&mut block)
            .map_err(|e| DigestError::from_io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&block[..read]);
    }

    Ok(Digest(hasher.finalize().into()))
}

/// Compute the SHA-256 digest of an in-memory byte slice.
#[must_use]
pub fn digest_bytes(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Digest(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Well-known SHA-256 of empty input.
    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_digest_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bin");
        File::create(&path).unwrap();

        let digest = digest_file(&path).unwrap();
        assert_eq!(digest.to_hex(), EMPTY_SHA256);
    }

    #[test]
    fn test_digest_known_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("abc.txt");
        File::create(&path).unwrap().write_all(b"abc").unwrap();

        let digest = digest_file(&path).unwrap();
        // FIPS 180-2 test vector for "abc"
        assert_eq!(
            digest.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_matches_single_pass() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("large.bin");
        // Span several blocks plus a partial tail
        let content: Vec<u8> = (0..BLOCK_SIZE * 3 + 123).map(|i| (i % 251) as u8).collect();
        File::create(&path).unwrap().write_all(&content).unwrap();

        assert_eq!(digest_file(&path).unwrap(), digest_bytes(&content));
    }

    #[test]
    fn test_digest_deterministic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stable.txt");
        File::create(&path)
            .unwrap()
            .write_all(b"unchanged content")
            .unwrap();

        assert_eq!(digest_file(&path).unwrap(), digest_file(&path).unwrap());
    }

    #[test]
    fn test_digest_missing_file() {
        let err = digest_file(Path::new("/nonexistent/file/xyz")).unwrap_err();
        assert!(matches!(err, DigestError::NotFound(_)));
    }

    #[test]
    fn test_from_hex_round_trip() {
        let digest = digest_bytes(b"round trip");
        let parsed = Digest::from_hex(&digest.to_hex()).unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn test_from_hex_uppercase_normalized() {
        let digest = Digest::from_hex(&EMPTY_SHA256.to_uppercase()).unwrap();
        assert_eq!(digest.to_hex(), EMPTY_SHA256);
    }

    #[test]
    fn test_from_hex_rejects_bad_length() {
        assert_eq!(
            Digest::from_hex("abc123").unwrap_err(),
            DigestParseError::InvalidLength(6)
        );
    }

    #[test]
    fn test_from_hex_rejects_bad_character() {
        let bad = format!("g{}", &EMPTY_SHA256[1..]);
        assert_eq!(
            Digest::from_hex(&bad).unwrap_err(),
            DigestParseError::InvalidCharacter('g')
        );
    }

    #[test]
    fn test_serde_as_hex_string() {
        let digest = digest_bytes(b"serde");
        let yaml = serde_yaml::to_string(&digest).unwrap();
        assert_eq!(yaml.trim(), digest.to_hex());

        let back: Digest = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, digest);
    }

    #[test]
    fn test_deserialize_rejects_malformed() {
        let result: Result<Digest, _> = serde_yaml::from_str("not-a-digest");
        assert!(result.is_err());
    }
}
