//! File statistics and content hashing.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Recorded state of a file: modification time, size and content digest.
///
/// Two stats are equal iff all three fields match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// Modification time.
    pub mtime: DateTime<Utc>,
    /// File size in bytes.
    pub size: u64,
    /// SHA-256 digest of the content, hex encoded.
    pub hexdigest: String,
}

impl Stat {
    /// Reads the stat of a file on disk.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let content = fs::read_to_string(path)?;
        Ok(Self {
            mtime: metadata.modified()?.into(),
            size: metadata.len(),
            hexdigest: hexdigest(&content),
        })
    }

    /// Builds the stat a content string would have if written at `mtime`.
    pub fn from_content(content: &str, mtime: DateTime<Utc>) -> Self {
        Self {
            mtime,
            size: content.len() as u64,
            hexdigest: hexdigest(content),
        }
    }
}

/// Computes the hex-encoded SHA-256 digest of a string.
///
/// The algorithm is fixed so databases stay stable across runs.
pub fn hexdigest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
