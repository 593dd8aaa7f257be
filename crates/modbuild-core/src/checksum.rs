//! SHA-256 verification of downloaded files.
//!
//! The on-disk download folder doubles as a cache: a file whose digest matches
//! the configured checksum is reused, a mismatching one is deleted so the next
//! fetch starts clean.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// State of a local file relative to its configured checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// No file on disk.
    Missing,
    /// Digest equals the configured checksum.
    Matched,
    /// No checksum configured; `actual` should be copied into the config.
    Unpinned { actual: String },
    /// Digest differs from the configured checksum. The file has been deleted.
    Mismatch { actual: String },
}

impl Verification {
    /// True when the file may be used for a build.
    pub fn is_usable(&self) -> bool {
        matches!(self, Verification::Matched | Verification::Unpinned { .. })
    }
}

/// Compares two hex digests, ignoring ASCII case.
pub fn digests_equal(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Checks `path` against `expected` (may be empty).
///
/// A pinned file that does not match is removed from disk before returning
/// [`Verification::Mismatch`].
pub fn verify(path: &Path, expected: &str) -> Result<Verification> {
    if !path.is_file() {
        return Ok(Verification::Missing);
    }
    let actual = sha256_path(path)?;
    if expected.trim().is_empty() {
        return Ok(Verification::Unpinned { actual });
    }
    if digests_equal(&actual, expected) {
        return Ok(Verification::Matched);
    }
    fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
    tracing::warn!(
        file = %path.display(),
        actual = %actual,
        expected = %expected,
        "deleted file with wrong checksum"
    );
    Ok(Verification::Mismatch { actual })
}
