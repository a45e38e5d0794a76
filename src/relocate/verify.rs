//! Content verification: byte size first, sha-256 only when the size holds.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::errors::IntegrityError;

/// Lowercase hex sha-256 of the file at `path`, streamed.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compare the file at `path` against the catalog's recorded size and
/// checksum. The cheap size check runs first; the hash only when it matches.
pub fn verify_file(
    path: &Path,
    expected_size: u64,
    expected_checksum: &str,
) -> Result<(), IntegrityError> {
    let meta = std::fs::metadata(path).map_err(|e| IntegrityError::Unreadable {
        path: path.to_path_buf(),
        source: e,
    })?;
    if meta.len() != expected_size {
        return Err(IntegrityError::SizeMismatch {
            path: path.to_path_buf(),
            expected: expected_size,
            actual: meta.len(),
        });
    }
    let actual = hash_file(path).map_err(|e| IntegrityError::Unreadable {
        path: path.to_path_buf(),
        source: e,
    })?;
    if !actual.eq_ignore_ascii_case(expected_checksum) {
        return Err(IntegrityError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected_checksum.to_string(),
            actual,
        });
    }
    Ok(())
}
