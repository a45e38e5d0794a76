//! Typed error definitions for shutter_move.
//! Template errors surface at configuration time; integrity errors are folded
//! into relocation outcomes rather than thrown.

use std::path::PathBuf;
use thiserror::Error;

/// Storage template compilation failure. Never reaches per-asset processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unrecognized template token '{{{{{0}}}}}'")]
    UnknownToken(String),

    #[error("unterminated token opening '{{{{' at byte {0}")]
    UnterminatedToken(usize),
}

/// Disagreement between a file on disk and the catalog's recorded size or
/// checksum, found during recovery or post-copy verification.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("size mismatch for '{path}': catalog says {expected} bytes, disk has {actual}")]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("checksum mismatch for '{path}': catalog says {expected}, disk hashes to {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("cannot verify '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
