//! The relocation engine: plan, verify, move, commit.
//!
//! Expected outcomes ([`Outcome::Skipped`], [`Outcome::Failed`]) are values,
//! not errors; only configuration mistakes (a bad template) are raised, and
//! those never get this far. Every relocation receives an explicit
//! [`ConfigSnapshot`] so there is no hidden mutable configuration state.

mod atomic;
mod conflict;
mod copy;
mod driver;
mod engine;
mod locks;
mod recovery;
mod verify;

pub use conflict::{strip_conflict_suffix, with_conflict_suffix, MAX_SUFFIX_ATTEMPTS};
pub use driver::MigrationSummary;
pub use engine::RelocationEngine;
pub use locks::KeyedLocks;
pub use verify::{hash_file, verify_file};

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::errors::IntegrityError;
use crate::template::{CompiledTemplate, TemplateContext};

/// Point-in-time configuration for one relocation call or bulk pass.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    /// Administrative switch; when false every call is a no-op Skip.
    pub enabled: bool,
    /// Root directory the rendered paths live under.
    pub library_root: PathBuf,
    pub template: CompiledTemplate,
}

impl ConfigSnapshot {
    /// Full candidate path for a context:
    /// `{library_root}/{owner segment}/{rendered relative path}`.
    pub fn target_path(&self, ctx: &TemplateContext<'_>) -> PathBuf {
        self.library_root
            .join(ctx.owner_segment())
            .join(self.template.render(ctx))
    }
}

/// Result of relocating one asset.
#[derive(Debug)]
pub enum Outcome {
    Success { new_path: PathBuf },
    Skipped(SkipReason),
    Failed(FailureReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The engine is administratively disabled.
    Disabled,
    /// Read-only assets are never relocated.
    ReadOnly,
    /// The asset already sits at its computed target.
    AlreadyInPlace,
}

impl SkipReason {
    pub fn describe(&self) -> &'static str {
        match self {
            SkipReason::Disabled => "storage template disabled",
            SkipReason::ReadOnly => "asset is read-only",
            SkipReason::AlreadyInPlace => "already at the computed target",
        }
    }
}

/// Why a relocation failed. All variants leave the source file and the
/// journal in a state that a later retry can resume from.
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error("asset '{0}' not found in the catalog")]
    AssetMissing(String),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error("no unoccupied destination near '{candidate}' after {attempts} attempts")]
    DestinationExhausted { candidate: PathBuf, attempts: u32 },

    #[error("catalog error: {0}")]
    Store(String),

    #[error("{0}")]
    Io(String),
}

/// Enrich an I/O error with the operation, path, and a platform hint.
fn describe_io(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    append_os_hint(&mut msg, e);
    msg
}

#[cfg(unix)]
fn append_os_hint(msg: &mut String, e: &io::Error) {
    if let Some(code) = e.raw_os_error() {
        match code {
            libc::EACCES | libc::EPERM => {
                msg.push_str("; permission denied, check ownership and write permissions")
            }
            libc::ENOENT => msg.push_str("; path not found, verify it exists"),
            libc::ENOSPC => msg.push_str("; insufficient space on device"),
            libc::EROFS => msg.push_str("; read-only filesystem, cannot write here"),
            _ => {}
        }
    }
}

#[cfg(not(unix))]
fn append_os_hint(_msg: &mut String, _e: &io::Error) {}

pub(crate) fn io_failure(op: &str, path: &Path, e: io::Error) -> FailureReason {
    FailureReason::Io(describe_io(op, path, &e))
}
