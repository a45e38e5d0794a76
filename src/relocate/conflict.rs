//! Destination conflict resolution.
//!
//! When the computed target is occupied by another file, the engine probes
//! `stem+1.ext`, `stem+2.ext`, … in increasing order until it finds a free
//! slot, bounded by [`MAX_SUFFIX_ATTEMPTS`]. The probe order is fixed, so
//! assets processed in a fixed order receive suffixes in a fixed order.
//!
//! This only decides a name from current filesystem state; the engine holds
//! the per-asset lock while probing and renaming.

use std::path::{Path, PathBuf};
use tracing::trace;

/// Upper bound on suffix probing before the relocation fails.
pub const MAX_SUFFIX_ATTEMPTS: u32 = 100;

/// Where the conflict probe landed.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Placement {
    /// An unoccupied path the move can claim.
    Free(PathBuf),
    /// A probed candidate is the current source itself: the asset already
    /// holds a disambiguated slot and nothing needs to move.
    SourceHolds(PathBuf),
    /// Every candidate up to the attempt cap was occupied.
    Exhausted { candidate: PathBuf, attempts: u32 },
}

/// Resolve `candidate` against existing files. The caller has already ruled
/// out `candidate == source`.
pub(super) fn place(candidate: &Path, source: &Path) -> Placement {
    if !candidate.exists() {
        return Placement::Free(candidate.to_path_buf());
    }
    for n in 1..=MAX_SUFFIX_ATTEMPTS {
        let probe = with_conflict_suffix(candidate, n);
        if probe == source {
            return Placement::SourceHolds(probe);
        }
        if !probe.exists() {
            if n > 1 {
                trace!(candidate = %candidate.display(), suffix = n, "multiple occupied slots before a free one");
            }
            return Placement::Free(probe);
        }
    }
    Placement::Exhausted {
        candidate: candidate.to_path_buf(),
        attempts: MAX_SUFFIX_ATTEMPTS,
    }
}

/// `dir/stem.ext` -> `dir/stem+N.ext` (extension-less names get `+N` at the
/// end).
pub fn with_conflict_suffix(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}+{n}.{ext}"),
        None => format!("{stem}+{n}"),
    };
    path.with_file_name(name)
}

/// Undo a `+N` suffix: `asset-id+1.jpg` -> `asset-id.jpg`. Returns None when
/// the name carries no disambiguation suffix.
pub fn strip_conflict_suffix(file_name: &str) -> Option<String> {
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };
    let (base, digits) = stem.rsplit_once('+')?;
    if base.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(match ext {
        Some(ext) => format!("{base}.{ext}"),
        None => base.to_string(),
    })
}
