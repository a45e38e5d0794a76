//! Atomic rename helper.
//! - Performs the rename with context on failure left to the caller.
//! - On Unix, best-effort fsync of the destination directory so the rename
//!   itself is durable.
//! - Exposes cross-device detection so callers can pick the copy fallback.

use std::fs;
use std::io;
use std::path::Path;

pub(super) fn try_atomic_rename(src: &Path, dst: &Path) -> io::Result<()> {
    fs::rename(src, dst)?;

    #[cfg(unix)]
    if let Some(parent) = dst.parent() {
        // Ignore fsync errors; the rename already succeeded.
        let _ = fsync_dir(parent);
    }

    Ok(())
}

#[cfg(unix)]
pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

/// True when the error means source and destination sit on different
/// filesystems and an in-place rename cannot work.
pub(super) fn is_cross_device(e: &io::Error) -> bool {
    #[cfg(unix)]
    {
        e.raw_os_error() == Some(libc::EXDEV)
    }
    #[cfg(windows)]
    {
        // ERROR_NOT_SAME_DEVICE
        e.raw_os_error() == Some(17)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = e;
        false
    }
}
