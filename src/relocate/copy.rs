//! Cross-device fallback: copy, fsync, verify, carry timestamps, then (and
//! only then) delete the source.
//!
//! A failed verification deletes the partial destination and leaves the
//! source and journal untouched, so a later retry starts clean.

use filetime::FileTime;
use std::fs;
use std::path::Path;
use tracing::warn;

use super::{io_failure, verify, FailureReason};
use crate::store::Asset;

pub(super) fn copy_across_devices(
    source: &Path,
    target: &Path,
    asset: &Asset,
) -> Result<(), FailureReason> {
    if let Some(parent) = target.parent() {
        check_free_space(parent, asset.size)?;
    }

    // Stat the source once up front; its timestamps are applied to the copy
    // after verification.
    let src_meta = fs::metadata(source).map_err(|e| io_failure("stat source", source, e))?;

    if let Err(e) = fs::copy(source, target) {
        let _ = fs::remove_file(target);
        return Err(io_failure("copy to destination", target, e));
    }
    if let Err(e) = sync_file(target) {
        let _ = fs::remove_file(target);
        return Err(io_failure("sync destination", target, e));
    }

    if let Err(mismatch) = verify::verify_file(target, asset.size, &asset.checksum) {
        warn!(
            asset = %asset.id,
            target = %target.display(),
            error = %mismatch,
            "post-copy verification failed; removing partial destination"
        );
        let _ = fs::remove_file(target);
        return Err(FailureReason::Integrity(mismatch));
    }

    let atime = FileTime::from_last_access_time(&src_meta);
    let mtime = FileTime::from_last_modification_time(&src_meta);
    if let Err(e) = filetime::set_file_times(target, atime, mtime) {
        warn!(path = %target.display(), error = %e, "failed to carry timestamps onto destination");
    }

    fs::remove_file(source).map_err(|e| io_failure("remove source after copy", source, e))?;
    Ok(())
}

fn sync_file(path: &Path) -> std::io::Result<()> {
    fs::File::open(path)?.sync_all()
}

fn check_free_space(dest_dir: &Path, required: u64) -> Result<(), FailureReason> {
    match fs2::available_space(dest_dir) {
        Ok(available) if available < required => Err(FailureReason::Io(format!(
            "insufficient space in '{}': need {} bytes, have {}",
            dest_dir.display(),
            required,
            available
        ))),
        // A probe error is not worth failing the move over; the copy itself
        // will surface ENOSPC if the device is actually full.
        _ => Ok(()),
    }
}
