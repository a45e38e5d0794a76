//! Process-wide shutdown coordination.
//! The ctrl-c handler sets a flag; the bulk driver polls it between assets so
//! a migration pass stops at an asset boundary instead of mid-protocol.
//!
//! Relaxed atomics are sufficient for a one-way "stop" flag.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a cooperative shutdown (idempotent, signal-handler safe).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

/// Check whether a shutdown has been requested.
#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Test-only: clear the shutdown flag.
#[cfg(any(test, feature = "test-helpers"))]
#[inline]
pub fn reset() {
    SHUTDOWN.store(false, Ordering::Relaxed);
}
