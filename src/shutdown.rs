//! Process-wide shutdown coordination.
//! The ctrlc handler flips a flag; the transfer loop and blocking probes poll
//! it to exit early instead of being killed mid-copy.
//!
//! A relaxed atomic is enough for a one-way "stop" flag, and `request()` is
//! safe to call from a signal handler.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Request a cooperative shutdown (idempotent).
#[inline]
pub fn request() {
    SHUTDOWN_REQUESTED.store(true, Ordering::Relaxed);
}

/// Check whether a shutdown has been requested.
#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::Relaxed)
}
