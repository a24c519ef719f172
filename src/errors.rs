//! Typed error definitions for mtp_move.
//! Provides the well-known failure modes of path resolution and transfer so
//! logs and tests can match on stable codes instead of message text.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MtpMoveError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Ambiguous path '{0}': matches both a device folder and a host directory; pass --skip-ambiguity-check to prefer the device")]
    AmbiguousPath(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Wildcard in a directory segment of '{0}'; wildcards are only allowed in the final segment")]
    WildcardInDirectory(String),

    #[error("Explicit patterns given, but '{0}' already names a file; drop the patterns or address the directory")]
    PatternConflict(String),

    #[error("Backslash in device path '{0}'; the device namespace uses forward slashes only")]
    InvalidPathSeparator(String),

    #[error("No free name for '{name}' in '{folder}' after 999 attempts")]
    NameSpaceExhausted { folder: String, name: String },

    #[error("Transfer of '{name}' failed: {cause}")]
    TransferFailed { name: String, cause: String },

    #[error("Gave up deleting '{path}' after {waited_secs}s; file stayed locked")]
    LockTimeout { path: PathBuf, waited_secs: u64 },
}

impl MtpMoveError {
    /// Stable machine-readable code, used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            MtpMoveError::InvalidArgument(_) => "invalid_argument",
            MtpMoveError::AmbiguousPath(_) => "ambiguous_path",
            MtpMoveError::NotFound(_) => "not_found",
            MtpMoveError::WildcardInDirectory(_) => "wildcard_in_directory",
            MtpMoveError::PatternConflict(_) => "pattern_conflict",
            MtpMoveError::InvalidPathSeparator(_) => "invalid_path_separator",
            MtpMoveError::NameSpaceExhausted { .. } => "namespace_exhausted",
            MtpMoveError::TransferFailed { .. } => "transfer_failed",
            MtpMoveError::LockTimeout { .. } => "lock_timeout",
        }
    }

    /// Resolution-phase errors abort the run; per-item and cleanup errors are
    /// recovered locally (skip, count, continue).
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            MtpMoveError::TransferFailed { .. } | MtpMoveError::LockTimeout { .. }
        )
    }
}
