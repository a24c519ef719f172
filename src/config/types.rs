//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::paths;
use super::{CLEANUP_TIMEOUT_SECS_DEFAULT, RETRY_INTERVAL_MS_DEFAULT};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration used by the mover.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where device mounts appear (gvfs root); None = platform default
    pub mounts_root: Option<PathBuf>,
    /// Override of the platform temp root for the staging directory
    pub staging_root: Option<PathBuf>,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// If true, print actions but do not modify anything
    pub dry_run: bool,
    /// Resolve ambiguous paths in favor of the device instead of failing
    pub skip_ambiguity_check: bool,
    /// Pause between cleanup deletion attempts for a locked file
    pub retry_interval: Duration,
    /// How long a cleanup record may stay pending before it is abandoned
    pub cleanup_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mounts_root: None,
            staging_root: None,
            log_level: LogLevel::Normal,
            // paths::default_log_path() returns Result<PathBuf>; store Some(path) on success.
            log_file: paths::default_log_path().ok(),
            dry_run: false,
            skip_ambiguity_check: false,
            retry_interval: Duration::from_millis(RETRY_INTERVAL_MS_DEFAULT),
            cleanup_timeout: Duration::from_secs(CLEANUP_TIMEOUT_SECS_DEFAULT),
        }
    }
}
