//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - Quote-mangled paths from shells are sanitized, but trailing separators
//!   are preserved: a trailing slash means "this is a directory".
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use mtp_move::config::{Config, LogLevel};

/// CLI wrapper for the mtp_move library.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Move or copy files between a host filesystem and device storage"
)]
pub struct Args {
    /// Source directory or file pattern. Host path ("/data/camera", "./pics/*.jpg")
    /// or device path ("Internal storage/DCIM").
    #[arg(value_name = "SOURCE", value_hint = ValueHint::AnyPath)]
    pub source: Option<String>,

    /// Destination directory, host or device addressed.
    #[arg(value_name = "DEST", value_hint = ValueHint::AnyPath)]
    pub dest: Option<String>,

    /// Filename pattern applied inside the source directory (repeatable).
    #[arg(
        short = 'p',
        long = "pattern",
        value_name = "GLOB",
        help = "Filename pattern(s), e.g. -p '*.jpg' -p '*.png'"
    )]
    pub patterns: Vec<String>,

    /// Copy instead of move; sources are left in place.
    #[arg(long, help = "Copy files instead of moving them")]
    pub copy: bool,

    /// Pick one attached device by (partial) mount name.
    #[arg(long, value_name = "NAME", help = "Select a device when several are attached")]
    pub device: Option<String>,

    /// Override where device mounts are discovered.
    #[arg(long, value_hint = ValueHint::DirPath, help = "Override the device mounts root")]
    pub mounts_root: Option<PathBuf>,

    /// Resolve ambiguous paths in favor of the device instead of failing.
    #[arg(
        long,
        help = "When a path matches both a device folder and a host directory, prefer the device"
    )]
    pub skip_ambiguity_check: bool,

    /// Pause between cleanup deletion attempts, in milliseconds.
    #[arg(long, value_name = "MS", help = "Cleanup retry interval in milliseconds")]
    pub retry_interval_ms: Option<u64>,

    /// Give up deleting a still-locked file after this many seconds.
    #[arg(long, value_name = "SECS", help = "Cleanup per-file timeout in seconds")]
    pub cleanup_timeout_secs: Option<u64>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Print where mtp_move will look for the config file (or MTP_MOVE_CONFIG if set), then exit.
    #[arg(
        long,
        help = "Print the config file location used by mtp_move and exit"
    )]
    pub print_config: bool,

    /// Dry-run: log actions but do not modify anything.
    #[arg(
        long,
        help = "Show what would be done, but do not modify files/directories"
    )]
    pub dry_run: bool,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

impl Args {
    /// Sanitized SOURCE argument, if given.
    pub fn sanitized_source(&self) -> Option<String> {
        self.source.as_deref().map(Self::sanitize_str)
    }

    /// Sanitized DEST argument, if given.
    pub fn sanitized_dest(&self) -> Option<String> {
        self.dest.as_deref().map(Self::sanitize_str)
    }

    /// Trim surrounding single/double quotes left behind by shell escaping
    /// mistakes. Trailing separators are kept: they carry meaning ("this is
    /// a directory") for the resolver.
    fn sanitize_str(s: &str) -> String {
        let trimmed = s.trim();
        let inner = if (trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() > 1)
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'') && trimmed.len() > 1)
        {
            &trimmed[1..trimmed.len() - 1]
        } else {
            trimmed
        };
        inner.trim_matches(|c| c == '\'' || c == '"').to_string()
    }

    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(root) = &self.mounts_root {
            cfg.mounts_root = Some(root.clone());
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(ms) = self.retry_interval_ms {
            cfg.retry_interval = std::time::Duration::from_millis(ms);
        }
        if let Some(secs) = self.cleanup_timeout_secs {
            cfg.cleanup_timeout = std::time::Duration::from_secs(secs);
        }
        if self.skip_ambiguity_check {
            cfg.skip_ambiguity_check = true;
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
