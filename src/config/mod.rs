//! Config module (modularized).
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use validate::validate_and_normalize;
pub use xml::{create_template_config, load_config_from_xml, load_config_from_xml_path};

use anyhow::Result;
use std::path::PathBuf;

/// Cleanup retry defaults, overridable via XML and CLI.
pub const RETRY_INTERVAL_MS_DEFAULT: u64 = 500;
pub const CLEANUP_TIMEOUT_SECS_DEFAULT: u64 = 5 * 60;

/// Outcome of the startup config check.
pub enum LoadResult {
    /// A config file already existed (or an explicit override is in use).
    Present,
    /// No config file was found; a template was written at this path.
    CreatedTemplate(PathBuf),
}

/// Ensure a config file exists, writing a template on first run.
/// An explicit MTP_MOVE_CONFIG override is never templated over.
pub fn load_or_init() -> Result<LoadResult> {
    if std::env::var_os("MTP_MOVE_CONFIG").is_some() {
        return Ok(LoadResult::Present);
    }
    let path = default_config_path()?;
    if path.exists() {
        return Ok(LoadResult::Present);
    }
    create_template_config(&path)?;
    Ok(LoadResult::CreatedTemplate(path))
}
