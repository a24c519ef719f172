//! Config validation logic.
//! Checks the configured roots and cleanup timing before a run starts.

use anyhow::{bail, Context, Result};
use std::fs;
use tracing::{debug, info};

use super::types::Config;

/// Validate a merged Config in place. Called once per run, after CLI
/// overrides are applied and before any filesystem work.
pub fn validate_and_normalize(cfg: &mut Config) -> Result<()> {
    if cfg.retry_interval.is_zero() {
        bail!("retry_interval_ms must be greater than zero");
    }
    if cfg.cleanup_timeout < cfg.retry_interval {
        bail!(
            "cleanup_timeout ({:?}) must not be shorter than the retry interval ({:?})",
            cfg.cleanup_timeout,
            cfg.retry_interval
        );
    }

    // An explicitly configured mounts root that does not exist is not fatal:
    // it just means no device is attached right now.
    if let Some(root) = &cfg.mounts_root {
        if !root.exists() {
            debug!(root = %root.display(), "mounts root not present; no device will attach");
        } else if !root.is_dir() {
            bail!("mounts_root is not a directory: {}", root.display());
        }
    }

    if let Some(root) = &cfg.staging_root {
        fs::create_dir_all(root)
            .with_context(|| format!("create staging root '{}'", root.display()))?;
    }

    info!(
        retry_ms = cfg.retry_interval.as_millis() as u64,
        timeout_s = cfg.cleanup_timeout.as_secs(),
        "config validated"
    );
    Ok(())
}
