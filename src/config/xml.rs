//! XML configuration support.
//! - Loads settings from config.xml (quick_xml).
//! - Creates a template if missing (unless MTP_MOVE_CONFIG is set).
//!
//! Notes:
//! - This module only reads/writes the config file; validation happens elsewhere.

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use super::{CLEANUP_TIMEOUT_SECS_DEFAULT, RETRY_INTERVAL_MS_DEFAULT};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    mounts_root: Option<String>,
    staging_root: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    skip_ambiguity_check: Option<bool>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    retry_interval_ms: Option<u64>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    cleanup_timeout_seconds: Option<u64>,
}

// Custom deserializer that trims surrounding whitespace for optional u64
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| s.trim().parse::<u64>().ok()))
}

fn trimmed_path(s: Option<&str>) -> Option<PathBuf> {
    s.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    })
}

// Map XmlConfig -> Config.
fn xml_to_config(parsed: XmlConfig) -> Config {
    let mut cfg = Config::default();

    cfg.mounts_root = trimmed_path(parsed.mounts_root.as_deref());
    cfg.staging_root = trimmed_path(parsed.staging_root.as_deref());
    if let Some(p) = trimmed_path(parsed.log_file.as_deref()) {
        cfg.log_file = Some(p);
    }
    if let Some(level) = parsed
        .log_level
        .as_deref()
        .and_then(|s| LogLevel::parse(s.trim()))
    {
        cfg.log_level = level;
    }
    cfg.skip_ambiguity_check = parsed.skip_ambiguity_check.unwrap_or(false);
    cfg.retry_interval =
        Duration::from_millis(parsed.retry_interval_ms.unwrap_or(RETRY_INTERVAL_MS_DEFAULT));
    cfg.cleanup_timeout = Duration::from_secs(
        parsed
            .cleanup_timeout_seconds
            .unwrap_or(CLEANUP_TIMEOUT_SECS_DEFAULT),
    );

    cfg
}

/// Load a Config from a specific XML file path (quick_xml).
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig =
        from_xml_str(&contents).with_context(|| format!("parse config xml '{}'", path.display()))?;
    Ok(xml_to_config(parsed))
}

/// Load the config from MTP_MOVE_CONFIG or the platform default path.
/// Returns Ok(None) when no file exists; defaults then apply.
pub fn load_config_from_xml() -> Result<Option<Config>> {
    let path = default_config_path().context("resolve config path")?;
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(None);
    }
    load_config_from_xml_path(&path).map(Some)
}

/// Create default template config file and parent directory (best-effort permissions).
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        return Err(anyhow::anyhow!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(parent, fs::Permissions::from_mode(0o700));
        }
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "/path/to/mtp_move.log".into());

    let content = format!(
        "<!--\n  mtp_move configuration (XML)\n\n  Fields:\n    mounts_root              -> where device mounts appear (default: the gvfs root)\n    staging_root             -> where the per-run staging directory is created (default: system temp)\n    log_level                -> quiet | normal | info | debug\n    log_file                 -> path to log file (optional; stdout/stderr still used)\n    skip_ambiguity_check     -> true resolves ambiguous paths in favor of the device\n    retry_interval_ms        -> pause between cleanup deletion attempts\n    cleanup_timeout_seconds  -> how long to keep retrying a locked file\n\n  Notes:\n    - CLI flags override XML values.\n-->\n<config>\n  <log_level>normal</log_level>\n  <log_file>{}</log_file>\n  <skip_ambiguity_check>false</skip_ambiguity_check>\n  <retry_interval_ms>{}</retry_interval_ms>\n  <cleanup_timeout_seconds>{}</cleanup_timeout_seconds>\n</config>\n",
        suggested_log, RETRY_INTERVAL_MS_DEFAULT, CLEANUP_TIMEOUT_SECS_DEFAULT
    );

    fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }

    tracing::info!("Created template config at {}", path.display());
    Ok(())
}
