//! Application orchestrator.
//! Loads/merges config, initializes logging, installs signal handlers,
//! attaches the device, resolves source and destination, and drives the
//! transfer loop with background cleanup.

use anyhow::{anyhow, bail, Context, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use mtp_move::config::{self, load_or_init, validate_and_normalize, LoadResult};
use mtp_move::errors::MtpMoveError;
use mtp_move::output as out;
use mtp_move::resolve::{self, contains_wildcard, is_default_patterns, WildcardMatcher};
use mtp_move::store::{
    default_mounts_root, enumerate_mounted_devices, DeviceHandle, FolderHandle, HostFolder,
    Location,
};
use mtp_move::transfer::{
    CleanupConfig, CleanupCoordinator, StagingArea, TransferItem, TransferMode, TransferStager,
};
use mtp_move::{default_config_path, shutdown, Config};

use crate::cli::Args;
use crate::logging::init_tracing;

/// Final status of a run. Resolution-phase errors become Err (Failure) from
/// run(); zero matches, per-item failures and abandoned cleanups are Warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Warning,
}

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        if let Ok(cfg_env) = std::env::var("MTP_MOVE_CONFIG") {
            out::print_info(&format!("Using MTP_MOVE_CONFIG (explicit):\n  {}\n", cfg_env));
            out::print_info("To override, unset MTP_MOVE_CONFIG or set it to another file.");
            return Ok(());
        }
        match default_config_path() {
            Ok(p) => {
                out::print_info(&format!("Default mtp_move config path:\n  {}\n", p.display()));
                if p.exists() {
                    out::print_info("A config file already exists at that location.");
                } else {
                    out::print_info("No config file exists there yet. Run without --print-config to create a template.");
                }
            }
            Err(e) => {
                out::print_error(&format!("Could not determine a default config path: {e}"));
            }
        }
        return Ok(());
    }

    // Create template config if none exists (before logging init)
    if let LoadResult::CreatedTemplate(path) = load_or_init()? {
        out::print_success(&format!(
            "A template mtp_move config was written to: {}",
            path.display()
        ));
        out::print_info("Edit the file to set `mounts_root`, cleanup timing and logging, then re-run this command. To use a different location set MTP_MOVE_CONFIG.");
        return Ok(());
    }

    // Build config (may read XML). CLI args override config values.
    let mut cfg = config::load_config_from_xml()?.unwrap_or_default();
    args.apply_overrides(&mut cfg);

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt: Option<tracing_appender::non_blocking::WorkerGuard> =
        init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
            out::print_error(&format!("Failed to initialize logging: {}", e));
            e
        })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; shutting down gracefully...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush tracing_appender
            }
        })
        .expect("failed to install signal handler");
    }

    if shutdown::is_requested() {
        return Ok(());
    }

    debug!("Starting mtp_move: {:?}", args);

    let result = run_transfer(&args, cfg);

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    match result {
        Ok(RunStatus::Success) => Ok(()),
        Ok(RunStatus::Warning) => Ok(()),
        Err(e) => {
            if let Some(me) = e.downcast_ref::<MtpMoveError>() {
                error!(code = me.code(), "{me}");
            } else {
                error!(error = ?e, "run failed");
            }
            out::print_error(&format!("{e:#}"));
            Err(e)
        }
    }
}

fn run_transfer(args: &Args, mut cfg: Config) -> Result<RunStatus> {
    validate_and_normalize(&mut cfg)?;

    let source_raw = args
        .sanitized_source()
        .ok_or_else(|| MtpMoveError::InvalidArgument("missing SOURCE argument".into()))?;
    let dest_raw = args
        .sanitized_dest()
        .ok_or_else(|| MtpMoveError::InvalidArgument("missing DEST argument".into()))?;

    let device = attach_device(&cfg, args)?;

    // Normalize the source into (directory, pattern).
    let resolved = resolve::resolve(
        &source_raw,
        device.as_ref(),
        &args.patterns,
        cfg.skip_ambiguity_check,
    )?;
    debug!(
        directory = %resolved.directory.describe(),
        pattern = %resolved.file_pattern,
        is_dir = resolved.is_directory_match,
        "source resolved"
    );

    // Explicit patterns win over the resolver's split.
    let patterns: Vec<String> = if is_default_patterns(&args.patterns) {
        vec![resolved.file_pattern.clone()]
    } else {
        args.patterns.clone()
    };
    let matcher = WildcardMatcher::compile(&patterns)?;

    let src_folder = open_location(&resolved.directory, device.as_ref(), false)?;
    let dest_location = resolve_destination(&dest_raw, device.as_ref(), cfg.skip_ambiguity_check)?;
    let dest_folder = open_location(&dest_location, device.as_ref(), true)?;

    // Enumeration is the external capability; matching happens here.
    let children = src_folder
        .enumerate_children()
        .context("enumerate source folder")?;
    let matches: Vec<_> = children
        .into_iter()
        .filter(|c| !c.is_folder && matcher.is_match(&c.name))
        .collect();

    if matches.is_empty() {
        warn!(pattern = %patterns.join(", "), "no files matched");
        out::print_warn(&format!("No files matched '{}'", patterns.join(", ")));
        return Ok(RunStatus::Warning);
    }

    let mode = if args.copy {
        TransferMode::Copy
    } else {
        TransferMode::Move
    };

    let staging_root = cfg
        .staging_root
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let staging = StagingArea::create_under(&staging_root).context("create staging area")?;
    let coordinator = CleanupCoordinator::spawn(CleanupConfig {
        retry_interval: cfg.retry_interval,
        timeout: cfg.cleanup_timeout,
    });
    let stager = TransferStager::new(&staging, &coordinator, cfg.dry_run);

    let mut transferred = 0usize;
    let mut failed = 0usize;
    for child in &matches {
        if shutdown::is_requested() {
            warn!("shutdown requested; stopping batch early");
            break;
        }
        let item = TransferItem {
            name: child.name.clone(),
            source: resolved.directory.clone(),
            is_folder: child.is_folder,
        };
        match stager.transfer(&item, src_folder.as_ref(), dest_folder.as_ref(), mode) {
            Ok(final_name) => {
                transferred += 1;
                out::print_user(&format!(
                    "{} '{}' -> '{}'",
                    if cfg.dry_run { "Would transfer" } else { mode.verb_capitalized() },
                    child.name,
                    final_name
                ));
            }
            Err(e) => {
                failed += 1;
                error!(code = e.code(), name = %child.name, "{e}");
                out::print_warn(&e.to_string());
            }
        }
    }

    // Block once, at shutdown: join the cleanup worker before reporting, so
    // no open handles leak past the final summary.
    let stats = coordinator.wait();
    drop(staging);

    if stats.timed_out > 0 {
        out::print_warn(&format!(
            "{} file(s) stayed locked and were left behind",
            stats.timed_out
        ));
    }

    info!(
        transferred,
        failed,
        cleanup_deleted = stats.deleted,
        cleanup_timed_out = stats.timed_out,
        "run complete"
    );
    out::print_user(&format!(
        "{} {} file(s), {} failed",
        mode.verb_capitalized(),
        transferred,
        failed
    ));

    if failed > 0 || stats.timed_out > 0 {
        Ok(RunStatus::Warning)
    } else {
        out::print_success("Done");
        Ok(RunStatus::Success)
    }
}

/// Attach at most one device: the only one mounted, or the one picked with
/// --device.
fn attach_device(cfg: &Config, args: &Args) -> Result<Option<DeviceHandle>> {
    let root = cfg.mounts_root.clone().or_else(default_mounts_root);
    let Some(root) = root else {
        return Ok(None);
    };
    if !root.is_dir() {
        debug!(root = %root.display(), "mounts root absent; running host-only");
        return Ok(None);
    }

    let mut devices = enumerate_mounted_devices(&root)
        .with_context(|| format!("enumerate devices under '{}'", root.display()))?;

    if let Some(wanted) = &args.device {
        devices.retain(|d| d.name().contains(wanted.as_str()));
        if devices.is_empty() {
            bail!(MtpMoveError::NotFound(format!(
                "no attached device matches '{wanted}'"
            )));
        }
    }

    match devices.len() {
        0 => Ok(None),
        1 => {
            let dev = devices.swap_remove(0);
            info!(device = dev.name(), "attached device");
            Ok(Some(dev))
        }
        n => bail!(MtpMoveError::InvalidArgument(format!(
            "{n} devices attached; pick one with --device"
        ))),
    }
}

/// The destination must name a directory; it is created when missing.
fn resolve_destination(
    raw: &str,
    device: Option<&DeviceHandle>,
    skip_ambiguity_check: bool,
) -> Result<Location> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!(MtpMoveError::InvalidArgument("empty destination path".into()));
    }
    if trimmed
        .split(['/', '\\'])
        .any(contains_wildcard)
    {
        bail!(MtpMoveError::InvalidArgument(format!(
            "destination may not contain wildcards: {trimmed}"
        )));
    }

    match resolve::classify(trimmed, device) {
        Location::Ambiguous(p) => {
            if skip_ambiguity_check {
                Ok(Location::Device(normalize_device_path(&p)?))
            } else {
                bail!(MtpMoveError::AmbiguousPath(p));
            }
        }
        Location::Device(p) => Ok(Location::Device(normalize_device_path(&p)?)),
        Location::Host(p) => Ok(Location::Host(p)),
    }
}

fn normalize_device_path(path: &str) -> Result<String> {
    if path.contains('\\') {
        bail!(MtpMoveError::InvalidPathSeparator(path.to_string()));
    }
    Ok(path.trim_end_matches('/').to_string())
}

/// Open a resolved location as a folder handle.
fn open_location(
    location: &Location,
    device: Option<&DeviceHandle>,
    create: bool,
) -> Result<Box<dyn FolderHandle>> {
    match location {
        Location::Host(p) => {
            let folder = if create {
                HostFolder::open_or_create(p)
            } else {
                HostFolder::open(p)
            }
            .with_context(|| format!("open host folder '{}'", p.display()))?;
            Ok(Box::new(folder))
        }
        Location::Device(p) => {
            let dev = device
                .ok_or_else(|| anyhow!("device path '{p}' without an attached device"))?;
            if create {
                open_or_create_device_path(dev, p)
            } else {
                dev.open_path(p)
                    .with_context(|| format!("open device folder '{p}'"))?
                    .map(|f| Box::new(f) as Box<dyn FolderHandle>)
                    .ok_or_else(|| MtpMoveError::NotFound(p.clone()).into())
            }
        }
        Location::Ambiguous(p) => bail!(MtpMoveError::AmbiguousPath(p.clone())),
    }
}

/// Walk a device destination path, creating missing folders on the way.
fn open_or_create_device_path(dev: &DeviceHandle, path: &str) -> Result<Box<dyn FolderHandle>> {
    let mut folder: Box<dyn FolderHandle> = Box::new(dev.root_folder());
    let mut walked = String::new();
    for seg in path.split('/').filter(|s| !s.is_empty()) {
        if !walked.is_empty() {
            walked.push('/');
        }
        walked.push_str(seg);
        folder = match folder
            .open_folder(seg)
            .with_context(|| format!("open device folder '{walked}'"))?
        {
            Some(next) => next,
            None => {
                info!(folder = %walked, "creating device folder");
                folder
                    .create_folder(seg)
                    .with_context(|| format!("create device folder '{walked}'"))?
            }
        };
    }
    Ok(folder)
}
