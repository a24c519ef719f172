//! Source resolution: raw user path -> (directory, file pattern).
//!
//! The resolver decides which store owns the path, walks it to a concrete
//! directory, and splits off the final segment as a filename pattern when it
//! is not itself a folder. All policy edge cases live here so the transfer
//! loop only ever sees a validated directory plus a pattern.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::errors::MtpMoveError;
use crate::store::{DeviceHandle, FolderHandle, Location};

use super::classify::classify_in;
use super::wildcard::{contains_wildcard, is_default_patterns};

/// Outcome of resolving a raw source path. Exactly one of the two match
/// flags is true; `file_pattern` is `"*"` for a bare directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub directory: Location,
    pub file_pattern: String,
    pub is_directory_match: bool,
    pub is_file_match: bool,
}

impl ResolvedSource {
    fn directory_match(directory: Location) -> Self {
        Self {
            directory,
            file_pattern: "*".to_string(),
            is_directory_match: true,
            is_file_match: false,
        }
    }

    fn file_match(directory: Location, pattern: &str) -> Self {
        Self {
            directory,
            file_pattern: pattern.to_string(),
            is_directory_match: false,
            is_file_match: true,
        }
    }
}

/// Resolve a raw source path against an optional device.
///
/// `patterns` are the caller's explicit filename patterns; `[]` and `["*"]`
/// count as the default. `skip_ambiguity_check` resolves an ambiguous path in
/// favor of the device instead of failing.
pub fn resolve(
    raw: &str,
    device: Option<&DeviceHandle>,
    patterns: &[String],
    skip_ambiguity_check: bool,
) -> Result<ResolvedSource> {
    resolve_in(raw, device, patterns, skip_ambiguity_check, Path::new("."))
}

/// Resolution against an explicit host base directory (injectable for tests;
/// the base only affects ambiguity classification).
pub fn resolve_in(
    raw: &str,
    device: Option<&DeviceHandle>,
    patterns: &[String],
    skip_ambiguity_check: bool,
    host_base: &Path,
) -> Result<ResolvedSource> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!(MtpMoveError::InvalidArgument("empty source path".into()));
    }

    // A bare "*" means "everything here".
    let trimmed = if trimmed == "*" { "." } else { trimmed };

    // A trailing separator asserts "this is a directory".
    let dir_forced = trimmed.len() > 1 && trimmed.ends_with(['/', '\\']);
    let path = if dir_forced {
        trimmed.trim_end_matches(['/', '\\'])
    } else {
        trimmed
    };
    let path = if path.is_empty() { "/" } else { path };

    let explicit_patterns = !is_default_patterns(patterns);

    match classify_in(path, device, host_base) {
        Location::Ambiguous(p) => {
            if skip_ambiguity_check {
                // Caller override: the device interpretation wins.
                resolve_device(&p, device.expect("ambiguity implies a device"), raw, dir_forced, explicit_patterns)
            } else {
                bail!(MtpMoveError::AmbiguousPath(p));
            }
        }
        Location::Device(p) => resolve_device(
            &p,
            device.expect("device classification implies a device"),
            raw,
            dir_forced,
            explicit_patterns,
        ),
        Location::Host(p) => resolve_host(&p, raw, dir_forced, explicit_patterns),
    }
}

/// Walk a device path segment by segment via the resolve-next-child
/// capability.
fn resolve_device(
    path: &str,
    device: &DeviceHandle,
    raw: &str,
    dir_forced: bool,
    explicit_patterns: bool,
) -> Result<ResolvedSource> {
    // The device namespace is forward-slash only.
    if path.contains('\\') {
        bail!(MtpMoveError::InvalidPathSeparator(path.to_string()));
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let (final_seg, dir_segs) = segments
        .split_last()
        .ok_or_else(|| MtpMoveError::InvalidArgument(format!("no segments in '{raw}'")))?;

    for seg in dir_segs {
        if contains_wildcard(seg) {
            bail!(MtpMoveError::WildcardInDirectory(path.to_string()));
        }
    }
    if dir_forced && contains_wildcard(final_seg) {
        // "a/*/" would make the wildcard name a directory.
        bail!(MtpMoveError::WildcardInDirectory(path.to_string()));
    }

    let mut folder: Box<dyn FolderHandle> = Box::new(device.root_folder());
    let mut walked: Vec<&str> = Vec::new();
    for &seg in dir_segs {
        let next = folder
            .open_folder(seg)
            .with_context(|| format!("resolve device folder '{}'", join_after(&walked, seg)))?;
        match next {
            Some(f) => {
                folder = f;
                walked.push(seg);
            }
            None => bail!(MtpMoveError::NotFound(join_after(&walked, seg))),
        }
    }
    let prefix = walked.join("/");

    if contains_wildcard(final_seg) {
        return Ok(ResolvedSource::file_match(Location::Device(prefix), final_seg));
    }

    let child = folder
        .resolve_child(final_seg)
        .with_context(|| format!("resolve device item '{path}'"))?;
    match child {
        Some(item) if item.is_folder => {
            Ok(ResolvedSource::directory_match(Location::Device(
                segments.join("/"),
            )))
        }
        Some(_) => {
            if dir_forced {
                bail!(MtpMoveError::NotFound(format!("{path} is not a directory")));
            }
            if explicit_patterns {
                bail!(MtpMoveError::PatternConflict(path.to_string()));
            }
            Ok(ResolvedSource::file_match(Location::Device(prefix), final_seg))
        }
        None => {
            if dir_forced {
                bail!(MtpMoveError::NotFound(path.to_string()));
            }
            // Unresolved final segment: treat as a pattern; the match loop may
            // later find zero files, which is a warning, not an error.
            Ok(ResolvedSource::file_match(Location::Device(prefix), final_seg))
        }
    }
}

/// Host paths get a trusted exists check instead of a segment walk.
fn resolve_host(
    path: &Path,
    raw: &str,
    dir_forced: bool,
    explicit_patterns: bool,
) -> Result<ResolvedSource> {
    let path_str = path.to_string_lossy();
    let segments: Vec<&str> = path_str.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    if let Some((final_seg, dir_segs)) = segments.split_last() {
        for seg in dir_segs {
            if contains_wildcard(seg) {
                bail!(MtpMoveError::WildcardInDirectory(path_str.to_string()));
            }
        }
        if dir_forced && contains_wildcard(final_seg) {
            bail!(MtpMoveError::WildcardInDirectory(path_str.to_string()));
        }
    }

    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {
            Ok(ResolvedSource::directory_match(Location::Host(
                path.to_path_buf(),
            )))
        }
        Ok(_) => {
            if dir_forced {
                bail!(MtpMoveError::NotFound(format!(
                    "{} is not a directory",
                    path.display()
                )));
            }
            if explicit_patterns {
                bail!(MtpMoveError::PatternConflict(path.display().to_string()));
            }
            let (parent, leaf) = split_parent_leaf(path, raw)?;
            Ok(ResolvedSource::file_match(Location::Host(parent.to_path_buf()), leaf))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let (parent, leaf) = split_parent_leaf(path, raw)?;
            if contains_wildcard(leaf) {
                if !parent.is_dir() {
                    bail!(MtpMoveError::NotFound(parent.display().to_string()));
                }
                return Ok(ResolvedSource::file_match(
                    Location::Host(parent.to_path_buf()),
                    leaf,
                ));
            }
            bail!(MtpMoveError::NotFound(path.display().to_string()));
        }
        Err(e) => Err(e).with_context(|| format!("stat '{}'", path.display())),
    }
}

fn split_parent_leaf<'a>(path: &'a Path, raw: &str) -> Result<(&'a Path, &'a str)> {
    let leaf = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MtpMoveError::InvalidArgument(format!("no file name in '{raw}'")))?;
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((parent, leaf))
}

fn join_after(walked: &[&str], seg: &str) -> String {
    if walked.is_empty() {
        seg.to_string()
    } else {
        format!("{}/{}", walked.join("/"), seg)
    }
}
