//! Collision-free destination naming.
//! Probes "{base} (n){ext}" the way desktop copy dialogs do; the destination
//! is never overwritten.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::errors::MtpMoveError;
use crate::store::FolderHandle;

const MAX_SUFFIX: u32 = 999;

/// Return `candidate` unchanged when the folder has no such child, otherwise
/// the first free "{base} (n){ext}" for n = 1, 2, ...
pub fn allocate_unique_name(folder: &dyn FolderHandle, candidate: &str) -> Result<String> {
    if probe(folder, candidate)?.is_none() {
        return Ok(candidate.to_string());
    }

    let base = Path::new(candidate);
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(candidate);
    let ext = base
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    for n in 1..=MAX_SUFFIX {
        let name = format!("{stem} ({n}){ext}");
        if probe(folder, &name)?.is_none() {
            return Ok(name);
        }
    }

    bail!(MtpMoveError::NameSpaceExhausted {
        folder: folder.name().to_string(),
        name: candidate.to_string(),
    })
}

fn probe(folder: &dyn FolderHandle, name: &str) -> Result<Option<()>> {
    Ok(folder
        .resolve_child(name)
        .with_context(|| format!("probe destination name '{name}'"))?
        .map(|_| ()))
}
