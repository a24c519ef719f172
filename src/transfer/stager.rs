//! Per-item transfer execution.
//!
//! Two shapes of transfer:
//! - direct: both folders are host-backed, so the file moves or copies
//!   straight to its unique-allocated destination path;
//! - staged: either side is device-backed, so the bytes shuttle through the
//!   staging area, get renamed there if the destination name collided, and
//!   the leftover staged copy (plus, for moves, the original source) is
//!   handed to the cleanup queue instead of being deleted inline.

use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use tracing::{debug, info};

use crate::errors::MtpMoveError;
use crate::shutdown;
use crate::store::{FolderHandle, Location};

use super::cleanup::CleanupCoordinator;
use super::staging::StagingArea;
use super::unique::allocate_unique_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Copy,
    Move,
}

impl TransferMode {
    pub fn verb(self) -> &'static str {
        match self {
            TransferMode::Copy => "copied",
            TransferMode::Move => "moved",
        }
    }

    pub fn verb_capitalized(self) -> &'static str {
        match self {
            TransferMode::Copy => "Copied",
            TransferMode::Move => "Moved",
        }
    }
}

/// One enumerated match, held only for the duration of its transfer attempt.
#[derive(Debug, Clone)]
pub struct TransferItem {
    pub name: String,
    pub source: Location,
    pub is_folder: bool,
}

pub struct TransferStager<'a> {
    staging: &'a StagingArea,
    cleanup: &'a CleanupCoordinator,
    dry_run: bool,
}

impl<'a> TransferStager<'a> {
    pub fn new(staging: &'a StagingArea, cleanup: &'a CleanupCoordinator, dry_run: bool) -> Self {
        Self {
            staging,
            cleanup,
            dry_run,
        }
    }

    /// Transfer one item; returns the final destination name. Failures come
    /// back as `TransferFailed` (or a more specific taxonomy error) so the
    /// caller can count them and continue with the batch.
    pub fn transfer(
        &self,
        item: &TransferItem,
        src: &dyn FolderHandle,
        dest: &dyn FolderHandle,
        mode: TransferMode,
    ) -> std::result::Result<String, MtpMoveError> {
        self.transfer_inner(item, src, dest, mode)
            .map_err(|e| match e.downcast::<MtpMoveError>() {
                Ok(me) => me,
                Err(other) => MtpMoveError::TransferFailed {
                    name: item.name.clone(),
                    cause: format!("{other:#}"),
                },
            })
    }

    fn transfer_inner(
        &self,
        item: &TransferItem,
        src: &dyn FolderHandle,
        dest: &dyn FolderHandle,
        mode: TransferMode,
    ) -> Result<String> {
        if shutdown::is_requested() {
            bail!("shutdown requested");
        }
        if item.is_folder {
            bail!("'{}' is a folder; folders are not transferred", item.name);
        }

        let unique = allocate_unique_name(dest, &item.name)?;
        if unique != item.name {
            debug!(from = %item.name, to = %unique, "destination name collision");
        }

        if self.dry_run {
            info!(
                name = %item.name,
                dest_name = %unique,
                source = %item.source.describe(),
                "dry-run: would transfer"
            );
            return Ok(unique);
        }

        let direct = src.host_path().is_some() && dest.host_path().is_some();
        if direct {
            self.transfer_direct(item, src, dest, mode, &unique)?;
        } else {
            self.transfer_staged(item, src, dest, mode, &unique)?;
        }

        info!(
            name = %item.name,
            dest_name = %unique,
            staged = !direct,
            "{}", mode.verb()
        );
        Ok(unique)
    }

    fn transfer_direct(
        &self,
        item: &TransferItem,
        src: &dyn FolderHandle,
        dest: &dyn FolderHandle,
        mode: TransferMode,
        unique: &str,
    ) -> Result<()> {
        let from = src
            .child_path(&item.name)
            .ok_or_else(|| anyhow!("host folder exposes no path for '{}'", item.name))?;
        match mode {
            TransferMode::Move => dest
                .move_in(&from, unique)
                .with_context(|| format!("move '{}' into destination", item.name)),
            TransferMode::Copy => dest
                .copy_in(&from, unique)
                .with_context(|| format!("copy '{}' into destination", item.name)),
        }
    }

    fn transfer_staged(
        &self,
        item: &TransferItem,
        src: &dyn FolderHandle,
        dest: &dyn FolderHandle,
        mode: TransferMode,
        unique: &str,
    ) -> Result<()> {
        let staged = self.staging.entry(&item.name);
        src.copy_out(&item.name, &staged)
            .with_context(|| format!("stage '{}' out of source", item.name))?;

        // Rename in the staging area before finalizing, so the destination
        // only ever sees the final name.
        let staged = if unique != item.name {
            let renamed = self.staging.entry(unique);
            fs::rename(&staged, &renamed)
                .with_context(|| format!("rename staged copy to '{unique}'"))?;
            renamed
        } else {
            staged
        };

        dest.copy_in(&staged, unique)
            .with_context(|| format!("finalize '{unique}' into destination"))?;

        // The destination store may still hold the just-written bytes open;
        // deletion is deferred to the cleanup worker.
        self.cleanup.enqueue(staged);
        if mode == TransferMode::Move {
            match src.child_path(&item.name) {
                Some(original) => self.cleanup.enqueue(original),
                // Opaque store without host-visible children: delete through
                // the store's own capability.
                None => src
                    .delete(&item.name)
                    .with_context(|| format!("delete source item '{}'", item.name))?,
            }
        }
        Ok(())
    }
}
