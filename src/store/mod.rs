//! Storage abstraction: one narrow capability surface over "a directory of
//! files", with concrete adapters per location kind.
//!
//! The host filesystem and an attached device store expose the same
//! `FolderHandle` trait; the only capability difference the engine cares
//! about is `host_path()`, which is Some for folders whose children are plain
//! local files (enabling the direct rename fast path) and None for
//! device-backed folders (forcing transfers through the staging area).

mod device;
mod host;

pub use device::{DeviceHandle, MountedDeviceFolder, default_mounts_root, enumerate_mounted_devices};
pub use host::HostFolder;

use std::io;
use std::path::{Path, PathBuf};

/// Where a user-supplied path points after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Conventional filesystem path.
    Host(PathBuf),
    /// Forward-slash path inside an attached device store.
    Device(String),
    /// Could be either; callers must treat this as a hard error.
    Ambiguous(String),
}

impl Location {
    pub fn is_device(&self) -> bool {
        matches!(self, Location::Device(_))
    }

    /// Human-readable rendering for logs and messages.
    pub fn describe(&self) -> String {
        match self {
            Location::Host(p) => p.display().to_string(),
            Location::Device(p) => format!("device:{p}"),
            Location::Ambiguous(p) => format!("ambiguous:{p}"),
        }
    }
}

/// A single entry inside a folder, as reported by lookup or enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemHandle {
    pub name: String,
    pub is_folder: bool,
    pub size: Option<u64>,
}

/// Capability surface over one directory of a store.
pub trait FolderHandle {
    /// Leaf name of this folder ("" for a store root).
    fn name(&self) -> &str;

    /// Look up a direct child by name; Ok(None) when absent.
    fn resolve_child(&self, name: &str) -> io::Result<Option<ItemHandle>>;

    /// Open a direct child folder by name; Ok(None) when absent or not a folder.
    fn open_folder(&self, name: &str) -> io::Result<Option<Box<dyn FolderHandle>>>;

    /// List direct children.
    fn enumerate_children(&self) -> io::Result<Vec<ItemHandle>>;

    /// Create (or open, if it already exists) a child folder.
    fn create_folder(&self, name: &str) -> io::Result<Box<dyn FolderHandle>>;

    /// Copy a host-side file into this folder under `name`.
    fn copy_in(&self, src: &Path, name: &str) -> io::Result<()>;

    /// Move a host-side file into this folder under `name`.
    ///
    /// Device-backed folders copy the bytes and leave the source in place;
    /// the caller owns deferred deletion of the original.
    fn move_in(&self, src: &Path, name: &str) -> io::Result<()>;

    /// Copy the child `name` out of this folder to a host-side path.
    fn copy_out(&self, name: &str, dest: &Path) -> io::Result<()>;

    /// Delete the child `name`.
    fn delete(&self, name: &str) -> io::Result<()>;

    /// Path of this folder when its children are plain local files.
    fn host_path(&self) -> Option<&Path>;

    /// Host-visible path of the child `name`, when one exists. Feeds the
    /// path-based cleanup queue.
    fn child_path(&self, name: &str) -> Option<PathBuf>;
}
