//! Device store adapter and enumeration.
//!
//! A device is addressed through a mount root (for example a gvfs MTP mount
//! under /run/user/<uid>/gvfs/). The mount gives a host-visible view of the
//! device tree, but it is not a regular filesystem: renames and in-place
//! writes are unsupported or unreliable, so `host_path()` is None and every
//! transfer touching a device goes through the staging area.
//!
//! The device namespace uses forward slashes only; top-level folder names
//! (e.g. "Internal storage", "SD card") are fetched once per handle and drive
//! path classification.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{FolderHandle, ItemHandle};

/// An attached device: mount root plus its top-level folder names.
#[derive(Debug, Clone)]
pub struct DeviceHandle {
    name: String,
    mount_root: PathBuf,
    top_level: Vec<String>,
}

impl DeviceHandle {
    /// Open a device by its mount root, reading top-level folder names once.
    pub fn open(name: &str, mount_root: &Path) -> io::Result<Self> {
        let mut top_level = Vec::new();
        for entry in fs::read_dir(mount_root)? {
            let entry = entry?;
            if entry.metadata()?.is_dir() {
                top_level.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        top_level.sort();
        debug!(device = name, folders = ?top_level, "device top-level folders");
        Ok(Self {
            name: name.to_string(),
            mount_root: mount_root.to_path_buf(),
            top_level,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level folder names, as read at open time.
    pub fn top_level_folders(&self) -> &[String] {
        &self.top_level
    }

    /// The device root as a folder handle.
    pub fn root_folder(&self) -> MountedDeviceFolder {
        MountedDeviceFolder {
            device_path: String::new(),
            dir: self.mount_root.clone(),
        }
    }

    /// Walk a forward-slash device path to a folder handle; Ok(None) when any
    /// segment is missing or not a folder.
    pub fn open_path(&self, device_path: &str) -> io::Result<Option<MountedDeviceFolder>> {
        let mut folder = self.root_folder();
        for segment in device_path.split('/').filter(|s| !s.is_empty()) {
            match folder.open_device_folder(segment)? {
                Some(next) => folder = next,
                None => return Ok(None),
            }
        }
        Ok(Some(folder))
    }
}

/// One folder inside a mounted device store.
pub struct MountedDeviceFolder {
    /// Forward-slash path inside the device namespace ("" for the root).
    device_path: String,
    /// Backing path under the mount root.
    dir: PathBuf,
}

impl MountedDeviceFolder {
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    fn child(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn child_device_path(&self, name: &str) -> String {
        if self.device_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.device_path, name)
        }
    }

    fn open_device_folder(&self, name: &str) -> io::Result<Option<MountedDeviceFolder>> {
        let path = self.child(name);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => Ok(Some(MountedDeviceFolder {
                device_path: self.child_device_path(name),
                dir: path,
            })),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl FolderHandle for MountedDeviceFolder {
    fn name(&self) -> &str {
        self.device_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.device_path)
    }

    fn resolve_child(&self, name: &str) -> io::Result<Option<ItemHandle>> {
        match fs::metadata(self.child(name)) {
            Ok(meta) => Ok(Some(ItemHandle {
                name: name.to_string(),
                is_folder: meta.is_dir(),
                size: meta.is_file().then(|| meta.len()),
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn open_folder(&self, name: &str) -> io::Result<Option<Box<dyn FolderHandle>>> {
        Ok(self
            .open_device_folder(name)?
            .map(|f| Box::new(f) as Box<dyn FolderHandle>))
    }

    fn enumerate_children(&self) -> io::Result<Vec<ItemHandle>> {
        let mut items = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            items.push(ItemHandle {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_folder: meta.is_dir(),
                size: meta.is_file().then(|| meta.len()),
            });
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    fn create_folder(&self, name: &str) -> io::Result<Box<dyn FolderHandle>> {
        let path = self.child(name);
        fs::create_dir_all(&path)?;
        Ok(Box::new(MountedDeviceFolder {
            device_path: self.child_device_path(name),
            dir: path,
        }))
    }

    fn copy_in(&self, src: &Path, name: &str) -> io::Result<()> {
        fs::copy(src, self.child(name)).map(|_| ())
    }

    fn move_in(&self, src: &Path, name: &str) -> io::Result<()> {
        // No rename across the mount boundary; bytes are copied and the
        // caller owns deferred deletion of the source.
        self.copy_in(src, name)
    }

    fn copy_out(&self, name: &str, dest: &Path) -> io::Result<()> {
        fs::copy(self.child(name), dest).map(|_| ())
    }

    fn delete(&self, name: &str) -> io::Result<()> {
        fs::remove_file(self.child(name))
    }

    fn host_path(&self) -> Option<&Path> {
        None
    }

    fn child_path(&self, name: &str) -> Option<PathBuf> {
        Some(self.child(name))
    }
}

/// Platform default for where device mounts appear (gvfs on Linux).
pub fn default_mounts_root() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        let uid = unsafe { libc::getuid() };
        Some(PathBuf::from(format!("/run/user/{uid}/gvfs")))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// List attached devices: one per directory under the mounts root.
pub fn enumerate_mounted_devices(mounts_root: &Path) -> io::Result<Vec<DeviceHandle>> {
    let mut devices = Vec::new();
    for entry in fs::read_dir(mounts_root)? {
        let entry = entry?;
        if !entry.metadata()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match DeviceHandle::open(&name, &entry.path()) {
            Ok(dev) => devices.push(dev),
            Err(e) => debug!(device = %name, error = %e, "skipping unreadable mount"),
        }
    }
    devices.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(devices)
}
