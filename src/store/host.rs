//! Host filesystem adapter.
//! Wraps one local directory behind `FolderHandle`. Moves prefer an atomic
//! rename and fall back to copy+remove across filesystems.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::{FolderHandle, ItemHandle};

pub struct HostFolder {
    dir: PathBuf,
    name: String,
}

impl HostFolder {
    /// Open an existing directory.
    pub fn open(dir: &Path) -> io::Result<Self> {
        let meta = fs::metadata(dir)?;
        if !meta.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", dir.display()),
            ));
        }
        Ok(Self::wrap(dir))
    }

    /// Open the directory, creating it (and parents) if missing.
    pub fn open_or_create(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self::wrap(dir))
    }

    fn wrap(dir: &Path) -> Self {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            dir: dir.to_path_buf(),
            name,
        }
    }

    fn child(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl FolderHandle for HostFolder {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve_child(&self, name: &str) -> io::Result<Option<ItemHandle>> {
        match fs::symlink_metadata(self.child(name)) {
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
        let path = self.child(name);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => Ok(Some(Box::new(Self::wrap(&path)))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
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
        Ok(Box::new(Self::wrap(&path)))
    }

    fn copy_in(&self, src: &Path, name: &str) -> io::Result<()> {
        fs::copy(src, self.child(name)).map(|_| ())
    }

    fn move_in(&self, src: &Path, name: &str) -> io::Result<()> {
        let dest = self.child(name);
        match try_atomic_rename(src, &dest) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, src = %src.display(), "rename failed, falling back to copy+remove");
                fs::copy(src, &dest)?;
                fs::remove_file(src)
            }
        }
    }

    fn copy_out(&self, name: &str, dest: &Path) -> io::Result<()> {
        fs::copy(self.child(name), dest).map(|_| ())
    }

    fn delete(&self, name: &str) -> io::Result<()> {
        fs::remove_file(self.child(name))
    }

    fn host_path(&self) -> Option<&Path> {
        Some(&self.dir)
    }

    fn child_path(&self, name: &str) -> Option<PathBuf> {
        Some(self.child(name))
    }
}

/// Rename with context on failure.
/// - On Windows, rename does not overwrite; destinations are unique-allocated
///   upstream, so no pre-delete is needed here.
/// - On Unix, best-effort fsync of the destination directory after rename.
pub(crate) fn try_atomic_rename(src: &Path, dst: &Path) -> io::Result<()> {
    fs::rename(src, dst)?;

    #[cfg(unix)]
    if let Some(parent) = dst.parent() {
        // Ignore fsync errors to avoid turning a successful rename into a failure.
        let _ = fsync_dir(parent);
    }

    Ok(())
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> io::Result<()> {
    use std::os::fd::AsRawFd;
    let f = fs::File::open(dir)?;
    let rc = unsafe { libc::fsync(f.as_raw_fd()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
