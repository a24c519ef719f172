//! Process-scoped staging directory.
//! Shuttles files between two stores that cannot transfer directly. The
//! directory name is derived from the process id, so a crashed run's leftover
//! staging area is wiped the next time the same slot is reused, and a clean
//! run wipes its own directory on drop.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Create the staging directory under the platform temp root.
    pub fn create() -> io::Result<Self> {
        Self::create_under(&env::temp_dir())
    }

    /// Create the staging directory under an explicit root.
    pub fn create_under(root: &Path) -> io::Result<Self> {
        let suffix = std::process::id() % 1000;
        let dir = root.join(format!("mtp_move_{suffix:03}"));

        // Startup wipe: a previous run in this slot may have left files behind.
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "staging area ready");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Full path of a staged file.
    pub fn entry(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        // Normal-completion wipe. Cleanup has already joined by the time the
        // area drops, so anything left is abandoned (timed out) anyway.
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(dir = %self.dir.display(), error = %e, "could not remove staging area");
            }
        }
    }
}
