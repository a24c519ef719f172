//! Asynchronous release of in-flight files.
//!
//! Cross-store transfers cannot delete their source or staged temp file the
//! moment the destination write returns: the destination store may still hold
//! the just-written bytes open. Records therefore go onto a queue consumed by
//! a dedicated worker that retries deletion until the file unlocks or a
//! per-record timeout expires.
//!
//! Per-record states: Pending -> Unlocked -> Deleted, or Pending -> TimedOut
//! (dropped with one warning). Closing the channel is the "no further
//! records" signal; the worker exits once the channel is closed and every
//! record is deleted or timed out.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::errors::MtpMoveError;

pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_CLEANUP_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// A file awaiting safe deletion: a staged temp copy, or (for moves) the
/// original source item.
#[derive(Debug)]
pub struct StagingRecord {
    pub path: PathBuf,
    pub enqueued_at: Instant,
}

#[derive(Debug, Clone, Copy)]
pub struct CleanupConfig {
    /// Pause between deletion attempts for a locked file.
    pub retry_interval: Duration,
    /// How long a single record may stay Pending before it is abandoned.
    pub timeout: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            timeout: DEFAULT_CLEANUP_TIMEOUT,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupStats {
    pub deleted: usize,
    pub timed_out: usize,
}

/// Owns the queue sender and the worker thread. `wait()` (or drop) closes the
/// queue and joins the worker, so no run exits with deletions still in
/// flight.
pub struct CleanupCoordinator {
    tx: Option<Sender<StagingRecord>>,
    worker: Option<JoinHandle<CleanupStats>>,
}

impl CleanupCoordinator {
    pub fn spawn(cfg: CleanupConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("cleanup".into())
            .spawn(move || worker_loop(rx, cfg))
            .expect("failed to spawn cleanup worker");
        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Queue a file for deferred deletion.
    pub fn enqueue(&self, path: PathBuf) {
        debug!(path = %path.display(), "queued for cleanup");
        if let Some(tx) = &self.tx {
            // The worker outlives the sender; send cannot fail here.
            let _ = tx.send(StagingRecord {
                path,
                enqueued_at: Instant::now(),
            });
        }
    }

    /// Close the queue and block until every record is Deleted or TimedOut.
    pub fn wait(mut self) -> CleanupStats {
        self.join_inner()
    }

    fn join_inner(&mut self) -> CleanupStats {
        drop(self.tx.take());
        self.worker
            .take()
            .and_then(|w| w.join().ok())
            .unwrap_or_default()
    }
}

impl Drop for CleanupCoordinator {
    fn drop(&mut self) {
        // Early-failure path: still drain the queue before the process exits.
        let _ = self.join_inner();
    }
}

fn worker_loop(rx: Receiver<StagingRecord>, cfg: CleanupConfig) -> CleanupStats {
    let mut pending: VecDeque<StagingRecord> = VecDeque::new();
    let mut stats = CleanupStats::default();
    let mut open = true;

    loop {
        if open {
            if pending.is_empty() {
                // Idle: block until something arrives or the queue closes.
                match rx.recv() {
                    Ok(rec) => pending.push_back(rec),
                    Err(_) => open = false,
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(rec) => pending.push_back(rec),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        open = false;
                        break;
                    }
                }
            }
        }

        if pending.is_empty() {
            if !open {
                return stats;
            }
            continue;
        }

        // One deletion pass over everything currently pending.
        let mut retry = VecDeque::new();
        for rec in pending.drain(..) {
            match try_delete(&rec.path) {
                Ok(()) => {
                    stats.deleted += 1;
                    debug!(path = %rec.path.display(), "released and deleted");
                }
                Err(e) => {
                    let waited = rec.enqueued_at.elapsed();
                    if waited >= cfg.timeout {
                        let err = MtpMoveError::LockTimeout {
                            path: rec.path.clone(),
                            waited_secs: waited.as_secs(),
                        };
                        warn!(code = err.code(), error = %e, "{err}");
                        stats.timed_out += 1;
                    } else {
                        retry.push_back(rec);
                    }
                }
            }
        }
        pending = retry;

        if !pending.is_empty() {
            // Sleep between retries; wake early for new arrivals while the
            // queue is still open.
            if open {
                match rx.recv_timeout(cfg.retry_interval) {
                    Ok(rec) => pending.push_back(rec),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => open = false,
                }
            } else {
                thread::sleep(cfg.retry_interval);
            }
        }
    }
}

/// A record whose file is already gone counts as deleted.
fn try_delete(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fast_cfg() -> CleanupConfig {
        CleanupConfig {
            retry_interval: Duration::from_millis(10),
            timeout: Duration::from_millis(80),
        }
    }

    #[test]
    fn deletes_unlocked_files() {
        let td = tempdir().unwrap();
        let a = td.path().join("a.tmp");
        let b = td.path().join("b.tmp");
        fs::write(&a, b"x").unwrap();
        fs::write(&b, b"y").unwrap();

        let coordinator = CleanupCoordinator::spawn(fast_cfg());
        coordinator.enqueue(a.clone());
        coordinator.enqueue(b.clone());
        let stats = coordinator.wait();

        assert_eq!(stats, CleanupStats { deleted: 2, timed_out: 0 });
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn missing_file_counts_as_deleted() {
        let td = tempdir().unwrap();
        let coordinator = CleanupCoordinator::spawn(fast_cfg());
        coordinator.enqueue(td.path().join("never-existed"));
        let stats = coordinator.wait();
        assert_eq!(stats.deleted, 1);
    }

    #[test]
    fn terminates_immediately_when_queue_closes_empty() {
        let coordinator = CleanupCoordinator::spawn(fast_cfg());
        let stats = coordinator.wait();
        assert_eq!(stats, CleanupStats::default());
    }

    #[cfg(unix)]
    #[test]
    fn undeletable_record_times_out_without_stalling() {
        use std::os::unix::fs::PermissionsExt;

        let td = tempdir().unwrap();
        let locked_dir = td.path().join("locked");
        fs::create_dir(&locked_dir).unwrap();
        let victim = locked_dir.join("held.tmp");
        fs::write(&victim, b"x").unwrap();
        // A read-only parent makes unlink fail, standing in for a lock.
        fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o555)).unwrap();

        let cfg = fast_cfg();
        let coordinator = CleanupCoordinator::spawn(cfg);
        coordinator.enqueue(victim.clone());
        let started = Instant::now();
        let stats = coordinator.wait();
        let elapsed = started.elapsed();

        assert_eq!(stats, CleanupStats { deleted: 0, timed_out: 1 });
        // Never blocks past timeout + one retry interval (plus scheduling slack).
        assert!(elapsed < cfg.timeout + cfg.retry_interval * 4);

        fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(victim.exists(), "timed-out record is abandoned, not deleted");
    }

    #[cfg(unix)]
    #[test]
    fn late_unlock_still_gets_deleted() {
        use std::os::unix::fs::PermissionsExt;

        let td = tempdir().unwrap();
        let locked_dir = td.path().join("busy");
        fs::create_dir(&locked_dir).unwrap();
        let victim = locked_dir.join("busy.tmp");
        fs::write(&victim, b"x").unwrap();
        fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o555)).unwrap();

        let coordinator = CleanupCoordinator::spawn(CleanupConfig {
            retry_interval: Duration::from_millis(10),
            timeout: Duration::from_secs(5),
        });
        coordinator.enqueue(victim.clone());

        // Unlock shortly after the first failed attempt.
        let dir = locked_dir.clone();
        let unlocker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(40));
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
        });

        let stats = coordinator.wait();
        unlocker.join().unwrap();

        assert_eq!(stats, CleanupStats { deleted: 1, timed_out: 0 });
        assert!(!victim.exists());
    }
}
