//! Run Lock - Advisory Single-Writer Lock File
//!
//! The record store must never be written by two runs concurrently.
//! A lock file created with `create_new` next to the records file makes
//! the second invocation fail fast instead of corrupting state. The
//! lock is released on drop; a stale file left by a crashed run must be
//! removed manually (its contents name the owning process).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::ports::record_store::StoreError;

/// Advisory lock held for the duration of a pipeline run.
#[derive(Debug)]
pub struct RunLock {
    lock_path: PathBuf,
}

impl RunLock {
    /// Acquire the lock for the store at `store_path`.
    ///
    /// Creates the store's parent directory if it doesn't exist: the
    /// lock is acquired before the store itself on a fresh install.
    /// Fails with [`StoreError::Locked`] if the lock file already
    /// exists (another run is in progress, or a previous run crashed).
    pub fn acquire(store_path: &str) -> Result<Self, StoreError> {
        let lock_path = PathBuf::from(format!("{store_path}.lock"));
        if let Some(dir) = lock_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.display().to_string(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    StoreError::Locked(lock_path.display().to_string())
                } else {
                    StoreError::Io {
                        path: lock_path.display().to_string(),
                        source: e,
                    }
                }
            })?;

        // Record the owner so a stale lock is diagnosable.
        let _ = writeln!(file, "pid {}", std::process::id());

        debug!(path = %lock_path.display(), "Run lock acquired");
        Ok(Self { lock_path })
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.lock_path) {
            warn!(
                path = %self.lock_path.display(),
                error = %e,
                "Failed to remove run lock file"
            );
        }
    }
}
