//! JSON Record Store - Atomic Whole-File Persistence
//!
//! Saves the market-record collection to a single JSON file using
//! atomic writes (write to tmp file, then rename). This guarantees the
//! file is always either the old or the new version, never a partial
//! write. Records are validated on load so malformed state fails the
//! run instead of being silently coerced.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, instrument};

use crate::domain::record::MarketRecord;
use crate::ports::record_store::{RecordStore, StoreError};

/// Atomic JSON store for the market-record collection.
pub struct JsonRecordStore {
    /// Path of the records file.
    path: PathBuf,
    /// Temporary path for atomic writes.
    tmp_path: PathBuf,
    /// Treat a missing file as an empty collection.
    tolerate_missing: bool,
}

impl JsonRecordStore {
    /// Create a store backed by the given file path.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub async fn new(path: &str, tolerate_missing: bool) -> Result<Self, StoreError> {
        let path = PathBuf::from(path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(|source| StoreError::Io {
                path: dir.display().to_string(),
                source,
            })?;
        }

        let tmp_path = sibling_tmp(&path);
        Ok(Self {
            path,
            tmp_path,
            tolerate_missing,
        })
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> StoreError {
        StoreError::Malformed {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
    }
}

fn sibling_tmp(path: &Path) -> PathBuf {
    let mut name = path.file_name().map_or_else(
        || std::ffi::OsString::from("records.json"),
        std::ffi::OsStr::to_os_string,
    );
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    /// Load and validate the full collection.
    #[instrument(skip(self))]
    async fn load_all(&self) -> Result<Vec<MarketRecord>, StoreError> {
        if !self.path.exists() {
            if self.tolerate_missing {
                info!(path = %self.path.display(), "No records file found, starting empty");
                return Ok(Vec::new());
            }
            return Err(self.io_err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "records file missing",
            )));
        }

        let json = fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_err(e))?;

        let records: Vec<MarketRecord> =
            serde_json::from_str(&json).map_err(|e| self.malformed(e.to_string()))?;

        let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
        for record in &records {
            record.validate().map_err(|reason| self.malformed(reason))?;
            if !seen.insert(record.game_id.as_str()) {
                return Err(self.malformed(format!("duplicate game_id {}", record.game_id)));
            }
        }

        info!(count = records.len(), "Loaded market records");
        Ok(records)
    }

    /// Atomically replace the records file (tmp → rename).
    #[instrument(skip_all, fields(count = records.len()))]
    async fn save_all(&self, records: &[MarketRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| self.malformed(e.to_string()))?;

        fs::write(&self.tmp_path, &json)
            .await
            .map_err(|e| self.io_err(e))?;

        fs::rename(&self.tmp_path, &self.path)
            .await
            .map_err(|e| self.io_err(e))?;

        Ok(())
    }

    /// Check if the backing file is writable.
    async fn is_healthy(&self) -> bool {
        if !self.path.exists() {
            return true; // First run is OK
        }
        fs::metadata(&self.path).await.is_ok()
    }
}
