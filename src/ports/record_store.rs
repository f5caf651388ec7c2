//! Record Store Port - Market Record Persistence Interface
//!
//! Defines the trait for loading and saving the whole market-record
//! collection. The file is the single source of truth: callers follow a
//! load-modify-save discipline under a single writer.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::record::MarketRecord;

/// Local persistence failure. Fatal for the run — the pipeline cannot
/// safely proceed without durable state.
#[derive(Debug, Error)]
pub enum StoreError {
  /// The backing file could not be read or written.
  #[error("store I/O failure at {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  /// The backing file exists but does not decode to valid records.
  #[error("store file {path} is malformed: {reason}")]
  Malformed { path: String, reason: String },
  /// Another run holds the advisory lock.
  #[error("store is locked by another run: {0}")]
  Locked(String),
}

/// Trait for market-record persistence providers.
///
/// `save_all` atomically replaces the prior persisted state entirely —
/// no partial merge. Record-level updates are expressed as
/// load-modify-save over the whole collection.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
  /// Load the full collection.
  ///
  /// Returns an empty vec when the file is absent and the store
  /// tolerates that (first run).
  async fn load_all(&self) -> Result<Vec<MarketRecord>, StoreError>;

  /// Atomically overwrite the backing file with the full collection.
  async fn save_all(&self, records: &[MarketRecord]) -> Result<(), StoreError>;

  /// Check if the store is healthy (permissions, disk).
  async fn is_healthy(&self) -> bool;
}
