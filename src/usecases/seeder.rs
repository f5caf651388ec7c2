//! Seeder Use Case - Merge Upstream Games into the Record Store
//!
//! Fetches pending game descriptors from the upstream feed and inserts
//! them as `Pending` records. Descriptors whose game id already exists
//! in the store are skipped, so re-running with the same feed never
//! creates duplicates. Descriptors that fail basic validation are
//! dropped with a warning rather than poisoning the store.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::record::{CreationParams, MarketRecord};
use crate::ports::game_source::{FetchError, GameSource, RawGameDescriptor};
use crate::ports::record_store::{RecordStore, StoreError};

/// Seeding failure: either the upstream fetch or the store.
///
/// The caller treats fetch failures as survivable (the run continues
/// over existing records) and store failures as fatal.
#[derive(Debug, Error)]
pub enum SeedError {
  #[error(transparent)]
  Fetch(#[from] FetchError),
  #[error(transparent)]
  Store(#[from] StoreError),
}

/// Counts from one seeding pass.
#[derive(Debug, Clone, Copy)]
pub struct SeedSummary {
  /// Descriptors returned by the feed.
  pub fetched: usize,
  /// New records inserted.
  pub added: usize,
  /// Descriptors skipped because their id already exists.
  pub skipped_existing: usize,
  /// Descriptors dropped by validation.
  pub skipped_invalid: usize,
}

/// Merges upstream game descriptors into the record store.
pub struct Seeder<F: GameSource, S: RecordStore> {
  source: F,
  store: Arc<S>,
}

impl<F: GameSource, S: RecordStore> Seeder<F, S> {
  /// Create a seeder wired to the given ports.
  pub fn new(source: F, store: Arc<S>) -> Self {
    Self { source, store }
  }

  /// Fetch descriptors and merge new ones into the store.
  pub async fn seed(&self) -> Result<SeedSummary, SeedError> {
    let descriptors = self.source.fetch_pending().await?;
    let mut records = self.store.load_all().await?;

    let mut existing: HashSet<String> =
      records.iter().map(|r| r.game_id.clone()).collect();

    let mut summary = SeedSummary {
      fetched: descriptors.len(),
      added: 0,
      skipped_existing: 0,
      skipped_invalid: 0,
    };

    for descriptor in descriptors {
      if let Err(reason) = validate(&descriptor) {
        warn!(game_id = %descriptor.game_id, reason, "Dropping invalid descriptor");
        summary.skipped_invalid += 1;
        continue;
      }
      if !existing.insert(descriptor.game_id.clone()) {
        summary.skipped_existing += 1;
        continue;
      }

      records.push(MarketRecord::new(
        descriptor.game_id,
        CreationParams {
          question: descriptor.question,
          options: descriptor.options,
          close_time: descriptor.close_time,
        },
      ));
      summary.added += 1;
    }

    if summary.added > 0 {
      self.store.save_all(&records).await?;
    }

    info!(
      fetched = summary.fetched,
      added = summary.added,
      skipped_existing = summary.skipped_existing,
      skipped_invalid = summary.skipped_invalid,
      "Seeding pass complete"
    );

    Ok(summary)
  }
}

fn validate(descriptor: &RawGameDescriptor) -> Result<(), &'static str> {
  if descriptor.game_id.is_empty() {
    return Err("empty game id");
  }
  if descriptor.question.is_empty() {
    return Err("empty question");
  }
  if descriptor.options.len() < 2 {
    return Err("fewer than 2 options");
  }
  Ok(())
}
