//! Batch Orchestrator Use Case - Per-record Create/Resolve Pipeline
//!
//! Drives every non-terminal record through its next state transition:
//! `Pending` records get a creation transaction, `Created` records past
//! their close time get their outcome queried and resolved. One attempt
//! per record per run; transient failures consume the record's retry
//! budget across runs, permanent failures fail the record immediately.
//!
//! Run flow:
//! 1. Load all records (optionally resetting Failed ones for retry)
//! 2. Process non-terminal records with bounded concurrency
//! 3. Persist the full collection after each record's outcome is known
//! 4. Aggregate a run summary
//!
//! A failure in one record never aborts the others; only a store
//! failure ends the run early (the pipeline cannot proceed without
//! durable state). A shutdown signal stops not-yet-started records
//! while in-flight chain submissions run to completion.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::domain::record::{MarketRecord, MarketStatus};
use crate::ports::chain_gateway::{ChainError, ChainGateway};
use crate::ports::record_store::{RecordStore, StoreError};

/// What happened to one record during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
  /// Creation transaction confirmed.
  Created,
  /// Resolution confirmed (or already resolved on-chain).
  Resolved,
  /// Permanent failure or retry budget exhausted.
  Failed,
  /// Transient failure; the record will be retried next run.
  Retried,
  /// Nothing to do this run (terminal, not due, outcome unknown, or
  /// shutdown requested).
  Skipped,
}

/// Aggregated report of a pipeline run.
#[derive(Debug, Clone)]
pub struct RunSummary {
  /// Unique id of this run (for log correlation).
  pub run_id: Uuid,
  /// When the run started.
  pub started_at: DateTime<Utc>,
  /// Records in the store at the start of the run.
  pub total: usize,
  /// Records that reached `Created` this run.
  pub created: usize,
  /// Records that reached `Resolved` this run.
  pub resolved: usize,
  /// Records that ended the run `Failed`.
  pub failed: usize,
  /// Records that consumed a retry attempt.
  pub retried: usize,
  /// Records with nothing to do.
  pub skipped: usize,
}

impl RunSummary {
  fn new(total: usize) -> Self {
    Self {
      run_id: Uuid::new_v4(),
      started_at: Utc::now(),
      total,
      created: 0,
      resolved: 0,
      failed: 0,
      retried: 0,
      skipped: 0,
    }
  }

  fn tally(&mut self, outcome: RecordOutcome) {
    match outcome {
      RecordOutcome::Created => self.created += 1,
      RecordOutcome::Resolved => self.resolved += 1,
      RecordOutcome::Failed => self.failed += 1,
      RecordOutcome::Retried => self.retried += 1,
      RecordOutcome::Skipped => self.skipped += 1,
    }
  }

  /// Whether any record ended the run `Failed` (drives the exit code).
  #[must_use]
  pub const fn has_failures(&self) -> bool {
    self.failed > 0
  }
}

/// The batch pipeline over the record store and chain gateway.
pub struct BatchOrchestrator<G: ChainGateway, S: RecordStore> {
  gateway: Arc<G>,
  store: Arc<S>,
  /// Transient attempts before a record fails.
  max_attempts: u32,
  /// Bound on concurrent in-flight chain calls.
  max_concurrent: usize,
  /// Reset Failed records at the start of the run.
  retry_failed: bool,
  /// Flipped on SIGINT; not-yet-started records are skipped.
  shutdown: watch::Receiver<bool>,
}

impl<G: ChainGateway, S: RecordStore> BatchOrchestrator<G, S> {
  /// Create an orchestrator wired to the given ports.
  pub fn new(
    gateway: Arc<G>,
    store: Arc<S>,
    config: &PipelineConfig,
    shutdown: watch::Receiver<bool>,
  ) -> Self {
    Self {
      gateway,
      store,
      max_attempts: config.max_attempts,
      max_concurrent: config.max_concurrent.max(1),
      retry_failed: config.retry_failed,
      shutdown,
    }
  }

  /// Execute one pipeline run over the whole store.
  ///
  /// # Errors
  /// Only store failures abort the run; per-record chain errors are
  /// captured on the records themselves.
  pub async fn run(&self) -> Result<RunSummary, StoreError> {
    let mut records = self.store.load_all().await?;

    if self.retry_failed {
      let mut reset = 0usize;
      for record in &mut records {
        if record.status == MarketStatus::Failed {
          record.reset_for_retry();
          reset += 1;
        }
      }
      if reset > 0 {
        info!(reset, "Reset failed records for manual retry");
        self.store.save_all(&records).await?;
      }
    }

    let mut summary = RunSummary::new(records.len());
    let actionable: Vec<usize> = records
      .iter()
      .enumerate()
      .filter(|(_, r)| !r.status.is_terminal())
      .map(|(i, _)| i)
      .collect();

    info!(
      run_id = %summary.run_id,
      total = summary.total,
      actionable = actionable.len(),
      "Starting pipeline run"
    );

    let shared = Mutex::new(records);
    let shared = &shared;

    let mut outcomes = stream::iter(actionable.into_iter().map(move |idx| {
      let shutdown = self.shutdown.clone();
      async move {
        if *shutdown.borrow() {
          return (idx, None, RecordOutcome::Skipped);
        }
        let record = shared.lock().await[idx].clone();
        let (updated, outcome) = self.process_record(record).await;
        (idx, Some(updated), outcome)
      }
    }))
    .buffer_unordered(self.max_concurrent);

    while let Some((idx, updated, outcome)) = outcomes.next().await {
      summary.tally(outcome);
      if let Some(updated) = updated {
        // Incremental persistence: the whole collection is replaced
        // after each record so a crash loses at most in-flight work.
        let snapshot = {
          let mut guard = shared.lock().await;
          guard[idx] = updated;
          guard.clone()
        };
        self.store.save_all(&snapshot).await?;
      }
    }
    drop(outcomes);

    info!(
      run_id = %summary.run_id,
      created = summary.created,
      resolved = summary.resolved,
      failed = summary.failed,
      retried = summary.retried,
      skipped = summary.skipped,
      "Pipeline run complete"
    );

    Ok(summary)
  }

  /// Advance one record by a single attempt.
  async fn process_record(&self, mut record: MarketRecord) -> (MarketRecord, RecordOutcome) {
    let now = Utc::now();

    match record.status {
      MarketStatus::Pending => {
        record.last_attempt = Some(now);
        match self.gateway.create_market(&record.game_id, &record.params).await {
          Ok(receipt) => {
            info!(game_id = %record.game_id, tx = %receipt.tx_id, "Record created");
            record.mark_created(Some(receipt.tx_id));
            (record, RecordOutcome::Created)
          }
          Err(ChainError::AlreadyExists) => {
            info!(game_id = %record.game_id, "Market already exists on-chain");
            record.mark_created(None);
            (record, RecordOutcome::Created)
          }
          Err(ChainError::Transient(msg)) => self.transient(record, msg),
          Err(e) => {
            warn!(game_id = %record.game_id, error = %e, "Creation failed permanently");
            record.mark_failed(e.to_string());
            (record, RecordOutcome::Failed)
          }
        }
      }

      MarketStatus::Created | MarketStatus::ResolutionPending => {
        if record.status == MarketStatus::Created && !record.resolution_due(now) {
          return (record, RecordOutcome::Skipped);
        }
        record.last_attempt = Some(now);

        let index = match self.gateway.query_outcome(&record.game_id).await {
          Ok(Some(index)) => index,
          Ok(None) => {
            // Outcome not posted yet; not an attempt against the budget.
            record.last_attempt = None;
            return (record, RecordOutcome::Skipped);
          }
          Err(ChainError::Transient(msg)) => return self.transient(record, msg),
          Err(e) => {
            record.mark_failed(e.to_string());
            return (record, RecordOutcome::Failed);
          }
        };

        let Some(option) = record.params.options.get(index as usize).cloned() else {
          record.mark_failed(format!(
            "outcome index {index} out of range for {} options",
            record.params.options.len()
          ));
          return (record, RecordOutcome::Failed);
        };

        record.mark_resolution_pending();
        match self.gateway.resolve_market(&record.game_id, index).await {
          Ok(receipt) => {
            info!(game_id = %record.game_id, tx = %receipt.tx_id, outcome = %option, "Record resolved");
            record.mark_resolved(option, Some(receipt.tx_id));
            (record, RecordOutcome::Resolved)
          }
          Err(ChainError::AlreadyResolved) => {
            info!(game_id = %record.game_id, outcome = %option, "Market already finalized on-chain");
            record.mark_resolved(option, None);
            (record, RecordOutcome::Resolved)
          }
          Err(ChainError::Transient(msg)) => self.transient(record, msg),
          Err(e) => {
            warn!(game_id = %record.game_id, error = %e, "Resolution failed permanently");
            record.mark_failed(e.to_string());
            (record, RecordOutcome::Failed)
          }
        }
      }

      MarketStatus::Resolved | MarketStatus::Failed => (record, RecordOutcome::Skipped),
    }
  }

  fn transient(&self, mut record: MarketRecord, msg: String) -> (MarketRecord, RecordOutcome) {
    let exhausted = record.note_transient_failure(msg, self.max_attempts);
    if exhausted {
      warn!(
        game_id = %record.game_id,
        attempts = record.attempts,
        "Retry budget exhausted, record failed"
      );
      (record, RecordOutcome::Failed)
    } else {
      info!(
        game_id = %record.game_id,
        attempts = record.attempts,
        max_attempts = self.max_attempts,
        "Transient failure, will retry next run"
      );
      (record, RecordOutcome::Retried)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn summary_tallies_each_outcome_bucket() {
    let mut summary = RunSummary::new(5);
    summary.tally(RecordOutcome::Created);
    summary.tally(RecordOutcome::Resolved);
    summary.tally(RecordOutcome::Failed);
    summary.tally(RecordOutcome::Retried);
    summary.tally(RecordOutcome::Skipped);

    assert_eq!(summary.created, 1);
    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.retried, 1);
    assert_eq!(summary.skipped, 1);
    assert!(summary.has_failures());
  }

  #[test]
  fn summary_without_failures() {
    let mut summary = RunSummary::new(1);
    summary.tally(RecordOutcome::Created);
    assert!(!summary.has_failures());
  }
}
