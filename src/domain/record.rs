//! Core market-record domain types.
//!
//! Defines the persisted market record, its status lifecycle, and the
//! creation parameters submitted on-chain. These types are the foundation
//! of the hexagonal architecture's inner ring: no I/O, fully serializable,
//! testable in isolation.
//!
//! Status lifecycle (forward-only, except the explicit manual retry):
//!
//! ```text
//! Pending → Created → ResolutionPending → Resolved
//!    │          │              │
//!    └──────────┴──────────────┴────────→ Failed ──(reset_for_retry)──→ Pending
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lightweight external game identifier used at the ports boundary.
pub type GameId = String;

/// Lifecycle status of a market record.
///
/// Transitions are monotonic forward; the only backward edge is
/// `Failed → Pending` via [`MarketRecord::reset_for_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketStatus {
    /// Record seeded locally, market not yet created on-chain.
    Pending,
    /// Creation transaction confirmed; awaiting the close time.
    Created,
    /// Outcome known, resolution transaction not yet confirmed.
    ResolutionPending,
    /// Resolution confirmed on-chain. Terminal.
    Resolved,
    /// Permanent error or retry budget exhausted. Terminal until manual retry.
    Failed,
}

impl MarketStatus {
    /// Terminal statuses are skipped by the orchestrator.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Failed)
    }
}

impl std::fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Created => write!(f, "CREATED"),
            Self::ResolutionPending => write!(f, "RESOLUTION_PENDING"),
            Self::Resolved => write!(f, "RESOLVED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Parameters for creating a market on-chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationParams {
    /// Human-readable market question.
    pub question: String,
    /// Outcome options, index-addressable (at least 2).
    pub options: Vec<String>,
    /// Time after which the market may be resolved.
    pub close_time: DateTime<Utc>,
}

/// A single persisted market record.
///
/// Created by the seeder in `Pending` status, mutated exclusively by the
/// orchestrator as it processes attempts, never deleted — failed records
/// remain for manual inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketRecord {
    /// External game identifier, unique within the store.
    pub game_id: GameId,
    /// Current lifecycle status.
    pub status: MarketStatus,
    /// On-chain creation parameters.
    pub params: CreationParams,
    /// Winning option. Set if and only if `status == Resolved`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    /// Transaction id of the creation submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_tx: Option<String>,
    /// Transaction id of the resolution submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_tx: Option<String>,
    /// Timestamp of the last chain attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<DateTime<Utc>>,
    /// Number of transient-failure attempts consumed so far.
    #[serde(default)]
    pub attempts: u32,
    /// Last error recorded against this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl MarketRecord {
    /// Create a fresh `Pending` record for a game.
    #[must_use]
    pub const fn new(game_id: GameId, params: CreationParams) -> Self {
        Self {
            game_id,
            status: MarketStatus::Pending,
            params,
            outcome: None,
            create_tx: None,
            resolve_tx: None,
            last_attempt: None,
            attempts: 0,
            last_error: None,
        }
    }

    /// Whether the resolution window has elapsed.
    #[must_use]
    pub fn resolution_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.params.close_time
    }

    /// Mark the market as created on-chain.
    ///
    /// `tx_id` is `None` when creation was short-circuited because a
    /// market for this game already exists on-chain.
    pub fn mark_created(&mut self, tx_id: Option<String>) {
        self.status = MarketStatus::Created;
        self.create_tx = tx_id;
        self.last_error = None;
    }

    /// The outcome is known; the resolution submission is now in flight.
    pub fn mark_resolution_pending(&mut self) {
        self.status = MarketStatus::ResolutionPending;
    }

    /// Mark the market as resolved with the winning option.
    ///
    /// `tx_id` is `None` when resolution was short-circuited because the
    /// market was already finalized on-chain.
    pub fn mark_resolved(&mut self, outcome: String, tx_id: Option<String>) {
        self.status = MarketStatus::Resolved;
        self.outcome = Some(outcome);
        self.resolve_tx = tx_id;
        self.last_error = None;
    }

    /// Record a permanent failure. No retry.
    pub fn mark_failed(&mut self, reason: String) {
        self.status = MarketStatus::Failed;
        self.last_error = Some(reason);
    }

    /// Record a transient failure: increment the attempt counter and fail
    /// the record once the retry budget is exhausted.
    ///
    /// Returns `true` if the record transitioned to `Failed`.
    pub fn note_transient_failure(&mut self, reason: String, max_attempts: u32) -> bool {
        self.attempts += 1;
        self.last_error = Some(reason);
        if self.attempts >= max_attempts {
            self.status = MarketStatus::Failed;
            true
        } else {
            false
        }
    }

    /// Manual retry: reset a `Failed` record back to the start of its
    /// lifecycle with a fresh attempt budget. No-op for other statuses.
    pub fn reset_for_retry(&mut self) {
        if self.status == MarketStatus::Failed {
            // A record that already made it on-chain resumes from Created,
            // not Pending, so the market is never submitted twice.
            self.status = if self.create_tx.is_some() {
                MarketStatus::Created
            } else {
                MarketStatus::Pending
            };
            self.attempts = 0;
            self.last_error = None;
        }
    }

    /// Check the record's structural invariants.
    ///
    /// Used by the store on load so malformed records fail loudly instead
    /// of being silently coerced.
    pub fn validate(&self) -> Result<(), String> {
        if self.game_id.is_empty() {
            return Err("empty game_id".to_string());
        }
        if self.params.options.len() < 2 {
            return Err(format!(
                "record {} has {} options, need at least 2",
                self.game_id,
                self.params.options.len()
            ));
        }
        match (self.status, &self.outcome) {
            (MarketStatus::Resolved, None) => {
                Err(format!("resolved record {} has no outcome", self.game_id))
            }
            (MarketStatus::Resolved, Some(o)) if !self.params.options.contains(o) => Err(
                format!("record {} outcome {o:?} is not one of its options", self.game_id),
            ),
            (s, Some(_)) if s != MarketStatus::Resolved => Err(format!(
                "record {} has an outcome but status {s}",
                self.game_id
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> MarketRecord {
        MarketRecord::new(
            "game-1".to_string(),
            CreationParams {
                question: "Will the home team win?".to_string(),
                options: vec!["Home".to_string(), "Away".to_string()],
                close_time: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            },
        )
    }

    #[test]
    fn new_record_is_pending_with_no_outcome() {
        let r = record();
        assert_eq!(r.status, MarketStatus::Pending);
        assert!(r.outcome.is_none());
        assert_eq!(r.attempts, 0);
        r.validate().unwrap();
    }

    #[test]
    fn happy_path_reaches_resolved() {
        let mut r = record();
        r.mark_created(Some("0xcreate".to_string()));
        assert_eq!(r.status, MarketStatus::Created);
        r.mark_resolution_pending();
        r.mark_resolved("Home".to_string(), Some("0xresolve".to_string()));
        assert_eq!(r.status, MarketStatus::Resolved);
        assert_eq!(r.outcome.as_deref(), Some("Home"));
        r.validate().unwrap();
    }

    #[test]
    fn transient_failures_respect_the_retry_budget() {
        let mut r = record();
        assert!(!r.note_transient_failure("timeout".to_string(), 3));
        assert!(!r.note_transient_failure("timeout".to_string(), 3));
        assert_eq!(r.status, MarketStatus::Pending);
        assert!(r.note_transient_failure("timeout".to_string(), 3));
        assert_eq!(r.status, MarketStatus::Failed);
        assert_eq!(r.attempts, 3);
    }

    #[test]
    fn reset_for_retry_resumes_after_creation() {
        let mut r = record();
        r.mark_created(Some("0xcreate".to_string()));
        r.mark_failed("revert".to_string());
        r.reset_for_retry();
        assert_eq!(r.status, MarketStatus::Created);
        assert_eq!(r.attempts, 0);

        let mut fresh = record();
        fresh.mark_failed("revert".to_string());
        fresh.reset_for_retry();
        assert_eq!(fresh.status, MarketStatus::Pending);
    }

    #[test]
    fn reset_for_retry_ignores_non_failed_records() {
        let mut r = record();
        r.mark_created(Some("0xcreate".to_string()));
        r.reset_for_retry();
        assert_eq!(r.status, MarketStatus::Created);
    }

    #[test]
    fn validate_rejects_outcome_without_resolved_status() {
        let mut r = record();
        r.outcome = Some("Home".to_string());
        assert!(r.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_outcome() {
        let mut r = record();
        r.mark_resolved("Draw".to_string(), None);
        assert!(r.validate().is_err());
    }

    #[test]
    fn validate_rejects_single_option() {
        let mut r = record();
        r.params.options.truncate(1);
        assert!(r.validate().is_err());
    }

    #[test]
    fn status_round_trips_through_json() {
        let r = record();
        let json = serde_json::to_string(&r).unwrap();
        let back: MarketRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, MarketStatus::Pending);
        assert_eq!(back.game_id, r.game_id);
    }
}
