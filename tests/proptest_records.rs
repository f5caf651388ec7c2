//! Property-Based Tests — Record Lifecycle Invariants
//!
//! Uses `proptest` to verify that market records maintain their
//! structural invariants across random legal transition sequences.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use polymarket_sync_bot::domain::record::{CreationParams, MarketRecord, MarketStatus};

fn record() -> MarketRecord {
    MarketRecord::new(
        "game-1".to_string(),
        CreationParams {
            question: "Will the home team win?".to_string(),
            options: vec!["Home".to_string(), "Away".to_string()],
            close_time: Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap(),
        },
    )
}

proptest! {
    /// A record fed nothing but transient failures consumes its budget
    /// exactly: `max_attempts` attempts, then Failed, then untouched.
    #[test]
    fn retry_budget_is_exact(max_attempts in 1u32..20, extra_runs in 0u32..40) {
        let mut r = record();
        let mut attempts_made = 0u32;

        for _ in 0..(max_attempts + extra_runs) {
            if r.status.is_terminal() {
                break;
            }
            r.note_transient_failure("connection reset".to_string(), max_attempts);
            attempts_made += 1;
        }

        prop_assert_eq!(r.status, MarketStatus::Failed);
        prop_assert_eq!(r.attempts, max_attempts);
        prop_assert_eq!(attempts_made, max_attempts);
    }

    /// Across arbitrary legal transition sequences (the moves the
    /// orchestrator can make from each status), the outcome field is
    /// populated if and only if the record is Resolved.
    #[test]
    fn outcome_is_set_iff_resolved(steps in prop::collection::vec(any::<u8>(), 1..40)) {
        let mut r = record();

        for step in steps {
            match r.status {
                MarketStatus::Pending => match step % 3 {
                    0 => r.mark_created(Some(format!("0x{step:02x}"))),
                    1 => {
                        r.note_transient_failure("timeout".to_string(), 3);
                    }
                    _ => r.mark_failed("execution reverted".to_string()),
                },
                MarketStatus::Created | MarketStatus::ResolutionPending => match step % 4 {
                    0 => {
                        r.mark_resolution_pending();
                        r.mark_resolved("Home".to_string(), Some(format!("0x{step:02x}")));
                    }
                    1 => {
                        r.note_transient_failure("timeout".to_string(), 3);
                    }
                    2 => r.mark_failed("execution reverted".to_string()),
                    _ => {} // outcome not yet available: no-op this run
                },
                MarketStatus::Resolved => {} // terminal
                MarketStatus::Failed => {
                    if step % 2 == 0 {
                        r.reset_for_retry();
                    }
                }
            }

            prop_assert_eq!(
                r.outcome.is_some(),
                r.status == MarketStatus::Resolved,
                "outcome/status invariant broken at status {}",
                r.status
            );
            prop_assert!(r.validate().is_ok());
        }
    }
}
