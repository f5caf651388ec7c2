//! Store Tests - JSON Record Store against Real Files
//!
//! Exercises the atomic file store and the advisory run lock in
//! throwaway temp directories.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use polymarket_sync_bot::adapters::store::{JsonRecordStore, RunLock};
use polymarket_sync_bot::domain::record::{CreationParams, MarketRecord, MarketStatus};
use polymarket_sync_bot::ports::record_store::{RecordStore, StoreError};

struct TempStore {
    dir: PathBuf,
    path: String,
}

impl TempStore {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("sync-bot-test-{}", Uuid::new_v4()));
        let path = dir.join("markets.json").display().to_string();
        Self { dir, path }
    }
}

impl Drop for TempStore {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn record(game_id: &str) -> MarketRecord {
    MarketRecord::new(
        game_id.to_string(),
        CreationParams {
            question: format!("Will {game_id} finish?"),
            options: vec!["Yes".to_string(), "No".to_string()],
            close_time: Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap(),
        },
    )
}

#[tokio::test]
async fn missing_file_is_an_empty_collection_when_tolerated() {
    let tmp = TempStore::new();
    let store = JsonRecordStore::new(&tmp.path, true).await.unwrap();
    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_file_is_an_error_when_not_tolerated() {
    let tmp = TempStore::new();
    let store = JsonRecordStore::new(&tmp.path, false).await.unwrap();
    assert!(matches!(
        store.load_all().await.unwrap_err(),
        StoreError::Io { .. }
    ));
}

#[tokio::test]
async fn save_then_load_round_trips_semantic_content() {
    let tmp = TempStore::new();
    let store = JsonRecordStore::new(&tmp.path, true).await.unwrap();

    let mut resolved = record("game-2");
    resolved.mark_created(Some("0xcreate".to_string()));
    resolved.mark_resolved("Yes".to_string(), Some("0xresolve".to_string()));

    let records = vec![record("game-1"), resolved];
    store.save_all(&records).await.unwrap();

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].game_id, "game-1");
    assert_eq!(loaded[0].status, MarketStatus::Pending);
    assert_eq!(loaded[1].status, MarketStatus::Resolved);
    assert_eq!(loaded[1].outcome.as_deref(), Some("Yes"));
    assert_eq!(loaded[1].resolve_tx.as_deref(), Some("0xresolve"));

    // save_all(load_all()) is a no-op on semantic content.
    store.save_all(&loaded).await.unwrap();
    let again = store.load_all().await.unwrap();
    assert_eq!(again.len(), 2);
    assert_eq!(again[1].outcome.as_deref(), Some("Yes"));
}

#[tokio::test]
async fn save_replaces_prior_state_entirely() {
    let tmp = TempStore::new();
    let store = JsonRecordStore::new(&tmp.path, true).await.unwrap();

    store
        .save_all(&[record("game-1"), record("game-2")])
        .await
        .unwrap();
    store.save_all(&[record("game-3")]).await.unwrap();

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].game_id, "game-3");
}

#[tokio::test]
async fn malformed_json_fails_the_load() {
    let tmp = TempStore::new();
    let store = JsonRecordStore::new(&tmp.path, true).await.unwrap();
    tokio::fs::write(&tmp.path, b"{ not json ]").await.unwrap();

    assert!(matches!(
        store.load_all().await.unwrap_err(),
        StoreError::Malformed { .. }
    ));
}

#[tokio::test]
async fn invariant_violating_records_fail_the_load() {
    let tmp = TempStore::new();
    let store = JsonRecordStore::new(&tmp.path, true).await.unwrap();

    // Outcome present on a non-Resolved record.
    let mut bad = record("game-1");
    bad.outcome = Some("Yes".to_string());
    let json = serde_json::to_string(&vec![bad]).unwrap();
    tokio::fs::write(&tmp.path, json).await.unwrap();

    assert!(matches!(
        store.load_all().await.unwrap_err(),
        StoreError::Malformed { .. }
    ));
}

#[tokio::test]
async fn duplicate_game_ids_fail_the_load() {
    let tmp = TempStore::new();
    let store = JsonRecordStore::new(&tmp.path, true).await.unwrap();

    let json = serde_json::to_string(&vec![record("game-1"), record("game-1")]).unwrap();
    tokio::fs::write(&tmp.path, json).await.unwrap();

    assert!(matches!(
        store.load_all().await.unwrap_err(),
        StoreError::Malformed { .. }
    ));
}

#[tokio::test]
async fn fresh_store_reports_healthy() {
    let tmp = TempStore::new();
    let store = JsonRecordStore::new(&tmp.path, true).await.unwrap();
    assert!(store.is_healthy().await);

    store.save_all(&[record("game-1")]).await.unwrap();
    assert!(store.is_healthy().await);
}

#[tokio::test]
async fn run_lock_creates_missing_parent_directories() {
    // First run: nothing under the store path exists yet, the lock is
    // acquired before the store itself.
    let tmp = TempStore::new();
    assert!(!tmp.dir.exists());

    let _lock = RunLock::acquire(&tmp.path).unwrap();
    assert!(tmp.dir.exists());

    let store = JsonRecordStore::new(&tmp.path, true).await.unwrap();
    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn run_lock_rejects_a_second_holder() {
    let tmp = TempStore::new();
    std::fs::create_dir_all(&tmp.dir).unwrap();

    let lock = RunLock::acquire(&tmp.path).unwrap();
    assert!(matches!(
        RunLock::acquire(&tmp.path).unwrap_err(),
        StoreError::Locked(_)
    ));

    drop(lock);
    let _relock = RunLock::acquire(&tmp.path).unwrap();
}
