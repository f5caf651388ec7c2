//! Chain Gateway Port - On-chain Market Interaction Interface
//!
//! Defines the trait for submitting market creation/resolution
//! transactions and querying game outcomes against the market-factory
//! contract. Uses alloy-rs on the adapter side.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::record::{CreationParams, GameId};

/// Failure taxonomy for chain calls.
///
/// The orchestrator's per-record state machine branches on these:
/// transient errors consume an attempt, permanent errors fail the record
/// immediately, and the `Already*` variants are idempotence shortcuts
/// mapped to success.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
  /// Network failure, timeout, or node-side hiccup. Retryable.
  #[error("transient chain error: {0}")]
  Transient(String),
  /// Reverted transaction or invalid parameters. Not retryable.
  #[error("permanent chain error: {0}")]
  Permanent(String),
  /// A market for this game already exists on-chain.
  #[error("market already exists on-chain")]
  AlreadyExists,
  /// The market is already finalized on-chain.
  #[error("market already resolved on-chain")]
  AlreadyResolved,
}

/// Result of a submitted on-chain transaction.
///
/// Owned by the gateway call that produced it, consumed immediately by
/// the orchestrator to update the matching record.
#[derive(Debug, Clone)]
pub struct ChainReceipt {
  /// Transaction hash.
  pub tx_id: String,
  /// Whether the transaction was mined successfully.
  pub success: bool,
  /// Node-reported error message, if any.
  pub error: Option<String>,
}

/// Trait for on-chain market operations.
///
/// Outcomes are spoken as option *indices* (what the contract stores);
/// mapping an index back to an option string is the orchestrator's job.
#[async_trait]
pub trait ChainGateway: Send + Sync + 'static {
  /// Submit a market creation transaction for a game.
  ///
  /// Fails with [`ChainError::AlreadyExists`] if a market is already
  /// keyed to this game; callers treat that as success.
  async fn create_market(
    &self,
    game_id: &GameId,
    params: &CreationParams,
  ) -> Result<ChainReceipt, ChainError>;

  /// Submit a resolution transaction finalizing the winning option.
  ///
  /// Fails with [`ChainError::AlreadyResolved`] if the market is already
  /// finalized; callers treat that as success.
  async fn resolve_market(
    &self,
    game_id: &GameId,
    outcome_index: u32,
  ) -> Result<ChainReceipt, ChainError>;

  /// Query the recorded outcome for a game. Read-only, side-effect-free.
  ///
  /// Returns `None` while the outcome is not yet available on-chain.
  async fn query_outcome(&self, game_id: &GameId) -> Result<Option<u32>, ChainError>;

  /// Check if the chain connection is healthy.
  async fn is_healthy(&self) -> bool;
}
