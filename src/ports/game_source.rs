//! Game Source Port - Upstream Game Metadata Interface
//!
//! Defines the trait for pulling game/market metadata from a third-party
//! HTTP source. Descriptors seed the record store as `Pending` records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::record::GameId;

/// Failure taxonomy for upstream fetches.
///
/// The HTTP adapter retries transient cases internally with backoff;
/// what surfaces here is final for the fetch and the caller decides
/// whether the run continues.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Non-2xx response after retries were exhausted.
  #[error("upstream returned HTTP {status}: {body}")]
  Http { status: u16, body: String },
  /// The request timed out.
  #[error("upstream request timed out")]
  Timeout,
  /// Connection-level failure (DNS, TLS, refused).
  #[error("upstream network failure: {0}")]
  Network(String),
  /// 2xx response whose payload does not decode.
  #[error("upstream payload is malformed: {0}")]
  Malformed(String),
}

/// Raw upstream description of a game, prior to conversion into a
/// market record.
#[derive(Debug, Clone)]
pub struct RawGameDescriptor {
  /// External game identifier.
  pub game_id: GameId,
  /// Market question derived from the game.
  pub question: String,
  /// Outcome options, index-addressable.
  pub options: Vec<String>,
  /// Time after which the market may be resolved.
  pub close_time: DateTime<Utc>,
}

/// Trait for upstream game-metadata providers.
#[async_trait]
pub trait GameSource: Send + Sync + 'static {
  /// Fetch the descriptors of games that should have markets.
  async fn fetch_pending(&self) -> Result<Vec<RawGameDescriptor>, FetchError>;
}
