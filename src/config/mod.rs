//! Configuration Module - TOML-based Pipeline Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variable overrides for endpoint URLs and pipeline knobs.
//! Signing credentials come ONLY from the environment (`PRIVATE_KEY`) —
//! nothing secret lives in the file. All endpoints and contract
//! addresses are externalized here, nothing is hardcoded in the
//! usecases layer.

pub mod loader;

use serde::Deserialize;

/// Top-level pipeline configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the run begins.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Bot identity and metadata.
  pub bot: BotConfig,
  /// Chain RPC endpoint and market-factory contract.
  pub chain: ChainConfig,
  /// Upstream games feed.
  pub upstream: UpstreamConfig,
  /// Record store file.
  #[serde(default)]
  pub store: StoreConfig,
  /// Batch pipeline knobs.
  #[serde(default)]
  pub pipeline: PipelineConfig,
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
  /// Human-readable bot name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Dry-run mode: log submissions instead of broadcasting them.
  #[serde(default)]
  pub dry_run: bool,
}

/// Chain RPC configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
  /// RPC endpoint URL. Overridable via `RPC_URL`.
  pub rpc_url: String,
  /// Expected chain id, validated at startup.
  #[serde(default = "default_chain_id")]
  pub chain_id: u64,
  /// Market-factory contract address.
  pub market_factory: String,
  /// Per-call timeout in seconds. Elapsed timeouts count as transient.
  #[serde(default = "default_chain_timeout")]
  pub timeout_seconds: u64,
}

/// Upstream games feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
  /// Feed base URL. Overridable via `UPSTREAM_URL`.
  pub base_url: String,
  /// Path of the pending-games listing.
  #[serde(default = "default_games_path")]
  pub games_path: String,
  /// Request timeout in seconds.
  #[serde(default = "default_upstream_timeout")]
  pub timeout_seconds: u64,
  /// In-call retries on 429/5xx/network failures.
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff), milliseconds.
  #[serde(default = "default_retry_base_delay")]
  pub retry_base_delay_ms: u64,
}

/// Record store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Path of the records file. Overridable via `STORE_PATH`.
  #[serde(default = "default_store_path")]
  pub path: String,
  /// Treat a missing file as an empty collection (first run).
  #[serde(default = "default_true")]
  pub tolerate_missing: bool,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      path: default_store_path(),
      tolerate_missing: true,
    }
  }
}

/// Batch pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
  /// Transient-failure attempts before a record fails.
  /// Overridable via `MAX_ATTEMPTS`.
  #[serde(default = "default_max_attempts")]
  pub max_attempts: u32,
  /// Bound on concurrent in-flight chain calls.
  /// Overridable via `MAX_CONCURRENT`.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
  /// Exit non-zero when any record ends the run Failed.
  #[serde(default = "default_true")]
  pub fail_on_failed: bool,
  /// Reset Failed records back to the pipeline at the start of the run.
  #[serde(default)]
  pub retry_failed: bool,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      max_attempts: default_max_attempts(),
      max_concurrent: default_max_concurrent(),
      fail_on_failed: true,
      retry_failed: false,
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_chain_id() -> u64 {
  137
}

fn default_chain_timeout() -> u64 {
  30
}

fn default_games_path() -> String {
  "/games?status=upcoming".to_string()
}

fn default_upstream_timeout() -> u64 {
  10
}

fn default_max_retries() -> u32 {
  3
}

fn default_retry_base_delay() -> u64 {
  200
}

fn default_store_path() -> String {
  "data/markets.json".to_string()
}

fn default_max_attempts() -> u32 {
  3
}

fn default_max_concurrent() -> usize {
  4
}
