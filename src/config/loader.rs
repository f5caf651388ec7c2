//! Configuration Loader - File Loading, Env Overrides, Validation
//!
//! Handles loading `config.toml`, applying environment variable
//! overrides, validating all parameters, and providing clear error
//! messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// Environment overrides recognized after parsing:
/// `RPC_URL`, `UPSTREAM_URL`, `STORE_PATH`, `MAX_ATTEMPTS`,
/// `MAX_CONCURRENT`.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - An override doesn't parse
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let mut config: AppConfig = toml::from_str(&content)
    .with_context(|| "Failed to parse config.toml")?;

  apply_env_overrides(&mut config)?;
  validate_config(&config)?;

  info!(
    store = %config.store.path,
    max_attempts = config.pipeline.max_attempts,
    max_concurrent = config.pipeline.max_concurrent,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Apply environment variable overrides on top of the parsed file.
fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
  if let Ok(url) = std::env::var("RPC_URL") {
    config.chain.rpc_url = url;
  }
  if let Ok(url) = std::env::var("UPSTREAM_URL") {
    config.upstream.base_url = url;
  }
  if let Ok(path) = std::env::var("STORE_PATH") {
    config.store.path = path;
  }
  if let Ok(v) = std::env::var("MAX_ATTEMPTS") {
    config.pipeline.max_attempts =
      v.parse().context("MAX_ATTEMPTS must be a positive integer")?;
  }
  if let Ok(v) = std::env::var("MAX_CONCURRENT") {
    config.pipeline.max_concurrent =
      v.parse().context("MAX_CONCURRENT must be a positive integer")?;
  }
  Ok(())
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(!config.bot.name.is_empty(), "bot.name must not be empty");

  // Chain validation
  anyhow::ensure!(
    !config.chain.rpc_url.is_empty(),
    "chain.rpc_url must not be empty"
  );
  anyhow::ensure!(
    config.chain.market_factory.starts_with("0x")
      && config.chain.market_factory.len() == 42,
    "chain.market_factory must be a 0x-prefixed 20-byte address, got {:?}",
    config.chain.market_factory
  );
  anyhow::ensure!(
    config.chain.timeout_seconds > 0,
    "chain.timeout_seconds must be positive"
  );

  // Upstream validation
  anyhow::ensure!(
    !config.upstream.base_url.is_empty(),
    "upstream.base_url must not be empty"
  );
  anyhow::ensure!(
    config.upstream.timeout_seconds > 0,
    "upstream.timeout_seconds must be positive"
  );

  // Store validation
  anyhow::ensure!(
    !config.store.path.is_empty(),
    "store.path must not be empty"
  );

  // Pipeline validation
  anyhow::ensure!(
    config.pipeline.max_attempts >= 1,
    "pipeline.max_attempts must be at least 1, got {}",
    config.pipeline.max_attempts
  );
  anyhow::ensure!(
    (1..=32).contains(&config.pipeline.max_concurrent),
    "pipeline.max_concurrent must be in [1, 32], got {}",
    config.pipeline.max_concurrent
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  const VALID: &str = r#"
    [bot]
    name = "sync-bot"

    [chain]
    rpc_url = "https://polygon-rpc.com"
    market_factory = "0x4bFb41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E"

    [upstream]
    base_url = "https://games.example.com"
  "#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_defaults_fill_in_optional_sections() {
    let config: AppConfig = toml::from_str(VALID).unwrap();
    validate_config(&config).unwrap();
    assert_eq!(config.pipeline.max_attempts, 3);
    assert_eq!(config.pipeline.max_concurrent, 4);
    assert!(config.pipeline.fail_on_failed);
    assert!(config.store.tolerate_missing);
    assert_eq!(config.chain.chain_id, 137);
  }

  #[test]
  fn test_rejects_bad_factory_address() {
    let mut config: AppConfig = toml::from_str(VALID).unwrap();
    config.chain.market_factory = "not-an-address".to_string();
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_rejects_zero_attempts() {
    let mut config: AppConfig = toml::from_str(VALID).unwrap();
    config.pipeline.max_attempts = 0;
    assert!(validate_config(&config).is_err());
  }
}
