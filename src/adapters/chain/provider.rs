//! Polygon RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Manages the connection to the chain via alloy-rs. Validates RPC
//! connectivity and chain id at startup and exposes a shared provider
//! instance for all on-chain operations.
//!
//! In alloy 0.9, `ProviderBuilder::new().on_http()` returns a complex
//! filler type. We store it as a type-erased `dyn Provider` to keep
//! the API clean across the adapter layer.

use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::config::ChainConfig;

/// Shared RPC provider backed by alloy-rs 0.9.
///
/// All chain adapters share a single provider instance to avoid
/// redundant connections and enable connection pooling.
///
/// Uses `dyn Provider` for type erasure because alloy 0.9's
/// `ProviderBuilder::new().on_http()` returns a deeply-nested
/// generic filler type that would leak implementation details.
pub struct RpcProvider {
    /// The alloy HTTP provider (type-erased).
    provider: Arc<dyn Provider + Send + Sync>,
    /// RPC endpoint URL (for diagnostics, never logged with secrets).
    #[allow(dead_code)]
    rpc_url: String,
}

impl RpcProvider {
    /// Connect to the RPC endpoint and validate the chain id.
    ///
    /// The URL comes from config (never hardcoded). When a wallet is
    /// supplied, the provider signs and fills outgoing transactions;
    /// without one it is read-only (dry-run mode).
    #[instrument(skip_all)]
    pub async fn connect(config: &ChainConfig, wallet: Option<EthereumWallet>) -> Result<Self> {
        let rpc_url = config.rpc_url.clone();
        let url: reqwest::Url = rpc_url.parse().context("Invalid RPC URL")?;

        // alloy 0.9: on_builtin() returns a BoxTransport-backed provider,
        // which matches the `dyn Provider` default transport parameter.
        let provider: Arc<dyn Provider + Send + Sync> = match wallet {
            Some(wallet) => Arc::new(
                ProviderBuilder::new()
                    .wallet(wallet)
                    .on_builtin(url.as_str())
                    .await
                    .context("Failed to connect to RPC endpoint")?,
            ),
            None => Arc::new(
                ProviderBuilder::new()
                    .on_builtin(url.as_str())
                    .await
                    .context("Failed to connect to RPC endpoint")?,
            ),
        };

        // Validate chain id at startup
        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        if chain_id != config.chain_id {
            anyhow::bail!(
                "Expected chain_id={}, got {chain_id} — check chain.rpc_url",
                config.chain_id
            );
        }

        info!(chain_id, "Connected to RPC endpoint");

        Ok(Self { provider, rpc_url })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> Arc<dyn Provider + Send + Sync> {
        Arc::clone(&self.provider)
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    pub async fn is_healthy(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}

/// Load the signing wallet from the `PRIVATE_KEY` env var.
///
/// The key MUST come from the environment (never from config.toml,
/// never committed to git).
pub fn wallet_from_env() -> Result<EthereumWallet> {
    let key = std::env::var("PRIVATE_KEY").context("PRIVATE_KEY not set")?;
    let signer: PrivateKeySigner = key.parse().context("Invalid PRIVATE_KEY")?;
    Ok(EthereumWallet::from(signer))
}
