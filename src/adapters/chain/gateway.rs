//! Market Factory Gateway - Chain Gateway Implementation
//!
//! Implements the `ChainGateway` port against the market-factory
//! contract: market creation, resolution, and outcome queries via
//! alloy-rs 0.9. The factory address comes from `config.toml` and is
//! parsed at construction.
//!
//! Error mapping:
//! - RPC timeouts and connection failures → `ChainError::Transient`
//! - Reverts and invalid parameters → `ChainError::Permanent`
//! - "already exists" reverts → `ChainError::AlreadyExists`
//! - "already resolved" reverts → `ChainError::AlreadyResolved`
//!
//! On-chain markets are keyed by `keccak256(game_id)`, so re-submitting
//! the same game reverts with `MarketExists` instead of creating a
//! duplicate market; that revert surfaces as `AlreadyExists` and the
//! orchestrator treats it as success.

use std::sync::Arc;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::config::ChainConfig;
use crate::domain::record::{CreationParams, GameId};
use crate::ports::chain_gateway::{ChainError, ChainGateway, ChainReceipt};

use super::provider::RpcProvider;

/// `ChainGateway` implementation backed by the market-factory contract.
pub struct FactoryGateway {
    /// Shared RPC provider.
    provider: Arc<RpcProvider>,
    /// Market-factory contract address.
    factory: Address,
    /// Per-call timeout; elapsed timeouts count as transient.
    timeout: Duration,
    /// Log submissions instead of broadcasting them.
    dry_run: bool,
}

impl FactoryGateway {
    /// Create a gateway from config.
    pub fn new(provider: Arc<RpcProvider>, config: &ChainConfig, dry_run: bool) -> Result<Self> {
        let factory: Address = config
            .market_factory
            .parse()
            .context("Invalid chain.market_factory address")?;

        Ok(Self {
            provider,
            factory,
            timeout: Duration::from_secs(config.timeout_seconds),
            dry_run,
        })
    }

    /// On-chain key for a game: `keccak256(game_id)`.
    fn game_key(game_id: &str) -> B256 {
        keccak256(game_id.as_bytes())
    }

    /// Submit a transaction to the factory and wait for its receipt.
    async fn submit(&self, what: &str, calldata: Bytes) -> Result<ChainReceipt, ChainError> {
        let tx = TransactionRequest::default()
            .with_to(self.factory)
            .with_input(calldata);

        let inner = self.provider.inner();

        let fut = async {
            let pending = inner
                .send_transaction(tx)
                .await
                .map_err(|e| classify(format!("{what} submission failed: {e}")))?;

            pending
                .get_receipt()
                .await
                .map_err(|e| classify(format!("{what} receipt wait failed: {e}")))
        };

        let receipt = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result?,
            Err(_) => return Err(ChainError::Transient(format!("{what} timed out"))),
        };

        let tx_id = receipt.transaction_hash.to_string();
        if receipt.status() {
            Ok(ChainReceipt {
                tx_id,
                success: true,
                error: None,
            })
        } else {
            // Mined but reverted: the parameters are bad, not the network.
            Err(ChainError::Permanent(format!("{what} reverted in tx {tx_id}")))
        }
    }

    /// Execute a read-only call against the factory.
    async fn read(&self, what: &str, calldata: Bytes) -> Result<Bytes, ChainError> {
        let tx = TransactionRequest::default()
            .with_to(self.factory)
            .with_input(calldata);

        let inner = self.provider.inner();
        match tokio::time::timeout(self.timeout, inner.call(&tx)).await {
            Ok(result) => result.map_err(|e| classify(format!("{what} call failed: {e}"))),
            Err(_) => Err(ChainError::Transient(format!("{what} timed out"))),
        }
    }
}

#[async_trait]
impl ChainGateway for FactoryGateway {
    #[instrument(skip(self, params), fields(game_id = %game_id))]
    async fn create_market(
        &self,
        game_id: &GameId,
        params: &CreationParams,
    ) -> Result<ChainReceipt, ChainError> {
        if self.dry_run {
            info!(question = %params.question, "Dry-run: skipping createMarket submission");
            return Ok(dry_run_receipt("create", game_id));
        }

        let calldata = encode_call(
            "createMarket(bytes32,uint64,uint256)",
            &[
                Self::game_key(game_id).0,
                u64_word(params.close_time.timestamp().max(0) as u64),
                u64_word(params.options.len() as u64),
            ],
        );

        let receipt = self.submit("createMarket", calldata).await?;
        info!(tx = %receipt.tx_id, "Market created on-chain");
        Ok(receipt)
    }

    #[instrument(skip(self), fields(game_id = %game_id, outcome_index))]
    async fn resolve_market(
        &self,
        game_id: &GameId,
        outcome_index: u32,
    ) -> Result<ChainReceipt, ChainError> {
        if self.dry_run {
            info!("Dry-run: skipping resolveMarket submission");
            return Ok(dry_run_receipt("resolve", game_id));
        }

        let calldata = encode_call(
            "resolveMarket(bytes32,uint256)",
            &[
                Self::game_key(game_id).0,
                u64_word(u64::from(outcome_index)),
            ],
        );

        let receipt = self.submit("resolveMarket", calldata).await?;
        info!(tx = %receipt.tx_id, "Market resolved on-chain");
        Ok(receipt)
    }

    #[instrument(skip(self), fields(game_id = %game_id))]
    async fn query_outcome(&self, game_id: &GameId) -> Result<Option<u32>, ChainError> {
        // gameOutcome returns 0 while unset, outcome index + 1 once known.
        let calldata = encode_call("gameOutcome(bytes32)", &[Self::game_key(game_id).0]);
        let bytes = self.read("gameOutcome", calldata).await?;

        if bytes.len() < 32 {
            return Err(ChainError::Permanent(format!(
                "gameOutcome returned {} bytes, expected 32",
                bytes.len()
            )));
        }

        let word = U256::from_be_slice(&bytes[..32]);
        if word.is_zero() {
            return Ok(None);
        }
        if word > U256::from(u64::from(u32::MAX)) {
            warn!(raw = %word, "Implausible outcome word from factory");
            return Err(ChainError::Permanent(format!(
                "implausible outcome value {word}"
            )));
        }

        Ok(Some((word.to::<u64>() - 1) as u32))
    }

    async fn is_healthy(&self) -> bool {
        self.provider.is_healthy().await
    }
}

/// Build calldata from a Solidity signature and 32-byte argument words.
fn encode_call(signature: &str, words: &[[u8; 32]]) -> Bytes {
    let mut data = Vec::with_capacity(4 + 32 * words.len());
    data.extend_from_slice(&keccak256(signature.as_bytes())[..4]);
    for word in words {
        data.extend_from_slice(word);
    }
    Bytes::from(data)
}

/// Left-pad a u64 into a 32-byte ABI word.
fn u64_word(value: u64) -> [u8; 32] {
    U256::from(value).to_be_bytes::<32>()
}

fn dry_run_receipt(op: &str, game_id: &str) -> ChainReceipt {
    ChainReceipt {
        tx_id: format!("dry-run-{op}-{game_id}"),
        success: true,
        error: None,
    }
}

/// Map a raw node error message onto the port taxonomy.
fn classify(msg: String) -> ChainError {
    let lower = msg.to_lowercase();
    if lower.contains("already resolved") || lower.contains("alreadyresolved") {
        ChainError::AlreadyResolved
    } else if lower.contains("already exists") || lower.contains("marketexists") {
        ChainError::AlreadyExists
    } else if lower.contains("revert")
        || lower.contains("invalid")
        || lower.contains("insufficient funds")
        || lower.contains("nonce too low")
    {
        ChainError::Permanent(msg)
    } else {
        ChainError::Transient(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_maps_reverts_to_permanent() {
        assert!(matches!(
            classify("execution reverted: bad params".to_string()),
            ChainError::Permanent(_)
        ));
    }

    #[test]
    fn classify_maps_already_resolved() {
        assert!(matches!(
            classify("execution reverted: AlreadyResolved()".to_string()),
            ChainError::AlreadyResolved
        ));
    }

    #[test]
    fn classify_maps_already_exists() {
        assert!(matches!(
            classify("execution reverted: MarketExists()".to_string()),
            ChainError::AlreadyExists
        ));
        assert!(matches!(
            classify("market already exists for key".to_string()),
            ChainError::AlreadyExists
        ));
    }

    #[test]
    fn classify_defaults_to_transient() {
        assert!(matches!(
            classify("connection reset by peer".to_string()),
            ChainError::Transient(_)
        ));
    }

    #[test]
    fn encode_call_lays_out_selector_and_words() {
        let word = u64_word(7);
        let data = encode_call("resolveMarket(bytes32,uint256)", &[[0u8; 32], word]);
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(
            &data[..4],
            &keccak256(b"resolveMarket(bytes32,uint256)")[..4]
        );
        assert_eq!(data[4 + 63], 7);
    }

    #[test]
    fn game_key_is_deterministic() {
        assert_eq!(
            FactoryGateway::game_key("game-1"),
            FactoryGateway::game_key("game-1")
        );
        assert_ne!(
            FactoryGateway::game_key("game-1"),
            FactoryGateway::game_key("game-2")
        );
    }
}
