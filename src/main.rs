//! Polymarket Sync Bot — Entry Point
//!
//! One-shot batch run: seed market records from the upstream games
//! feed, then drive every non-terminal record through its next
//! create/resolve step on-chain. Designed to be invoked periodically
//! (cron/systemd timer); the advisory run lock rejects overlapping
//! invocations.
//!
//! Wiring sequence:
//! 1. Load config.toml + env overrides + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Acquire the store run lock (single-writer discipline)
//! 4. Install the SIGINT handler (skip not-yet-started records)
//! 5. Connect the RPC provider (PRIVATE_KEY from env unless dry-run)
//! 6. Build the factory gateway, record store, and games feed;
//!    health-check the store and the chain before touching records
//! 7. Seeding pass (fetch failure is survivable, store failure fatal)
//! 8. Orchestrator run + summary
//! 9. Exit 1 if any record ended Failed and fail_on_failed is set

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

mod adapters;
mod config;
mod domain;
mod ports;
mod usecases;

use adapters::chain::provider::wallet_from_env;
use adapters::chain::{FactoryGateway, RpcProvider};
use adapters::store::{JsonRecordStore, RunLock};
use adapters::upstream::{FeedClient, GamesFeed};
use ports::chain_gateway::ChainGateway;
use ports::record_store::RecordStore;
use usecases::orchestrator::BatchOrchestrator;
use usecases::seeder::{SeedError, Seeder};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.bot.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.bot.name,
        version = env!("CARGO_PKG_VERSION"),
        dry_run = config.bot.dry_run,
        store = %config.store.path,
        "Starting Polymarket sync bot"
    );

    // ── 3. Acquire the run lock ─────────────────────────────
    let run_lock = RunLock::acquire(&config.store.path)
        .context("Another run appears to be in progress")?;

    // ── 4. SIGINT → stop starting new records ───────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("SIGINT received — finishing in-flight submissions, skipping the rest");
            let _ = shutdown_tx.send(true);
        }
    });

    // ── 5. Connect the RPC provider ─────────────────────────
    let wallet = if config.bot.dry_run {
        None
    } else {
        Some(wallet_from_env().context("Signing credential required unless bot.dry_run")?)
    };
    let provider = Arc::new(
        RpcProvider::connect(&config.chain, wallet)
            .await
            .context("Failed to connect to RPC endpoint")?,
    );

    // ── 6. Build gateway, store, and feed ───────────────────
    let gateway = Arc::new(FactoryGateway::new(
        Arc::clone(&provider),
        &config.chain,
        config.bot.dry_run,
    )?);
    let store = Arc::new(
        JsonRecordStore::new(&config.store.path, config.store.tolerate_missing)
            .await
            .context("Failed to open record store")?,
    );
    let feed = GamesFeed::new(FeedClient::new(&config.upstream)?, &config.upstream);

    anyhow::ensure!(
        store.is_healthy().await,
        "Record store failed its health check"
    );
    anyhow::ensure!(
        gateway.is_healthy().await,
        "Chain gateway failed its health check"
    );

    // ── 7. Seeding pass ─────────────────────────────────────
    let seeder = Seeder::new(feed, Arc::clone(&store));
    match seeder.seed().await {
        Ok(seeded) => info!(
            fetched = seeded.fetched,
            added = seeded.added,
            "Seeding finished"
        ),
        Err(SeedError::Fetch(e)) => {
            warn!(error = %e, "Upstream fetch failed — continuing with existing records");
        }
        Err(SeedError::Store(e)) => {
            return Err(e).context("Store failure during seeding");
        }
    }

    // ── 8. Pipeline run ─────────────────────────────────────
    let orchestrator = BatchOrchestrator::new(
        gateway,
        Arc::clone(&store),
        &config.pipeline,
        shutdown_rx,
    );
    let summary = orchestrator.run().await.context("Pipeline run aborted")?;

    info!(
        run_id = %summary.run_id,
        created = summary.created,
        resolved = summary.resolved,
        failed = summary.failed,
        retried = summary.retried,
        skipped = summary.skipped,
        "Run summary"
    );

    // ── 9. Exit policy ──────────────────────────────────────
    if summary.has_failures() && config.pipeline.fail_on_failed {
        error!(failed = summary.failed, "Run finished with failed records");
        drop(run_lock);
        std::process::exit(1);
    }

    drop(run_lock);
    Ok(())
}
