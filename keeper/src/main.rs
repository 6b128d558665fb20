//! MIND Mirror Keeper
//!
//! Off-chain service that polls the mining, staking and burn-round programs,
//! prices every watched wallet against a single projection and keeps the
//! current round's burn leaderboard up to date.

use anyhow::{Context, Result};
use mind_keeper::config::{self, Config};
use mind_keeper::gateway::RpcGateway;
use mind_keeper::mirror::{Mirror, MirrorReport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("init") {
        let path = args
            .next()
            .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
        return Config::write_default(&path);
    }

    log::info!("Starting MIND mirror");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default devnet config", e);
        Config::default_devnet()
    });

    log::info!("Connected to RPC: {}", config.rpc_url);
    log::info!("Mining program: {}", config.mining_program);
    log::info!("Melt program: {}", config.melt_program);
    log::info!("Watching {} wallets", config.watched_owners.len());

    let gateway = RpcGateway::new(&config.rpc_url);
    let mut mirror = Mirror::new(gateway, config.clone());

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Shutdown requested");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    // Main event loop
    let mut interval = time::interval(Duration::from_secs(config.poll_interval_secs.max(1)));

    loop {
        interval.tick().await;
        if cancel.load(Ordering::Relaxed) {
            break;
        }

        let now = unix_now()?;
        let result = tokio::task::block_in_place(|| mirror.refresh(now, &cancel));
        match result {
            Ok(report) => {
                log_summary(&report);
                if let Some(path) = config.snapshot_file() {
                    if let Err(e) = write_report(&path, &report) {
                        log::error!("Error writing snapshot: {:#}", e);
                    }
                }
            }
            Err(e) => log::error!("Error refreshing mirror: {:#}", e),
        }
    }

    log::info!("MIND mirror stopped");
    Ok(())
}

fn unix_now() -> Result<i64> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock before unix epoch")?
        .as_secs();
    i64::try_from(secs).context("System clock out of range")
}

fn log_summary(report: &MirrorReport) {
    for wallet in &report.wallets {
        log::info!(
            "{}: {} HP active ({} capped), pending {} MIND base units, {} positions",
            wallet.owner,
            wallet.active_hp,
            wallet.capped_hp,
            wallet.pending_mind,
            wallet.positions.len()
        );
    }
    if let Some(melt) = &report.melt {
        log::info!(
            "Melt round {:?}: {:?}, vial {}/{}",
            melt.round_seq,
            melt.phase,
            melt.vial,
            melt.vault_cap
        );
        if let Some(board) = &melt.leaderboard {
            log::info!(
                "Leaderboard: {} burned, {} new txs{}",
                board.total_burned,
                board.applied,
                if board.stale { " (stale)" } else { "" }
            );
            if let Some(top) = board.top.first() {
                log::debug!("Top burner {} with {}", top.owner, top.burned);
            }
        }
    }
}

fn write_report(path: &str, report: &MirrorReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize snapshot")?;
    std::fs::write(path, json).context(format!("Failed to write snapshot to {}", path))?;
    Ok(())
}

