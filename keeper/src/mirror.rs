//! One polling pass over the ledger
//!
//! Reads the mining Config once, prices every watched wallet against it and
//! follows the latest burn round: phase, claim predictions and leaderboard.

use crate::cache::AccountCache;
use crate::config::Config;
use crate::gateway::LedgerGateway;
use crate::leaderboard::{RoundScan, ScanReport};
use crate::pda;
use crate::snapshot::{fetch_wallet, WalletSnapshot};
use anyhow::{Context, Result};
use mind_codec::{decode_config, decode_melt_config, decode_melt_round, decode_melt_user_round};
use mind_codec::{MeltConfig, MeltRound, MiningConfig};
use mind_model::helpers::accumulator_monotone;
use mind_model::melt::{classify_phase, latest_round_seq, predict_claim};
use mind_model::rewards::project_accumulator;
use mind_model::{AccumulatorProjection, ClaimPrediction, MirrorError, RoundPhase};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ClaimView {
    pub owner: String,
    pub prediction: ClaimPrediction,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeltView {
    pub phase: RoundPhase,
    pub round_seq: Option<u64>,
    pub vial: u64,
    pub vault_cap: u64,
    pub bonus_pool: u64,
    pub next_window_sec: u64,
    pub round_end_ts: Option<i64>,
    pub round_payout: Option<u64>,
    pub claims: Vec<ClaimView>,
    pub leaderboard: Option<ScanReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MirrorReport {
    pub as_of: i64,
    pub accumulator: AccumulatorProjection,
    /// The mining accumulator went backwards since the previous refresh.
    pub accumulator_regressed: bool,
    pub wallets: Vec<WalletSnapshot>,
    pub melt: Option<MeltView>,
}

/// Polling state carried between refreshes
pub struct Mirror<G> {
    gateway: G,
    config: Config,
    cache: AccountCache,
    scan: Option<RoundScan>,
    last_accumulator: Option<AccumulatorProjection>,
}

impl<G: LedgerGateway> Mirror<G> {
    pub fn new(gateway: G, config: Config) -> Self {
        let ttl = Duration::from_secs(config.cache_ttl_secs);
        Self {
            gateway,
            config,
            cache: AccountCache::new(ttl),
            scan: None,
            last_accumulator: None,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn cached_account(&mut self, key: &Pubkey) -> Result<Option<Vec<u8>>> {
        if let Some(data) = self.cache.get(key) {
            return Ok(data.clone());
        }
        let data = self.gateway.get_account(key)?;
        self.cache.insert(*key, data.clone());
        Ok(data)
    }

    /// One polling pass at `now`
    pub fn refresh(&mut self, now: i64, cancel: &AtomicBool) -> Result<MirrorReport> {
        self.cache.evict_stale();

        let config_key = pda::config(&self.config.mining_program);
        let data = self
            .cached_account(&config_key)?
            .ok_or(MirrorError::MissingDependency("config"))?;
        let mining = decode_config(&data)
            .map_err(|e| {
                self.cache.invalidate(&config_key);
                e
            })
            .context("Failed to decode config")?;

        let accumulator = project_accumulator(&mining, now)?;
        let accumulator_regressed = self
            .last_accumulator
            .is_some_and(|prev| !accumulator_monotone(&prev, &accumulator));
        if accumulator_regressed {
            log::warn!(
                "Mining accumulator went backwards: {:?} -> {}",
                self.last_accumulator.map(|p| p.acc),
                accumulator.acc
            );
        }
        self.last_accumulator = Some(accumulator);

        let wallets = self.refresh_wallets(&mining, now);

        let melt = match self.refresh_melt(now, cancel) {
            Ok(view) => view,
            Err(e) => {
                log::warn!("Melt refresh failed: {:#}", e);
                None
            }
        };

        Ok(MirrorReport {
            as_of: now,
            accumulator,
            accumulator_regressed,
            wallets,
            melt,
        })
    }

    fn refresh_wallets(&self, mining: &MiningConfig, now: i64) -> Vec<WalletSnapshot> {
        let program = self.config.mining_program;
        let mut snapshots = Vec::with_capacity(self.config.watched_owners.len());
        for owner in &self.config.watched_owners {
            let wallet = match fetch_wallet(&self.gateway, &program, owner) {
                Ok(wallet) => wallet,
                Err(e) => {
                    log::warn!("Failed to fetch wallet {}: {:#}", owner, e);
                    continue;
                }
            };
            match WalletSnapshot::build(mining, &wallet, now, self.config.bonus_epsilon) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => log::warn!("Failed to price wallet {}: {}", owner, e),
            }
        }
        snapshots
    }

    fn refresh_melt(&mut self, now: i64, cancel: &AtomicBool) -> Result<Option<MeltView>> {
        let program = self.config.melt_program;
        let Some(data) = self.cached_account(&pda::melt_config(&program))? else {
            log::debug!("No melt config on ledger");
            return Ok(None);
        };
        let melt = decode_melt_config(&data).context("Failed to decode melt config")?;

        let seq = latest_round_seq(&melt);
        let round_key = seq.map(|seq| pda::melt_round(&program, seq));
        let round = match round_key {
            Some(key) => match self.gateway.get_account(&key)? {
                Some(data) => Some(decode_melt_round(&data).context("Failed to decode round")?),
                None => None,
            },
            None => None,
        };
        let phase = classify_phase(&melt, round.as_ref(), now);

        let claims = match (round_key, round.as_ref()) {
            (Some(key), Some(round)) => self.predict_claims(&key, round, now),
            _ => Vec::new(),
        };

        let leaderboard = match round_key {
            Some(key) => Some(self.scan_round(key, round.as_ref(), cancel)),
            None => None,
        };

        Ok(Some(melt_view(&melt, seq, phase, round.as_ref(), claims, leaderboard)))
    }

    fn predict_claims(&self, round_key: &Pubkey, round: &MeltRound, now: i64) -> Vec<ClaimView> {
        let program = self.config.melt_program;
        let mut claims = Vec::new();
        for owner in &self.config.watched_owners {
            let key = pda::melt_user_round(&program, owner, round_key);
            let user_round = match self.gateway.get_account(&key) {
                Ok(Some(data)) => match decode_melt_user_round(&data) {
                    Ok(user_round) => user_round,
                    Err(e) => {
                        log::warn!("Skipping user round {}: {}", key, e);
                        continue;
                    }
                },
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Failed to fetch user round {}: {:#}", key, e);
                    continue;
                }
            };
            match predict_claim(round, &user_round, now) {
                Ok(prediction) => claims.push(ClaimView {
                    owner: owner.to_string(),
                    prediction,
                }),
                Err(e) => log::warn!("Failed to predict claim for {}: {}", owner, e),
            }
        }
        claims
    }

    fn scan_round(
        &mut self,
        key: Pubkey,
        round: Option<&MeltRound>,
        cancel: &AtomicBool,
    ) -> ScanReport {
        if self.scan.as_ref().map(|s| *s.round()) != Some(key) {
            log::info!("Tracking leaderboard for round {}", key);
            self.scan = None;
        }
        let (page_size, top_n) = (self.config.leaderboard_page_size, self.config.top_burners);
        let scan = self
            .scan
            .get_or_insert_with(|| RoundScan::new(key, page_size, top_n));
        let report = scan.scan(&self.gateway, round, cancel);
        log::debug!(
            "Round {} cursor {:?}, {} txs replayed",
            key,
            scan.cursor(),
            scan.board().applied_count()
        );
        report
    }
}

fn melt_view(
    melt: &MeltConfig,
    seq: Option<u64>,
    phase: RoundPhase,
    round: Option<&MeltRound>,
    claims: Vec<ClaimView>,
    leaderboard: Option<ScanReport>,
) -> MeltView {
    MeltView {
        phase,
        round_seq: seq,
        vial: melt.vial,
        vault_cap: melt.vault_cap,
        bonus_pool: melt.bonus_pool,
        next_window_sec: melt.next_window_sec(),
        round_end_ts: round.map(|r| r.end_ts),
        round_payout: round.map(|r| r.v_pay),
        claims,
        leaderboard,
    }
}
