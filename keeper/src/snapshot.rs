//! Per-wallet reward snapshot
//!
//! A snapshot is priced against one `now` and one Config copy: the mining and
//! staking accumulators are projected once and every position and stake reads
//! from those projections.

use crate::gateway::{AccountFilter, LedgerGateway};
use crate::pda;
use anyhow::{Context, Result};
use mind_codec::accounts::position::{POSITION_OWNER_OFFSET, POSITION_VERSIONS};
use mind_codec::capacity::format_hp;
use mind_codec::{decode_position, decode_profile, decode_stake};
use mind_codec::{MinerPosition, MiningConfig, MiningProfile, UserStake};
use mind_model::helpers::{claim_within_ceiling, projection_not_behind, wallet_cap_respected};
use mind_model::levels::{
    effective_position_capacity, level_up_preview, project_xp, LevelUpPreview, XpProjection,
};
use mind_model::rewards::{position_pending_at, project_accumulator, wallet_capped_capacity};
use mind_model::staking::{
    project_staking_accumulator, staking_claim_estimate_at, unstake_preview, StakingClaimEstimate,
    UnstakePreview,
};
use mind_model::{AccumulatorProjection, MirrorResult};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

/// Decoded ledger state of one wallet
#[derive(Debug, Clone, Default)]
pub struct WalletAccounts {
    pub owner: Pubkey,
    pub profile: Option<MiningProfile>,
    pub stake: Option<UserStake>,
    pub positions: Vec<(Pubkey, MinerPosition)>,
}

/// Fetch and decode a wallet's profile, stake and positions.
///
/// Accounts that fail to decode are logged and skipped.
pub fn fetch_wallet<G: LedgerGateway>(
    gateway: &G,
    program: &Pubkey,
    owner: &Pubkey,
) -> Result<WalletAccounts> {
    let profile_key = pda::profile(program, owner);
    let profile = match gateway
        .get_account(&profile_key)
        .context("Failed to fetch profile")?
    {
        Some(data) => decode_profile(&data)
            .map_err(|e| log::warn!("Skipping profile {}: {}", profile_key, e))
            .ok(),
        None => None,
    };

    let stake_key = pda::stake(program, owner);
    let stake = match gateway
        .get_account(&stake_key)
        .context("Failed to fetch stake")?
    {
        Some(data) => decode_stake(&data)
            .map_err(|e| log::warn!("Skipping stake {}: {}", stake_key, e))
            .ok(),
        None => None,
    };

    // one server-side scan per layout length
    let mut positions = Vec::new();
    for len in POSITION_VERSIONS.lengths() {
        let filter = AccountFilter::with_length(len).and_match(POSITION_OWNER_OFFSET, owner.as_ref());
        let accounts = gateway
            .get_accounts_by_filter(program, &filter)
            .context(format!("Failed to scan {}-byte positions", len))?;
        for (key, data) in accounts {
            match decode_position(&data) {
                Ok(position) => positions.push((key, position)),
                Err(e) => log::warn!("Skipping position {}: {}", key, e),
            }
        }
    }
    positions.sort_by_key(|(_, p)| p.start_ts);

    Ok(WalletAccounts {
        owner: *owner,
        profile,
        stake,
        positions,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionView {
    pub address: String,
    pub version: String,
    pub hp: String,
    pub effective_hp: String,
    pub start_ts: i64,
    pub end_ts: i64,
    pub active: bool,
    pub pending_mind: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct StakeView {
    pub staked_mind: u64,
    pub claim: StakingClaimEstimate,
    /// Outcome of unstaking everything now.
    pub unstake_all: UnstakePreview,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletSnapshot {
    pub owner: String,
    pub as_of: i64,
    pub cycle: u64,
    pub accumulator: AccumulatorProjection,
    pub level: Option<u8>,
    pub xp: Option<XpProjection>,
    pub level_up: Option<LevelUpPreview>,
    pub positions: Vec<PositionView>,
    pub active_hp: String,
    /// Active capacity after the per-wallet cap.
    pub capped_hp: String,
    pub pending_mind: u128,
    pub stake: Option<StakeView>,
}

impl WalletSnapshot {
    pub fn build(
        cfg: &MiningConfig,
        wallet: &WalletAccounts,
        now: i64,
        bonus_epsilon: u64,
    ) -> MirrorResult<Self> {
        let accumulator = project_accumulator(cfg, now)?;
        if !projection_not_behind(cfg, &accumulator) {
            log::warn!("Accumulator projection behind config for {}", wallet.owner);
        }
        let profile = wallet.profile.as_ref();

        let mut positions = Vec::with_capacity(wallet.positions.len());
        let mut pending_mind = 0u128;
        let mut active_hp = 0u64;
        for (key, position) in &wallet.positions {
            let pending = position_pending_at(cfg, &accumulator, position, profile, now)?;
            let effective = effective_position_capacity(cfg, position, profile, now)?;
            let active = !position.deactivated && !position.expired && !position.is_past_end(now);
            if active {
                active_hp = active_hp.saturating_add(effective);
            }
            pending_mind = pending_mind.saturating_add(pending);
            positions.push(PositionView {
                address: key.to_string(),
                version: format!("{:?}", position.version),
                hp: format_hp(position.hp_canonical),
                effective_hp: format_hp(effective),
                start_ts: position.start_ts,
                end_ts: position.end_ts,
                active,
                pending_mind: pending,
            });
        }

        let capped = wallet_capped_capacity(active_hp, cfg.network_hp_active, cfg.wallet_cap_bps)?;
        if !wallet_cap_respected(capped, cfg.network_hp_active, cfg.wallet_cap_bps) {
            log::warn!("Wallet cap exceeded for {}", wallet.owner);
        }

        let stake = match wallet.stake.as_ref() {
            Some(stake) => {
                let projection = project_staking_accumulator(cfg, now)?;
                let claim = staking_claim_estimate_at(&projection, stake, profile, bonus_epsilon)?;
                if !claim_within_ceiling(&claim, bonus_epsilon) {
                    log::warn!("Staking estimate above ceiling for {}", wallet.owner);
                }
                Some(StakeView {
                    staked_mind: stake.staked_mind,
                    claim,
                    unstake_all: unstake_preview(stake.staked_mind)?,
                })
            }
            None => None,
        };

        let xp = profile.map(|p| project_xp(p, now)).transpose()?;
        let level_up = profile.map(|p| level_up_preview(p, now)).transpose()?;

        Ok(Self {
            owner: wallet.owner.to_string(),
            as_of: now,
            cycle: cfg.cycle_at(now),
            accumulator,
            level: xp.map(|x| x.level),
            xp,
            level_up,
            positions,
            active_hp: format_hp(active_hp),
            capped_hp: format_hp(capped),
            pending_mind,
            stake,
        })
    }
}
