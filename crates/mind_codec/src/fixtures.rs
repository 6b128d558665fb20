//! Account-byte builders for tests
//!
//! Encoders write exactly the layout of the record's `version`, so a decoded
//! fixture resolves back to the same version.

use crate::accounts::config::{ConfigVersion, MiningConfig};
use crate::accounts::melt::{MeltConfig, MeltConfigVersion, MeltRound, MeltUserRound};
use crate::accounts::position::{MinerPosition, PositionVersion};
use crate::accounts::profile::{MiningProfile, ProfileVersion, MAX_LEVEL_SNAPSHOTS};
use crate::accounts::stake::UserStake;
use crate::discriminator::account_discriminator;
use crate::version::AccountKind;
use solana_sdk::pubkey::Pubkey;

/// Little-endian field writer seeded with an account discriminator.
pub struct AccountBuilder {
    buf: Vec<u8>,
}

impl AccountBuilder {
    pub fn new(kind: AccountKind) -> Self {
        Self {
            buf: account_discriminator(kind.type_name()).to_vec(),
        }
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.buf.push(v);
        self
    }

    pub fn bool(self, v: bool) -> Self {
        self.u8(v as u8)
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u64(mut self, v: u64) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i64(mut self, v: i64) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u128(self, v: u128) -> Self {
        self.u64(v as u64).u64((v >> 64) as u64)
    }

    pub fn pubkey(mut self, key: &Pubkey) -> Self {
        self.buf.extend_from_slice(key.as_ref());
        self
    }

    /// Zero-fills up to `len` total bytes.
    pub fn pad_to(mut self, len: usize) -> Self {
        if self.buf.len() < len {
            self.buf.resize(len, 0);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

pub fn encode_config(cfg: &MiningConfig) -> Vec<u8> {
    let s = &cfg.staking;
    let b = AccountBuilder::new(AccountKind::Config)
        .pubkey(&cfg.admin)
        .u64(cfg.emission_per_sec)
        .u128(cfg.acc_mind_per_hp)
        .i64(cfg.last_update_ts)
        .u64(cfg.network_hp_active)
        .pubkey(&cfg.mind_mint)
        .pubkey(&cfg.xnt_mint)
        .pubkey(&cfg.staking_reward_vault)
        .pubkey(&cfg.treasury_vault)
        .pubkey(&cfg.staking_mind_vault)
        .u64(cfg.max_effective_hp)
        .u64(cfg.seconds_per_day)
        .u128(s.acc_xnt_per_mind)
        .i64(s.last_update_ts)
        .u64(s.reward_rate_xnt_per_sec)
        .i64(s.epoch_end_ts)
        .u64(s.total_staked_mind)
        .u64(s.undistributed_xnt)
        .u64(s.accounted_balance)
        .u8(cfg.bump_config)
        .u8(cfg.bump_vault_authority);
    match cfg.version {
        ConfigVersion::V1 => b.build(),
        ConfigVersion::V2 => b.u16(cfg.wallet_cap_bps).build(),
    }
}

pub fn encode_position(p: &MinerPosition) -> Vec<u8> {
    let mut b = AccountBuilder::new(AccountKind::Position)
        .pubkey(&p.owner)
        .u64(p.hp.to_raw())
        .i64(p.start_ts)
        .i64(p.end_ts)
        .u128(p.reward_debt)
        .u128(p.final_acc_mind_per_hp)
        .bool(p.deactivated)
        .u8(p.bump);
    if p.version >= PositionVersion::V2 {
        b = b.u8(p.rig_type).u8(p.buff_level).bool(p.hp.is_scaled());
    }
    if p.version >= PositionVersion::V3 {
        b = b.bool(p.expired).u64(p.buff_effective_from_cycle);
    }
    b.build()
}

pub fn encode_profile(p: &MiningProfile) -> Vec<u8> {
    let mut b = AccountBuilder::new(AccountKind::Profile)
        .pubkey(&p.owner)
        .u64(p.next_position_index)
        .u64(p.active_hp.to_raw())
        .u64(p.xp)
        .u8(p.badge_tier)
        .u16(p.badge_bonus_bps)
        .u8(p.bump);
    if p.version >= ProfileVersion::V2 {
        b = b.u8(p.level).i64(p.last_xp_update_ts);
    }
    if p.version >= ProfileVersion::V3 {
        b = b
            .u64(p.next_stake_index)
            .u64(p.buffed_hp.to_raw())
            .bool(p.hp_scaled);
    }
    if p.version >= ProfileVersion::V4 {
        b = b.u8(p.level_snapshots.len() as u8);
        for i in 0..MAX_LEVEL_SNAPSHOTS {
            b = b.u128(p.level_snapshots.get(i).copied().unwrap_or(0));
        }
    }
    b.build()
}

pub fn encode_stake(s: &UserStake) -> Vec<u8> {
    AccountBuilder::new(AccountKind::Stake)
        .pubkey(&s.owner)
        .u64(s.staked_mind)
        .u128(s.reward_debt)
        .u64(s.reward_owed)
        .u8(s.bump)
        .build()
}

pub fn encode_melt_config(c: &MeltConfig) -> Vec<u8> {
    let b = AccountBuilder::new(AccountKind::MeltConfig)
        .pubkey(&c.admin)
        .pubkey(&c.mind_mint)
        .pubkey(&c.vault)
        .u64(c.vault_cap)
        .u16(c.rollover_bps)
        .u64(c.burn_min)
        .u64(c.round_window_sec)
        .bool(c.test_mode)
        .u64(c.round_seq);
    let b = match c.version {
        MeltConfigVersion::Legacy => b,
        MeltConfigVersion::V2 => b
            .u64(c.vial)
            .u64(c.bonus_pool)
            .u64(c.active_round_seq)
            .bool(c.active_round_active)
            .u64(c.pending_window_sec),
    };
    b.u8(c.bump_config).u8(c.bump_vault).build()
}

pub fn encode_melt_round(r: &MeltRound) -> Vec<u8> {
    AccountBuilder::new(AccountKind::MeltRound)
        .u64(r.seq)
        .i64(r.start_ts)
        .i64(r.end_ts)
        .u64(r.v_round)
        .u64(r.v_pay)
        .u64(r.total_burn)
        .u8(r.status.to_byte())
        .u8(r.bump)
        .build()
}

pub fn encode_melt_user_round(u: &MeltUserRound) -> Vec<u8> {
    AccountBuilder::new(AccountKind::MeltUserRound)
        .pubkey(&u.user)
        .pubkey(&u.round)
        .u64(u.burned)
        .bool(u.claimed)
        .u8(u.bump)
        .build()
}
