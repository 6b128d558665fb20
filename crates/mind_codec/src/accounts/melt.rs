//! Burn-round ("melt") accounts
//!
//! `MeltConfig` changed shape between versions: the vial and round-tracking
//! fields were inserted before the bump bytes, so each version has its own
//! reader rather than a shared prefix.

use super::{open, open_fixed};
use crate::error::{DecodeError, DecodeResult};
use crate::reader::ByteReader;
use crate::version::{AccountKind, VersionTable};
use solana_sdk::pubkey::Pubkey;

pub const MELT_CONFIG_V1_LEN: usize = 141;
pub const MELT_CONFIG_V2_LEN: usize = 174;
pub const MELT_ROUND_ACCOUNT_LEN: usize = 58;
pub const MELT_USER_ROUND_ACCOUNT_LEN: usize = 82;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeltConfigVersion {
    /// Round-per-window layout without a vial.
    Legacy,
    #[default]
    V2,
}

pub const MELT_CONFIG_VERSIONS: VersionTable<MeltConfigVersion> = VersionTable::new(
    AccountKind::MeltConfig,
    &[
        (MeltConfigVersion::Legacy, MELT_CONFIG_V1_LEN),
        (MeltConfigVersion::V2, MELT_CONFIG_V2_LEN),
    ],
);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeltConfig {
    pub version: MeltConfigVersion,
    pub admin: Pubkey,
    pub mind_mint: Pubkey,
    pub vault: Pubkey,
    /// Vial size that triggers a round.
    pub vault_cap: u64,
    pub rollover_bps: u16,
    pub burn_min: u64,
    pub round_window_sec: u64,
    pub test_mode: bool,
    pub round_seq: u64,
    pub vial: u64,
    pub bonus_pool: u64,
    pub active_round_seq: u64,
    pub active_round_active: bool,
    /// One-shot override for the next round's window, zero when unset.
    pub pending_window_sec: u64,
    pub bump_config: u8,
    pub bump_vault: u8,
}

impl MeltConfig {
    /// Window the next round will run for.
    pub fn next_window_sec(&self) -> u64 {
        if self.pending_window_sec > 0 {
            self.pending_window_sec
        } else {
            self.round_window_sec
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundStatus {
    #[default]
    Planned,
    Active,
    Finalized,
}

impl RoundStatus {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(RoundStatus::Planned),
            1 => Some(RoundStatus::Active),
            2 => Some(RoundStatus::Finalized),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            RoundStatus::Planned => 0,
            RoundStatus::Active => 1,
            RoundStatus::Finalized => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeltRound {
    pub seq: u64,
    pub start_ts: i64,
    pub end_ts: i64,
    /// Pot locked when the round started.
    pub v_round: u64,
    /// Share of the pot paid out to burners.
    pub v_pay: u64,
    pub total_burn: u64,
    pub status: RoundStatus,
    pub bump: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeltUserRound {
    pub user: Pubkey,
    pub round: Pubkey,
    pub burned: u64,
    pub claimed: bool,
    pub bump: u8,
}

pub fn decode_melt_config(data: &[u8]) -> DecodeResult<MeltConfig> {
    let (version, mut r) = open(&MELT_CONFIG_VERSIONS, data)?;
    match version {
        MeltConfigVersion::Legacy => read_legacy_config(&mut r),
        MeltConfigVersion::V2 => read_config_v2(&mut r),
    }
}

fn read_legacy_config(r: &mut ByteReader<'_>) -> DecodeResult<MeltConfig> {
    Ok(MeltConfig {
        version: MeltConfigVersion::Legacy,
        admin: r.read_pubkey()?,
        mind_mint: r.read_pubkey()?,
        vault: r.read_pubkey()?,
        vault_cap: r.read_u64()?,
        rollover_bps: r.read_u16()?,
        burn_min: r.read_u64()?,
        round_window_sec: r.read_u64()?,
        test_mode: r.read_bool("test_mode")?,
        round_seq: r.read_u64()?,
        bump_config: r.read_u8()?,
        bump_vault: r.read_u8()?,
        ..MeltConfig::default()
    })
}

fn read_config_v2(r: &mut ByteReader<'_>) -> DecodeResult<MeltConfig> {
    Ok(MeltConfig {
        version: MeltConfigVersion::V2,
        admin: r.read_pubkey()?,
        mind_mint: r.read_pubkey()?,
        vault: r.read_pubkey()?,
        vault_cap: r.read_u64()?,
        rollover_bps: r.read_u16()?,
        burn_min: r.read_u64()?,
        round_window_sec: r.read_u64()?,
        test_mode: r.read_bool("test_mode")?,
        round_seq: r.read_u64()?,
        vial: r.read_u64()?,
        bonus_pool: r.read_u64()?,
        active_round_seq: r.read_u64()?,
        active_round_active: r.read_bool("active_round_active")?,
        pending_window_sec: r.read_u64()?,
        bump_config: r.read_u8()?,
        bump_vault: r.read_u8()?,
    })
}

pub fn decode_melt_round(data: &[u8]) -> DecodeResult<MeltRound> {
    let mut r = open_fixed(AccountKind::MeltRound, MELT_ROUND_ACCOUNT_LEN, data)?;
    let seq = r.read_u64()?;
    let start_ts = r.read_i64()?;
    let end_ts = r.read_i64()?;
    let v_round = r.read_u64()?;
    let v_pay = r.read_u64()?;
    let total_burn = r.read_u64()?;
    let status = RoundStatus::from_byte(r.read_u8()?).ok_or(DecodeError::InvalidField {
        kind: AccountKind::MeltRound,
        field: "status",
    })?;
    let bump = r.read_u8()?;
    Ok(MeltRound {
        seq,
        start_ts,
        end_ts,
        v_round,
        v_pay,
        total_burn,
        status,
        bump,
    })
}

pub fn decode_melt_user_round(data: &[u8]) -> DecodeResult<MeltUserRound> {
    let mut r = open_fixed(AccountKind::MeltUserRound, MELT_USER_ROUND_ACCOUNT_LEN, data)?;
    Ok(MeltUserRound {
        user: r.read_pubkey()?,
        round: r.read_pubkey()?,
        burned: r.read_u64()?,
        claimed: r.read_bool("claimed")?,
        bump: r.read_u8()?,
    })
}
