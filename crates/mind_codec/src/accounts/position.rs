//! Miner positions (`account:MinerPosition`)

use super::{canonical_capacity, open};
use crate::capacity::Capacity;
use crate::error::DecodeResult;
use crate::version::{AccountKind, VersionTable};
use solana_sdk::pubkey::Pubkey;

pub const POSITION_V1_LEN: usize = 98;
pub const POSITION_V2_LEN: usize = 101;
pub const POSITION_V3_LEN: usize = 110;

/// Body offset of the owner key, used for prefix filters.
pub const POSITION_OWNER_OFFSET: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PositionVersion {
    /// Whole-HP capacity, no rig metadata.
    V1,
    /// Adds rig type, buff level and the `hp_scaled` flag.
    V2,
    /// Adds expiry flag and the cycle from which the buff applies.
    #[default]
    V3,
}

pub const POSITION_VERSIONS: VersionTable<PositionVersion> = VersionTable::new(
    AccountKind::Position,
    &[
        (PositionVersion::V1, POSITION_V1_LEN),
        (PositionVersion::V2, POSITION_V2_LEN),
        (PositionVersion::V3, POSITION_V3_LEN),
    ],
);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MinerPosition {
    pub version: PositionVersion,
    pub owner: Pubkey,
    pub hp: Capacity,
    /// `hp` in canonical centi-HP.
    pub hp_canonical: u64,
    pub start_ts: i64,
    pub end_ts: i64,
    pub reward_debt: u128,
    pub final_acc_mind_per_hp: u128,
    pub deactivated: bool,
    pub bump: u8,
    pub rig_type: u8,
    pub buff_level: u8,
    pub hp_scaled: bool,
    pub expired: bool,
    pub buff_effective_from_cycle: u64,
}

impl MinerPosition {
    /// True once the contract window has passed, whether or not the ledger
    /// has deactivated the position yet.
    pub fn is_past_end(&self, now: i64) -> bool {
        now >= self.end_ts
    }

    /// Buff level stored on the position, if its layout has one.
    pub fn stored_buff_level(&self) -> Option<u8> {
        match self.version {
            PositionVersion::V1 => None,
            PositionVersion::V2 | PositionVersion::V3 => Some(self.buff_level),
        }
    }
}

pub fn decode_position(data: &[u8]) -> DecodeResult<MinerPosition> {
    let (version, mut r) = open(&POSITION_VERSIONS, data)?;

    let owner = r.read_pubkey()?;
    let raw_hp = r.read_u64()?;
    let start_ts = r.read_i64()?;
    let end_ts = r.read_i64()?;
    let reward_debt = r.read_u128()?;
    let final_acc_mind_per_hp = r.read_u128()?;
    let deactivated = r.read_bool("deactivated")?;
    let bump = r.read_u8()?;

    let (rig_type, buff_level, hp_scaled) = if version >= PositionVersion::V2 {
        (r.read_u8()?, r.read_u8()?, r.read_bool("hp_scaled")?)
    } else {
        (0, 0, false)
    };
    let (expired, buff_effective_from_cycle) = if version >= PositionVersion::V3 {
        (r.read_bool("expired")?, r.read_u64()?)
    } else {
        (false, 0)
    };

    let (hp, hp_canonical) =
        canonical_capacity(AccountKind::Position, "hp", raw_hp, deactivated, hp_scaled)?;

    Ok(MinerPosition {
        version,
        owner,
        hp,
        hp_canonical,
        start_ts,
        end_ts,
        reward_debt,
        final_acc_mind_per_hp,
        deactivated,
        bump,
        rig_type,
        buff_level,
        hp_scaled,
        expired,
        buff_effective_from_cycle,
    })
}
