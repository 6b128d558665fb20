//! Per-wallet mining profile (`account:UserMiningProfile`)

use super::{canonical_capacity, open};
use crate::capacity::Capacity;
use crate::error::{DecodeError, DecodeResult};
use crate::version::{AccountKind, VersionTable};
use arrayvec::ArrayVec;
use solana_sdk::pubkey::Pubkey;

pub const PROFILE_V1_LEN: usize = 68;
pub const PROFILE_V2_LEN: usize = 77;
pub const PROFILE_V3_LEN: usize = 94;
pub const PROFILE_V4_LEN: usize = 207;

/// One accumulator snapshot per level, level 0 through 6.
pub const MAX_LEVEL_SNAPSHOTS: usize = 7;

pub type LevelSnapshots = ArrayVec<u128, MAX_LEVEL_SNAPSHOTS>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ProfileVersion {
    V1,
    /// Level and XP clock.
    V2,
    /// Stake index, buffed HP and the `hp_scaled` flag.
    V3,
    /// Accumulator snapshots taken at each level-up.
    #[default]
    V4,
}

pub const PROFILE_VERSIONS: VersionTable<ProfileVersion> = VersionTable::new(
    AccountKind::Profile,
    &[
        (ProfileVersion::V1, PROFILE_V1_LEN),
        (ProfileVersion::V2, PROFILE_V2_LEN),
        (ProfileVersion::V3, PROFILE_V3_LEN),
        (ProfileVersion::V4, PROFILE_V4_LEN),
    ],
);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MiningProfile {
    pub version: ProfileVersion,
    pub owner: Pubkey,
    pub next_position_index: u64,
    pub active_hp: Capacity,
    pub active_hp_canonical: u64,
    pub xp: u64,
    pub badge_tier: u8,
    pub badge_bonus_bps: u16,
    pub bump: u8,
    /// Zero on V1 accounts; the ledger promotes them to level 1 on next touch.
    pub level: u8,
    pub last_xp_update_ts: i64,
    pub next_stake_index: u64,
    pub buffed_hp: Capacity,
    pub buffed_hp_canonical: u64,
    pub hp_scaled: bool,
    /// Entry `i` is the accumulator value at which the profile reached level `i`.
    pub level_snapshots: LevelSnapshots,
}

impl MiningProfile {
    pub fn has_level_curve(&self) -> bool {
        self.version >= ProfileVersion::V4 && !self.level_snapshots.is_empty()
    }
}

pub fn decode_profile(data: &[u8]) -> DecodeResult<MiningProfile> {
    let (version, mut r) = open(&PROFILE_VERSIONS, data)?;

    let owner = r.read_pubkey()?;
    let next_position_index = r.read_u64()?;
    let raw_active_hp = r.read_u64()?;
    let xp = r.read_u64()?;
    let badge_tier = r.read_u8()?;
    let badge_bonus_bps = r.read_u16()?;
    let bump = r.read_u8()?;

    let (level, last_xp_update_ts) = if version >= ProfileVersion::V2 {
        (r.read_u8()?, r.read_i64()?)
    } else {
        (0, 0)
    };
    let (next_stake_index, raw_buffed_hp, hp_scaled) = if version >= ProfileVersion::V3 {
        (r.read_u64()?, r.read_u64()?, r.read_bool("hp_scaled")?)
    } else {
        (0, 0, false)
    };

    let mut level_snapshots = LevelSnapshots::new();
    if version >= ProfileVersion::V4 {
        let count = r.read_u8()? as usize;
        if count > MAX_LEVEL_SNAPSHOTS {
            return Err(DecodeError::InvalidField {
                kind: AccountKind::Profile,
                field: "level_snapshot_count",
            });
        }
        for i in 0..MAX_LEVEL_SNAPSHOTS {
            let snapshot = r.read_u128()?;
            if i < count {
                level_snapshots.push(snapshot);
            }
        }
    }

    let (active_hp, active_hp_canonical) =
        canonical_capacity(AccountKind::Profile, "active_hp", raw_active_hp, false, hp_scaled)?;
    let (buffed_hp, buffed_hp_canonical) =
        canonical_capacity(AccountKind::Profile, "buffed_hp", raw_buffed_hp, false, hp_scaled)?;

    Ok(MiningProfile {
        version,
        owner,
        next_position_index,
        active_hp,
        active_hp_canonical,
        xp,
        badge_tier,
        badge_bonus_bps,
        bump,
        level,
        last_xp_update_ts,
        next_stake_index,
        buffed_hp,
        buffed_hp_canonical,
        hp_scaled,
        level_snapshots,
    })
}
