//! Profile levels, XP accrual and the level bonus on capacity

use crate::error::{MirrorError, MirrorResult};
use crate::math::*;
use mind_codec::{MinerPosition, MiningConfig, MiningProfile, PositionVersion, HP_SCALE};
use serde::Serialize;

pub const MAX_LEVEL: u8 = 6;
pub const LEVEL_BONUS_CAP_BPS: u16 = 1_000;
pub const XP_SECONDS_PER_POINT: u64 = 36_000;
pub const MIND_DECIMALS: u64 = 1_000_000_000;

/// Capacity bonus granted at `level`
pub fn level_bonus_bps(level: u8) -> u16 {
    match level {
        0 | 1 => 0,
        2 => 160,
        3 => 340,
        4 => 550,
        5 => 780,
        _ => LEVEL_BONUS_CAP_BPS,
    }
}

/// XP needed to reach `level`
pub fn level_threshold_xp(level: u8) -> u64 {
    match level {
        0 | 1 => 0,
        2 => 1,
        3 => 2_000,
        4 => 5_000,
        5 => 10_000,
        _ => 16_000,
    }
}

/// MIND burned to leave `level`; zero once there is nothing above it
pub fn level_up_cost(level: u8) -> u64 {
    match level {
        1 => 150 * MIND_DECIMALS,
        2 => 350 * MIND_DECIMALS,
        3 => 900 * MIND_DECIMALS,
        4 => 2_000 * MIND_DECIMALS,
        5 => 4_000 * MIND_DECIMALS,
        _ => 0,
    }
}

/// Canonical capacity with the (capped) level bonus applied
pub fn effective_capacity(canonical: u64, level: u8) -> MirrorResult<u64> {
    let bonus = level_bonus_bps(level).min(LEVEL_BONUS_CAP_BPS) as u64;
    let boosted = apply_bps(canonical as u128, BPS_DENOMINATOR + bonus, "effective capacity")?;
    to_u64(boosted, "effective capacity")
}

/// Level whose bonus applies to `position` during `cycle`.
///
/// Positions that record their own buff level use it; older ones fall back
/// to the owner's profile. A buff scheduled for a later cycle has not taken
/// effect yet, so the previous level still applies.
pub fn position_level(position: &MinerPosition, profile: Option<&MiningProfile>, cycle: u64) -> u8 {
    let level = position
        .stored_buff_level()
        .or_else(|| profile.map(|p| p.level))
        .unwrap_or(0);
    if position.version >= PositionVersion::V3 && cycle < position.buff_effective_from_cycle {
        level.saturating_sub(1)
    } else {
        level
    }
}

/// Effective capacity of a position at `now`
pub fn effective_position_capacity(
    cfg: &MiningConfig,
    position: &MinerPosition,
    profile: Option<&MiningProfile>,
    now: i64,
) -> MirrorResult<u64> {
    let level = position_level(position, profile, cfg.cycle_at(now));
    effective_capacity(position.hp_canonical, level)
}

/// Earnings of `capacity` across the accumulator ranges spent at each level.
///
/// `snapshots[l]` is the accumulator value at which level `l` began; the
/// final level runs up to `acc`. Each segment is floored on its own.
pub fn level_curve_earned(capacity: u64, snapshots: &[u128], acc: u128) -> MirrorResult<u128> {
    let mut total = 0u128;
    for (level, &start) in snapshots.iter().enumerate() {
        let end = snapshots.get(level + 1).copied().unwrap_or(acc).min(acc);
        if end <= start {
            continue;
        }
        let eff = effective_capacity(capacity, level as u8)?;
        let segment = mul_div_u128(eff as u128, end - start, ACC_SCALE, "level curve")?;
        total = add_u128(total, segment, "level curve")?;
    }
    Ok(total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XpProjection {
    pub level: u8,
    pub xp: u64,
    pub as_of: i64,
}

/// XP the ledger would hold after touching `profile` at `now`
pub fn project_xp(profile: &MiningProfile, now: i64) -> MirrorResult<XpProjection> {
    if profile.level == 0 {
        // first touch promotes to level 1 and restarts the clock
        return Ok(XpProjection {
            level: 1,
            xp: 0,
            as_of: now,
        });
    }
    let dt = elapsed_secs(profile.last_xp_update_ts, now);
    if dt == 0 {
        return Ok(XpProjection {
            level: profile.level,
            xp: profile.xp,
            as_of: profile.last_xp_update_ts,
        });
    }
    let gained = mul_div_u128(
        profile.active_hp_canonical as u128,
        dt as u128,
        (XP_SECONDS_PER_POINT * HP_SCALE) as u128,
        "xp",
    )?;
    let xp = profile
        .xp
        .checked_add(to_u64(gained, "xp")?)
        .ok_or(MirrorError::ArithmeticOverflow("xp"))?;
    Ok(XpProjection {
        level: profile.level,
        xp,
        as_of: now,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelUpPreview {
    pub level: u8,
    pub next_level: Option<u8>,
    pub xp: u64,
    pub xp_required: u64,
    pub cost: u64,
    /// XP requirement met; the MIND balance is checked by the caller.
    pub xp_ok: bool,
}

/// What a level-up would require at `now`
pub fn level_up_preview(profile: &MiningProfile, now: i64) -> MirrorResult<LevelUpPreview> {
    let projected = project_xp(profile, now)?;
    let next_level = (projected.level < MAX_LEVEL).then(|| projected.level + 1);
    let xp_required = next_level.map_or(0, level_threshold_xp);
    let cost = next_level.map_or(0, |_| level_up_cost(projected.level));
    Ok(LevelUpPreview {
        level: projected.level,
        next_level,
        xp: projected.xp,
        xp_required,
        cost,
        xp_ok: next_level.is_some() && projected.xp >= xp_required && cost > 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mind_codec::{Capacity, MinerPosition, MiningProfile, PositionVersion};

    fn profile(level: u8, xp: u64, hp_canonical: u64, last: i64) -> MiningProfile {
        MiningProfile {
            level,
            xp,
            active_hp: Capacity::Scaled(hp_canonical),
            active_hp_canonical: hp_canonical,
            last_xp_update_ts: last,
            ..MiningProfile::default()
        }
    }

    #[test]
    fn test_bonus_table_is_capped() {
        assert_eq!(level_bonus_bps(0), 0);
        assert_eq!(level_bonus_bps(1), 0);
        assert_eq!(level_bonus_bps(3), 340);
        assert_eq!(level_bonus_bps(6), 1_000);
        assert_eq!(level_bonus_bps(200), LEVEL_BONUS_CAP_BPS);
    }

    #[test]
    fn test_effective_capacity() {
        assert_eq!(effective_capacity(10_000, 1), Ok(10_000));
        assert_eq!(effective_capacity(10_000, 2), Ok(10_160));
        assert_eq!(effective_capacity(10_000, 6), Ok(11_000));
        // floors like the ledger
        assert_eq!(effective_capacity(99, 2), Ok(100));
        assert!(effective_capacity(u64::MAX, 6).is_err());
    }

    #[test]
    fn test_level_up_costs() {
        assert_eq!(level_up_cost(1), 150_000_000_000);
        assert_eq!(level_up_cost(5), 4_000_000_000_000);
        assert_eq!(level_up_cost(6), 0);
        assert_eq!(level_up_cost(0), 0);
    }

    #[test]
    fn test_position_level_prefers_stored_buff() {
        let p = profile(5, 0, 0, 0);
        let v1 = MinerPosition {
            version: PositionVersion::V1,
            ..MinerPosition::default()
        };
        assert_eq!(position_level(&v1, Some(&p), 0), 5);
        assert_eq!(position_level(&v1, None, 0), 0);

        let v2 = MinerPosition {
            version: PositionVersion::V2,
            buff_level: 3,
            ..MinerPosition::default()
        };
        assert_eq!(position_level(&v2, Some(&p), 0), 3);
    }

    #[test]
    fn test_scheduled_buff_waits_for_cycle() {
        let v3 = MinerPosition {
            version: PositionVersion::V3,
            buff_level: 4,
            buff_effective_from_cycle: 100,
            ..MinerPosition::default()
        };
        assert_eq!(position_level(&v3, None, 99), 3);
        assert_eq!(position_level(&v3, None, 100), 4);
        assert_eq!(position_level(&v3, None, 250), 4);
    }

    #[test]
    fn test_xp_projection() {
        // 2 HP for 10 hours = 2 points
        let p = profile(2, 10, 200, 1_000);
        let xp = project_xp(&p, 1_000 + 36_000).unwrap();
        assert_eq!(xp.xp, 12);
        assert_eq!(xp.as_of, 37_000);

        // clock never runs backwards
        assert_eq!(project_xp(&p, 500).unwrap().xp, 10);
    }

    #[test]
    fn test_level_zero_promotes_without_xp() {
        let p = profile(0, 999, 500, 1);
        let xp = project_xp(&p, 50_000).unwrap();
        assert_eq!((xp.level, xp.xp, xp.as_of), (1, 0, 50_000));
    }

    #[test]
    fn test_level_up_preview() {
        let p = profile(2, 1_999, 100, 0);
        let preview = level_up_preview(&p, 0).unwrap();
        assert_eq!(preview.next_level, Some(3));
        assert_eq!(preview.xp_required, 2_000);
        assert_eq!(preview.cost, 350 * MIND_DECIMALS);
        assert!(!preview.xp_ok);

        let p = profile(2, 2_000, 100, 0);
        assert!(level_up_preview(&p, 0).unwrap().xp_ok);

        let maxed = profile(MAX_LEVEL, 50_000, 100, 0);
        let preview = level_up_preview(&maxed, 0).unwrap();
        assert_eq!(preview.next_level, None);
        assert!(!preview.xp_ok);
    }

    #[test]
    fn test_level_curve_prorates_segments() {
        // level 0 from 0..ACC, level 1 from ACC..2ACC, level 2 from 2ACC..acc
        let snapshots = [0, ACC_SCALE, 2 * ACC_SCALE];
        let earned = level_curve_earned(10_000, &snapshots, 3 * ACC_SCALE).unwrap();
        assert_eq!(earned, 10_000 + 10_000 + 10_160);

        // accumulator still inside level 1
        let earned = level_curve_earned(10_000, &snapshots, ACC_SCALE + ACC_SCALE / 2).unwrap();
        assert_eq!(earned, 10_000 + 5_000);
    }

    #[test]
    fn test_level_curve_matches_flat_when_single_level() {
        let acc = 7 * ACC_SCALE / 3;
        let curve = level_curve_earned(4_321, &[0], acc).unwrap();
        let flat = mul_div_u128(4_321, acc, ACC_SCALE, "flat").unwrap();
        assert_eq!(curve, flat);
    }
}
