//! XNT staking accumulator replica

use crate::error::{MirrorError, MirrorResult};
use crate::math::*;
use crate::rewards::{apply_capped_bonus, BADGE_BONUS_CAP_BPS};
use mind_codec::{MiningConfig, MiningProfile, UserStake};
use serde::Serialize;

pub const UNSTAKE_BURN_BPS: u64 = 300;

/// Slack added on top of the bonus ceiling, in XNT base units.
pub const DEFAULT_BONUS_EPSILON: u64 = 1_000_000;

/// Payout may exceed base by at most this factor (badge cap plus the base).
pub const BONUS_CEILING_BPS: u64 = BPS_DENOMINATOR + BADGE_BONUS_CAP_BPS as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StakingProjection {
    pub acc: u128,
    pub elapsed: u64,
    pub as_of: i64,
}

/// Project the staking accumulator to `now`, stopping at the epoch end
pub fn project_staking_accumulator(cfg: &MiningConfig, now: i64) -> MirrorResult<StakingProjection> {
    let s = &cfg.staking;
    let unchanged = StakingProjection {
        acc: s.acc_xnt_per_mind,
        elapsed: 0,
        as_of: s.last_update_ts,
    };
    if now <= s.last_update_ts {
        return Ok(unchanged);
    }
    if s.reward_rate_xnt_per_sec == 0 || s.total_staked_mind == 0 {
        // clock moves, nothing accrues
        return Ok(StakingProjection { as_of: now, ..unchanged });
    }
    let effective_end = now.min(s.epoch_end_ts);
    let elapsed = elapsed_secs(s.last_update_ts, effective_end);
    if elapsed == 0 {
        return Ok(unchanged);
    }
    let mintable = mul_u128(elapsed as u128, s.reward_rate_xnt_per_sec as u128, "staking emission")?;
    let delta = mul_div_u128(
        mintable,
        ACC_SCALE,
        s.total_staked_mind as u128,
        "staking delta",
    )?;
    Ok(StakingProjection {
        acc: add_u128(s.acc_xnt_per_mind, delta, "staking accumulator")?,
        elapsed,
        as_of: effective_end,
    })
}

/// Earned minus debt plus already-owed rewards
pub fn stake_pending_at(projection: &StakingProjection, stake: &UserStake) -> MirrorResult<u128> {
    let earned = mul_div_u128(stake.staked_mind as u128, projection.acc, ACC_SCALE, "stake earned")?;
    add_u128(
        earned.saturating_sub(stake.reward_debt),
        stake.reward_owed as u128,
        "stake pending",
    )
}

pub fn stake_pending(cfg: &MiningConfig, stake: &UserStake, now: i64) -> MirrorResult<u128> {
    let projection = project_staking_accumulator(cfg, now)?;
    stake_pending_at(&projection, stake)
}

/// `min(raw, base * 1.2 + epsilon)`
pub fn bonus_ceiling(raw: u128, base: u128, epsilon: u64) -> MirrorResult<u128> {
    let ceiling = add_u128(
        apply_bps(base, BONUS_CEILING_BPS, "bonus ceiling")?,
        epsilon as u128,
        "bonus ceiling",
    )?;
    Ok(raw.min(ceiling))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StakingClaimEstimate {
    pub base: u128,
    pub bonus_bps: u16,
    pub payout: u64,
}

/// What `claim_xnt` would pay at `now`
pub fn staking_claim_estimate_at(
    projection: &StakingProjection,
    stake: &UserStake,
    profile: Option<&MiningProfile>,
    bonus_epsilon: u64,
) -> MirrorResult<StakingClaimEstimate> {
    let base = stake_pending_at(projection, stake)?;
    let bonus_bps = profile
        .map_or(0, |p| p.badge_bonus_bps)
        .min(BADGE_BONUS_CAP_BPS);
    let raw = apply_capped_bonus(base, bonus_bps, BADGE_BONUS_CAP_BPS)?;
    let payout = bonus_ceiling(raw, base, bonus_epsilon)?;
    Ok(StakingClaimEstimate {
        base,
        bonus_bps,
        payout: to_u64(payout, "staking payout")?,
    })
}

pub fn staking_claim_estimate(
    cfg: &MiningConfig,
    stake: &UserStake,
    profile: Option<&MiningProfile>,
    now: i64,
    bonus_epsilon: u64,
) -> MirrorResult<StakingClaimEstimate> {
    let projection = project_staking_accumulator(cfg, now)?;
    staking_claim_estimate_at(&projection, stake, profile, bonus_epsilon)
}

/// XNT released between `last_update` and `min(now, epoch_end)` at `rate`
pub fn smoothed_emission(rate: u64, last_update: i64, epoch_end: i64, now: i64) -> MirrorResult<u128> {
    let elapsed = elapsed_secs(last_update, now.min(epoch_end));
    mul_u128(rate as u128, elapsed as u128, "smoothed emission")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EpochRollPreview {
    pub reward_rate_xnt_per_sec: u64,
    pub epoch_end_ts: i64,
    pub undistributed_xnt: u64,
    pub accounted_balance: u64,
    /// XNT committed to the new epoch.
    pub distributed: u64,
}

/// Staking state after an epoch roll at `now`
pub fn preview_roll_epoch(
    cfg: &MiningConfig,
    vault_available: u64,
    epoch_seconds: u64,
    now: i64,
) -> MirrorResult<EpochRollPreview> {
    if epoch_seconds == 0 {
        return Err(MirrorError::InvalidArgument("epoch_seconds"));
    }
    let s = &cfg.staking;
    let mut undistributed = s.undistributed_xnt;
    let mut accounted = s.accounted_balance;
    if vault_available > accounted {
        undistributed = undistributed
            .checked_add(vault_available - accounted)
            .ok_or(MirrorError::ArithmeticOverflow("undistributed"))?;
        accounted = vault_available;
    }

    let rate = if s.total_staked_mind == 0 || undistributed == 0 {
        0
    } else {
        undistributed / epoch_seconds
    };
    if rate == 0 {
        return Ok(EpochRollPreview {
            reward_rate_xnt_per_sec: 0,
            epoch_end_ts: now,
            undistributed_xnt: undistributed,
            accounted_balance: accounted,
            distributed: 0,
        });
    }

    let distributed = rate
        .checked_mul(epoch_seconds)
        .ok_or(MirrorError::ArithmeticOverflow("distributed"))?;
    let epoch_end_ts = i64::try_from(epoch_seconds)
        .ok()
        .and_then(|secs| now.checked_add(secs))
        .ok_or(MirrorError::ArithmeticOverflow("epoch end"))?;
    Ok(EpochRollPreview {
        reward_rate_xnt_per_sec: rate,
        epoch_end_ts,
        undistributed_xnt: undistributed - distributed,
        accounted_balance: accounted,
        distributed,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnstakePreview {
    pub burned: u64,
    pub returned: u64,
}

/// 3% of an unstake is burned, the rest returned
pub fn unstake_preview(amount: u64) -> MirrorResult<UnstakePreview> {
    let burned = to_u64(apply_bps(amount as u128, UNSTAKE_BURN_BPS, "unstake burn")?, "unstake burn")?;
    Ok(UnstakePreview {
        burned,
        returned: amount - burned,
    })
}
