//! Mining reward accumulator replica
//!
//! The ledger keeps a global `acc_mind_per_hp` that grows by
//! `emission * dt * ACC_SCALE / network_capacity` and a per-position reward
//! debt. Pending reward is `capacity * acc / ACC_SCALE - debt`. Everything
//! here projects those values forward without touching the snapshot.

use crate::error::{MirrorError, MirrorResult};
use crate::levels::{effective_position_capacity, level_curve_earned};
use crate::math::*;
use mind_codec::{MinerPosition, MiningConfig, MiningProfile, HP_SCALE};
use serde::Serialize;

pub const BADGE_BONUS_CAP_BPS: u16 = 2_000;

/// Share of a contract purchase routed to the staking reward vault.
pub const STAKING_SHARE_BPS: u64 = 3_000;

/// Accumulator value as of a projection instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccumulatorProjection {
    pub acc: u128,
    /// Seconds accrued past the snapshot's `last_update_ts`.
    pub elapsed: u64,
    pub as_of: i64,
}

/// Project the mining accumulator to `now`
pub fn project_accumulator(cfg: &MiningConfig, now: i64) -> MirrorResult<AccumulatorProjection> {
    if now <= cfg.last_update_ts {
        return Ok(AccumulatorProjection {
            acc: cfg.acc_mind_per_hp,
            elapsed: 0,
            as_of: cfg.last_update_ts,
        });
    }
    let elapsed = elapsed_secs(cfg.last_update_ts, now);
    if cfg.network_hp_active == 0 {
        // nobody mining: time passes, nothing accrues
        return Ok(AccumulatorProjection {
            acc: cfg.acc_mind_per_hp,
            elapsed,
            as_of: now,
        });
    }
    let minted = mul_u128(cfg.emission_per_sec as u128, elapsed as u128, "emission")?;
    let delta = mul_div_u128(
        minted,
        ACC_SCALE,
        cfg.network_hp_active as u128,
        "accumulator delta",
    )?;
    Ok(AccumulatorProjection {
        acc: add_u128(cfg.acc_mind_per_hp, delta, "accumulator")?,
        elapsed,
        as_of: now,
    })
}

/// `capacity * acc / ACC_SCALE`
pub fn earned(capacity: u64, acc: u128) -> MirrorResult<u128> {
    mul_div_u128(capacity as u128, acc, ACC_SCALE, "earned")
}

/// Earned minus debt, never negative
pub fn pending_reward(capacity: u64, acc: u128, debt: u128) -> MirrorResult<u128> {
    Ok(earned(capacity, acc)?.saturating_sub(debt))
}

/// `base * (10_000 + min(bonus, cap)) / 10_000`
pub fn apply_capped_bonus(base: u128, bonus_bps: u16, cap_bps: u16) -> MirrorResult<u128> {
    let bonus = bonus_bps.min(cap_bps) as u64;
    apply_bps(base, BPS_DENOMINATOR + bonus, "bonus")
}

/// Pending MIND for one position at `now`
pub fn position_pending(
    cfg: &MiningConfig,
    position: &MinerPosition,
    profile: Option<&MiningProfile>,
    now: i64,
) -> MirrorResult<u128> {
    let projection = project_accumulator(cfg, now)?;
    position_pending_at(cfg, &projection, position, profile, now)
}

/// Pending MIND for one position against an already computed projection.
///
/// Callers pricing several positions share one projection so that all of
/// them observe the same accumulator.
pub fn position_pending_at(
    cfg: &MiningConfig,
    projection: &AccumulatorProjection,
    position: &MinerPosition,
    profile: Option<&MiningProfile>,
    now: i64,
) -> MirrorResult<u128> {
    if position.deactivated {
        // stored hp was rewritten to effective hp when the position closed
        return pending_reward(
            position.hp_canonical,
            position.final_acc_mind_per_hp,
            position.reward_debt,
        );
    }

    if position.is_past_end(now) {
        let final_acc = if cfg.last_update_ts < position.end_ts {
            project_accumulator(cfg, position.end_ts)?.acc
        } else {
            cfg.acc_mind_per_hp
        };
        let capacity = effective_position_capacity(cfg, position, profile, now)?;
        return pending_reward(capacity, final_acc, position.reward_debt);
    }

    if let Some(profile) = profile.filter(|p| p.has_level_curve()) {
        let earned = level_curve_earned(
            position.hp_canonical,
            &profile.level_snapshots,
            projection.acc,
        )?;
        return Ok(earned.saturating_sub(position.reward_debt));
    }

    let capacity = effective_position_capacity(cfg, position, profile, now)?;
    pending_reward(capacity, projection.acc, position.reward_debt)
}

/// Capacity a wallet may earn on: `min(capacity, total * cap_bps / 10_000)`
pub fn wallet_capped_capacity(capacity: u64, total: u64, cap_bps: u16) -> MirrorResult<u64> {
    let bound = to_u64(apply_bps(total as u128, cap_bps as u64, "wallet cap")?, "wallet cap")?;
    Ok(capacity.min(bound))
}

/// Emission a wallet receives under the cap; the excess is never minted
pub fn capped_emission_share(
    emission: u64,
    capacity: u64,
    total: u64,
    cap_bps: u16,
) -> MirrorResult<u64> {
    if total == 0 {
        return Ok(0);
    }
    let capped = wallet_capped_capacity(capacity, total, cap_bps)?;
    let share = mul_div_u128(emission as u128, capped as u128, total as u128, "emission share")?;
    to_u64(share, "emission share")
}

/// Rig contract offered by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContractTerms {
    pub duration_days: u64,
    /// Canonical centi-HP.
    pub capacity: u64,
    pub cost: u64,
}

/// Terms for a contract type, `None` for unknown types
pub fn contract_terms(contract_type: u8) -> Option<ContractTerms> {
    const XNT_BASE: u64 = 1_000_000_000;
    let (duration_days, hp, cost) = match contract_type {
        0 => (7, 1, XNT_BASE),
        1 => (14, 5, 10 * XNT_BASE),
        2 => (28, 7, 20 * XNT_BASE),
        _ => return None,
    };
    Some(ContractTerms {
        duration_days,
        capacity: hp * HP_SCALE,
        cost,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurchasePreview {
    pub terms: ContractTerms,
    pub end_ts: i64,
    pub staking_share: u64,
    pub treasury_share: u64,
    /// Buying would push the wallet past `max_effective_hp`.
    pub exceeds_max_capacity: bool,
}

/// What buying `contract_type` at `now` would do for `profile`; `None` for unknown types
pub fn purchase_preview(
    cfg: &MiningConfig,
    profile: &MiningProfile,
    contract_type: u8,
    now: i64,
) -> MirrorResult<Option<PurchasePreview>> {
    let Some(terms) = contract_terms(contract_type) else {
        return Ok(None);
    };
    let duration = terms
        .duration_days
        .checked_mul(cfg.cycle_seconds())
        .and_then(|secs| i64::try_from(secs).ok())
        .ok_or(MirrorError::ArithmeticOverflow("contract duration"))?;
    let end_ts = now
        .checked_add(duration)
        .ok_or(MirrorError::ArithmeticOverflow("contract end"))?;
    let staking_share = to_u64(
        apply_bps(terms.cost as u128, STAKING_SHARE_BPS, "staking share")?,
        "staking share",
    )?;
    let new_total = profile
        .active_hp_canonical
        .checked_add(terms.capacity)
        .ok_or(MirrorError::ArithmeticOverflow("active capacity"))?;
    let max_canonical = cfg.max_effective_hp.saturating_mul(HP_SCALE);
    Ok(Some(PurchasePreview {
        terms,
        end_ts,
        staking_share,
        treasury_share: terms.cost - staking_share,
        exceeds_max_capacity: new_total > max_canonical,
    }))
}
