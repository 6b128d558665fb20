//! Burn-round ("melt") state machine replica
//!
//! The ledger moves a round through `Planned -> Active -> Finalized`. The
//! mirror adds a derived `Ended` phase: an active round whose window has
//! passed but that nobody has finalized yet.

use crate::error::{MirrorError, MirrorResult};
use crate::math::*;
use mind_codec::{MeltConfig, MeltRound, MeltUserRound, RoundStatus};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundPhase {
    /// No round running; the vial is filling.
    Charging,
    Active,
    /// Window closed, finalize still pending.
    Ended,
    Finalized,
}

pub fn classify_phase(cfg: &MeltConfig, round: Option<&MeltRound>, now: i64) -> RoundPhase {
    let Some(round) = round else {
        return if cfg.active_round_active {
            RoundPhase::Active
        } else {
            RoundPhase::Charging
        };
    };
    match round.status {
        RoundStatus::Planned => RoundPhase::Charging,
        RoundStatus::Finalized => RoundPhase::Finalized,
        RoundStatus::Active if now > round.end_ts => RoundPhase::Ended,
        RoundStatus::Active => RoundPhase::Active,
    }
}

/// Sequence number of the running round, else of the last one started
pub fn latest_round_seq(cfg: &MeltConfig) -> Option<u64> {
    if cfg.active_round_active {
        Some(cfg.active_round_seq)
    } else {
        cfg.round_seq.checked_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ContributionSplit {
    /// Part of the contribution that completes the current vial.
    pub fills_current: u64,
    /// Part left in the vial for the next round.
    pub seeds_next: u64,
    pub starts_round: bool,
    pub locked_pot: u64,
    pub locked_payout: u64,
}

/// Locked pot and payout for a round starting from this config
pub fn round_terms(cfg: &MeltConfig) -> MirrorResult<(u64, u64)> {
    let pot = cfg
        .vault_cap
        .checked_add(cfg.bonus_pool)
        .ok_or(MirrorError::ArithmeticOverflow("round pot"))?;
    let pay_bps = BPS_DENOMINATOR
        .checked_sub(cfg.rollover_bps as u64)
        .ok_or(MirrorError::ArithmeticOverflow("rollover bps"))?;
    let v_pay = to_u64(apply_bps(pot as u128, pay_bps, "round payout")?, "round payout")?;
    Ok((pot, v_pay))
}

/// How a funding contribution of `amount` lands in the vial.
///
/// At most one round starts per contribution; anything past the cap stays in
/// the vial for the round after.
pub fn split_contribution(cfg: &MeltConfig, amount: u64) -> MirrorResult<ContributionSplit> {
    if cfg.active_round_active {
        return Ok(ContributionSplit {
            fills_current: amount,
            ..ContributionSplit::default()
        });
    }
    let vial = add_u128(cfg.vial as u128, amount as u128, "vial")?;
    let vial = to_u64(vial, "vial")?;
    if vial < cfg.vault_cap {
        return Ok(ContributionSplit {
            fills_current: amount,
            ..ContributionSplit::default()
        });
    }
    let (locked_pot, locked_payout) = round_terms(cfg)?;
    let fills_current = cfg.vault_cap.saturating_sub(cfg.vial).min(amount);
    Ok(ContributionSplit {
        fills_current,
        seeds_next: amount - fills_current,
        starts_round: true,
        locked_pot,
        locked_payout,
    })
}

/// Rollover returned to the bonus pool when `round` finalizes
pub fn finalize_preview(round: &MeltRound) -> MirrorResult<u64> {
    round
        .v_round
        .checked_sub(round.v_pay)
        .ok_or(MirrorError::ArithmeticOverflow("round rollover"))
}

/// Pro-rata share of `v_pay` for `burned`; zero when nothing was burned.
pub fn payout(round: &MeltRound, burned: u64) -> MirrorResult<u64> {
    if round.total_burn == 0 || round.v_pay == 0 {
        return Ok(0);
    }
    let share = mul_div_u128(
        round.v_pay as u128,
        burned as u128,
        round.total_burn as u128,
        "melt payout",
    )?;
    to_u64(share, "melt payout")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClaimPrediction {
    AlreadyClaimed,
    NothingBurned,
    RoundOpen,
    Claimable { amount: u64, needs_finalize: bool },
}

pub fn predict_claim(
    round: &MeltRound,
    user_round: &MeltUserRound,
    now: i64,
) -> MirrorResult<ClaimPrediction> {
    let needs_finalize = match round.status {
        RoundStatus::Finalized => false,
        RoundStatus::Active if now > round.end_ts => true,
        _ => return Ok(ClaimPrediction::RoundOpen),
    };
    if user_round.claimed {
        return Ok(ClaimPrediction::AlreadyClaimed);
    }
    if user_round.burned == 0 {
        return Ok(ClaimPrediction::NothingBurned);
    }
    Ok(ClaimPrediction::Claimable {
        amount: payout(round, user_round.burned)?,
        needs_finalize,
    })
}

pub fn burn_window_open(round: &MeltRound, now: i64) -> bool {
    round.status == RoundStatus::Active && round.start_ts <= now && now <= round.end_ts
}

pub fn meets_burn_min(cfg: &MeltConfig, amount: u64) -> bool {
    amount > 0 && (cfg.burn_min == 0 || amount >= cfg.burn_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use solana_sdk::pubkey::Pubkey;

    fn config(vault_cap: u64, vial: u64) -> MeltConfig {
        MeltConfig {
            vault_cap,
            vial,
            rollover_bps: 2_000,
            round_window_sec: 3_600,
            ..MeltConfig::default()
        }
    }

    fn active_round(v_pay: u64, total_burn: u64) -> MeltRound {
        MeltRound {
            seq: 1,
            start_ts: 1_000,
            end_ts: 4_600,
            v_round: v_pay + 5,
            v_pay,
            total_burn,
            status: RoundStatus::Active,
            bump: 255,
        }
    }

    fn user_round(burned: u64) -> MeltUserRound {
        MeltUserRound {
            user: Pubkey::new_unique(),
            round: Pubkey::new_unique(),
            burned,
            ..MeltUserRound::default()
        }
    }

    #[test]
    fn test_contribution_overflowing_cap_seeds_next_round() {
        let split = split_contribution(&config(10, 8), 5).unwrap();
        assert_eq!(split.fills_current, 2);
        assert_eq!(split.seeds_next, 3);
        assert!(split.starts_round);
        assert_eq!(split.locked_pot, 10);
        assert_eq!(split.locked_payout, 8);
    }

    #[test]
    fn test_contribution_below_cap_only_fills() {
        let split = split_contribution(&config(10, 2), 5).unwrap();
        assert_eq!(split.fills_current, 5);
        assert_eq!(split.seeds_next, 0);
        assert!(!split.starts_round);
    }

    #[test]
    fn test_contribution_during_active_round_accumulates() {
        let mut cfg = config(10, 8);
        cfg.active_round_active = true;
        let split = split_contribution(&cfg, 50).unwrap();
        assert_eq!(split.fills_current, 50);
        assert!(!split.starts_round);
    }

    #[test]
    fn test_locked_pot_includes_bonus_pool() {
        let mut cfg = config(1_000, 1_000);
        cfg.bonus_pool = 200;
        assert_eq!(round_terms(&cfg).unwrap(), (1_200, 960));
    }

    #[test]
    fn test_rollover_bps_over_denominator_is_error() {
        let mut cfg = config(10, 10);
        cfg.rollover_bps = 10_001;
        assert_eq!(
            split_contribution(&cfg, 1),
            Err(MirrorError::ArithmeticOverflow("rollover bps"))
        );
    }

    #[test]
    fn test_classify_phase() {
        let cfg = config(10, 0);
        let mut round = active_round(8, 0);
        assert_eq!(classify_phase(&cfg, None, 0), RoundPhase::Charging);
        assert_eq!(classify_phase(&cfg, Some(&round), 4_600), RoundPhase::Active);
        assert_eq!(classify_phase(&cfg, Some(&round), 4_601), RoundPhase::Ended);
        round.status = RoundStatus::Finalized;
        assert_eq!(classify_phase(&cfg, Some(&round), 0), RoundPhase::Finalized);

        let mut busy = cfg.clone();
        busy.active_round_active = true;
        assert_eq!(classify_phase(&busy, None, 0), RoundPhase::Active);
    }

    #[test]
    fn test_latest_round_seq() {
        let mut cfg = config(10, 0);
        assert_eq!(latest_round_seq(&cfg), None);
        cfg.round_seq = 3;
        assert_eq!(latest_round_seq(&cfg), Some(2));
        cfg.active_round_active = true;
        cfg.active_round_seq = 2;
        assert_eq!(latest_round_seq(&cfg), Some(2));
    }

    #[test]
    fn test_finalize_preview_is_pot_minus_payout() {
        assert_eq!(finalize_preview(&active_round(8, 0)).unwrap(), 5);
    }

    #[test]
    fn test_payout_zero_when_nobody_burned() {
        assert_eq!(payout(&active_round(1_000, 0), 10).unwrap(), 0);
    }

    #[test]
    fn test_predict_claim_on_ended_round_needs_finalize() {
        let round = active_round(900, 300);
        assert_eq!(
            predict_claim(&round, &user_round(100), 5_000).unwrap(),
            ClaimPrediction::Claimable {
                amount: 300,
                needs_finalize: true
            }
        );
        assert_eq!(
            predict_claim(&round, &user_round(100), 4_000).unwrap(),
            ClaimPrediction::RoundOpen
        );
    }

    #[test]
    fn test_predict_claim_rejections() {
        let mut round = active_round(900, 300);
        round.status = RoundStatus::Finalized;
        let mut claimed = user_round(100);
        claimed.claimed = true;
        assert_eq!(
            predict_claim(&round, &claimed, 0).unwrap(),
            ClaimPrediction::AlreadyClaimed
        );
        assert_eq!(
            predict_claim(&round, &user_round(0), 0).unwrap(),
            ClaimPrediction::NothingBurned
        );
    }

    #[test]
    fn test_burn_window_and_minimum() {
        let round = active_round(1, 0);
        assert!(!burn_window_open(&round, 999));
        assert!(burn_window_open(&round, 1_000));
        assert!(burn_window_open(&round, 4_600));
        assert!(!burn_window_open(&round, 4_601));

        let mut cfg = config(10, 0);
        assert!(meets_burn_min(&cfg, 1));
        assert!(!meets_burn_min(&cfg, 0));
        cfg.burn_min = 500;
        assert!(!meets_burn_min(&cfg, 499));
        assert!(meets_burn_min(&cfg, 500));
    }

    proptest! {
        #[test]
        fn test_payout_conservation(
            v_pay in 0u64..=1_000_000_000_000,
            burns in prop::collection::vec(1u64..=1_000_000_000_000, 1..20),
        ) {
            let total_burn: u64 = burns.iter().sum();
            let round = MeltRound { v_pay, v_round: v_pay, total_burn, ..active_round(0, 0) };
            let paid: u64 = burns.iter().map(|b| payout(&round, *b).unwrap()).sum();
            prop_assert!(paid <= v_pay);
            prop_assert!(v_pay - paid <= burns.len() as u64);
        }
    }
}
