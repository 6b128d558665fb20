//! Invariant checking helpers
//!
//! Each check returns `bool` so callers can assert in tests or log a warning
//! when a live snapshot violates what the ledger guarantees.

use crate::leaderboard::{Completeness, Leaderboard};
use crate::melt::payout;
use crate::rewards::AccumulatorProjection;
use crate::staking::{StakingClaimEstimate, BONUS_CEILING_BPS};
use crate::math::BPS_DENOMINATOR;
use mind_codec::{MeltRound, MiningConfig};

/// Accumulator never moves backwards between two projections
pub fn accumulator_monotone(before: &AccumulatorProjection, after: &AccumulatorProjection) -> bool {
    after.as_of < before.as_of || after.acc >= before.acc
}

/// A projection never starts below the snapshot it was taken from
pub fn projection_not_behind(cfg: &MiningConfig, projection: &AccumulatorProjection) -> bool {
    projection.acc >= cfg.acc_mind_per_hp && projection.as_of >= cfg.last_update_ts
}

/// Pro-rata payouts never exceed `v_pay` and lose at most one unit per burner
pub fn payout_conserved(round: &MeltRound, burns: &[u64]) -> bool {
    let mut paid: u128 = 0;
    for burned in burns {
        match payout(round, *burned) {
            Ok(amount) => paid += amount as u128,
            Err(_) => return false,
        }
    }
    let v_pay = round.v_pay as u128;
    let burned_total: u128 = burns.iter().map(|b| *b as u128).sum();
    if burned_total != round.total_burn as u128 || round.total_burn == 0 {
        return paid <= v_pay;
    }
    paid <= v_pay && v_pay - paid <= burns.len() as u128
}

/// Rollover can only be taken from the locked pot
pub fn round_pot_covers_payout(round: &MeltRound) -> bool {
    round.v_pay <= round.v_round
}

/// Capped capacity stays within `total * cap_bps / 10_000`
pub fn wallet_cap_respected(capped: u64, total: u64, cap_bps: u16) -> bool {
    (capped as u128) * (BPS_DENOMINATOR as u128) <= (total as u128) * (cap_bps as u128)
}

/// Staking payout stays under `base * 1.2 + epsilon`
pub fn claim_within_ceiling(estimate: &StakingClaimEstimate, epsilon: u64) -> bool {
    let ceiling = estimate.base * BONUS_CEILING_BPS as u128 / BPS_DENOMINATOR as u128;
    (estimate.payout as u128) <= ceiling.saturating_add(epsilon as u128)
}

/// Replayed burns never exceed what the round recorded
pub fn leaderboard_consistent(board: &Leaderboard, round: &MeltRound) -> bool {
    !matches!(board.completeness(round), Completeness::Inconsistent { .. })
}
