//! End-to-end mirror scenarios
//!
//! Account bytes go through the codec, then the model; burn rounds are played
//! forward on a simulated ledger and replayed from its logs.

use mind_codec::fixtures::{
    encode_config, encode_melt_config, encode_melt_round, encode_position, encode_profile,
    encode_stake,
};
use mind_codec::{
    decode, decode_batch, decode_config, decode_melt_config, decode_melt_round, decode_position,
    decode_profile, decode_stake, parse_logs, AccountKind, Capacity, DecodeError, MeltConfig,
    MinerPosition, MiningConfig, MiningProfile, PositionVersion, ProfileVersion, StakingState,
    TypedRecord, UserStake,
};
use mind_integration_tests::MeltLedger;
use mind_model::helpers::{claim_within_ceiling, leaderboard_consistent, payout_conserved};
use mind_model::melt::{classify_phase, payout, predict_claim};
use mind_model::rewards::{position_pending, project_accumulator};
use mind_model::staking::{preview_roll_epoch, staking_claim_estimate, DEFAULT_BONUS_EPSILON};
use mind_model::{ClaimPrediction, Completeness, Leaderboard, RoundPhase};
use proptest::prelude::*;
use solana_sdk::pubkey::Pubkey;

const T0: i64 = 1_700_000_000;
const EMISSION: u64 = 1_000_000_000;

fn mining_config() -> MiningConfig {
    MiningConfig {
        emission_per_sec: EMISSION,
        last_update_ts: T0,
        network_hp_active: 100,
        seconds_per_day: 86_400,
        wallet_cap_bps: 10_000,
        ..MiningConfig::default()
    }
}

fn position(hp: Capacity, version: PositionVersion) -> MinerPosition {
    MinerPosition {
        version,
        owner: Pubkey::new_unique(),
        hp,
        hp_scaled: hp.is_scaled(),
        start_ts: T0 - 3_600,
        end_ts: T0 + 86_400 * 7,
        ..MinerPosition::default()
    }
}

/// Emission 1e9/s over one unit of capacity for 1 200 s, through account bytes
#[test]
fn test_emission_scenario_through_account_bytes() {
    let cfg = decode_config(&encode_config(&mining_config())).unwrap();
    let projection = project_accumulator(&cfg, T0 + 1_200).unwrap();
    assert_eq!(
        projection.acc,
        1_000_000_000u128 * 1_200 * 1_000_000_000_000_000_000 / 100
    );

    // the three capacity encodings of one HP price identically; the marked one
    // was closed at the projected accumulator
    for (hp, version) in [
        (Capacity::Scaled(100), PositionVersion::V3),
        (Capacity::UnscaledFlagged(1), PositionVersion::V2),
        (Capacity::UnscaledMarked(1), PositionVersion::V1),
    ] {
        let mut p = position(hp, version);
        if let Capacity::UnscaledMarked(_) = hp {
            p.deactivated = true;
            p.final_acc_mind_per_hp = projection.acc;
        }
        let decoded = decode_position(&encode_position(&p)).unwrap();
        assert_eq!(decoded.hp_canonical, 100, "{:?}", hp);
        let pending = position_pending(&cfg, &decoded, None, T0 + 1_200).unwrap();
        assert_eq!(pending, 1_000_000_000 * 1_200, "{:?}", hp);
    }
}

#[test]
fn test_batch_decode_reports_per_account_failures() {
    let profile = MiningProfile {
        version: ProfileVersion::V1,
        owner: Pubkey::new_unique(),
        active_hp: Capacity::UnscaledFlagged(2),
        ..MiningProfile::default()
    };
    let good = encode_profile(&profile);
    let mut wrong_tag = good.clone();
    wrong_tag[..8].copy_from_slice(&[0; 8]);
    let truncated = good[..40].to_vec();

    let results = decode_batch(
        AccountKind::Profile,
        vec![("good", good), ("wrong_tag", wrong_tag), ("short", truncated)],
    );
    assert_eq!(results.len(), 3);
    match &results[0] {
        ("good", Ok(TypedRecord::Profile(p))) => assert_eq!(p.active_hp_canonical, 200),
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(
        results[1].1,
        Err(DecodeError::UnknownDiscriminator { .. })
    ));
    assert!(matches!(results[2].1, Err(DecodeError::TooShort { .. })));

    let profile = decode_profile(&encode_profile(&profile)).unwrap();
    assert_eq!(profile.level, 0);
}

#[test]
fn test_staking_epoch_roll_then_claim() {
    let mut cfg = mining_config();
    cfg.staking = StakingState {
        last_update_ts: T0,
        epoch_end_ts: T0,
        total_staked_mind: 1_000_000,
        ..StakingState::default()
    };
    let roll = preview_roll_epoch(&cfg, 86_400_000, 86_400, T0).unwrap();
    assert_eq!(roll.reward_rate_xnt_per_sec, 1_000);
    assert_eq!(roll.distributed, 86_400_000);

    cfg.staking.reward_rate_xnt_per_sec = roll.reward_rate_xnt_per_sec;
    cfg.staking.epoch_end_ts = roll.epoch_end_ts;
    let cfg = decode_config(&encode_config(&cfg)).unwrap();

    let stake = UserStake {
        owner: Pubkey::new_unique(),
        staked_mind: 250_000,
        ..UserStake::default()
    };
    let stake = decode_stake(&encode_stake(&stake)).unwrap();
    let badge = MiningProfile {
        badge_bonus_bps: 5_000,
        ..MiningProfile::default()
    };

    // a quarter of the stake for the whole epoch, and past its end nothing more accrues
    let estimate = |now| {
        staking_claim_estimate(&cfg, &stake, Some(&badge), now, DEFAULT_BONUS_EPSILON).unwrap()
    };
    let at_end = estimate(T0 + 86_400);
    let after = estimate(T0 + 90_000);
    assert!(claim_within_ceiling(&at_end, DEFAULT_BONUS_EPSILON));
    assert_eq!(at_end.base, 21_600_000);
    assert_eq!(at_end, after);
    // badge bonus capped at 20 %
    assert_eq!(at_end.bonus_bps, 2_000);
    assert_eq!(at_end.payout, 25_920_000);
}

fn melt_config(vault_cap: u64, vial: u64) -> MeltConfig {
    MeltConfig {
        vault_cap,
        vial,
        rollover_bps: 1_000,
        round_window_sec: 3_600,
        ..MeltConfig::default()
    }
}

/// Vial cap 10 holding 8: a contribution of 5 fills 2 and seeds 3
#[test]
fn test_vial_overflow_seeds_next_round() {
    let decoded = decode_melt_config(&encode_melt_config(&melt_config(10, 8))).unwrap();
    let mut ledger = MeltLedger::new(decoded);
    let split = ledger.fund(5, T0).unwrap();
    assert_eq!((split.fills_current, split.seeds_next), (2, 3));
    assert!(split.starts_round);

    // the ledger agrees with the prediction
    assert_eq!(ledger.config.vial, 3);
    let round = ledger.active_round().unwrap();
    assert_eq!(round.v_round, split.locked_pot);
    assert_eq!(round.v_pay, split.locked_payout);
    assert_eq!(classify_phase(&ledger.config, Some(round), T0), RoundPhase::Active);
}

#[test]
fn test_round_lifecycle_and_leaderboard_replay() {
    let mut ledger = MeltLedger::new(melt_config(1_000_000, 0));
    let (alice, bob, carol) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());

    ledger.fund(1_000_000, T0).unwrap();
    assert!(ledger.burn(alice, 300, T0 + 10));
    assert!(ledger.burn(bob, 600, T0 + 20));
    assert!(ledger.burn(alice, 100, T0 + 30));
    // late burns bounce
    assert!(!ledger.burn(carol, 50, T0 + 3_601));

    let round_key = ledger.round_address(0);
    let round = ledger.active_round().unwrap().clone();
    assert_eq!(round.total_burn, 1_000);
    assert_eq!(classify_phase(&ledger.config, Some(&round), T0 + 3_601), RoundPhase::Ended);

    // rebuild the leaderboard from logs, with an overlapping second page
    let mut board = Leaderboard::new(round_key);
    for (sig, lines) in ledger.txs.iter().chain(ledger.txs.iter().skip(2)) {
        board.apply(sig, &parse_logs(lines)).unwrap();
    }
    let standings = board.standings();
    assert_eq!(standings[0].owner, bob);
    assert_eq!(standings[1].burned, 400);
    let on_ledger = decode_melt_round(&encode_melt_round(&round)).unwrap();
    assert_eq!(board.completeness(&on_ledger), Completeness::Complete);
    assert!(leaderboard_consistent(&board, &on_ledger));

    // a claim against the ended round finalizes it first
    let user_round = mind_codec::MeltUserRound {
        user: alice,
        round: round_key,
        burned: ledger.burned(0, &alice),
        ..Default::default()
    };
    let predicted = predict_claim(&round, &user_round, T0 + 3_601).unwrap();
    assert_eq!(
        predicted,
        ClaimPrediction::Claimable {
            amount: 360_000,
            needs_finalize: true
        }
    );

    let rollover = ledger.finalize(T0 + 3_601).unwrap();
    assert_eq!(rollover, Some(100_000));
    assert_eq!(ledger.config.bonus_pool, 100_000);
    let finalized = &ledger.rounds[0];
    assert_eq!(payout(finalized, ledger.burned(0, &alice)).unwrap(), 360_000);

    // rollover sweetens the next round's pot
    ledger.fund(1_000_000, T0 + 4_000).unwrap();
    let next = ledger.active_round().unwrap();
    assert_eq!(next.seq, 1);
    assert_eq!(next.v_round, 1_100_000);
    assert_eq!(next.v_pay, 990_000);
    assert_eq!(ledger.config.bonus_pool, 0);
}

#[test]
fn test_generic_decode_dispatch() {
    let bytes = encode_melt_config(&melt_config(10, 0));
    match decode(AccountKind::MeltConfig, &bytes).unwrap() {
        TypedRecord::MeltConfig(cfg) => assert_eq!(cfg.vault_cap, 10),
        other => panic!("unexpected {:?}", other.kind()),
    }
    assert!(decode(AccountKind::Stake, &bytes).is_err());
}

proptest! {
    /// Whatever the burn pattern, claims never pay out more than the round's payout
    #[test]
    fn test_replayed_payouts_conserve_round(burns in prop::collection::vec(1u64..1_000_000, 1..12)) {
        let mut ledger = MeltLedger::new(melt_config(5_000_000, 0));
        ledger.fund(5_000_000, T0).unwrap();
        let users: Vec<Pubkey> = burns.iter().map(|_| Pubkey::new_unique()).collect();
        for (i, (user, amount)) in users.iter().zip(&burns).enumerate() {
            prop_assert!(ledger.burn(*user, *amount, T0 + i as i64));
        }
        ledger.finalize(T0 + 3_601).unwrap();
        let round = &ledger.rounds[0];
        let paid: u64 = users
            .iter()
            .map(|u| payout(round, ledger.burned(0, u)).unwrap())
            .sum();
        prop_assert!(paid <= round.v_pay);
        prop_assert!(payout_conserved(round, &burns));
        prop_assert!(round.v_pay - paid <= users.len() as u64);
    }
}
