//! MIND Mirror Integration Tests
//!
//! Scenarios run the codec and model crates together against account bytes
//! and event logs shaped like the ledger's. [`MeltLedger`] plays the burn-round
//! program forward so the mirror's predictions can be checked against the
//! state it would actually reach.

use mind_codec::{MeltConfig, MeltEvent, MeltRound, RoundStatus};
use mind_model::melt::{burn_window_open, finalize_preview, meets_burn_min, split_contribution};
use mind_model::{ContributionSplit, MirrorError, MirrorResult};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

/// One ledger transaction: signature and log lines
pub type LoggedTx = (String, Vec<String>);

pub struct MeltLedger {
    pub program: Pubkey,
    pub config: MeltConfig,
    pub rounds: Vec<MeltRound>,
    /// Per round sequence, burned amount per user.
    pub burns: HashMap<u64, HashMap<Pubkey, u64>>,
    pub txs: Vec<LoggedTx>,
}

impl MeltLedger {
    pub fn new(config: MeltConfig) -> Self {
        Self {
            program: Pubkey::new_unique(),
            config,
            rounds: Vec::new(),
            burns: HashMap::new(),
            txs: Vec::new(),
        }
    }

    pub fn round_address(&self, seq: u64) -> Pubkey {
        Pubkey::find_program_address(&[b"melt_round".as_ref(), &seq.to_le_bytes()], &self.program).0
    }

    pub fn active_round(&self) -> Option<&MeltRound> {
        if !self.config.active_round_active {
            return None;
        }
        self.rounds
            .iter()
            .find(|r| r.seq == self.config.active_round_seq)
    }

    fn log(&mut self, events: Vec<MeltEvent>) {
        let signature = format!("tx{}", self.txs.len());
        let lines = events.iter().map(MeltEvent::to_log_line).collect();
        self.txs.push((signature, lines));
    }

    fn try_start_round(&mut self, now: i64) -> MirrorResult<Option<MeltEvent>> {
        let cfg = &mut self.config;
        if cfg.active_round_active || cfg.vial < cfg.vault_cap {
            return Ok(None);
        }
        let (pot, v_pay) = mind_model::melt::round_terms(cfg)?;
        let end_ts = now
            .checked_add(cfg.next_window_sec() as i64)
            .ok_or(MirrorError::ArithmeticOverflow("round end"))?;
        let seq = cfg.round_seq;
        cfg.vial -= cfg.vault_cap;
        cfg.bonus_pool = 0;
        cfg.active_round_seq = seq;
        cfg.active_round_active = true;
        cfg.round_seq += 1;
        cfg.pending_window_sec = 0;
        self.rounds.push(MeltRound {
            seq,
            start_ts: now,
            end_ts,
            v_round: pot,
            v_pay,
            total_burn: 0,
            status: RoundStatus::Active,
            bump: 255,
        });
        Ok(Some(MeltEvent::RoundStarted {
            seq,
            start_ts: now,
            end_ts,
            pot,
            v_pay,
        }))
    }

    /// Add to the vial; a full vial starts a round.
    pub fn fund(&mut self, amount: u64, now: i64) -> MirrorResult<ContributionSplit> {
        let split = split_contribution(&self.config, amount)?;
        self.config.vial = self
            .config
            .vial
            .checked_add(amount)
            .ok_or(MirrorError::ArithmeticOverflow("vial"))?;
        let mut events = vec![MeltEvent::FundingRecorded {
            amount,
            vial: self.config.vial,
        }];
        events.extend(self.try_start_round(now)?);
        self.log(events);
        Ok(split)
    }

    /// Burn into the active round. Returns `false` when the ledger would reject it.
    pub fn burn(&mut self, user: Pubkey, amount: u64, now: i64) -> bool {
        let Some(round) = self.active_round() else {
            return false;
        };
        if !burn_window_open(round, now) || !meets_burn_min(&self.config, amount) {
            return false;
        }
        let seq = round.seq;
        let address = self.round_address(seq);
        let Some(round) = self.rounds.iter_mut().find(|r| r.seq == seq) else {
            return false;
        };
        round.total_burn += amount;
        let total_burn = round.total_burn;
        *self.burns.entry(seq).or_default().entry(user).or_default() += amount;
        self.log(vec![MeltEvent::Burned {
            user,
            round: address,
            amount,
            total_burn,
        }]);
        true
    }

    /// Finalize an ended round and start the next one if the vial allows.
    pub fn finalize(&mut self, now: i64) -> MirrorResult<Option<u64>> {
        let seq = match self.active_round() {
            Some(round) if now > round.end_ts => round.seq,
            _ => return Ok(None),
        };
        let Some(round) = self.rounds.iter_mut().find(|r| r.seq == seq) else {
            return Ok(None);
        };
        let rollover = finalize_preview(round)?;
        round.status = RoundStatus::Finalized;
        self.config.bonus_pool = self
            .config
            .bonus_pool
            .checked_add(rollover)
            .ok_or(MirrorError::ArithmeticOverflow("bonus pool"))?;
        self.config.active_round_active = false;
        let mut events = vec![MeltEvent::Finalized { seq, rollover }];
        events.extend(self.try_start_round(now)?);
        self.log(events);
        Ok(Some(rollover))
    }

    pub fn burned(&self, seq: u64, user: &Pubkey) -> u64 {
        self.burns
            .get(&seq)
            .and_then(|m| m.get(user))
            .copied()
            .unwrap_or(0)
    }
}
