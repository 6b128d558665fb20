//! Burn leaderboard scanning
//!
//! Walks a round's signatures newest first, replays each transaction's melt
//! events into a [`Leaderboard`] and keeps a bounded top-burner ranking.

use crate::gateway::{is_valid_signature, LedgerGateway};
use mind_codec::{parse_logs, MeltEvent, MeltRound};
use mind_model::{Completeness, Leaderboard, Standing};
use priority_queue::PriorityQueue;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};

/// Worst entry sits on top: lowest amount, then highest owner.
type Rank = Reverse<(u64, Reverse<Pubkey>)>;

/// Top-N burners, updated as totals grow
pub struct TopBurners {
    capacity: usize,
    queue: PriorityQueue<Pubkey, Rank>,
}

impl TopBurners {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: PriorityQueue::new(),
        }
    }

    fn rank(owner: Pubkey, burned: u64) -> Rank {
        Reverse((burned, Reverse(owner)))
    }

    /// Offer an owner's new total. Totals only grow, so an evicted owner
    /// re-enters once it beats the current worst entry.
    pub fn offer(&mut self, owner: Pubkey, burned: u64) {
        if self.capacity == 0 {
            return;
        }
        let rank = Self::rank(owner, burned);
        if self.queue.get(&owner).is_some() {
            self.queue.change_priority(&owner, rank);
            return;
        }
        if self.queue.len() < self.capacity {
            self.queue.push(owner, rank);
            return;
        }
        let beats_worst = self
            .queue
            .peek()
            .is_some_and(|(_, worst)| rank < *worst);
        if beats_worst {
            self.queue.pop();
            self.queue.push(owner, rank);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Best first
    pub fn ranked(&self) -> Vec<Standing> {
        let mut rows: Vec<(Pubkey, u64)> = self
            .queue
            .iter()
            .map(|(owner, Reverse((burned, _)))| (*owner, *burned))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rows.into_iter()
            .enumerate()
            .map(|(i, (owner, burned))| Standing {
                rank: i + 1,
                owner,
                burned,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub round: Pubkey,
    /// Transactions applied during this pass.
    pub applied: usize,
    /// Pass stopped early; results are partial.
    pub stale: bool,
    pub total_burned: u64,
    pub completeness: Option<Completeness>,
    pub top: Vec<Standing>,
}

#[derive(Default)]
struct Sweep {
    /// Newest signature replayed.
    head: Option<String>,
    /// Oldest well-formed signature reached.
    before: Option<String>,
    applied: usize,
    interrupted: bool,
}

/// Resumable scan state for one round
pub struct RoundScan {
    board: Leaderboard,
    top: TopBurners,
    page_size: usize,
    /// Newest signature covered by a completed pass.
    boundary: Option<String>,
    /// Where an interrupted pass stopped.
    resume_before: Option<String>,
    /// Newest signature of the interrupted pass.
    pending_head: Option<String>,
}

impl RoundScan {
    pub fn new(round: Pubkey, page_size: usize, top_n: usize) -> Self {
        Self {
            board: Leaderboard::new(round),
            top: TopBurners::new(top_n),
            page_size: page_size.max(1),
            boundary: None,
            resume_before: None,
            pending_head: None,
        }
    }

    pub fn round(&self) -> &Pubkey {
        self.board.round()
    }

    pub fn board(&self) -> &Leaderboard {
        &self.board
    }

    pub fn cursor(&self) -> Option<&str> {
        self.resume_before.as_deref().or(self.boundary.as_deref())
    }

    /// One scan pass. Cancellation or a gateway error ends the pass early and
    /// marks the report stale; the next pass picks up where this one stopped.
    /// Finishing an interrupted pass is followed by a sweep of transactions
    /// that arrived in the meantime.
    pub fn scan<G: LedgerGateway>(
        &mut self,
        gateway: &G,
        round_account: Option<&MeltRound>,
        cancel: &AtomicBool,
    ) -> ScanReport {
        let round = *self.board.round();
        let mut applied = 0;
        let mut stale = false;

        loop {
            let resumed = self.resume_before.is_some();
            let sweep = self.sweep(gateway, self.resume_before.clone(), cancel);
            applied += sweep.applied;

            if sweep.interrupted {
                stale = true;
                self.resume_before = sweep.before;
                if self.pending_head.is_none() {
                    self.pending_head = sweep.head;
                }
                break;
            }

            // everything from the newest covered signature down is replayed
            if let Some(newest) = self.pending_head.take().or(sweep.head) {
                self.boundary = Some(newest);
            }
            self.resume_before = None;
            if !resumed {
                break;
            }
        }

        ScanReport {
            round,
            applied,
            stale,
            total_burned: self.board.total(),
            completeness: round_account.map(|r| self.board.completeness(r)),
            top: self.top.ranked(),
        }
    }

    /// Walk pages from `before` down to the boundary. The cursor only ever
    /// holds well-formed signatures.
    fn sweep<G: LedgerGateway>(
        &mut self,
        gateway: &G,
        mut before: Option<String>,
        cancel: &AtomicBool,
    ) -> Sweep {
        let round = *self.board.round();
        let mut sweep = Sweep::default();

        'pages: loop {
            if cancel.load(Ordering::Relaxed) {
                log::info!("Leaderboard scan for {} cancelled", round);
                sweep.interrupted = true;
                break;
            }
            let page = match gateway.get_signatures_for_address(
                &round,
                before.as_deref(),
                self.page_size,
            ) {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Signature page for {} failed: {:#}", round, e);
                    sweep.interrupted = true;
                    break;
                }
            };
            let page_len = page.len();
            let mut advanced = false;

            for signature in page {
                if self.boundary.as_deref() == Some(signature.as_str()) {
                    break 'pages;
                }
                if cancel.load(Ordering::Relaxed) {
                    sweep.interrupted = true;
                    break 'pages;
                }
                if !is_valid_signature(&signature) {
                    log::warn!("Skipping malformed signature {:?}", signature);
                    continue;
                }
                if !self.board.is_applied(&signature) {
                    match self.replay(gateway, &signature) {
                        Ok(true) => sweep.applied += 1,
                        Ok(false) => {}
                        Err(e) => {
                            log::warn!("Replay of {} failed: {:#}", signature, e);
                            sweep.interrupted = true;
                            break 'pages;
                        }
                    }
                }
                sweep.head.get_or_insert_with(|| signature.clone());
                before = Some(signature);
                advanced = true;
            }

            if page_len < self.page_size {
                break;
            }
            if !advanced {
                // the same page would come back forever
                log::warn!("No usable signature on a full page for {}", round);
                sweep.interrupted = true;
                break;
            }
        }

        sweep.before = before;
        sweep
    }

    fn replay<G: LedgerGateway>(&mut self, gateway: &G, signature: &str) -> anyhow::Result<bool> {
        let lines = gateway.get_transaction_logs(signature)?.unwrap_or_default();
        let events = parse_logs(&lines);
        let fresh = self.board.apply(signature, &events)?;
        if fresh {
            for event in &events {
                if let MeltEvent::Burned { user, round, .. } = event {
                    if round == self.board.round() {
                        self.top.offer(*user, self.board.burned_by(user));
                    }
                }
            }
        }
        Ok(fresh)
    }
}
