//! Per-round burn leaderboard rebuilt from event logs
//!
//! Transactions can be delivered more than once when scan pages overlap, so
//! every batch is keyed by its signature and applied at most once.

use crate::error::MirrorResult;
use crate::math::{add_u128, to_u64};
use mind_codec::{MeltEvent, MeltRound};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// 1-based.
    pub rank: usize,
    pub owner: Pubkey,
    pub burned: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Completeness {
    Complete,
    /// Some burns have not been replayed yet.
    Partial { missing: u64 },
    /// Replayed more than the round recorded; the logs and the account disagree.
    Inconsistent { excess: u64 },
}

#[derive(Debug, Clone)]
pub struct Leaderboard {
    round: Pubkey,
    /// Signatures that carried burns for this round, so bounded by the
    /// round's burn transactions.
    seen: HashSet<String>,
    burned: HashMap<Pubkey, u64>,
    total: u64,
}

impl Leaderboard {
    pub fn new(round: Pubkey) -> Self {
        Self {
            round,
            seen: HashSet::new(),
            burned: HashMap::new(),
            total: 0,
        }
    }

    pub fn round(&self) -> &Pubkey {
        &self.round
    }

    /// Apply one transaction's events. Returns `true` when it added burns for
    /// this round; a repeated signature or a transaction without such burns
    /// returns `false` and is not remembered. On error nothing is recorded.
    pub fn apply(&mut self, signature: &str, events: &[MeltEvent]) -> MirrorResult<bool> {
        if self.seen.contains(signature) {
            return Ok(false);
        }
        let mut staged: Vec<(Pubkey, u64)> = Vec::new();
        let mut total = self.total as u128;
        for event in events {
            if let MeltEvent::Burned {
                user,
                round,
                amount,
                ..
            } = event
            {
                if *round != self.round {
                    continue;
                }
                total = add_u128(total, *amount as u128, "leaderboard total")?;
                staged.push((*user, *amount));
            }
        }
        if staged.is_empty() {
            return Ok(false);
        }
        let total = to_u64(total, "leaderboard total")?;

        // validate per-owner sums before touching state
        let mut updates: HashMap<Pubkey, u64> = HashMap::new();
        for (user, amount) in staged {
            let current = updates
                .get(&user)
                .copied()
                .unwrap_or_else(|| self.burned_by(&user));
            let next = to_u64(
                add_u128(current as u128, amount as u128, "owner burn")?,
                "owner burn",
            )?;
            updates.insert(user, next);
        }

        self.burned.extend(updates);
        self.total = total;
        self.seen.insert(signature.to_string());
        Ok(true)
    }

    pub fn is_applied(&self, signature: &str) -> bool {
        self.seen.contains(signature)
    }

    pub fn applied_count(&self) -> usize {
        self.seen.len()
    }

    pub fn burned_by(&self, owner: &Pubkey) -> u64 {
        self.burned.get(owner).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Ranked by amount burned, ties broken by owner address
    pub fn standings(&self) -> Vec<Standing> {
        let mut rows: Vec<(Pubkey, u64)> = self.burned.iter().map(|(k, v)| (*k, *v)).collect();
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

    pub fn completeness(&self, round: &MeltRound) -> Completeness {
        match self.total.cmp(&round.total_burn) {
            std::cmp::Ordering::Equal => Completeness::Complete,
            std::cmp::Ordering::Less => Completeness::Partial {
                missing: round.total_burn - self.total,
            },
            std::cmp::Ordering::Greater => Completeness::Inconsistent {
                excess: self.total - round.total_burn,
            },
        }
    }
}
