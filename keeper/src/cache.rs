//! Timestamped copies of ledger data
//!
//! A cached copy is never treated as authoritative: callers check its age and
//! refetch once it is older than the configured TTL.

use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub data: T,
    pub fetched_at: Instant,
}

impl<T> Cached<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            fetched_at: Instant::now(),
        }
    }

    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    pub fn is_stale_at(&self, now: Instant, ttl: Duration) -> bool {
        self.age_at(now) >= ttl
    }

    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.is_stale_at(Instant::now(), ttl)
    }
}

/// Raw account bytes keyed by address; `None` records a confirmed absence
pub struct AccountCache {
    ttl: Duration,
    entries: HashMap<Pubkey, Cached<Option<Vec<u8>>>>,
}

impl AccountCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Fresh entry for `key`, if any
    pub fn get(&self, key: &Pubkey) -> Option<&Option<Vec<u8>>> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_stale(self.ttl))
            .map(|entry| &entry.data)
    }

    pub fn insert(&mut self, key: Pubkey, data: Option<Vec<u8>>) {
        self.entries.insert(key, Cached::new(data));
    }

    pub fn invalidate(&mut self, key: &Pubkey) {
        self.entries.remove(key);
    }

    /// Drop entries past their TTL
    pub fn evict_stale(&mut self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| !entry.is_stale(ttl));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
