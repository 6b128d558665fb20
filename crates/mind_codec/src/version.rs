//! Length-implied schema versions
//!
//! Ledger accounts grow by appending fields, so an account's total length
//! identifies which layout wrote it. Every kind declares an ascending table
//! of `(version, minimum total length)` rows and resolution picks the newest
//! row that fits.

use crate::error::{DecodeError, DecodeResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccountKind {
    Config,
    Position,
    Profile,
    Stake,
    MeltConfig,
    MeltRound,
    MeltUserRound,
}

impl AccountKind {
    pub const ALL: [AccountKind; 7] = [
        AccountKind::Config,
        AccountKind::Position,
        AccountKind::Profile,
        AccountKind::Stake,
        AccountKind::MeltConfig,
        AccountKind::MeltRound,
        AccountKind::MeltUserRound,
    ];

    /// Anchor type name hashed into the account discriminator.
    pub fn type_name(self) -> &'static str {
        match self {
            AccountKind::Config => "Config",
            AccountKind::Position => "MinerPosition",
            AccountKind::Profile => "UserMiningProfile",
            AccountKind::Stake => "UserStake",
            AccountKind::MeltConfig => "MeltConfig",
            AccountKind::MeltRound => "MeltRound",
            AccountKind::MeltUserRound => "MeltUserRound",
        }
    }

    /// Smallest total length any version of this kind can have.
    pub fn min_len(self) -> usize {
        use crate::accounts::{config, melt, position, profile, stake};
        match self {
            AccountKind::Config => config::CONFIG_VERSIONS.min_len(),
            AccountKind::Position => position::POSITION_VERSIONS.min_len(),
            AccountKind::Profile => profile::PROFILE_VERSIONS.min_len(),
            AccountKind::Stake => stake::STAKE_ACCOUNT_LEN,
            AccountKind::MeltConfig => melt::MELT_CONFIG_VERSIONS.min_len(),
            AccountKind::MeltRound => melt::MELT_ROUND_ACCOUNT_LEN,
            AccountKind::MeltUserRound => melt::MELT_USER_ROUND_ACCOUNT_LEN,
        }
    }

    /// Every total length at which a new version of this kind begins.
    pub fn exact_lengths(self) -> Vec<usize> {
        use crate::accounts::{config, melt, position, profile};
        match self {
            AccountKind::Config => config::CONFIG_VERSIONS.lengths().collect(),
            AccountKind::Position => position::POSITION_VERSIONS.lengths().collect(),
            AccountKind::Profile => profile::PROFILE_VERSIONS.lengths().collect(),
            AccountKind::MeltConfig => melt::MELT_CONFIG_VERSIONS.lengths().collect(),
            single => vec![single.min_len()],
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Ascending `(version, minimum total length)` rows for one account kind.
#[derive(Debug, Clone, Copy)]
pub struct VersionTable<V: 'static> {
    kind: AccountKind,
    rows: &'static [(V, usize)],
}

impl<V: Copy> VersionTable<V> {
    pub const fn new(kind: AccountKind, rows: &'static [(V, usize)]) -> Self {
        Self { kind, rows }
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn rows(&self) -> &'static [(V, usize)] {
        self.rows
    }

    pub fn min_len(&self) -> usize {
        self.rows.first().map_or(0, |(_, len)| *len)
    }

    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().map(|(_, len)| *len)
    }

    /// Newest version whose minimum length fits in `len` bytes.
    pub fn resolve(&self, len: usize) -> DecodeResult<V> {
        self.rows
            .iter()
            .rev()
            .find(|(_, min)| *min <= len)
            .map(|(version, _)| *version)
            .ok_or(DecodeError::TooShort {
                kind: self.kind,
                got: len,
                min: self.min_len(),
            })
    }
}
