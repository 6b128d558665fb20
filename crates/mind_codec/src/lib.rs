//! MIND account codec
//!
//! Decodes raw ledger account bytes into typed records. Each account kind
//! carries an explicit version table and the buffer length selects the
//! layout. Nothing here panics on malformed input; every failure is a
//! [`DecodeError`] value.

pub mod accounts;
pub mod capacity;
pub mod discriminator;
pub mod error;
pub mod events;
pub mod reader;
pub mod record;
pub mod version;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use accounts::config::{decode_config, ConfigVersion, MiningConfig, StakingState};
pub use accounts::melt::{
    decode_melt_config, decode_melt_round, decode_melt_user_round, MeltConfig, MeltConfigVersion,
    MeltRound, MeltUserRound, RoundStatus,
};
pub use accounts::position::{decode_position, MinerPosition, PositionVersion};
pub use accounts::profile::{
    decode_profile, LevelSnapshots, MiningProfile, ProfileVersion, MAX_LEVEL_SNAPSHOTS,
};
pub use accounts::stake::{decode_stake, UserStake};
pub use capacity::{Capacity, HP_HIGH_BIT, HP_SCALE};
pub use discriminator::{account_discriminator, event_discriminator, DISCRIMINATOR_LEN};
pub use error::{DecodeError, DecodeResult};
pub use events::{parse_log_line, parse_logs, MeltEvent, PROGRAM_DATA_PREFIX};
pub use record::{decode, decode_batch, TypedRecord};
pub use version::{AccountKind, VersionTable};
