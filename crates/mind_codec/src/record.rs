//! Kind-dispatched decoding

use crate::accounts::config::{decode_config, MiningConfig};
use crate::accounts::melt::{
    decode_melt_config, decode_melt_round, decode_melt_user_round, MeltConfig, MeltRound,
    MeltUserRound,
};
use crate::accounts::position::{decode_position, MinerPosition};
use crate::accounts::profile::{decode_profile, MiningProfile};
use crate::accounts::stake::{decode_stake, UserStake};
use crate::error::DecodeResult;
use crate::version::AccountKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedRecord {
    Config(MiningConfig),
    Position(MinerPosition),
    Profile(MiningProfile),
    Stake(UserStake),
    MeltConfig(MeltConfig),
    MeltRound(MeltRound),
    MeltUserRound(MeltUserRound),
}

impl TypedRecord {
    pub fn kind(&self) -> AccountKind {
        match self {
            TypedRecord::Config(_) => AccountKind::Config,
            TypedRecord::Position(_) => AccountKind::Position,
            TypedRecord::Profile(_) => AccountKind::Profile,
            TypedRecord::Stake(_) => AccountKind::Stake,
            TypedRecord::MeltConfig(_) => AccountKind::MeltConfig,
            TypedRecord::MeltRound(_) => AccountKind::MeltRound,
            TypedRecord::MeltUserRound(_) => AccountKind::MeltUserRound,
        }
    }
}

pub fn decode(kind: AccountKind, data: &[u8]) -> DecodeResult<TypedRecord> {
    match kind {
        AccountKind::Config => decode_config(data).map(TypedRecord::Config),
        AccountKind::Position => decode_position(data).map(TypedRecord::Position),
        AccountKind::Profile => decode_profile(data).map(TypedRecord::Profile),
        AccountKind::Stake => decode_stake(data).map(TypedRecord::Stake),
        AccountKind::MeltConfig => decode_melt_config(data).map(TypedRecord::MeltConfig),
        AccountKind::MeltRound => decode_melt_round(data).map(TypedRecord::MeltRound),
        AccountKind::MeltUserRound => decode_melt_user_round(data).map(TypedRecord::MeltUserRound),
    }
}

/// Decodes every account independently; one malformed buffer never stops the batch.
pub fn decode_batch<K, B, I>(kind: AccountKind, accounts: I) -> Vec<(K, DecodeResult<TypedRecord>)>
where
    I: IntoIterator<Item = (K, B)>,
    B: AsRef<[u8]>,
{
    accounts
        .into_iter()
        .map(|(key, data)| {
            let record = decode(kind, data.as_ref());
            (key, record)
        })
        .collect()
}
