//! Staked MIND per wallet (`account:UserStake`)

use super::open_fixed;
use crate::error::DecodeResult;
use crate::version::AccountKind;
use solana_sdk::pubkey::Pubkey;

pub const STAKE_ACCOUNT_LEN: usize = 73;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserStake {
    pub owner: Pubkey,
    pub staked_mind: u64,
    pub reward_debt: u128,
    pub reward_owed: u64,
    pub bump: u8,
}

pub fn decode_stake(data: &[u8]) -> DecodeResult<UserStake> {
    let mut r = open_fixed(AccountKind::Stake, STAKE_ACCOUNT_LEN, data)?;
    Ok(UserStake {
        owner: r.read_pubkey()?,
        staked_mind: r.read_u64()?,
        reward_debt: r.read_u128()?,
        reward_owed: r.read_u64()?,
        bump: r.read_u8()?,
    })
}
