//! Program-derived addresses used by the mirror

use solana_sdk::pubkey::Pubkey;

pub const CONFIG_SEED: &[u8] = b"config";
pub const PROFILE_SEED: &[u8] = b"profile";
pub const POSITION_SEED: &[u8] = b"position";
pub const STAKE_SEED: &[u8] = b"stake";
pub const MELT_CONFIG_SEED: &[u8] = b"melt_config";
pub const MELT_VAULT_SEED: &[u8] = b"melt_vault";
pub const MELT_ROUND_SEED: &[u8] = b"melt_round";
pub const MELT_USER_ROUND_SEED: &[u8] = b"melt_user_round";

pub fn config(program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[CONFIG_SEED], program).0
}

pub fn profile(program: &Pubkey, owner: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[PROFILE_SEED, owner.as_ref()], program).0
}

pub fn position(program: &Pubkey, owner: &Pubkey, index: u64) -> Pubkey {
    Pubkey::find_program_address(
        &[POSITION_SEED, owner.as_ref(), &index.to_le_bytes()],
        program,
    )
    .0
}

pub fn stake(program: &Pubkey, owner: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[STAKE_SEED, owner.as_ref()], program).0
}

pub fn melt_config(program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[MELT_CONFIG_SEED], program).0
}

pub fn melt_vault(program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[MELT_VAULT_SEED], program).0
}

pub fn melt_round(program: &Pubkey, seq: u64) -> Pubkey {
    Pubkey::find_program_address(&[MELT_ROUND_SEED, &seq.to_le_bytes()], program).0
}

pub fn melt_user_round(program: &Pubkey, user: &Pubkey, round: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[MELT_USER_ROUND_SEED, user.as_ref(), round.as_ref()],
        program,
    )
    .0
}
