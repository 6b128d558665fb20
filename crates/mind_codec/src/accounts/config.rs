//! Global mining configuration (`account:Config`)

use super::open;
use crate::error::DecodeResult;
use crate::version::{AccountKind, VersionTable};
use solana_sdk::pubkey::Pubkey;

pub const CONFIG_V1_LEN: usize = 322;
pub const CONFIG_V2_LEN: usize = 324;

/// Seconds per reward cycle when the account leaves it unset.
pub const DEFAULT_SECONDS_PER_DAY: u64 = 86_400;

/// Mirrored cap for configs written before per-wallet caps existed.
pub const UNCAPPED_WALLET_BPS: u16 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigVersion {
    V1,
    #[default]
    V2,
}

pub const CONFIG_VERSIONS: VersionTable<ConfigVersion> = VersionTable::new(
    AccountKind::Config,
    &[(ConfigVersion::V1, CONFIG_V1_LEN), (ConfigVersion::V2, CONFIG_V2_LEN)],
);

/// Staking sub-state embedded in the mining config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StakingState {
    pub acc_xnt_per_mind: u128,
    pub last_update_ts: i64,
    pub reward_rate_xnt_per_sec: u64,
    pub epoch_end_ts: i64,
    pub total_staked_mind: u64,
    pub undistributed_xnt: u64,
    pub accounted_balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MiningConfig {
    pub version: ConfigVersion,
    pub admin: Pubkey,
    pub emission_per_sec: u64,
    pub acc_mind_per_hp: u128,
    pub last_update_ts: i64,
    /// Canonical centi-HP.
    pub network_hp_active: u64,
    pub mind_mint: Pubkey,
    pub xnt_mint: Pubkey,
    pub staking_reward_vault: Pubkey,
    pub treasury_vault: Pubkey,
    pub staking_mind_vault: Pubkey,
    pub max_effective_hp: u64,
    pub seconds_per_day: u64,
    pub staking: StakingState,
    pub bump_config: u8,
    pub bump_vault_authority: u8,
    pub wallet_cap_bps: u16,
}

impl MiningConfig {
    /// Cycle length with the ledger default substituted for zero.
    pub fn cycle_seconds(&self) -> u64 {
        if self.seconds_per_day == 0 {
            DEFAULT_SECONDS_PER_DAY
        } else {
            self.seconds_per_day
        }
    }

    /// Reward cycle index containing `now`.
    pub fn cycle_at(&self, now: i64) -> u64 {
        (now.max(0) as u64) / self.cycle_seconds()
    }
}

pub fn decode_config(data: &[u8]) -> DecodeResult<MiningConfig> {
    let (version, mut r) = open(&CONFIG_VERSIONS, data)?;

    let admin = r.read_pubkey()?;
    let emission_per_sec = r.read_u64()?;
    let acc_mind_per_hp = r.read_u128()?;
    let last_update_ts = r.read_i64()?;
    let network_hp_active = r.read_u64()?;
    let mind_mint = r.read_pubkey()?;
    let xnt_mint = r.read_pubkey()?;
    let staking_reward_vault = r.read_pubkey()?;
    let treasury_vault = r.read_pubkey()?;
    let staking_mind_vault = r.read_pubkey()?;
    let max_effective_hp = r.read_u64()?;
    let seconds_per_day = r.read_u64()?;
    let staking = StakingState {
        acc_xnt_per_mind: r.read_u128()?,
        last_update_ts: r.read_i64()?,
        reward_rate_xnt_per_sec: r.read_u64()?,
        epoch_end_ts: r.read_i64()?,
        total_staked_mind: r.read_u64()?,
        undistributed_xnt: r.read_u64()?,
        accounted_balance: r.read_u64()?,
    };
    let bump_config = r.read_u8()?;
    let bump_vault_authority = r.read_u8()?;
    let wallet_cap_bps = match version {
        ConfigVersion::V1 => UNCAPPED_WALLET_BPS,
        ConfigVersion::V2 => r.read_u16()?,
    };

    Ok(MiningConfig {
        version,
        admin,
        emission_per_sec,
        acc_mind_per_hp,
        last_update_ts,
        network_hp_active,
        mind_mint,
        xnt_mint,
        staking_reward_vault,
        treasury_vault,
        staking_mind_vault,
        max_effective_hp,
        seconds_per_day,
        staking,
        bump_config,
        bump_vault_authority,
        wallet_cap_bps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::fixtures::encode_config;

    fn sample() -> MiningConfig {
        MiningConfig {
            admin: Pubkey::new_unique(),
            emission_per_sec: 1_000_000_000,
            acc_mind_per_hp: (5u128 << 64) + 17,
            last_update_ts: 1_700_000_000,
            network_hp_active: 12_500,
            mind_mint: Pubkey::new_unique(),
            seconds_per_day: 600,
            staking: StakingState {
                acc_xnt_per_mind: 99,
                epoch_end_ts: 1_700_086_400,
                total_staked_mind: 40,
                ..StakingState::default()
            },
            bump_config: 254,
            bump_vault_authority: 253,
            wallet_cap_bps: 2_500,
            ..MiningConfig::default()
        }
    }

    #[test]
    fn test_v2_reads_wallet_cap() {
        let cfg = sample();
        let bytes = encode_config(&cfg);
        assert_eq!(bytes.len(), CONFIG_V2_LEN);
        let decoded = decode_config(&bytes).unwrap();
        assert_eq!(decoded.version, ConfigVersion::V2);
        assert_eq!(decoded.wallet_cap_bps, 2_500);
        assert_eq!(decoded.acc_mind_per_hp, (5u128 << 64) + 17);
        assert_eq!(decoded.staking.total_staked_mind, 40);
        assert_eq!(decoded.bump_vault_authority, 253);
    }

    #[test]
    fn test_v1_mirrors_uncapped_wallet() {
        let cfg = MiningConfig {
            version: ConfigVersion::V1,
            ..sample()
        };
        let bytes = encode_config(&cfg);
        assert_eq!(bytes.len(), CONFIG_V1_LEN);
        let decoded = decode_config(&bytes).unwrap();
        assert_eq!(decoded.version, ConfigVersion::V1);
        assert_eq!(decoded.wallet_cap_bps, UNCAPPED_WALLET_BPS);
        assert_eq!(decoded.emission_per_sec, 1_000_000_000);
    }

    #[test]
    fn test_one_byte_short_of_v2_is_v1() {
        let mut bytes = encode_config(&sample());
        bytes.truncate(CONFIG_V2_LEN - 1);
        assert_eq!(decode_config(&bytes).unwrap().version, ConfigVersion::V1);
        bytes.truncate(CONFIG_V1_LEN - 1);
        assert_eq!(
            decode_config(&bytes),
            Err(DecodeError::TooShort {
                kind: AccountKind::Config,
                got: CONFIG_V1_LEN - 1,
                min: CONFIG_V1_LEN
            })
        );
    }

    #[test]
    fn test_zero_cycle_length_uses_default() {
        let cfg = MiningConfig::default();
        assert_eq!(cfg.cycle_seconds(), DEFAULT_SECONDS_PER_DAY);
        assert_eq!(cfg.cycle_at(86_400 * 3 + 5), 3);
        assert_eq!(sample().cycle_at(1_800), 3);
    }
}
