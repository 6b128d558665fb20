//! Mirror configuration

use anyhow::{Context, Result};
use mind_model::staking::DEFAULT_BONUS_EPSILON;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

pub const CONFIG_ENV: &str = "MIRROR_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "mirror-config.toml";

const MINING_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("uaDkkJGLLEY3kFMhhvrh5MZJ6fmwCmhNf8L7BZQJ9Aw");
const MELT_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("HAWdiMtvTfiFhENgxPdWEgBQmoa3A5oN1KV9N3LSmxXz");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC URL for the cluster
    pub rpc_url: String,

    /// Mining and staking program ID
    #[serde(with = "pubkey_str")]
    pub mining_program: Pubkey,

    /// Burn-round program ID
    #[serde(with = "pubkey_str")]
    pub melt_program: Pubkey,

    /// Wallets to build snapshots for
    #[serde(default, with = "pubkey_vec_str")]
    pub watched_owners: Vec<Pubkey>,

    /// Polling interval in seconds
    pub poll_interval_secs: u64,

    /// Slack over the 1.2x staking bonus ceiling, XNT base units
    #[serde(default = "default_bonus_epsilon")]
    pub bonus_epsilon: u64,

    /// Signatures fetched per leaderboard page
    #[serde(default = "default_page_size")]
    pub leaderboard_page_size: usize,

    /// Burners kept in the logged top list
    #[serde(default = "default_top_burners")]
    pub top_burners: usize,

    /// Seconds before a cached account copy is refetched
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Write the latest snapshot here as JSON when set
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

fn default_bonus_epsilon() -> u64 {
    DEFAULT_BONUS_EPSILON
}

fn default_page_size() -> usize {
    100
}

fn default_top_burners() -> usize {
    10
}

fn default_cache_ttl() -> u64 {
    30
}

impl Config {
    /// Load configuration from the TOML file named by `MIRROR_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let config_str = std::fs::read_to_string(expanded.as_ref())
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&config_str).context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Create default configuration
    pub fn default_devnet() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            mining_program: MINING_PROGRAM_ID,
            melt_program: MELT_PROGRAM_ID,
            watched_owners: Vec::new(),
            poll_interval_secs: 30,
            bonus_epsilon: DEFAULT_BONUS_EPSILON,
            leaderboard_page_size: default_page_size(),
            top_burners: default_top_burners(),
            cache_ttl_secs: default_cache_ttl(),
            snapshot_path: None,
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_devnet();
        let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;

        let expanded = shellexpand::tilde(path);
        std::fs::write(expanded.as_ref(), toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }

    /// Snapshot output path with `~` expanded
    pub fn snapshot_file(&self) -> Option<String> {
        self.snapshot_path
            .as_deref()
            .map(|p| shellexpand::tilde(p).into_owned())
    }
}

mod pubkey_str {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Pubkey, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Pubkey, D::Error> {
        let raw = String::deserialize(d)?;
        Pubkey::from_str(&raw).map_err(D::Error::custom)
    }
}

mod pubkey_vec_str {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(keys: &[Pubkey], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(keys.iter().map(|k| k.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Pubkey>, D::Error> {
        Vec::<String>::deserialize(d)?
            .iter()
            .map(|raw| Pubkey::from_str(raw).map_err(D::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_devnet();
        assert_eq!(config.rpc_url, "https://api.devnet.solana.com");
        assert_eq!(config.bonus_epsilon, DEFAULT_BONUS_EPSILON);
        assert!(config.snapshot_path.is_none());
    }

    #[test]
    fn test_toml_round_trip_keeps_program_ids() {
        let mut config = Config::default_devnet();
        config.watched_owners = vec![Pubkey::new_unique()];
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("uaDkkJGLLEY3kFMhhvrh5MZJ6fmwCmhNf8L7BZQJ9Aw"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.watched_owners, config.watched_owners);
        assert_eq!(parsed.melt_program, MELT_PROGRAM_ID);
    }

    #[test]
    fn test_optional_fields_fall_back_to_defaults() {
        let text = r#"
            rpc_url = "http://localhost:8899"
            mining_program = "uaDkkJGLLEY3kFMhhvrh5MZJ6fmwCmhNf8L7BZQJ9Aw"
            melt_program = "HAWdiMtvTfiFhENgxPdWEgBQmoa3A5oN1KV9N3LSmxXz"
            poll_interval_secs = 5
        "#;
        let parsed: Config = toml::from_str(text).unwrap();
        assert!(parsed.watched_owners.is_empty());
        assert_eq!(parsed.bonus_epsilon, DEFAULT_BONUS_EPSILON);
        assert_eq!(parsed.leaderboard_page_size, 100);
    }
}
