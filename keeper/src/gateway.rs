//! Ledger access seam
//!
//! Everything the mirror reads goes through [`LedgerGateway`] so the refresh
//! logic can run against an in-memory ledger in tests.

use anyhow::{Context, Result};
use solana_account_decoder::UiAccountEncoding;
use solana_client::rpc_client::{GetConfirmedSignaturesForAddress2Config, RpcClient};
use solana_client::rpc_config::{
    RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcTransactionConfig,
};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::UiTransactionEncoding;
use std::str::FromStr;

const SIGNATURE_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid transaction signature: {0}")]
    InvalidSignature(String),
}

/// Server-side account selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub exact_length: Option<usize>,
    /// `(offset, bytes)` pairs that must all match.
    pub prefix_match: Vec<(usize, Vec<u8>)>,
}

impl AccountFilter {
    pub fn with_length(len: usize) -> Self {
        Self {
            exact_length: Some(len),
            prefix_match: Vec::new(),
        }
    }

    pub fn and_match(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.prefix_match.push((offset, bytes.to_vec()));
        self
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        if self.exact_length.is_some_and(|len| data.len() != len) {
            return false;
        }
        self.prefix_match.iter().all(|(offset, bytes)| {
            offset
                .checked_add(bytes.len())
                .and_then(|end| data.get(*offset..end))
                == Some(bytes.as_slice())
        })
    }

    fn to_rpc_filters(&self) -> Vec<RpcFilterType> {
        let mut filters = Vec::with_capacity(self.prefix_match.len() + 1);
        if let Some(len) = self.exact_length {
            filters.push(RpcFilterType::DataSize(len as u64));
        }
        for (offset, bytes) in &self.prefix_match {
            filters.push(RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                *offset,
                bytes.clone(),
            )));
        }
        filters
    }
}

pub trait LedgerGateway {
    fn get_account(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;

    fn get_accounts_by_filter(
        &self,
        program: &Pubkey,
        filter: &AccountFilter,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>>;

    /// Log lines of a confirmed transaction, `None` when it carries no meta
    fn get_transaction_logs(&self, signature: &str) -> Result<Option<Vec<String>>>;

    /// Newest first, strictly older than `before` when given
    fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>>;
}

/// Base58 text that decodes to a 64-byte signature
pub fn is_valid_signature(text: &str) -> bool {
    bs58::decode(text)
        .into_vec()
        .is_ok_and(|bytes| bytes.len() == SIGNATURE_LEN)
}

fn parse_signature(text: &str) -> Result<Signature> {
    if !is_valid_signature(text) {
        return Err(GatewayError::InvalidSignature(text.to_string()).into());
    }
    Signature::from_str(text).map_err(|_| GatewayError::InvalidSignature(text.to_string()).into())
}

pub struct RpcGateway {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcGateway {
    pub fn new(rpc_url: &str) -> Self {
        let commitment = CommitmentConfig::confirmed();
        Self {
            client: RpcClient::new_with_commitment(rpc_url.to_string(), commitment),
            commitment,
        }
    }
}

impl LedgerGateway for RpcGateway {
    fn get_account(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .context(format!("Failed to fetch account {}", address))?;
        Ok(response.value.map(|account| account.data))
    }

    fn get_accounts_by_filter(
        &self,
        program: &Pubkey,
        filter: &AccountFilter,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filter.to_rpc_filters()),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self
            .client
            .get_program_accounts_with_config(program, config)
            .context(format!("Failed to scan accounts of program {}", program))?;
        // some RPC providers ignore filters
        Ok(accounts
            .into_iter()
            .map(|(key, account)| (key, account.data))
            .filter(|(_, data)| filter.matches(data))
            .collect())
    }

    fn get_transaction_logs(&self, signature: &str) -> Result<Option<Vec<String>>> {
        let signature = parse_signature(signature)?;
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        };
        let tx = self
            .client
            .get_transaction_with_config(&signature, config)
            .context(format!("Failed to fetch transaction {}", signature))?;
        let logs = tx.transaction.meta.and_then(|meta| match meta.log_messages {
            OptionSerializer::Some(lines) => Some(lines),
            _ => None,
        });
        Ok(logs)
    }

    fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>> {
        let before = before.map(parse_signature).transpose()?;
        let config = GetConfirmedSignaturesForAddress2Config {
            before,
            until: None,
            limit: Some(limit),
            commitment: Some(self.commitment),
        };
        let statuses = self
            .client
            .get_signatures_for_address_with_config(address, config)
            .context(format!("Failed to list signatures for {}", address))?;
        Ok(statuses.into_iter().map(|status| status.signature).collect())
    }
}
