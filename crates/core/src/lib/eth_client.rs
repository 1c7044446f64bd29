use std::sync::Arc;
use std::time::Duration;

use alloy::eips::BlockNumberOrTag;
use alloy::network::Ethereum;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::fillers::RecommendedFillers;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::Filter;
use alloy::sol;
use alloy::sol_types::SolEvent;
use alloy::transports::http::reqwest::{Client as HttpClient, Url};
use alloy::transports::http::Http;
use thiserror::Error;

use crate::prometheus_metrics;

sol! {
    #[sol(rpc)]
    interface ValidatorsRegistry {
        event DepositEvent(bytes pubkey, bytes withdrawal_credentials, bytes amount, bytes signature, bytes index);

        function get_deposit_root() external view returns (bytes32);
    }
}

sol! {
    #[sol(rpc)]
    interface Keeper {
        event ConfigUpdated(string configIpfsHash);
    }
}

sol! {
    #[sol(rpc)]
    interface Vault {
        function validatorsManagerNonce() external view returns (uint256);
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to parse private key")]
    ParsePrivateKeyError,
    #[error("Failed to decode private key hex")]
    FromHexError,
    #[error("Failed to deserialize private key")]
    DeserializePrivateKeyError,
}

/// Decodes a `0x`-prefixed (or bare) hex-encoded secp256k1 private key, the same way the
/// validators-manager signer and the execution-layer transaction signer both do it.
pub fn decode_secret_key(raw: &str) -> Result<k256::SecretKey, ProviderError> {
    let key_str = raw.trim_start_matches("0x").trim();
    let key_hex = hex::decode(key_str).map_err(|_e| ProviderError::FromHexError)?;
    k256::SecretKey::from_bytes((&key_hex[..]).into()).map_err(|_e| ProviderError::DeserializePrivateKeyError)
}

/// A provider with no wallet filler, for the read-only contract calls and log scans the
/// relayer itself performs (it never submits transactions; produced signatures are handed
/// back to the caller, who submits them through their own wallet).
pub type ReadOnlyProvider = alloy::providers::fillers::FillProvider<
    alloy::providers::fillers::JoinFill<alloy::providers::Identity, <Ethereum as RecommendedFillers>::RecommendedFillers>,
    alloy::providers::RootProvider,
>;

pub struct ProviderFactory {}

impl ProviderFactory {
    /// Builds the read-only execution-layer provider, applying `EXECUTION_TIMEOUT` (§6) to the
    /// underlying HTTP client the same way [`crate::consensus_client::ConsensusClient`] and
    /// [`crate::ipfs_client::IpfsClient`] apply their own configured timeouts.
    pub fn create_read_only_provider(endpoint: Url, timeout: Duration) -> ReadOnlyProvider {
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build execution-layer HTTP client");
        let rpc_client = RpcClient::new(Http::with_client(client, endpoint), false);
        ProviderBuilder::new().connect_client(rpc_client)
    }
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error(transparent)]
    Transport(#[from] alloy::transports::RpcError<alloy::transports::TransportErrorKind>),
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    #[error("malformed DepositEvent log: {0}")]
    MalformedDepositEvent(&'static str),
}

/// One finalized `DepositEvent` as emitted by the validators-registry contract, with its
/// deposit-data fields decoded from their packed big-endian/little-endian wire encodings.
#[derive(Debug, Clone)]
pub struct RawDepositEvent {
    pub pubkey: [u8; 48],
    pub withdrawal_credentials: [u8; 32],
    pub amount_gwei: u64,
    pub signature: [u8; 96],
    pub block_number: u64,
}

fn decode_deposit_event(event: &ValidatorsRegistry::DepositEvent, block_number: u64) -> Result<RawDepositEvent, ContractError> {
    let pubkey: [u8; 48] = event
        .pubkey
        .as_ref()
        .try_into()
        .map_err(|_| ContractError::MalformedDepositEvent("pubkey"))?;
    let withdrawal_credentials: [u8; 32] = event
        .withdrawal_credentials
        .as_ref()
        .try_into()
        .map_err(|_| ContractError::MalformedDepositEvent("withdrawal_credentials"))?;
    let signature: [u8; 96] = event
        .signature
        .as_ref()
        .try_into()
        .map_err(|_| ContractError::MalformedDepositEvent("signature"))?;
    // amount is a little-endian 8-byte gwei value per the deposit contract's packed encoding.
    let amount_bytes: [u8; 8] = event
        .amount
        .as_ref()
        .try_into()
        .map_err(|_| ContractError::MalformedDepositEvent("amount"))?;
    Ok(RawDepositEvent {
        pubkey,
        withdrawal_credentials,
        amount_gwei: u64::from_le_bytes(amount_bytes),
        signature,
        block_number,
    })
}

pub struct ValidatorsRegistryClient<P: Provider<Ethereum>> {
    provider: Arc<P>,
    address: Address,
    metric_reporter: Arc<prometheus_metrics::Adapters>,
}

impl<P: Provider<Ethereum>> ValidatorsRegistryClient<P> {
    pub fn new(provider: Arc<P>, address: Address, metric_reporter: Arc<prometheus_metrics::Adapters>) -> Self {
        Self {
            provider,
            address,
            metric_reporter,
        }
    }

    pub async fn get_deposit_root(&self) -> Result<B256, ContractError> {
        let contract = ValidatorsRegistry::new(self.address, Arc::clone(&self.provider));
        let root = contract.get_deposit_root().call().await?;
        Ok(root)
    }

    /// Scans `[from, to]` (inclusive) for `DepositEvent` logs in a single RPC window.
    pub async fn scan_deposit_events(&self, from: u64, to: u64) -> Result<Vec<RawDepositEvent>, ContractError> {
        let filter = Filter::new()
            .address(self.address)
            .event_signature(ValidatorsRegistry::DepositEvent::SIGNATURE_HASH)
            .from_block(BlockNumberOrTag::Number(from))
            .to_block(BlockNumberOrTag::Number(to));

        let logs = self.provider.get_logs(&filter).await?;
        let mut events = Vec::with_capacity(logs.len());
        for log in logs {
            let block_number = log.block_number.unwrap_or(to);
            let decoded = log.log_decode::<ValidatorsRegistry::DepositEvent>()?;
            events.push(decode_deposit_event(decoded.inner.data(), block_number)?);
        }
        Ok(events)
    }

    pub fn metrics(&self) -> &prometheus_metrics::Adapters {
        &self.metric_reporter
    }
}

pub struct KeeperClient<P: Provider<Ethereum>> {
    provider: Arc<P>,
    address: Address,
}

impl<P: Provider<Ethereum>> KeeperClient<P> {
    pub fn new(provider: Arc<P>, address: Address) -> Self {
        Self { provider, address }
    }

    /// Scans `[from, to]` (inclusive) for `ConfigUpdated` events, most-recent-last.
    pub async fn scan_config_updates(&self, from: u64, to: u64) -> Result<Vec<String>, ContractError> {
        let filter = Filter::new()
            .address(self.address)
            .event_signature(Keeper::ConfigUpdated::SIGNATURE_HASH)
            .from_block(BlockNumberOrTag::Number(from))
            .to_block(BlockNumberOrTag::Number(to));

        let logs = self.provider.get_logs(&filter).await?;
        let mut hashes = Vec::with_capacity(logs.len());
        for log in logs {
            let decoded = log.log_decode::<Keeper::ConfigUpdated>()?;
            hashes.push(decoded.inner.data().configIpfsHash.clone());
        }
        Ok(hashes)
    }
}

pub struct VaultClient<P: Provider<Ethereum>> {
    provider: Arc<P>,
}

impl<P: Provider<Ethereum>> VaultClient<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    pub async fn validators_manager_nonce(&self, vault: Address) -> Result<U256, ContractError> {
        let contract = Vault::new(vault, Arc::clone(&self.provider));
        let nonce = contract.validatorsManagerNonce().call().await?;
        Ok(nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_private_key_with_or_without_0x_prefix() {
        let raw = "0000000000000000000000000000000000000000000000000000000000000001";
        let with_prefix = decode_secret_key(&format!("0x{raw}")).unwrap();
        let without_prefix = decode_secret_key(raw).unwrap();
        assert_eq!(with_prefix.to_bytes(), without_prefix.to_bytes());
    }
}
