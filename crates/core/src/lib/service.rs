//! Top-level wiring (§9 "Global state → explicit service context"): a single [`Service`]
//! value constructed once at startup, holding every adapter and piece of mutable state that
//! the HTTP handlers and periodic tasks need. No hidden globals.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use dvt_relayer_shared::networks::{Network, NetworkConfig};
use dvt_relayer_shared::types::PublicKeyBytes;
use dvt_relayer_shared::util::usize_to_u64;
use thiserror::Error;

use crate::consensus_client::{ConsensusClient, ConsensusClientError};
use crate::csv_loader::{self, CsvLoaderError};
use crate::env;
use crate::eth_client::{
    ContractError, KeeperClient, ProviderFactory, ReadOnlyProvider, ValidatorsRegistryClient, VaultClient,
};
use crate::ipfs_client::IpfsClient;
use crate::manager_signer::{ManagerSigner, ManagerSignerError};
use crate::network_validators::{NetworkValidatorsScanner, ScannerError};
use crate::prometheus_metrics::{self, Registar};
use crate::protocol_config::{ProtocolConfigCache, ProtocolConfigError};
use crate::registry::ValidatorRegistry;
use crate::store::{NetworkValidatorStore, StoreError};
use crate::unregistered;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid NETWORK value")]
    UnknownNetwork,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Scanner(#[from] ScannerError),
    #[error(transparent)]
    CsvLoader(#[from] CsvLoaderError),
    #[error(transparent)]
    ManagerSigner(#[from] ManagerSignerError),
    #[error(transparent)]
    Metrics(#[from] anyhow::Error),
    #[error("invalid RPC URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum TickError {
    #[error(transparent)]
    Scanner(#[from] ScannerError),
    #[error(transparent)]
    ProtocolConfig(#[from] ProtocolConfigError),
    #[error(transparent)]
    Consensus(#[from] ConsensusClientError),
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error("registry mutex poisoned")]
    Poisoned,
}

pub struct Service {
    pub network: &'static NetworkConfig,
    pub registry: ValidatorRegistry,
    pub protocol_config: ProtocolConfigCache,
    pub scanner: NetworkValidatorsScanner,
    pub configured_public_keys: Vec<PublicKeyBytes>,
    pub validators_registry_client: ValidatorsRegistryClient<ReadOnlyProvider>,
    pub keeper_client: KeeperClient<ReadOnlyProvider>,
    pub vault_client: VaultClient<ReadOnlyProvider>,
    pub consensus_client: ConsensusClient,
    pub ipfs_client: IpfsClient,
    pub manager_signer: ManagerSigner,
    pub metrics: prometheus_metrics::Metrics,
    pub prometheus_registry: prometheus::Registry,
    pub validator_lifetime_seconds: u64,
    pub signature_threshold_override: Option<usize>,
    pub genesis_validators_ipfs_hash: Option<String>,
    pub keeper_genesis_block: u64,
    pub bootstrap_complete: AtomicBool,
}

impl Service {
    /// Reads every §6 env var, constructs adapters, and performs the one-time genesis-load
    /// bootstrap before returning. Fails fast (per §7's `ConfigError` policy) on any missing
    /// or malformed required variable.
    pub async fn bootstrap() -> Result<Self, BootstrapError> {
        let network_name: String = env::NETWORK.required();
        let network = Network::from_str(&network_name).ok_or(BootstrapError::UnknownNetwork)?.config();

        let execution_endpoint: String = env::EXECUTION_ENDPOINT.required();
        let consensus_endpoint: String = env::CONSENSUS_ENDPOINT.required();
        let execution_timeout = Duration::from_secs(env::EXECUTION_TIMEOUT.default(10u64).value);
        let consensus_timeout = Duration::from_secs(env::CONSENSUS_TIMEOUT.default(10u64).value);
        let ipfs_timeout = Duration::from_secs(env::IPFS_TIMEOUT.default(10u64).value);

        let ipfs_endpoints = env::IPFS_FETCH_ENDPOINTS.map(env::split_csv_list).value;
        let database_path: String = env::DATABASE.default("dvt-relayer.sqlite3".to_owned()).value;
        let validator_lifetime = env::VALIDATOR_LIFETIME.default(3_600u64).value;
        let configured_keys_path: String = env::CONFIGURED_PUBLIC_KEYS_PATH.required();
        let genesis_hash = env::GENESIS_VALIDATORS_IPFS_HASH.optional::<String>().value;
        let manager_key: String = env::VALIDATORS_MANAGER_PRIVATE_KEY.required();
        let keeper_genesis_block = env::KEEPER_GENESIS_BLOCK.default(network.keeper_genesis_block).value;
        let signature_threshold_override = env::SIGNATURE_THRESHOLD.optional::<usize>().value;
        let validators_registry_address: Address = env::VALIDATORS_REGISTRY_ADDRESS
            .default(network.validators_registry_address.to_string())
            .value
            .parse()
            .map_err(|_| BootstrapError::InvalidUrl("VALIDATORS_REGISTRY_ADDRESS".to_owned()))?;
        let keeper_address: Address = env::KEEPER_ADDRESS
            .default(network.keeper_address.to_string())
            .value
            .parse()
            .map_err(|_| BootstrapError::InvalidUrl("KEEPER_ADDRESS".to_owned()))?;
        let namespace: String = env::PROMETHEUS_NAMESPACE.default("dvt_relayer".to_owned()).value;

        let execution_url = execution_endpoint
            .parse()
            .map_err(|_| BootstrapError::InvalidUrl(execution_endpoint.clone()))?;
        let provider = Arc::new(ProviderFactory::create_read_only_provider(execution_url, execution_timeout));

        let metrics = prometheus_metrics::Metrics::new(&namespace);
        let prometheus_registry = prometheus::Registry::new();
        metrics.register_on(&prometheus_registry)?;

        let validators_registry_client = ValidatorsRegistryClient::new(
            Arc::clone(&provider),
            validators_registry_address,
            Arc::new(metrics.adapters.clone()),
        );
        let keeper_client = KeeperClient::new(Arc::clone(&provider), keeper_address);
        let vault_client = VaultClient::new(Arc::clone(&provider));

        let consensus_client = ConsensusClient::new(consensus_endpoint, consensus_timeout);
        let ipfs_client = IpfsClient::new(ipfs_endpoints, ipfs_timeout);
        let manager_signer = ManagerSigner::from_hex(&manager_key)?;

        let configured_public_keys = csv_loader::load(&PathBuf::from(configured_keys_path))?;

        let store = NetworkValidatorStore::open(&PathBuf::from(database_path))?;
        let scanner = NetworkValidatorsScanner::new(store)?;
        if let Some(hash) = &genesis_hash {
            scanner.load_genesis(&ipfs_client, hash).await?;
        }

        Ok(Self {
            network,
            registry: ValidatorRegistry::new(),
            protocol_config: ProtocolConfigCache::new(),
            scanner,
            configured_public_keys,
            validators_registry_client,
            keeper_client,
            vault_client,
            consensus_client,
            ipfs_client,
            manager_signer,
            metrics,
            prometheus_registry,
            validator_lifetime_seconds: validator_lifetime,
            signature_threshold_override,
            genesis_validators_ipfs_hash: genesis_hash,
            keeper_genesis_block,
            bootstrap_complete: AtomicBool::new(false),
        })
    }

    pub fn is_ready(&self) -> bool {
        self.bootstrap_complete.load(Ordering::SeqCst)
    }

    /// §4.9 `/health`: flips true once genesis load (done in [`Service::bootstrap`]) and the
    /// first protocol-config fetch have both been attempted.
    pub fn mark_ready(&self) {
        self.bootstrap_complete.store(true, Ordering::SeqCst);
    }

    /// §4.6: one scanner tick, from the scanner's frontier up to the consensus-finalized
    /// execution block (waiting, per the spec, simply means skipping the tick if execution
    /// hasn't caught up yet — there is nothing to scan until it has).
    pub async fn run_network_validators_tick(&self) -> Result<usize, TickError> {
        let finalized = self.consensus_client.finalized_execution_block().await?;
        let window = 43_200 / self.network.seconds_per_block;
        let inserted = self
            .scanner
            .scan(&self.validators_registry_client, finalized, window, self.network)
            .await?;
        self.metrics.chain.last_processed_block.set(self.scanner.last_processed_block());
        Ok(inserted)
    }

    /// §4.7: one protocol-config refresh tick.
    pub async fn run_protocol_config_tick(&self) -> Result<(), TickError> {
        let finalized = self.consensus_client.finalized_execution_block().await?;
        let from = self.protocol_config.checkpoint_block().max(self.keeper_genesis_block);
        let window = 43_200 / self.network.seconds_per_block;
        self.protocol_config
            .refresh(&self.keeper_client, &self.ipfs_client, from, finalized, window)
            .await?;
        self.metrics
            .chain
            .protocol_config_checkpoint_block
            .set(self.protocol_config.checkpoint_block());
        if let Some(config) = self.protocol_config.current() {
            self.metrics.chain.oracle_committee_size.set(usize_to_u64(config.committee_size()));
        }
        Ok(())
    }

    /// §4.8: evicts validator records past `VALIDATOR_LIFETIME`.
    pub fn run_cleanup_tick(&self, now: u64) -> Result<usize, TickError> {
        let evicted = self
            .registry
            .evict_expired(now, self.validator_lifetime_seconds)
            .map_err(|_| TickError::Poisoned)?;
        self.metrics
            .chain
            .registry_size
            .set(usize_to_u64(self.registry.len().map_err(|_| TickError::Poisoned)?));
        Ok(evicted)
    }

    /// §4.10: `configured − registered − pending`, scanning in-flight deposits between the
    /// scanner's frontier and the current execution head.
    pub async fn unregistered_public_keys(&self) -> Result<Vec<PublicKeyBytes>, TickError> {
        let head = self.consensus_client.finalized_execution_block().await?;
        let frontier = self.scanner.last_processed_block();
        let pending: HashSet<PublicKeyBytes> = if head > frontier {
            self.validators_registry_client
                .scan_deposit_events(frontier + 1, head)
                .await?
                .into_iter()
                .map(|event| event.pubkey)
                .collect()
        } else {
            HashSet::new()
        };

        let registered: HashSet<PublicKeyBytes> = self
            .configured_public_keys
            .iter()
            .filter(|key| self.scanner.is_registered(key))
            .copied()
            .collect();

        Ok(unregistered::compute(&self.configured_public_keys, &registered, &pending))
    }
}
