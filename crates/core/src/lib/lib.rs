pub mod consensus_client;
pub mod csv_loader;
pub mod env;
pub mod eth_client;
pub mod genesis_dump;
pub mod ipfs_client;
pub mod manager_signer;
pub mod network_validators;
pub mod prometheus_metrics;
pub mod protocol_config;
pub mod registry;
pub mod service;
pub mod store;
pub mod tracing;
pub mod unregistered;
