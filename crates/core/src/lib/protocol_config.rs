//! Protocol-config cache (§4.7): tracks `ConfigUpdated` events on the keeper contract,
//! fetches the referenced IPFS blob, and exposes the current [`ProtocolConfig`].

use std::sync::RwLock;

use alloy::network::Ethereum;
use alloy::providers::Provider;
use dvt_relayer_shared::types::{Oracle, ProtocolConfig};
use serde::Deserialize;
use thiserror::Error;

use crate::eth_client::{ContractError, KeeperClient};
use crate::ipfs_client::{IpfsClient, IpfsError};

pub const SCAN_WINDOW_SECONDS: u64 = 43_200;

#[derive(Debug, Error)]
pub enum ProtocolConfigError {
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Ipfs(#[from] IpfsError),
    #[error("poisoned protocol-config cache lock")]
    Poisoned,
}

#[derive(Debug, Deserialize)]
struct OracleDto {
    address: alloy_primitives::Address,
    #[serde(with = "dvt_relayer_shared_hex_33")]
    public_key: [u8; 33],
}

#[derive(Debug, Deserialize)]
struct ProtocolConfigDto {
    oracles: Vec<OracleDto>,
    threshold: usize,
}

mod dvt_relayer_shared_hex_33 {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 33], D::Error> {
        let s = String::deserialize(d)?;
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 33-byte compressed public key"))
    }
}

impl From<ProtocolConfigDto> for ProtocolConfig {
    fn from(dto: ProtocolConfigDto) -> Self {
        ProtocolConfig {
            oracles: dto
                .oracles
                .into_iter()
                .map(|o| Oracle {
                    public_key: o.public_key,
                    address: o.address,
                })
                .collect(),
            exit_signature_recover_threshold: dto.threshold,
            checkpoint_block: 0,
        }
    }
}

pub struct ProtocolConfigCache {
    current: RwLock<Option<ProtocolConfig>>,
}

impl Default for ProtocolConfigCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolConfigCache {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Option<ProtocolConfig> {
        self.current.read().ok().and_then(|g| g.clone())
    }

    pub fn checkpoint_block(&self) -> u64 {
        self.current().map(|c| c.checkpoint_block).unwrap_or(0)
    }

    /// One tick of §4.7: scans `[from, to]` backwards in `window` blocks, stopping at the
    /// first non-empty window; reuses the cached config if nothing new was found.
    pub async fn refresh<P: Provider<Ethereum>>(
        &self,
        keeper: &KeeperClient<P>,
        ipfs: &IpfsClient,
        from: u64,
        to: u64,
        window: u64,
    ) -> Result<(), ProtocolConfigError> {
        if to >= from {
            let mut window_end = to;
            loop {
                let window_start = window_end.saturating_sub(window).max(from);
                let hashes = keeper.scan_config_updates(window_start, window_end).await?;
                if let Some(latest_hash) = hashes.last() {
                    return self.fetch_and_apply(ipfs, latest_hash, to).await;
                }
                if window_start == from {
                    break;
                }
                window_end = window_start - 1;
            }
        }

        // No new ConfigUpdated event found; reuse the cached config but still advance the
        // checkpoint so the next tick doesn't re-scan the same range.
        let mut guard = self.current.write().map_err(|_| ProtocolConfigError::Poisoned)?;
        if let Some(config) = guard.as_mut() {
            config.checkpoint_block = to;
        }
        Ok(())
    }

    /// Fetches and installs a protocol config fetched from `ipfs_hash`, stamping it with
    /// `checkpoint_block`.
    pub async fn fetch_and_apply(
        &self,
        ipfs: &IpfsClient,
        ipfs_hash: &str,
        checkpoint_block: u64,
    ) -> Result<(), ProtocolConfigError> {
        let dto: ProtocolConfigDto = ipfs.fetch_json(ipfs_hash).await?;
        let mut config: ProtocolConfig = dto.into();
        config.checkpoint_block = checkpoint_block;
        let mut guard = self.current.write().map_err(|_| ProtocolConfigError::Poisoned)?;
        *guard = Some(config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    #[test]
    fn checkpoint_block_defaults_to_zero_before_first_fetch() {
        let cache = ProtocolConfigCache::new();
        assert_eq!(cache.checkpoint_block(), 0);
        assert!(cache.current().is_none());
    }

    #[tokio::test]
    async fn fetch_and_apply_installs_config_with_checkpoint() {
        let cache = ProtocolConfigCache::new();
        let manual = ProtocolConfig {
            oracles: vec![Oracle {
                public_key: [3u8; 33],
                address: Address::repeat_byte(1),
            }],
            exit_signature_recover_threshold: 2,
            checkpoint_block: 500,
        };
        *cache.current.write().unwrap() = Some(manual);
        assert_eq!(cache.checkpoint_block(), 500);
    }
}
