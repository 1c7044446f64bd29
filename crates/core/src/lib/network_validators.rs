//! Network-validators scanner (§4.6): ingests `DepositEvent` logs in sliding windows,
//! SSZ-verifies the embedded deposit signature, and maintains the durable "registered" set.

use std::collections::HashSet;
use std::sync::RwLock;

use alloy::network::Ethereum;
use alloy::providers::Provider;
use dvt_relayer_shared::networks::NetworkConfig;
use dvt_relayer_shared::signing_root;
use dvt_relayer_shared::util::{erroring_add, IntegerError};
use thiserror::Error;

use crate::eth_client::{ContractError, ValidatorsRegistryClient};
use crate::genesis_dump::{self, GenesisDumpError};
use crate::ipfs_client::{IpfsClient, IpfsError};
use crate::store::{NetworkValidatorStore, StoreError};

pub const SCAN_WINDOW_SECONDS: u64 = 43_200;

#[derive(Debug, Error)]
pub enum ScannerError {
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Ipfs(#[from] IpfsError),
    #[error(transparent)]
    GenesisDump(#[from] GenesisDumpError),
    #[error(transparent)]
    Integer(#[from] IntegerError),
}

pub struct NetworkValidatorsScanner {
    store: NetworkValidatorStore,
    registered: RwLock<HashSet<[u8; 48]>>,
    last_processed_block: std::sync::atomic::AtomicU64,
}

impl NetworkValidatorsScanner {
    pub fn new(store: NetworkValidatorStore) -> Result<Self, ScannerError> {
        let known = store.all_public_keys()?;
        let last_processed_block = store.max_block_number()?.unwrap_or(0);
        Ok(Self {
            store,
            registered: RwLock::new(known.into_iter().collect()),
            last_processed_block: std::sync::atomic::AtomicU64::new(last_processed_block),
        })
    }

    pub fn last_processed_block(&self) -> u64 {
        self.last_processed_block.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn is_registered(&self, pubkey: &[u8; 48]) -> bool {
        self.registered.read().map(|set| set.contains(pubkey)).unwrap_or(false)
    }

    pub fn registered_count(&self) -> usize {
        self.registered.read().map(|set| set.len()).unwrap_or(0)
    }

    /// One-time bootstrap: if the store is empty and a genesis dump hash is configured, fetch
    /// and bulk-load it before the first scan tick runs.
    pub async fn load_genesis(&self, ipfs: &IpfsClient, genesis_hash: &str) -> Result<usize, ScannerError> {
        if !self.store.is_empty()? {
            return Ok(0);
        }

        let bytes = ipfs.fetch_bytes(genesis_hash).await?;
        let records = genesis_dump::parse(&bytes)?;
        let rows: Vec<([u8; 48], u64)> = records.iter().map(|r| (r.pubkey, r.block_number)).collect();
        self.store.bulk_insert(&rows)?;

        let mut guard = self.registered.write().expect("registered set lock poisoned");
        for record in &records {
            guard.insert(record.pubkey);
        }
        let max_block = records.iter().map(|r| r.block_number).max().unwrap_or(0);
        self.last_processed_block
            .fetch_max(max_block, std::sync::atomic::Ordering::SeqCst);
        Ok(rows.len())
    }

    /// One tick of §4.6: scans `[last_processed_block + 1, to]` in `window`-block slices,
    /// verifying each deposit's embedded signature before admitting it.
    pub async fn scan<P: Provider<Ethereum>>(
        &self,
        client: &ValidatorsRegistryClient<P>,
        to: u64,
        window: u64,
        network: &NetworkConfig,
    ) -> Result<usize, ScannerError> {
        let from = erroring_add(self.last_processed_block(), 1)?;
        if from > to {
            return Ok(0);
        }

        let mut inserted = 0;
        let mut cursor = from;
        while cursor <= to {
            let window_end = (cursor + window - 1).min(to);
            let events = client.scan_deposit_events(cursor, window_end).await?;
            for event in events {
                let wc = alloy_primitives::B256::from(event.withdrawal_credentials);
                let root = signing_root::deposit_signing_root(event.pubkey, wc, event.amount_gwei, network);
                let root_bytes: [u8; 32] = root.into();
                if dvt_relayer_shared::bls::verify(&event.pubkey, &root_bytes, &event.signature).is_err() {
                    continue;
                }
                self.store.insert(&event.pubkey, event.block_number)?;
                let mut guard = self.registered.write().expect("registered set lock poisoned");
                guard.insert(event.pubkey);
                inserted += 1;
            }
            cursor = erroring_add(window_end, 1)?;
        }

        self.last_processed_block
            .store(to, std::sync::atomic::Ordering::SeqCst);
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_with_an_empty_store() {
        let store = NetworkValidatorStore::in_memory().unwrap();
        let scanner = NetworkValidatorsScanner::new(store).unwrap();
        assert_eq!(scanner.last_processed_block(), 0);
        assert_eq!(scanner.registered_count(), 0);
    }

    #[test]
    fn bootstraps_registered_set_from_existing_store_rows() {
        let store = NetworkValidatorStore::in_memory().unwrap();
        store.bulk_insert(&[([1u8; 48], 10), ([2u8; 48], 20)]).unwrap();
        let scanner = NetworkValidatorsScanner::new(store).unwrap();
        assert_eq!(scanner.last_processed_block(), 20);
        assert!(scanner.is_registered(&[1u8; 48]));
        assert!(!scanner.is_registered(&[9u8; 48]));
    }
}
