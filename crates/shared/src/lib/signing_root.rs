//! SSZ signing roots for exit and deposit messages, used to validate reconstructed BLS
//! signatures against the Ethereum consensus-layer's canonical domain-separated hashes.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::{typenum, FixedVector};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

use crate::networks::NetworkConfig;

pub type Hash256 = B256;
pub type Epoch = u64;
pub type Gwei = u64;
pub type BlsPublicKeyBytes = FixedVector<u8, typenum::U48>;
pub type BlsSignatureBytes = FixedVector<u8, typenum::U96>;
pub type Version = FixedVector<u8, typenum::U4>;

const DOMAIN_VOLUNTARY_EXIT: [u8; 4] = [0x04, 0x00, 0x00, 0x00];
const DOMAIN_DEPOSIT: [u8; 4] = [0x03, 0x00, 0x00, 0x00];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct ForkData {
    pub current_version: Version,
    pub genesis_validators_root: Hash256,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct SigningData {
    pub object_root: Hash256,
    pub domain: Hash256,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct VoluntaryExit {
    pub epoch: Epoch,
    pub validator_index: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct DepositMessage {
    pub pubkey: BlsPublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    pub amount: Gwei,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct DepositData {
    pub pubkey: BlsPublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    pub amount: Gwei,
    pub signature: BlsSignatureBytes,
}

/// The `deposit_data_root` stored alongside a validator once its deposit signature is known;
/// distinct from [`deposit_signing_root`], which is what that signature is computed *over*.
pub fn deposit_data_root(
    pubkey: [u8; 48],
    withdrawal_credentials: Hash256,
    amount: Gwei,
    signature: [u8; 96],
) -> Hash256 {
    DepositData {
        pubkey: BlsPublicKeyBytes::from(pubkey.to_vec()),
        withdrawal_credentials,
        amount,
        signature: BlsSignatureBytes::from(signature.to_vec()),
    }
    .tree_hash_root()
}

fn compute_fork_data_root(current_version: [u8; 4], genesis_validators_root: Hash256) -> Hash256 {
    ForkData {
        current_version: Version::from(current_version.to_vec()),
        genesis_validators_root,
    }
    .tree_hash_root()
}

fn compute_domain(
    domain_type: [u8; 4],
    fork_version: [u8; 4],
    genesis_validators_root: Hash256,
) -> Hash256 {
    let fork_data_root = compute_fork_data_root(fork_version, genesis_validators_root);
    let mut domain = [0u8; 32];
    domain[0..4].copy_from_slice(&domain_type);
    domain[4..32].copy_from_slice(&fork_data_root.as_slice()[0..28]);
    Hash256::from(domain)
}

fn compute_signing_root(object_root: Hash256, domain: Hash256) -> Hash256 {
    SigningData {
        object_root,
        domain,
    }
    .tree_hash_root()
}

/// Signing root for the exit message, under the Shapella (Capella) fork and the network's
/// real genesis validators root.
pub fn exit_signing_root(validator_index: u64, network: &NetworkConfig) -> Hash256 {
    let exit = VoluntaryExit {
        epoch: network.shapella_epoch,
        validator_index,
    };
    let domain = compute_domain(
        DOMAIN_VOLUNTARY_EXIT,
        network.shapella_fork_version,
        network.genesis_validators_root,
    );
    compute_signing_root(exit.tree_hash_root(), domain)
}

/// Signing root for the deposit message. Per the consensus spec the deposit domain is always
/// computed against a zeroed genesis validators root, regardless of network.
pub fn deposit_signing_root(
    pubkey: [u8; 48],
    withdrawal_credentials: Hash256,
    amount: Gwei,
    network: &NetworkConfig,
) -> Hash256 {
    let message = DepositMessage {
        pubkey: BlsPublicKeyBytes::from(pubkey.to_vec()),
        withdrawal_credentials,
        amount,
    };
    let domain = compute_domain(DOMAIN_DEPOSIT, network.genesis_fork_version, Hash256::ZERO);
    compute_signing_root(message.tree_hash_root(), domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::Network;

    #[test]
    fn deposit_root_is_deterministic() {
        let network = Network::Mainnet.config();
        let pubkey = [7u8; 48];
        let wc = Hash256::repeat_byte(1);
        let a = deposit_signing_root(pubkey, wc, 32_000_000_000, network);
        let b = deposit_signing_root(pubkey, wc, 32_000_000_000, network);
        assert_eq!(a, b);
    }

    #[test]
    fn exit_root_changes_with_validator_index() {
        let network = Network::Mainnet.config();
        let a = exit_signing_root(1, network);
        let b = exit_signing_root(2, network);
        assert_ne!(a, b);
    }

    #[test]
    fn exit_root_differs_across_networks() {
        let a = exit_signing_root(42, Network::Mainnet.config());
        let b = exit_signing_root(42, Network::Holesky.config());
        assert_ne!(a, b);
    }
}
