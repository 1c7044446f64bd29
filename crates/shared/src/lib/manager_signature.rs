//! EIP-712 typed-data hashes for the four validators-manager operations. Hashing is domain
//! logic and lives here; actually producing the ECDSA signature over the hash requires a
//! private key and lives in the core crate's adapter layer.

use alloy_primitives::{Address, B256};
use alloy_sol_types::{eip712_domain, sol, SolStruct};

sol! {
    struct RegisterValidator {
        bytes pubkey;
        bytes withdrawalCredentials;
        uint64 amount;
        bytes signature;
        bytes32 depositDataRoot;
    }

    struct Register {
        bytes32 validatorsRegistryRoot;
        RegisterValidator[] validators;
    }

    struct FundValidator {
        bytes pubkey;
        uint64 amount;
    }

    struct Fund {
        uint256 nonce;
        FundValidator[] validators;
    }

    struct Withdraw {
        uint256 nonce;
        bytes[] publicKeys;
        uint64[] amounts;
    }

    struct Consolidate {
        uint256 nonce;
        bytes[] sourcePublicKeys;
        bytes[] targetPublicKeys;
    }
}

fn domain(chain_id: u64, vault: Address) -> alloy_sol_types::Eip712Domain {
    eip712_domain! {
        name: "VaultsRegistry",
        version: "1",
        chain_id: chain_id,
        verifying_contract: vault,
    }
}

pub fn register_signing_hash(
    chain_id: u64,
    vault: Address,
    validators_registry_root: B256,
    validators: Vec<RegisterValidator>,
) -> B256 {
    let message = Register {
        validatorsRegistryRoot: validators_registry_root,
        validators,
    };
    message.eip712_signing_hash(&domain(chain_id, vault))
}

pub fn fund_signing_hash(
    chain_id: u64,
    vault: Address,
    nonce: alloy_primitives::U256,
    validators: Vec<FundValidator>,
) -> B256 {
    let message = Fund { nonce, validators };
    message.eip712_signing_hash(&domain(chain_id, vault))
}

pub fn withdraw_signing_hash(
    chain_id: u64,
    vault: Address,
    nonce: alloy_primitives::U256,
    public_keys: Vec<Vec<u8>>,
    amounts: Vec<u64>,
) -> B256 {
    let message = Withdraw {
        nonce,
        publicKeys: public_keys.into_iter().map(Into::into).collect(),
        amounts,
    };
    message.eip712_signing_hash(&domain(chain_id, vault))
}

pub fn consolidate_signing_hash(
    chain_id: u64,
    vault: Address,
    nonce: alloy_primitives::U256,
    source_public_keys: Vec<Vec<u8>>,
    target_public_keys: Vec<Vec<u8>>,
) -> B256 {
    let message = Consolidate {
        nonce,
        sourcePublicKeys: source_public_keys.into_iter().map(Into::into).collect(),
        targetPublicKeys: target_public_keys.into_iter().map(Into::into).collect(),
    };
    message.eip712_signing_hash(&domain(chain_id, vault))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn register_hash_is_deterministic_and_domain_bound() {
        let vault = Address::repeat_byte(0x42);
        let root = B256::ZERO;
        let validators = vec![RegisterValidator {
            pubkey: vec![1u8; 48].into(),
            withdrawalCredentials: vec![2u8; 32].into(),
            amount: 32_000_000_000,
            signature: vec![3u8; 96].into(),
            depositDataRoot: B256::repeat_byte(4),
        }];

        let a = register_signing_hash(1, vault, root, validators.clone());
        let b = register_signing_hash(1, vault, root, validators.clone());
        assert_eq!(a, b);

        let different_chain = register_signing_hash(17000, vault, root, validators);
        assert_ne!(a, different_chain);
    }

    #[test]
    fn withdraw_hash_changes_with_nonce() {
        let vault = Address::repeat_byte(0x7);
        let keys = vec![vec![9u8; 48]];
        let amounts = vec![1_000_000_000u64];
        let a = withdraw_signing_hash(1, vault, U256::from(0u64), keys.clone(), amounts.clone());
        let b = withdraw_signing_hash(1, vault, U256::from(1u64), keys, amounts);
        assert_ne!(a, b);
    }
}
