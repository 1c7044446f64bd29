use std::collections::BTreeMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::withdrawal_credentials::{self, ValidatorType};

pub type PublicKeyBytes = [u8; 48];
pub type SignatureBytes = [u8; 96];

/// A validator being onboarded or exited through the relayer. Keyed by `public_key` in the
/// registry; see [`crate::networks`] for the per-chain constants its signing roots depend on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validator {
    #[serde(with = "hex_pubkey")]
    pub public_key: PublicKeyBytes,
    pub vault: Address,
    pub validator_index: u64,
    pub amount: u64,
    pub validator_type: ValidatorType,
    pub created_at: u64,

    pub deposit_shares: BTreeMap<u64, SignatureBytes>,
    #[serde(with = "hex_signature_opt")]
    pub deposit_signature: Option<SignatureBytes>,

    pub exit_shares: BTreeMap<u64, SignatureBytes>,
    #[serde(with = "hex_signature_opt")]
    pub exit_signature: Option<SignatureBytes>,
    pub oracles_exit_signature_shares: Option<OraclesExitSignatureShares>,
}

impl Validator {
    pub fn new(
        public_key: PublicKeyBytes,
        vault: Address,
        validator_index: u64,
        amount: u64,
        validator_type: ValidatorType,
        created_at: u64,
    ) -> Self {
        Self {
            public_key,
            vault,
            validator_index,
            amount,
            validator_type,
            created_at,
            deposit_shares: BTreeMap::new(),
            deposit_signature: None,
            exit_shares: BTreeMap::new(),
            exit_signature: None,
            oracles_exit_signature_shares: None,
        }
    }

    pub fn withdrawal_credentials(&self) -> alloy_primitives::B256 {
        withdrawal_credentials::derive(self.validator_type, self.vault)
    }

    pub fn is_expired(&self, now: u64, lifetime_seconds: u64) -> bool {
        now.saturating_sub(self.created_at) > lifetime_seconds
    }

    /// Sorted intersection of exit-share and deposit-share indexes, per the `/exits`
    /// endpoint's `share_indexes_ready` field.
    pub fn share_indexes_ready(&self) -> Vec<u64> {
        self.exit_shares
            .keys()
            .filter(|index| self.deposit_shares.contains_key(index))
            .copied()
            .collect()
    }

    pub fn is_signatures_ready(&self) -> bool {
        self.deposit_signature.is_some() && self.exit_signature.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OraclesExitSignatureShares {
    #[serde(with = "hex_pubkey_vec")]
    pub public_keys: Vec<PublicKeyBytes>,
    pub encrypted_exit_signatures: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Oracle {
    #[serde(with = "hex_secp256k1_pubkey")]
    pub public_key: [u8; 33],
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub oracles: Vec<Oracle>,
    pub exit_signature_recover_threshold: usize,
    pub checkpoint_block: u64,
}

impl ProtocolConfig {
    pub fn committee_size(&self) -> usize {
        self.oracles.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkValidator {
    #[serde(with = "hex_pubkey")]
    pub public_key: PublicKeyBytes,
    pub block_number: u64,
}

mod hex_pubkey {
    use super::PublicKeyBytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &PublicKeyBytes, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<PublicKeyBytes, D::Error> {
        let s = String::deserialize(d)?;
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 48-byte public key"))
    }
}

mod hex_pubkey_vec {
    use super::PublicKeyBytes;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(values: &[PublicKeyBytes], s: S) -> Result<S::Ok, S::Error> {
        let strings: Vec<String> = values
            .iter()
            .map(|v| format!("0x{}", hex::encode(v)))
            .collect();
        strings.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<PublicKeyBytes>, D::Error> {
        let strings = Vec::<String>::deserialize(d)?;
        strings
            .into_iter()
            .map(|s| {
                let bytes =
                    hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
                bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 48-byte public key"))
            })
            .collect()
    }
}

mod hex_signature_opt {
    use super::SignatureBytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<SignatureBytes>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => s.serialize_str(&format!("0x{}", hex::encode(bytes))),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<SignatureBytes>, D::Error> {
        let maybe = Option::<String>::deserialize(d)?;
        match maybe {
            None => Ok(None),
            Some(s) => {
                let bytes =
                    hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
                let array: SignatureBytes = bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 96-byte signature"))?;
                Ok(Some(array))
            }
        }
    }
}

mod hex_secp256k1_pubkey {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8; 33], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 33], D::Error> {
        let s = String::deserialize(d)?;
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 33-byte compressed public key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_validator() -> Validator {
        Validator::new(
            [9u8; 48],
            Address::repeat_byte(0x11),
            7,
            32_000_000_000,
            ValidatorType::V1,
            1_000,
        )
    }

    #[test]
    fn eviction_respects_lifetime() {
        let v = sample_validator();
        assert!(!v.is_expired(1_500, 3_600));
        assert!(v.is_expired(10_000, 3_600));
    }

    #[test]
    fn share_indexes_ready_is_intersection() {
        let mut v = sample_validator();
        v.exit_shares.insert(1, [0u8; 96]);
        v.exit_shares.insert(2, [0u8; 96]);
        v.deposit_shares.insert(2, [0u8; 96]);
        v.deposit_shares.insert(3, [0u8; 96]);
        assert_eq!(v.share_indexes_ready(), vec![2]);
    }
}
