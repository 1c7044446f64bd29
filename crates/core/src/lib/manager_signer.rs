//! Produces the final ECDSA signature over an EIP-712 validators-manager signing hash
//! (§4.2), using the off-chain `VALIDATORS_MANAGER_PRIVATE_KEY` that the relayer — not any
//! sidecar — holds directly.

use alloy::primitives::B256;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use thiserror::Error;

use crate::eth_client::{decode_secret_key, ProviderError};

#[derive(Debug, Error)]
pub enum ManagerSignerError {
    #[error(transparent)]
    Decode(#[from] ProviderError),
    #[error(transparent)]
    Signing(#[from] alloy::signers::Error),
}

pub struct ManagerSigner {
    signer: PrivateKeySigner,
}

impl ManagerSigner {
    pub fn from_hex(raw: &str) -> Result<Self, ManagerSignerError> {
        let key = decode_secret_key(raw)?;
        Ok(Self {
            signer: PrivateKeySigner::from(key),
        })
    }

    pub fn address(&self) -> alloy::primitives::Address {
        self.signer.address()
    }

    /// Signs a pre-computed EIP-712 signing hash and returns the 65-byte `r || s || v` signature.
    pub async fn sign_hash(&self, hash: B256) -> Result<[u8; 65], ManagerSignerError> {
        let signature = self.signer.sign_hash(&hash).await?;
        Ok(signature.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signing_is_deterministic_and_recovers_configured_address() {
        let raw_key = "0x0000000000000000000000000000000000000000000000000000000000000001";
        let signer = ManagerSigner::from_hex(raw_key).expect("valid key");
        let hash = B256::repeat_byte(0x42);

        let sig_a = signer.sign_hash(hash).await.expect("sign");
        let sig_b = signer.sign_hash(hash).await.expect("sign");
        assert_eq!(sig_a, sig_b);
    }
}
