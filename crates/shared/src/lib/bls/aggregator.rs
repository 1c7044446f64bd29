//! Threshold BLS signature/public-key recovery via Lagrange interpolation at x = 0.

use std::collections::BTreeMap;

use blst::min_pk::{PublicKey, Signature};
use blst::BLST_ERROR;
use thiserror::Error;

use super::g1::{self, G1_COMPRESSED_LEN};
use super::g2::{self, G2_COMPRESSED_LEN};
use super::scalar::lagrange_coefficient_at_zero;

/// Ethereum consensus-layer's BLS signature domain separation tag (proof-of-possession
/// scheme, minimal-pubkey-size variant).
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

#[derive(Debug, Error)]
pub enum BlsError {
    #[error("need at least one share to recover a signature")]
    EmptyShareSet,
    #[error("share index must be >= 1, got {0}")]
    NonPositiveIndex(u64),
    #[error(transparent)]
    G2(#[from] g2::G2Error),
    #[error(transparent)]
    G1(#[from] g1::G1Error),
    #[error("malformed public key bytes")]
    InvalidPublicKey,
    #[error("malformed signature bytes")]
    InvalidSignature,
    #[error("signature failed pairing verification")]
    VerificationFailed,
}

/// Reconstructs a full BLS signature from a quorum of `(share_index, signature_share)` pairs.
/// `share_index` is the 1-based x-coordinate assigned to each DVT sidecar.
pub fn recover_signature(
    shares: &BTreeMap<u64, [u8; G2_COMPRESSED_LEN]>,
) -> Result<[u8; G2_COMPRESSED_LEN], BlsError> {
    if shares.is_empty() {
        return Err(BlsError::EmptyShareSet);
    }
    let indices: Vec<u64> = shares.keys().copied().collect();
    for &i in &indices {
        if i == 0 {
            return Err(BlsError::NonPositiveIndex(i));
        }
    }

    let mut terms = Vec::with_capacity(shares.len());
    for (&i, bytes) in shares {
        let point = g2::from_compressed(bytes)?;
        let others: Vec<u64> = indices.iter().copied().filter(|&j| j != i).collect();
        let coeff = lagrange_coefficient_at_zero(i, &others);
        terms.push((point, coeff));
    }
    let recovered = g2::weighted_sum(&terms);
    Ok(g2::to_compressed(&recovered))
}

/// Test-only mirror of [`recover_signature`] over G1, used to check that public-key shares
/// handed to the oracle committee are consistent with the real validator public key.
pub fn recover_public_key(
    shares: &BTreeMap<u64, [u8; G1_COMPRESSED_LEN]>,
) -> Result<[u8; G1_COMPRESSED_LEN], BlsError> {
    if shares.is_empty() {
        return Err(BlsError::EmptyShareSet);
    }
    let indices: Vec<u64> = shares.keys().copied().collect();
    let mut terms = Vec::with_capacity(shares.len());
    for (&i, bytes) in shares {
        let point = g1::from_compressed(bytes)?;
        let others: Vec<u64> = indices.iter().copied().filter(|&j| j != i).collect();
        let coeff = lagrange_coefficient_at_zero(i, &others);
        terms.push((point, coeff));
    }
    let recovered = g1::weighted_sum(&terms);
    Ok(g1::to_compressed(&recovered))
}

/// Pairing-verifies a reconstructed (or directly supplied) signature against a signing root.
pub fn verify(
    public_key: &[u8; G1_COMPRESSED_LEN],
    signing_root: &[u8; 32],
    signature: &[u8; G2_COMPRESSED_LEN],
) -> Result<(), BlsError> {
    let pk = PublicKey::from_bytes(public_key).map_err(|_| BlsError::InvalidPublicKey)?;
    let sig = Signature::from_bytes(signature).map_err(|_| BlsError::InvalidSignature)?;
    match sig.verify(true, signing_root, DST, &[], &pk, true) {
        BLST_ERROR::BLST_SUCCESS => Ok(()),
        _ => Err(BlsError::VerificationFailed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bls::resharing::split_g2;
    use blst::min_pk::SecretKey;
    use rand::RngCore;

    fn random_ikm() -> [u8; 32] {
        let mut ikm = [0u8; 32];
        rand::rng().fill_bytes(&mut ikm);
        ikm
    }

    #[test]
    fn threshold_recovery_round_trip() {
        let ikm = random_ikm();
        let sk = SecretKey::key_gen(&ikm, &[]).unwrap();
        let pk = sk.sk_to_pk();
        let message = b"exit-signature-root-placeholder-32-bytes-long!!";
        let signing_root: [u8; 32] = {
            let mut buf = [0u8; 32];
            buf.copy_from_slice(&message[..32]);
            buf
        };
        let full_sig = sk.sign(&signing_root, DST, &[]);
        let full_sig_point = g2::from_compressed(&full_sig.compress()).unwrap();

        let shares = split_g2(&full_sig_point, 3, 4, &mut rand::rng());
        let mut subset = BTreeMap::new();
        for (index, point) in shares.into_iter().take(3) {
            subset.insert(index, g2::to_compressed(&point));
        }

        let recovered = recover_signature(&subset).unwrap();
        assert_eq!(recovered, full_sig.compress());
        verify(&pk.compress(), &signing_root, &recovered).unwrap();
    }

    #[test]
    fn empty_share_set_rejected() {
        let shares: BTreeMap<u64, [u8; G2_COMPRESSED_LEN]> = BTreeMap::new();
        assert!(matches!(
            recover_signature(&shares),
            Err(BlsError::EmptyShareSet)
        ));
    }
}
