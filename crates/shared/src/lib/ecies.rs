//! ECIES (Elliptic Curve Integrated Encryption Scheme) over secp256k1, built from the same
//! RustCrypto-family crates (`k256`, `sha2`) already used elsewhere in the stack for signer
//! key handling, composed with `hkdf` key derivation and `aes-gcm` authenticated encryption.
//! No off-the-shelf "ecies" crate with real, fetchable source exists for this stack; ECIES is
//! itself just this standard composition of primitives, not a bespoke cipher.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use hkdf::Hkdf;
use k256::ecdh::diffie_hellman;
use k256::{PublicKey, SecretKey};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

const HKDF_INFO: &[u8] = b"dvt-relayer-oracle-share-ecies-v1";
const EPHEMERAL_PUBKEY_LEN: usize = 33;
const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum EciesError {
    #[error("malformed ciphertext: too short")]
    Truncated,
    #[error("malformed ephemeral public key")]
    InvalidEphemeralKey,
    #[error("key derivation failed")]
    KeyDerivation,
    #[error("authenticated encryption failed")]
    Encryption,
    #[error("authenticated decryption failed (wrong key or tampered ciphertext)")]
    Decryption,
}

fn derive_key(shared_secret: &[u8]) -> Result<[u8; 32], EciesError> {
    let hk = Hkdf::<Sha256>::new(None, shared_secret);
    let mut okm = [0u8; 32];
    hk.expand(HKDF_INFO, &mut okm)
        .map_err(|_| EciesError::KeyDerivation)?;
    Ok(okm)
}

/// Encrypts `plaintext` (an oracle's re-share of the exit signature) under `recipient`'s
/// secp256k1 public key. Output layout: `ephemeral_pubkey(33) || nonce(12) || ciphertext`.
pub fn encrypt(
    recipient: &PublicKey,
    plaintext: &[u8],
    rng: &mut impl RngCore,
) -> Result<Vec<u8>, EciesError> {
    let ephemeral_secret = SecretKey::random(rng);
    let ephemeral_public = ephemeral_secret.public_key();

    let shared = diffie_hellman(ephemeral_secret.to_nonzero_scalar(), recipient.as_affine());
    let key_bytes = derive_key(shared.raw_secret_bytes().as_slice())?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| EciesError::Encryption)?;

    let mut out = Vec::with_capacity(EPHEMERAL_PUBKEY_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(ephemeral_public.to_encoded_point(true).as_bytes());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Test-support decrypt path (an oracle's own key material never passes through the relayer
/// in production, but the round trip is how correctness of [`encrypt`] is checked).
pub fn decrypt(recipient_secret: &SecretKey, blob: &[u8]) -> Result<Vec<u8>, EciesError> {
    if blob.len() < EPHEMERAL_PUBKEY_LEN + NONCE_LEN {
        return Err(EciesError::Truncated);
    }
    let (ephemeral_pubkey_bytes, rest) = blob.split_at(EPHEMERAL_PUBKEY_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let ephemeral_public = PublicKey::from_sec1_bytes(ephemeral_pubkey_bytes)
        .map_err(|_| EciesError::InvalidEphemeralKey)?;

    let shared = diffie_hellman(
        recipient_secret.to_nonzero_scalar(),
        ephemeral_public.as_affine(),
    );
    let key_bytes = derive_key(shared.raw_secret_bytes().as_slice())?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| EciesError::Decryption)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_round_trip() {
        let mut rng = rand::rng();
        let secret = SecretKey::random(&mut rng);
        let public = secret.public_key();

        let plaintext = b"96-byte-bls-signature-share-placeholder-bytes-here";
        let ciphertext = encrypt(&public, plaintext, &mut rng).unwrap();
        let decrypted = decrypt(&secret, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn tampered_ciphertext_fails_to_decrypt() {
        let mut rng = rand::rng();
        let secret = SecretKey::random(&mut rng);
        let public = secret.public_key();

        let mut ciphertext = encrypt(&public, b"share", &mut rng).unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;
        assert!(decrypt(&secret, &ciphertext).is_err());
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let mut rng = rand::rng();
        let secret_a = SecretKey::random(&mut rng);
        let public_a = secret_a.public_key();
        let secret_b = SecretKey::random(&mut rng);

        let ciphertext = encrypt(&public_a, b"share", &mut rng).unwrap();
        assert!(decrypt(&secret_b, &ciphertext).is_err());
    }
}
