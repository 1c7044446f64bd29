//! In-memory validator lifecycle registry (§4.3) and the aggregation protocol that runs a
//! share submission through Lagrange recovery, pairing verification, and — for exit
//! signatures — oracle resharing (§4.4, §4.5).

use std::collections::HashMap;
use std::sync::Mutex;

use alloy_primitives::Address;
use dvt_relayer_shared::bls::{self, aggregator::BlsError};
use dvt_relayer_shared::ecies::{self, EciesError};
use dvt_relayer_shared::networks::NetworkConfig;
use dvt_relayer_shared::signing_root;
use dvt_relayer_shared::types::{Oracle, OraclesExitSignatureShares, ProtocolConfig, Validator};
use dvt_relayer_shared::withdrawal_credentials::ValidatorType;
use thiserror::Error;

pub type PublicKeyBytes = [u8; 48];
pub type SignatureBytes = [u8; 96];

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Bls(#[from] BlsError),
    #[error(transparent)]
    G2(#[from] dvt_relayer_shared::bls::g2::G2Error),
    #[error(transparent)]
    G1(#[from] dvt_relayer_shared::bls::g1::G1Error),
    #[error(transparent)]
    Ecies(#[from] EciesError),
    #[error("malformed oracle public key for address {0}")]
    MalformedOraclePublicKey(Address),
    #[error("poisoned registry mutex")]
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareKind {
    Exit,
    Deposit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    IdempotentSkip,
    ThresholdReachedAndCommitted,
}

pub struct ValidatorRegistry {
    validators: Mutex<HashMap<PublicKeyBytes, Validator>>,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self {
            validators: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<PublicKeyBytes, Validator>>, RegistryError> {
        self.validators.lock().map_err(|_| RegistryError::Poisoned)
    }

    pub fn len(&self) -> Result<usize, RegistryError> {
        Ok(self.lock()?.len())
    }

    pub fn get(&self, public_key: &PublicKeyBytes) -> Result<Option<Validator>, RegistryError> {
        Ok(self.lock()?.get(public_key).cloned())
    }

    pub fn list(&self) -> Result<Vec<Validator>, RegistryError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    /// Returns the existing entry if `validator_index` matches; otherwise creates a fresh
    /// record, dropping any shares accumulated under the old index (§3 replace semantics).
    pub fn get_or_create(
        &self,
        public_key: PublicKeyBytes,
        validator_index: u64,
        vault: Address,
        amount: u64,
        validator_type: ValidatorType,
        now: u64,
    ) -> Result<Validator, RegistryError> {
        let mut guard = self.lock()?;
        if let Some(existing) = guard.get(&public_key) {
            if existing.validator_index == validator_index {
                return Ok(existing.clone());
            }
        }
        let fresh = Validator::new(public_key, vault, validator_index, amount, validator_type, now);
        guard.insert(public_key, fresh.clone());
        Ok(fresh)
    }

    /// Deletes every record older than `ttl` seconds (§4.8); returns the number evicted.
    pub fn evict_expired(&self, now: u64, ttl: u64) -> Result<usize, RegistryError> {
        let mut guard = self.lock()?;
        let before = guard.len();
        guard.retain(|_, v| !v.is_expired(now, ttl));
        Ok(before - guard.len())
    }

    /// Submits a signature share for `kind`, idempotent per `(public_key, share_index)`
    /// (§4.5). On reaching the committee threshold, reconstructs, verifies, and — for exit
    /// shares — computes the oracle resharing payload.
    ///
    /// `signature_threshold_override` is `SIGNATURE_THRESHOLD` (§6): when set, it overrides
    /// `protocol_config.exit_signature_recover_threshold` as the quorum size sidecar shares
    /// must reach before recovery runs.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_share(
        &self,
        public_key: &PublicKeyBytes,
        share_index: u64,
        share: SignatureBytes,
        kind: ShareKind,
        network: &NetworkConfig,
        protocol_config: &ProtocolConfig,
        signature_threshold_override: Option<usize>,
    ) -> Result<SubmitOutcome, RegistryError> {
        let mut guard = self.lock()?;
        let Some(validator) = guard.get_mut(public_key) else {
            return Ok(SubmitOutcome::IdempotentSkip);
        };

        let shares = match kind {
            ShareKind::Exit => &mut validator.exit_shares,
            ShareKind::Deposit => &mut validator.deposit_shares,
        };
        if shares.contains_key(&share_index) {
            return Ok(SubmitOutcome::IdempotentSkip);
        }
        shares.insert(share_index, share);

        let threshold = signature_threshold_override.unwrap_or(protocol_config.exit_signature_recover_threshold);
        if shares.len() < threshold {
            return Ok(SubmitOutcome::Accepted);
        }

        match kind {
            ShareKind::Exit => {
                let recovered = bls::recover_signature(&validator.exit_shares)?;
                let signing_root = signing_root::exit_signing_root(validator.validator_index, network);
                bls::verify(&validator.public_key, signing_root.as_slice().try_into().unwrap(), &recovered)?;
                validator.exit_signature = Some(recovered);
                validator.oracles_exit_signature_shares =
                    Some(compute_oracle_shares(&recovered, &validator.public_key, protocol_config)?);
            }
            ShareKind::Deposit => {
                let recovered = bls::recover_signature(&validator.deposit_shares)?;
                let wc = validator.withdrawal_credentials();
                let signing_root = signing_root::deposit_signing_root(
                    validator.public_key,
                    wc,
                    validator.amount,
                    network,
                );
                bls::verify(&validator.public_key, signing_root.as_slice().try_into().unwrap(), &recovered)?;
                validator.deposit_signature = Some(recovered);
            }
        }

        Ok(SubmitOutcome::ThresholdReachedAndCommitted)
    }
}

/// §4.4: re-split the reconstructed exit signature (and the validator's public key, in
/// lockstep) into one fresh share per oracle, ECIES-encrypted under that oracle's key.
fn compute_oracle_shares(
    exit_signature: &SignatureBytes,
    public_key: &PublicKeyBytes,
    protocol_config: &ProtocolConfig,
) -> Result<OraclesExitSignatureShares, RegistryError> {
    let n = protocol_config.oracles.len();
    let t = protocol_config.exit_signature_recover_threshold;
    let mut rng = rand::rng();

    let signature_shares = dvt_relayer_shared::bls::resharing::split_g2_compressed(exit_signature, t, n, &mut rng)?;
    let pubkey_shares = dvt_relayer_shared::bls::resharing::split_g1_compressed(public_key, t, n, &mut rng)?;

    let mut public_keys = Vec::with_capacity(n);
    let mut encrypted_exit_signatures = Vec::with_capacity(n);

    for (oracle, ((_, sig_share), (_, pk_share))) in protocol_config
        .oracles
        .iter()
        .zip(signature_shares.iter().zip(pubkey_shares.iter()))
    {
        let encrypted = encrypt_share_for_oracle(oracle, sig_share)?;
        public_keys.push(*pk_share);
        encrypted_exit_signatures.push(format!("0x{}", hex::encode(encrypted)));
    }

    Ok(OraclesExitSignatureShares {
        public_keys,
        encrypted_exit_signatures,
    })
}

fn encrypt_share_for_oracle(oracle: &Oracle, share: &[u8; 96]) -> Result<Vec<u8>, RegistryError> {
    let recipient = k256::PublicKey::from_sec1_bytes(&oracle.public_key)
        .map_err(|_| RegistryError::MalformedOraclePublicKey(oracle.address))?;
    let mut rng = rand::rng();
    Ok(ecies::encrypt(&recipient, share, &mut rng)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blst::min_pk::SecretKey;
    use dvt_relayer_shared::bls::resharing::split_g2;
    use dvt_relayer_shared::networks::Network;

    fn random_ikm() -> [u8; 32] {
        let mut ikm = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::rng(), &mut ikm);
        ikm
    }

    fn oracle_committee(n: usize) -> Vec<Oracle> {
        (0..n)
            .map(|i| {
                let secret = k256::SecretKey::random(&mut rand::rng());
                let public = secret.public_key();
                Oracle {
                    public_key: public.to_encoded_point(true).as_bytes().try_into().unwrap(),
                    address: Address::repeat_byte(i as u8 + 1),
                }
            })
            .collect()
    }

    #[test]
    fn threshold_recovery_round_trip_through_registry() {
        let network = Network::Mainnet.config();
        let validator_index = 42u64;

        let ikm = random_ikm();
        let sk = SecretKey::key_gen(&ikm, &[]).unwrap();
        let pk = sk.sk_to_pk();
        let public_key: PublicKeyBytes = pk.compress();

        let root = dvt_relayer_shared::signing_root::exit_signing_root(validator_index, network);
        let full_sig = sk.sign(root.as_slice(), dvt_relayer_shared::bls::DST, &[]);
        let full_sig_point =
            dvt_relayer_shared::bls::g2::from_compressed(&full_sig.compress()).unwrap();
        let shares = split_g2(&full_sig_point, 3, 4, &mut rand::rng());

        let protocol_config = ProtocolConfig {
            oracles: oracle_committee(3),
            exit_signature_recover_threshold: 3,
            checkpoint_block: 0,
        };

        let registry = ValidatorRegistry::new();
        registry
            .get_or_create(public_key, validator_index, Address::ZERO, 32_000_000_000, ValidatorType::V1, 0)
            .unwrap();

        let mut last_outcome = SubmitOutcome::Accepted;
        for (index, point) in shares.into_iter().take(3) {
            last_outcome = registry
                .submit_share(
                    &public_key,
                    index,
                    dvt_relayer_shared::bls::g2::to_compressed(&point),
                    ShareKind::Exit,
                    network,
                    &protocol_config,
                    None,
                )
                .unwrap();
        }

        assert_eq!(last_outcome, SubmitOutcome::ThresholdReachedAndCommitted);
        let stored = registry.get(&public_key).unwrap().unwrap();
        assert!(stored.exit_signature.is_some());
        assert_eq!(
            stored.oracles_exit_signature_shares.unwrap().public_keys.len(),
            3
        );
    }

    #[test]
    fn duplicate_share_index_is_idempotent() {
        let network = Network::Mainnet.config();
        let protocol_config = ProtocolConfig {
            oracles: oracle_committee(3),
            exit_signature_recover_threshold: 3,
            checkpoint_block: 0,
        };
        let registry = ValidatorRegistry::new();
        let public_key = [5u8; 48];
        registry
            .get_or_create(public_key, 1, Address::ZERO, 1, ValidatorType::V1, 0)
            .unwrap();

        let first = registry
            .submit_share(&public_key, 1, [1u8; 96], ShareKind::Exit, network, &protocol_config, None)
            .unwrap();
        let second = registry
            .submit_share(&public_key, 1, [2u8; 96], ShareKind::Exit, network, &protocol_config, None)
            .unwrap();

        assert_eq!(first, SubmitOutcome::Accepted);
        assert_eq!(second, SubmitOutcome::IdempotentSkip);
        let stored = registry.get(&public_key).unwrap().unwrap();
        assert_eq!(stored.exit_shares.get(&1), Some(&[1u8; 96]));
    }

    /// `SIGNATURE_THRESHOLD` (§6) overrides `protocol_config.exit_signature_recover_threshold`:
    /// with a quorum of 4 oracles but an override of 2, recovery should fire after the second
    /// share instead of waiting for the fourth.
    #[test]
    fn signature_threshold_override_lowers_the_recovery_quorum() {
        let network = Network::Mainnet.config();
        let validator_index = 7u64;

        let ikm = random_ikm();
        let sk = SecretKey::key_gen(&ikm, &[]).unwrap();
        let pk = sk.sk_to_pk();
        let public_key: PublicKeyBytes = pk.compress();

        let root = dvt_relayer_shared::signing_root::exit_signing_root(validator_index, network);
        let full_sig = sk.sign(root.as_slice(), dvt_relayer_shared::bls::DST, &[]);
        let full_sig_point = dvt_relayer_shared::bls::g2::from_compressed(&full_sig.compress()).unwrap();
        let shares = split_g2(&full_sig_point, 4, 4, &mut rand::rng());

        let protocol_config = ProtocolConfig {
            oracles: oracle_committee(4),
            exit_signature_recover_threshold: 4,
            checkpoint_block: 0,
        };

        let registry = ValidatorRegistry::new();
        registry
            .get_or_create(public_key, validator_index, Address::ZERO, 32_000_000_000, ValidatorType::V1, 0)
            .unwrap();

        let mut last_outcome = SubmitOutcome::Accepted;
        for (index, point) in shares.into_iter().take(2) {
            last_outcome = registry
                .submit_share(
                    &public_key,
                    index,
                    dvt_relayer_shared::bls::g2::to_compressed(&point),
                    ShareKind::Exit,
                    network,
                    &protocol_config,
                    Some(2),
                )
                .unwrap();
        }

        assert_eq!(last_outcome, SubmitOutcome::ThresholdReachedAndCommitted);
    }

    #[test]
    fn replacing_with_a_different_validator_index_drops_shares() {
        let registry = ValidatorRegistry::new();
        let public_key = [9u8; 48];
        registry
            .get_or_create(public_key, 100, Address::ZERO, 1, ValidatorType::V1, 0)
            .unwrap();
        let protocol_config = ProtocolConfig {
            oracles: oracle_committee(1),
            exit_signature_recover_threshold: 3,
            checkpoint_block: 0,
        };
        registry
            .submit_share(&public_key, 1, [1u8; 96], ShareKind::Exit, Network::Mainnet.config(), &protocol_config, None)
            .unwrap();

        let replaced = registry
            .get_or_create(public_key, 50, Address::ZERO, 1, ValidatorType::V1, 0)
            .unwrap();
        assert_eq!(replaced.validator_index, 50);
        assert!(replaced.exit_shares.is_empty());
    }

    #[test]
    fn eviction_removes_expired_entries() {
        let registry = ValidatorRegistry::new();
        registry
            .get_or_create([1u8; 48], 1, Address::ZERO, 1, ValidatorType::V1, 0)
            .unwrap();
        assert_eq!(registry.len().unwrap(), 1);
        let evicted = registry.evict_expired(10_000, 3_600).unwrap();
        assert_eq!(evicted, 1);
        assert_eq!(registry.len().unwrap(), 0);
    }
}
