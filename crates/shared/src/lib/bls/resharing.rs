//! Re-splits an already-reconstructed BLS point into a fresh `t`-of-`n` Shamir sharing.
//!
//! The relayer never learns the discrete log of a signature or a validator public key (no
//! party ever does, by the DVT design these keys come from), so a "secret" here is always a
//! curve point rather than a scalar. Splitting still works: pick `t - 1` uniformly random
//! points as the higher-degree "coefficients" of a point-valued polynomial whose constant
//! term is the point being shared, then evaluate at `i = 1..=n`. Lagrange interpolation over
//! any `t`-subset recovers the constant term exactly as in scalar-valued Shamir sharing,
//! since both point addition and scalar multiplication by `i^k` are linear operations.

use blst::{blst_p1, blst_p2};
use rand::RngCore;

use super::g1;
use super::g2;
use super::scalar::{pow_u64, Fr};

fn random_scalar(rng: &mut impl RngCore) -> Fr {
    let mut limbs = [0u8; 8];
    rng.fill_bytes(&mut limbs);
    Fr::from_u64(u64::from_le_bytes(limbs))
}

/// Splits `secret` into `n` shares (indexes `1..=n`) reconstructible by any `threshold` of them.
pub fn split_g2(
    secret: &blst_p2,
    threshold: usize,
    n: usize,
    rng: &mut impl RngCore,
) -> Vec<(u64, blst_p2)> {
    let coefficients: Vec<blst_p2> = (1..threshold)
        .map(|_| g2::mul(&g2::generator(), &random_scalar(rng)))
        .collect();
    (1..=n as u64)
        .map(|i| {
            let mut share = *secret;
            for (k, coeff_point) in coefficients.iter().enumerate() {
                let weight = pow_u64(i, (k + 1) as u32);
                share = g2::add(&share, &g2::mul(coeff_point, &weight));
            }
            (i, share)
        })
        .collect()
}

/// G1 counterpart of [`split_g2`], used to derive oracle public-key shares from a validator's
/// public key so that the same share indexes Lagrange-reconstruct both the signature and the
/// public key.
pub fn split_g1(
    secret: &blst_p1,
    threshold: usize,
    n: usize,
    rng: &mut impl RngCore,
) -> Vec<(u64, blst_p1)> {
    let coefficients: Vec<blst_p1> = (1..threshold)
        .map(|_| g1::mul(&g1::generator(), &random_scalar(rng)))
        .collect();
    (1..=n as u64)
        .map(|i| {
            let mut share = *secret;
            for (k, coeff_point) in coefficients.iter().enumerate() {
                let weight = pow_u64(i, (k + 1) as u32);
                share = g1::add(&share, &g1::mul(coeff_point, &weight));
            }
            (i, share)
        })
        .collect()
}

/// Compressed-bytes convenience wrapper over [`split_g2`], for callers (the oracle resharing
/// pipeline) that only ever handle wire-format signature bytes.
pub fn split_g2_compressed(
    secret: &[u8; g2::G2_COMPRESSED_LEN],
    threshold: usize,
    n: usize,
    rng: &mut impl RngCore,
) -> Result<Vec<(u64, [u8; g2::G2_COMPRESSED_LEN])>, g2::G2Error> {
    let point = g2::from_compressed(secret)?;
    Ok(split_g2(&point, threshold, n, rng)
        .into_iter()
        .map(|(i, p)| (i, g2::to_compressed(&p)))
        .collect())
}

/// Compressed-bytes convenience wrapper over [`split_g1`], used to derive oracle public-key
/// shares from a validator's compressed public key.
pub fn split_g1_compressed(
    secret: &[u8; g1::G1_COMPRESSED_LEN],
    threshold: usize,
    n: usize,
    rng: &mut impl RngCore,
) -> Result<Vec<(u64, [u8; g1::G1_COMPRESSED_LEN])>, g1::G1Error> {
    let point = g1::from_compressed(secret)?;
    Ok(split_g1(&point, threshold, n, rng)
        .into_iter()
        .map(|(i, p)| (i, g1::to_compressed(&p)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bls::aggregator::{recover_public_key, recover_signature};
    use std::collections::BTreeMap;

    #[test]
    fn g1_resharing_round_trip_any_quorum() {
        let secret = g1::mul(&g1::generator(), &Fr::from_u64(424242));
        let shares = split_g1(&secret, 3, 5, &mut rand::rng());

        // Any 3-of-5 subset must reconstruct the same point.
        let subset_a: BTreeMap<u64, [u8; g1::G1_COMPRESSED_LEN]> = shares[0..3]
            .iter()
            .map(|(i, p)| (*i, g1::to_compressed(p)))
            .collect();
        let subset_b: BTreeMap<u64, [u8; g1::G1_COMPRESSED_LEN]> = shares[2..5]
            .iter()
            .map(|(i, p)| (*i, g1::to_compressed(p)))
            .collect();

        let recovered_a = recover_public_key(&subset_a).unwrap();
        let recovered_b = recover_public_key(&subset_b).unwrap();
        assert_eq!(recovered_a, g1::to_compressed(&secret));
        assert_eq!(recovered_b, g1::to_compressed(&secret));
    }

    #[test]
    fn g2_resharing_round_trip_any_quorum() {
        let secret = g2::mul(&g2::generator(), &Fr::from_u64(13371337));
        let shares = split_g2(&secret, 2, 3, &mut rand::rng());
        let subset: BTreeMap<u64, [u8; g2::G2_COMPRESSED_LEN]> = shares[1..3]
            .iter()
            .map(|(i, p)| (*i, g2::to_compressed(p)))
            .collect();
        let recovered = recover_signature(&subset).unwrap();
        assert_eq!(recovered, g2::to_compressed(&secret));
    }
}
