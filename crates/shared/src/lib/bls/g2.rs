//! Point arithmetic on the G2 subgroup (where BLS signatures live), via blst's raw FFI.
//!
//! `blst::min_pk::Signature` only exposes parse/serialize/verify; reconstructing a signature
//! from shares requires scaling arbitrary G2 points by arbitrary scalars and summing them,
//! which is exactly what this module provides.

use super::scalar::{Fr, SCALAR_NBITS};
use blst::{
    blst_p2, blst_p2_add_or_double, blst_p2_affine, blst_p2_affine_compress, blst_p2_from_affine,
    blst_p2_generator, blst_p2_mult, blst_p2_to_affine, blst_p2_uncompress, BLST_ERROR,
};
use thiserror::Error;

pub const G2_COMPRESSED_LEN: usize = 96;

#[derive(Debug, Error)]
pub enum G2Error {
    #[error("failed to decompress G2 point: blst error code {0:?}")]
    Decompress(BLST_ERROR),
}

pub fn identity() -> blst_p2 {
    let mut zero = blst_p2::default();
    unsafe { blst_p2_add_or_double(&mut zero, &zero.clone(), &zero.clone()) };
    zero
}

pub fn generator() -> blst_p2 {
    let mut out = blst_p2::default();
    unsafe {
        let affine_gen = blst_p2_generator();
        blst_p2_from_affine(&mut out, affine_gen);
    }
    out
}

pub fn from_compressed(bytes: &[u8]) -> Result<blst_p2, G2Error> {
    let mut affine = blst_p2_affine::default();
    let err = unsafe { blst_p2_uncompress(&mut affine, bytes.as_ptr()) };
    if err != BLST_ERROR::BLST_SUCCESS {
        return Err(G2Error::Decompress(err));
    }
    let mut jacobian = blst_p2::default();
    unsafe { blst_p2_from_affine(&mut jacobian, &affine) };
    Ok(jacobian)
}

pub fn to_compressed(p: &blst_p2) -> [u8; G2_COMPRESSED_LEN] {
    let mut affine = blst_p2_affine::default();
    unsafe { blst_p2_to_affine(&mut affine, p) };
    let mut out = [0u8; G2_COMPRESSED_LEN];
    unsafe { blst_p2_affine_compress(out.as_mut_ptr(), &affine) };
    out
}

pub fn add(a: &blst_p2, b: &blst_p2) -> blst_p2 {
    let mut out = blst_p2::default();
    unsafe { blst_p2_add_or_double(&mut out, a, b) };
    out
}

pub fn mul(p: &blst_p2, scalar: &Fr) -> blst_p2 {
    let bytes = scalar.to_scalar_bytes();
    let mut out = blst_p2::default();
    unsafe { blst_p2_mult(&mut out, p, bytes.as_ptr(), SCALAR_NBITS) };
    out
}

/// Weighted sum `sum(coeff_i * point_i)`, used by both Lagrange recovery and resharing.
pub fn weighted_sum(terms: &[(blst_p2, Fr)]) -> blst_p2 {
    let mut acc = identity();
    for (point, coeff) in terms {
        acc = add(&acc, &mul(point, coeff));
    }
    acc
}
