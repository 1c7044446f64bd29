//! Point arithmetic on the G1 subgroup (where BLS public keys live), via blst's raw FFI.
//!
//! Only used for the test-only `recover_public_key` path and for deriving oracle public-key
//! shares during re-sharing — see [`super::g2`] for the signature-side counterpart.

use super::scalar::{Fr, SCALAR_NBITS};
use blst::{
    blst_p1, blst_p1_add_or_double, blst_p1_affine, blst_p1_affine_compress, blst_p1_from_affine,
    blst_p1_generator, blst_p1_mult, blst_p1_to_affine, blst_p1_uncompress, BLST_ERROR,
};
use thiserror::Error;

pub const G1_COMPRESSED_LEN: usize = 48;

#[derive(Debug, Error)]
pub enum G1Error {
    #[error("failed to decompress G1 point: blst error code {0:?}")]
    Decompress(BLST_ERROR),
}

pub fn identity() -> blst_p1 {
    let mut zero = blst_p1::default();
    unsafe { blst_p1_add_or_double(&mut zero, &zero.clone(), &zero.clone()) };
    zero
}

pub fn generator() -> blst_p1 {
    let mut out = blst_p1::default();
    unsafe {
        let affine_gen = blst_p1_generator();
        blst_p1_from_affine(&mut out, affine_gen);
    }
    out
}

pub fn from_compressed(bytes: &[u8]) -> Result<blst_p1, G1Error> {
    let mut affine = blst_p1_affine::default();
    let err = unsafe { blst_p1_uncompress(&mut affine, bytes.as_ptr()) };
    if err != BLST_ERROR::BLST_SUCCESS {
        return Err(G1Error::Decompress(err));
    }
    let mut jacobian = blst_p1::default();
    unsafe { blst_p1_from_affine(&mut jacobian, &affine) };
    Ok(jacobian)
}

pub fn to_compressed(p: &blst_p1) -> [u8; G1_COMPRESSED_LEN] {
    let mut affine = blst_p1_affine::default();
    unsafe { blst_p1_to_affine(&mut affine, p) };
    let mut out = [0u8; G1_COMPRESSED_LEN];
    unsafe { blst_p1_affine_compress(out.as_mut_ptr(), &affine) };
    out
}

pub fn add(a: &blst_p1, b: &blst_p1) -> blst_p1 {
    let mut out = blst_p1::default();
    unsafe { blst_p1_add_or_double(&mut out, a, b) };
    out
}

pub fn mul(p: &blst_p1, scalar: &Fr) -> blst_p1 {
    let bytes = scalar.to_scalar_bytes();
    let mut out = blst_p1::default();
    unsafe { blst_p1_mult(&mut out, p, bytes.as_ptr(), SCALAR_NBITS) };
    out
}

pub fn weighted_sum(terms: &[(blst_p1, Fr)]) -> blst_p1 {
    let mut acc = identity();
    for (point, coeff) in terms {
        acc = add(&acc, &mul(point, coeff));
    }
    acc
}
