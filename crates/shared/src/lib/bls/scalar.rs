//! Scalar-field arithmetic on BLS12-381's prime-order subgroup.
//!
//! `blst::min_pk` only exposes parsing, aggregation and pairing-verification of points; it
//! has no API for multiplying an arbitrary point by an arbitrary scalar, which Lagrange
//! interpolation and Shamir re-splitting both need. This module wraps the handful of raw
//! `blst_fr_*`/`blst_scalar_*` FFI entry points required for that, and nothing else.

use blst::{blst_fr, blst_fr_add, blst_fr_inverse, blst_fr_mul, blst_fr_sub};
use blst::{blst_fr_from_scalar, blst_scalar, blst_scalar_from_fr, blst_scalar_from_uint64};

/// BLS12-381's scalar field order is 255 bits (< 2^255).
pub const SCALAR_NBITS: usize = 255;

/// An element of the scalar field, in the representation `blst_fr` expects (Montgomery form).
#[derive(Clone, Copy)]
pub struct Fr(pub(crate) blst_fr);

impl Fr {
    pub fn zero() -> Self {
        Fr::from_u64(0)
    }

    pub fn one() -> Self {
        Fr::from_u64(1)
    }

    pub fn from_u64(v: u64) -> Self {
        let limbs: [u64; 4] = [v, 0, 0, 0];
        let mut scalar = blst_scalar::default();
        let mut fr = blst_fr::default();
        unsafe {
            blst_scalar_from_uint64(&mut scalar, limbs.as_ptr());
            blst_fr_from_scalar(&mut fr, &scalar);
        }
        Fr(fr)
    }

    pub fn add(&self, other: &Fr) -> Fr {
        let mut out = blst_fr::default();
        unsafe { blst_fr_add(&mut out, &self.0, &other.0) };
        Fr(out)
    }

    pub fn sub(&self, other: &Fr) -> Fr {
        let mut out = blst_fr::default();
        unsafe { blst_fr_sub(&mut out, &self.0, &other.0) };
        Fr(out)
    }

    pub fn mul(&self, other: &Fr) -> Fr {
        let mut out = blst_fr::default();
        unsafe { blst_fr_mul(&mut out, &self.0, &other.0) };
        Fr(out)
    }

    pub fn neg(&self) -> Fr {
        Fr::zero().sub(self)
    }

    /// Multiplicative inverse. Callers are responsible for never calling this on zero —
    /// within this crate that can only happen for two distinct, positive share indices
    /// producing `i - j == 0`, which is impossible.
    pub fn inverse(&self) -> Fr {
        let mut out = blst_fr::default();
        unsafe { blst_fr_inverse(&mut out, &self.0) };
        Fr(out)
    }

    pub fn to_scalar_bytes(&self) -> [u8; 32] {
        let mut scalar = blst_scalar::default();
        unsafe { blst_scalar_from_fr(&mut scalar, &self.0) };
        scalar.b
    }
}

/// Computes the Lagrange basis coefficient `L_i(0) = prod_{j != i} (-j) / (i - j)` for share
/// index `i` over the set `others` (the remaining indices in the interpolation set).
pub fn lagrange_coefficient_at_zero(i: u64, others: &[u64]) -> Fr {
    let i_fr = Fr::from_u64(i);
    let mut numerator = Fr::one();
    let mut denominator = Fr::one();
    for &j in others {
        let j_fr = Fr::from_u64(j);
        numerator = numerator.mul(&j_fr.neg());
        denominator = denominator.mul(&i_fr.sub(&j_fr));
    }
    numerator.mul(&denominator.inverse())
}

/// `i^k` in the scalar field, for small `k` (polynomial-coefficient weighting in Shamir
/// re-splitting, where `k` never exceeds the sharing threshold).
pub fn pow_u64(base: u64, exponent: u32) -> Fr {
    let base_fr = Fr::from_u64(base);
    let mut acc = Fr::one();
    for _ in 0..exponent {
        acc = acc.mul(&base_fr);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lagrange_coefficients_sum_consistency() {
        // For the set {1, 2, 3}, the coefficients of the degree-2 interpolation at x=0
        // are rational but their weighted combination with any consistent polynomial
        // must reconstruct the constant term; we sanity check via the scalar-only case:
        // evaluate f(x) = 5 + 7x + 11x^2 at x in {1,2,3}, reconstruct f(0) = 5.
        let f = |x: u64| -> Fr {
            let c0 = Fr::from_u64(5);
            let c1 = Fr::from_u64(7).mul(&Fr::from_u64(x));
            let c2 = Fr::from_u64(11).mul(&pow_u64(x, 2));
            c0.add(&c1).add(&c2)
        };
        let indices = [1u64, 2, 3];
        let mut acc = Fr::zero();
        for (pos, &i) in indices.iter().enumerate() {
            let others: Vec<u64> = indices
                .iter()
                .enumerate()
                .filter(|(p, _)| *p != pos)
                .map(|(_, &v)| v)
                .collect();
            let coeff = lagrange_coefficient_at_zero(i, &others);
            acc = acc.add(&coeff.mul(&f(i)));
        }
        assert_eq!(acc.to_scalar_bytes(), Fr::from_u64(5).to_scalar_bytes());
    }
}
