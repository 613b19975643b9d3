// -*- mode: rust; -*-
//
// This file is part of ledger-ed25519.
// See LICENSE for licensing information.

//! This module contains various constants (such as curve parameters and
//! useful field elements like `sqrt(-1)`), as well as the lookup tables
//! of pre-computed basepoint multiples.
//!
//! All values here are process-wide read-only data: the literal
//! constants are baked into the binary, and the two basepoint tables
//! are derived once from `ED25519_BASEPOINT_POINT` on first use and
//! never mutated afterwards, so they are safe to share across threads
//! without synchronization.

#![allow(non_snake_case)]

use lazy_static::lazy_static;

use crate::edwards::{AffineNielsPoint, CompressedEdwardsY, ExtendedPoint, Identity};
use crate::field::FieldElement;
use crate::scalar::Scalar;

/// Edwards `d` value, equal to `-121665/121666 mod p`.
pub(crate) const EDWARDS_D: FieldElement = FieldElement([
    -10913610, 13857413, -15372611, 6949391, 114729,
    -8787816, -6275908, -3247719, -18696448, -12055116,
]);

/// Edwards `2*d` value, equal to `2*(-121665/121666) mod p`.
pub(crate) const EDWARDS_D2: FieldElement = FieldElement([
    -21827239, -5839606, -30745221, 13898782, 229458,
    15978800, -12551817, -6495438, 29715968, 9444199,
]);

/// Precomputed value of one of the square roots of -1 (mod p).
pub(crate) const SQRT_M1: FieldElement = FieldElement([
    -32595792, -7943725, 9377950, 3500415, 12389472,
    -272473, -25146209, -2005654, 326686, 11406482,
]);

/// In Montgomery form y² = x³+Ax²+x, Curve25519 has A = 486662.
#[allow(dead_code)]
pub(crate) const MONTGOMERY_A: FieldElement =
    FieldElement([486662, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

/// The Ed25519 basepoint has y = 4/5.  This is called `_POINT` to
/// distinguish it from `_TABLE`, which should be used for scalar
/// multiplication (it's much faster).
pub const ED25519_BASEPOINT_POINT: ExtendedPoint = ExtendedPoint {
    X: FieldElement([
        -14297830, -7645148, 16144683, -16471763, 27570974,
        -2696100, -26142465, 8378389, 20764389, 8758491,
    ]),
    Y: FieldElement([
        -26843541, -6710886, 13421773, -13421773, 26843546,
        6710886, -13421773, 13421773, -26843546, -6710886,
    ]),
    Z: FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
    T: FieldElement([
        28827062, -6116119, -27349572, 244363, 8635006,
        11264893, 19351346, 13413597, 16611511, -6414980,
    ]),
};

/// The canonical compressed form of the Ed25519 basepoint.
///
/// These are the bytes of 4/5 in 𝔽ₚ; the sign bit is 0 since the
/// basepoint has x chosen to be positive.
pub const BASE_CMPRSSD: CompressedEdwardsY = CompressedEdwardsY([
    0x58, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
]);

/// `BASEPOINT_ORDER` is the order of the basepoint, i.e.
/// `l = 2^252 + 27742317777372353535851937790883648493`, in
/// little-endian bytes.
pub const BASEPOINT_ORDER: Scalar = Scalar([
    0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58,
    0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde, 0x14,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
]);

/// The eight affine-Niels multiples `[P, 2P, ..., 8P]` of a point.
fn affine_multiples_of(P: &ExtendedPoint) -> [AffineNielsPoint; 8] {
    let mut multiples = [P.to_affine_niels(); 8];
    let mut Q = *P;
    for multiple in multiples.iter_mut() {
        *multiple = Q.to_affine_niels();
        Q = &Q + P;
    }
    multiples
}

lazy_static! {
    /// Table containing precomputed multiples of the basepoint
    /// `B = (x, 4/5)`, used by the constant-structure fixed-base
    /// scalar multiplication.
    ///
    /// Row `i` holds `[16^2i·B, 2·16^2i·B, ..., 8·16^2i·B]`, so that a
    /// radix-16 signed digit at window position `i` can be looked up
    /// directly (with sign correction applied afterwards).
    pub static ref ED25519_BASEPOINT_TABLE: [[AffineNielsPoint; 8]; 32] = {
        let mut table = [[AffineNielsPoint::identity(); 8]; 32];
        let mut P = ED25519_BASEPOINT_POINT;
        for row in table.iter_mut() {
            *row = affine_multiples_of(&P);
            // Advance by 16^2 = 256.
            P = P.mult_by_pow_2(8);
        }
        table
    };

    /// Odd multiples `[B, 3B, 5B, 7B, 9B, 11B, 13B, 15B]` of the
    /// basepoint, used by the variable-time double-scalar
    /// multiplication during verification.
    pub static ref AFFINE_ODD_MULTIPLES_OF_BASEPOINT: [AffineNielsPoint; 8] = {
        let mut multiples = [ED25519_BASEPOINT_POINT.to_affine_niels(); 8];
        let B2 = ED25519_BASEPOINT_POINT.double();
        let mut Q = ED25519_BASEPOINT_POINT;
        for multiple in multiples.iter_mut().skip(1) {
            Q = &Q + &B2;
            *multiple = Q.to_affine_niels();
        }
        multiples
    };
}

#[cfg(test)]
mod test {
    use crate::constants;
    use crate::edwards::ValidityCheck;
    use crate::field::FieldElement;

    /// Test that SQRT_M1 is a square root of -1.
    #[test]
    fn sqrt_minus_one() {
        let minus_one = FieldElement::minus_one();
        let sqrt_m1_sq = &constants::SQRT_M1 * &constants::SQRT_M1;
        assert_eq!(minus_one, sqrt_m1_sq);
    }

    /// Test that d = -121665/121666.
    #[test]
    fn d_vs_ratio() {
        let a = -&FieldElement([121665, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let b = FieldElement([121666, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let d = &a * &b.invert();
        let d2 = &d + &d;
        assert_eq!(d, constants::EDWARDS_D);
        assert_eq!(d2, constants::EDWARDS_D2);
    }

    #[test]
    fn basepoint_is_valid() {
        assert!(constants::ED25519_BASEPOINT_POINT.is_valid());
    }

    /// The basepoint multiplied by the group order is the identity.
    #[test]
    fn basepoint_has_order_l() {
        use crate::edwards::{ExtendedPoint, IsIdentity};

        // l·B = (l-1)·B + B = -B + B; compute (l-1)·B via basepoint
        // multiplication, since l itself is not a reduced scalar.
        let mut l_minus_1 = constants::BASEPOINT_ORDER;
        l_minus_1.0[0] -= 1;
        let almost = ExtendedPoint::basepoint_mult(&l_minus_1);
        let full_order = &almost + &constants::ED25519_BASEPOINT_POINT;
        assert!(full_order.is_identity());
        // And (l-1)·B is -B.
        assert_eq!(almost, -(&constants::ED25519_BASEPOINT_POINT));
    }
}
