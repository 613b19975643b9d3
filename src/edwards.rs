// -*- mode: rust; -*-
//
// This file is part of ledger-ed25519.
// See LICENSE for licensing information.

//! Group operations on the twisted Edwards curve
//! -x² + y² = 1 + dx²y² modulo p = 2²⁵⁵-19, with d = -121665/121666.
//!
//! Following the implementation strategy of the "ref10" reference
//! implementation of Ed25519, we use several models for curve points:
//!
//! * `CompletedPoint`: points in 𝗣¹(𝔽ₚ)×𝗣¹(𝔽ₚ), the transient result of
//!   an addition or doubling before normalization;
//! * `ExtendedPoint`: points in 𝗣³(𝔽ₚ) with X·Y = Z·T;
//! * `ProjectivePoint`: points in 𝗣²(𝔽ₚ).
//!
//! Finally, to accelerate additions, we use two cached point formats,
//! one for the affine model and one for the 𝗣³ model:
//!
//! * `AffineNielsPoint`: `(y+x, y-x, 2dxy)`, the entries of the fixed
//!   basepoint tables;
//! * `ProjectiveNielsPoint`: `(Y+X, Y-X, Z, 2dT)`, the cached operand
//!   for addition of a variable point.

// We allow non snake_case names because coordinates in projective space
// are traditionally denoted by the capitalisation of their respective
// counterparts in affine space.
#![allow(non_snake_case)]

use core::fmt::Debug;
use core::ops::{Add, Neg, Sub};

use subtle::{Choice, ConditionallyNegatable, ConditionallySelectable, ConstantTimeEq};

use crate::constants;
use crate::field::FieldElement;
use crate::scalar::Scalar;

// ------------------------------------------------------------------------
// Compressed points
// ------------------------------------------------------------------------

/// In "Edwards y" format, the point `(x,y)` on the curve is determined
/// by the `y`-coordinate and the sign of `x`, marshalled into a 32-byte
/// array.
///
/// The first 255 bits of a `CompressedEdwardsY` represent the
/// y-coordinate.  The high bit of the 32nd byte gives the sign of `x`.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct CompressedEdwardsY(pub [u8; 32]);

impl Debug for CompressedEdwardsY {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "CompressedEdwardsY: {:?}", self.as_bytes())
    }
}

impl CompressedEdwardsY {
    /// View this `CompressedEdwardsY` as an array of bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Copy this `CompressedEdwardsY` to an array of bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Attempt to decompress to an `ExtendedPoint`.
    ///
    /// Recovers `x` from `y` as `x = u·v³·(u·v⁷)^((p-5)/8)` with
    /// `u = y²-1`, `v = dy²+1`, multiplying by `√-1` when the first
    /// candidate fails the curve equation, and selecting between `x`
    /// and `-x` by the sign bit.
    ///
    /// Returns `None` if the input is not the `y`-coordinate of a curve
    /// point.
    ///
    /// # Warning
    ///
    /// The `y`-coordinate is not required to be canonically encoded:
    /// bit 255 is treated purely as the sign of `x`, and `y ≥ p` is
    /// reduced rather than rejected.  The ZIP215 verification rules
    /// depend on this tolerance; the RFC 8032 path recovers strictness
    /// by re-encoding and comparing bytes.
    pub fn decompress(&self) -> Option<ExtendedPoint> {
        let Y = FieldElement::from_bytes(self.as_bytes());
        let Z = FieldElement::one();
        let YY = Y.square();
        let u = &YY - &Z; // u =  y²-1
        let v = &(&YY * &constants::EDWARDS_D) + &Z; // v = dy²+1

        let v3 = &v.square() * &v; // v³
        let v7 = &v3.square() * &v; // v⁷
        let uv3 = &u * &v3;
        let uv7 = &u * &v7;
        let mut X = &uv3 * &uv7.pow_p58(); // x = uv³(uv⁷)^((p-5)/8)

        let vxx = &X.square() * &v;
        let check = &vxx - &u; // vx²-u
        if bool::from(check.is_nonzero()) {
            let check2 = &vxx + &u; // vx²+u
            if bool::from(check2.is_nonzero()) {
                return None;
            }
            X = &X * &constants::SQRT_M1;
        }

        let compressed_sign_bit = Choice::from(self.as_bytes()[31] >> 7);
        let current_sign_bit = Choice::from(X.is_negative());
        X.conditional_negate(current_sign_bit ^ compressed_sign_bit);

        let T = &X * &Y;
        Some(ExtendedPoint { X, Y, Z, T })
    }
}

// ------------------------------------------------------------------------
// Internal point representations
// ------------------------------------------------------------------------

/// An `ExtendedPoint` is a point on the curve in 𝗣³(𝔽ₚ).
/// A point (x,y) in the affine model corresponds to (x:y:1:xy).
#[derive(Copy, Clone)]
pub struct ExtendedPoint {
    pub(crate) X: FieldElement,
    pub(crate) Y: FieldElement,
    pub(crate) Z: FieldElement,
    pub(crate) T: FieldElement,
}

/// A `ProjectivePoint` is a point on the curve in 𝗣²(𝔽ₚ).
/// A point (x,y) in the affine model corresponds to (x:y:1).
#[derive(Copy, Clone)]
pub struct ProjectivePoint {
    pub(crate) X: FieldElement,
    pub(crate) Y: FieldElement,
    pub(crate) Z: FieldElement,
}

/// A `CompletedPoint` is a point ((X:Z), (Y:T)) in 𝗣¹(𝔽ₚ)×𝗣¹(𝔽ₚ).
/// A point (x,y) in the affine model corresponds to ((x:1),(y:1)).
#[derive(Copy, Clone)]
pub struct CompletedPoint {
    X: FieldElement,
    Y: FieldElement,
    Z: FieldElement,
    T: FieldElement,
}

/// A pre-computed point in the affine model for the curve, represented
/// as (y+x, y-x, 2dxy).  These precomputations accelerate addition and
/// subtraction against the fixed basepoint tables.
// Safe to derive Eq because affine coordinates.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct AffineNielsPoint {
    pub(crate) y_plus_x: FieldElement,
    pub(crate) y_minus_x: FieldElement,
    pub(crate) xy2d: FieldElement,
}

/// A pre-computed point in the 𝗣³(𝔽ₚ) model for the curve, represented
/// as (Y+X, Y-X, Z, 2dT), the cached operand of point addition.
#[derive(Copy, Clone)]
pub struct ProjectiveNielsPoint {
    Y_plus_X: FieldElement,
    Y_minus_X: FieldElement,
    Z: FieldElement,
    T2d: FieldElement,
}

// ------------------------------------------------------------------------
// Constructors
// ------------------------------------------------------------------------

/// Trait for curve point types which have an identity constructor.
pub trait Identity {
    /// Returns the identity element of the curve.
    /// Can be used as a constructor.
    fn identity() -> Self;
}

impl Identity for CompressedEdwardsY {
    fn identity() -> CompressedEdwardsY {
        let mut bytes = [0u8; 32];
        bytes[0] = 1;
        CompressedEdwardsY(bytes)
    }
}

impl Identity for ExtendedPoint {
    fn identity() -> ExtendedPoint {
        ExtendedPoint {
            X: FieldElement::zero(),
            Y: FieldElement::one(),
            Z: FieldElement::one(),
            T: FieldElement::zero(),
        }
    }
}

impl Identity for ProjectivePoint {
    fn identity() -> ProjectivePoint {
        ProjectivePoint {
            X: FieldElement::zero(),
            Y: FieldElement::one(),
            Z: FieldElement::one(),
        }
    }
}

impl Identity for ProjectiveNielsPoint {
    fn identity() -> ProjectiveNielsPoint {
        ProjectiveNielsPoint {
            Y_plus_X: FieldElement::one(),
            Y_minus_X: FieldElement::one(),
            Z: FieldElement::one(),
            T2d: FieldElement::zero(),
        }
    }
}

impl Identity for AffineNielsPoint {
    fn identity() -> AffineNielsPoint {
        AffineNielsPoint {
            y_plus_x: FieldElement::one(),
            y_minus_x: FieldElement::one(),
            xy2d: FieldElement::zero(),
        }
    }
}

// ------------------------------------------------------------------------
// Validity checks (for debugging and tests, not CT)
// ------------------------------------------------------------------------

/// Trait for checking whether a point is on the curve.
pub trait ValidityCheck {
    /// Checks whether the point is on the curve.  Not CT.
    fn is_valid(&self) -> bool;
}

impl ValidityCheck for ProjectivePoint {
    fn is_valid(&self) -> bool {
        // Curve equation is    -x^2 + y^2 = 1 + d*x^2*y^2,
        // homogenized as (-X^2 + Y^2)*Z^2 = Z^4 + d*X^2*Y^2
        let XX = self.X.square();
        let YY = self.Y.square();
        let ZZ = self.Z.square();
        let ZZZZ = ZZ.square();
        let lhs = &(&YY - &XX) * &ZZ;
        let rhs = &ZZZZ + &(&constants::EDWARDS_D * &(&XX * &YY));

        lhs == rhs
    }
}

impl ValidityCheck for ExtendedPoint {
    fn is_valid(&self) -> bool {
        let on_curve = self.to_projective().is_valid();
        let on_segre_image = &self.X * &self.Y == &self.Z * &self.T;
        on_curve && on_segre_image
    }
}

// ------------------------------------------------------------------------
// Constant-time assignment and equality
// ------------------------------------------------------------------------

impl ConditionallySelectable for ProjectiveNielsPoint {
    fn conditional_select(
        a: &ProjectiveNielsPoint,
        b: &ProjectiveNielsPoint,
        choice: Choice,
    ) -> ProjectiveNielsPoint {
        ProjectiveNielsPoint {
            Y_plus_X: FieldElement::conditional_select(&a.Y_plus_X, &b.Y_plus_X, choice),
            Y_minus_X: FieldElement::conditional_select(&a.Y_minus_X, &b.Y_minus_X, choice),
            Z: FieldElement::conditional_select(&a.Z, &b.Z, choice),
            T2d: FieldElement::conditional_select(&a.T2d, &b.T2d, choice),
        }
    }
}

impl ConditionallySelectable for AffineNielsPoint {
    fn conditional_select(
        a: &AffineNielsPoint,
        b: &AffineNielsPoint,
        choice: Choice,
    ) -> AffineNielsPoint {
        AffineNielsPoint {
            y_plus_x: FieldElement::conditional_select(&a.y_plus_x, &b.y_plus_x, choice),
            y_minus_x: FieldElement::conditional_select(&a.y_minus_x, &b.y_minus_x, choice),
            xy2d: FieldElement::conditional_select(&a.xy2d, &b.xy2d, choice),
        }
    }
}

impl ConstantTimeEq for ExtendedPoint {
    fn ct_eq(&self, other: &ExtendedPoint) -> Choice {
        self.compress()
            .as_bytes()
            .ct_eq(other.compress().as_bytes())
    }
}

impl PartialEq for ExtendedPoint {
    fn eq(&self, other: &ExtendedPoint) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for ExtendedPoint {}

/// Trait for testing if a curve point is equivalent to the identity
/// point.
pub trait IsIdentity {
    /// Return true if this element is the identity element of the
    /// curve.
    fn is_identity(&self) -> bool;
}

/// Implement generic identity equality testing for point
/// representations which have constant-time equality testing and a
/// defined identity constructor.
impl<T> IsIdentity for T
where
    T: ConstantTimeEq + Identity,
{
    fn is_identity(&self) -> bool {
        bool::from(self.ct_eq(&T::identity()))
    }
}

// ------------------------------------------------------------------------
// Point conversions
// ------------------------------------------------------------------------

impl ProjectivePoint {
    /// Convert to the extended twisted Edwards representation of this
    /// point: (X:Y:Z) ↦ (XZ:YZ:Z²:XY).
    pub(crate) fn to_extended(&self) -> ExtendedPoint {
        ExtendedPoint {
            X: &self.X * &self.Z,
            Y: &self.Y * &self.Z,
            Z: self.Z.square(),
            T: &self.X * &self.Y,
        }
    }

    /// Convert this point to a `CompressedEdwardsY`.
    pub fn compress(&self) -> CompressedEdwardsY {
        let recip = self.Z.invert();
        let x = &self.X * &recip;
        let y = &self.Y * &recip;
        let mut s: [u8; 32] = y.to_bytes();
        s[31] ^= x.is_negative() << 7;
        CompressedEdwardsY(s)
    }
}

impl ExtendedPoint {
    /// Convert to a ProjectiveNielsPoint.
    pub(crate) fn to_projective_niels(&self) -> ProjectiveNielsPoint {
        ProjectiveNielsPoint {
            Y_plus_X: &self.Y + &self.X,
            Y_minus_X: &self.Y - &self.X,
            Z: self.Z,
            T2d: &self.T * &constants::EDWARDS_D2,
        }
    }

    /// Convert the representation of this point from extended
    /// coordinates to projective coordinates.
    ///
    /// Free of field operations, since the extended coordinates carry a
    /// strict superset of the projective information.
    pub(crate) fn to_projective(&self) -> ProjectivePoint {
        ProjectivePoint {
            X: self.X,
            Y: self.Y,
            Z: self.Z,
        }
    }

    /// Dehomogenize to an AffineNielsPoint.
    pub(crate) fn to_affine_niels(&self) -> AffineNielsPoint {
        let recip = self.Z.invert();
        let x = &self.X * &recip;
        let y = &self.Y * &recip;
        let xy2d = &(&x * &y) * &constants::EDWARDS_D2;
        AffineNielsPoint {
            y_plus_x: &y + &x,
            y_minus_x: &y - &x,
            xy2d,
        }
    }

    /// Compress this point to `CompressedEdwardsY` format.
    pub fn compress(&self) -> CompressedEdwardsY {
        self.to_projective().compress()
    }
}

impl CompletedPoint {
    /// Convert to a ProjectivePoint.
    pub(crate) fn to_projective(&self) -> ProjectivePoint {
        ProjectivePoint {
            X: &self.X * &self.T,
            Y: &self.Y * &self.Z,
            Z: &self.Z * &self.T,
        }
    }

    /// Convert to an ExtendedPoint.
    pub(crate) fn to_extended(&self) -> ExtendedPoint {
        ExtendedPoint {
            X: &self.X * &self.T,
            Y: &self.Y * &self.Z,
            Z: &self.Z * &self.T,
            T: &self.X * &self.Y,
        }
    }
}

// ------------------------------------------------------------------------
// Doubling
// ------------------------------------------------------------------------

impl ProjectivePoint {
    /// Double this point: return self + self.
    pub(crate) fn double(&self) -> CompletedPoint {
        let XX = self.X.square();
        let YY = self.Y.square();
        let ZZ2 = self.Z.square2();
        let X_plus_Y = &self.X + &self.Y;
        let X_plus_Y_sq = X_plus_Y.square();
        let YY_plus_XX = &YY + &XX;
        let YY_minus_XX = &YY - &XX;

        CompletedPoint {
            X: &X_plus_Y_sq - &YY_plus_XX,
            Y: YY_plus_XX,
            Z: YY_minus_XX,
            T: &ZZ2 - &YY_minus_XX,
        }
    }
}

impl ExtendedPoint {
    /// Add this point to itself.
    pub fn double(&self) -> ExtendedPoint {
        self.to_projective().double().to_extended()
    }
}

// ------------------------------------------------------------------------
// Addition and Subtraction
// ------------------------------------------------------------------------

impl<'a, 'b> Add<&'b ProjectiveNielsPoint> for &'a ExtendedPoint {
    type Output = CompletedPoint;

    fn add(self, other: &'b ProjectiveNielsPoint) -> CompletedPoint {
        let Y_plus_X = &self.Y + &self.X;
        let Y_minus_X = &self.Y - &self.X;
        let PP = &Y_plus_X * &other.Y_plus_X;
        let MM = &Y_minus_X * &other.Y_minus_X;
        let TT2d = &self.T * &other.T2d;
        let ZZ = &self.Z * &other.Z;
        let ZZ2 = &ZZ + &ZZ;

        CompletedPoint {
            X: &PP - &MM,
            Y: &PP + &MM,
            Z: &ZZ2 + &TT2d,
            T: &ZZ2 - &TT2d,
        }
    }
}

impl<'a, 'b> Sub<&'b ProjectiveNielsPoint> for &'a ExtendedPoint {
    type Output = CompletedPoint;

    fn sub(self, other: &'b ProjectiveNielsPoint) -> CompletedPoint {
        let Y_plus_X = &self.Y + &self.X;
        let Y_minus_X = &self.Y - &self.X;
        let PM = &Y_plus_X * &other.Y_minus_X;
        let MP = &Y_minus_X * &other.Y_plus_X;
        let TT2d = &self.T * &other.T2d;
        let ZZ = &self.Z * &other.Z;
        let ZZ2 = &ZZ + &ZZ;

        CompletedPoint {
            X: &PM - &MP,
            Y: &PM + &MP,
            Z: &ZZ2 - &TT2d,
            T: &ZZ2 + &TT2d,
        }
    }
}

impl<'a, 'b> Add<&'b AffineNielsPoint> for &'a ExtendedPoint {
    type Output = CompletedPoint;

    fn add(self, other: &'b AffineNielsPoint) -> CompletedPoint {
        let Y_plus_X = &self.Y + &self.X;
        let Y_minus_X = &self.Y - &self.X;
        let PP = &Y_plus_X * &other.y_plus_x;
        let MM = &Y_minus_X * &other.y_minus_x;
        let Txy2d = &self.T * &other.xy2d;
        let Z2 = &self.Z + &self.Z;

        CompletedPoint {
            X: &PP - &MM,
            Y: &PP + &MM,
            Z: &Z2 + &Txy2d,
            T: &Z2 - &Txy2d,
        }
    }
}

impl<'a, 'b> Sub<&'b AffineNielsPoint> for &'a ExtendedPoint {
    type Output = CompletedPoint;

    fn sub(self, other: &'b AffineNielsPoint) -> CompletedPoint {
        let Y_plus_X = &self.Y + &self.X;
        let Y_minus_X = &self.Y - &self.X;
        let PM = &Y_plus_X * &other.y_minus_x;
        let MP = &Y_minus_X * &other.y_plus_x;
        let Txy2d = &self.T * &other.xy2d;
        let Z2 = &self.Z + &self.Z;

        CompletedPoint {
            X: &PM - &MP,
            Y: &PM + &MP,
            Z: &Z2 - &Txy2d,
            T: &Z2 + &Txy2d,
        }
    }
}

impl<'a, 'b> Add<&'b ExtendedPoint> for &'a ExtendedPoint {
    type Output = ExtendedPoint;
    fn add(self, other: &'b ExtendedPoint) -> ExtendedPoint {
        (self + &other.to_projective_niels()).to_extended()
    }
}

impl<'a, 'b> Sub<&'b ExtendedPoint> for &'a ExtendedPoint {
    type Output = ExtendedPoint;
    fn sub(self, other: &'b ExtendedPoint) -> ExtendedPoint {
        (self - &other.to_projective_niels()).to_extended()
    }
}

impl<'a> Neg for &'a ExtendedPoint {
    type Output = ExtendedPoint;

    fn neg(self) -> ExtendedPoint {
        ExtendedPoint {
            X: -(&self.X),
            Y: self.Y,
            Z: self.Z,
            T: -(&self.T),
        }
    }
}

impl<'a> Neg for &'a ProjectiveNielsPoint {
    type Output = ProjectiveNielsPoint;

    fn neg(self) -> ProjectiveNielsPoint {
        ProjectiveNielsPoint {
            Y_plus_X: self.Y_minus_X,
            Y_minus_X: self.Y_plus_X,
            Z: self.Z,
            T2d: -(&self.T2d),
        }
    }
}

impl<'a> Neg for &'a AffineNielsPoint {
    type Output = AffineNielsPoint;

    fn neg(self) -> AffineNielsPoint {
        AffineNielsPoint {
            y_plus_x: self.y_minus_x,
            y_minus_x: self.y_plus_x,
            xy2d: -(&self.xy2d),
        }
    }
}

// ------------------------------------------------------------------------
// Scalar multiplication
// ------------------------------------------------------------------------

impl ExtendedPoint {
    /// Multiply by the cofactor: compute `8 * self`.
    #[inline]
    pub fn mult_by_cofactor(&self) -> ExtendedPoint {
        self.mult_by_pow_2(3)
    }

    /// Compute `2^k * self` by successive doublings.
    /// Requires `k > 0`.
    #[inline]
    pub fn mult_by_pow_2(&self, k: u32) -> ExtendedPoint {
        let mut r: CompletedPoint;
        let mut s = self.to_projective();
        for _ in 0..(k - 1) {
            r = s.double();
            s = r.to_projective();
        }
        // Unroll last iteration so we can go directly to_extended().
        s.double().to_extended()
    }

    /// Determine if this point is of small order.
    ///
    /// The order of the group of points on the curve Ɛ is |Ɛ| = 8l, so
    /// a point P is of small order iff 8P is the identity.
    pub fn is_small_order(&self) -> bool {
        self.mult_by_pow_2(3).is_identity()
    }

    /// Checks whether `self` and `other` are equal up to cofactor
    /// multiplication, i.e. whether their difference is of small order.
    ///
    /// The consensus verification rules compare points this way so that
    /// encodings differing only by a cofactor-order component are
    /// accepted or rejected identically by every implementation.
    pub fn cofactor_equal(&self, other: &ExtendedPoint) -> bool {
        let mut r = (self - &other.to_projective_niels()).to_projective(); // P - Q
        for _ in 0..3 {
            r = r.double().to_projective(); // [8](P - Q)
        }

        // Now test whether [8](P - Q) is the identity.  In projective
        // coordinates the identity is (X:Y:Z) ~ (0:1:1), i.e.
        // X/Z = 0 and Y/Z = 1  <=>  X = 0 and Y = Z.
        let zero = [0u8; 32];
        r.X.to_bytes() == zero && r.Y.to_bytes() == r.Z.to_bytes()
    }

    /// Construct an `ExtendedPoint` from a `Scalar`, `a`, by computing
    /// the multiple `aB` of the basepoint `B`.
    ///
    /// Precondition: the scalar must be reduced (`a[31] <= 127`).
    ///
    /// Write the scalar `a` in radix 16 with coefficients in [-8,8),
    /// i.e., `a = a_0 + a_1*16^1 + ... + a_63*16^63`.  Grouping even
    /// and odd coefficients gives
    ///
    ///    a*B =      (a_0*16^0*B + a_2*16^2*B + ... + a_62*16^62*B)
    ///          + 16*(a_1*16^0*B + a_3*16^2*B + ... + a_63*16^62*B).
    ///
    /// For each window position, `select_precomputed_point` reads
    /// `a_i * 16^2j * B` out of the fixed table in constant time.
    pub fn basepoint_mult(a: &Scalar) -> ExtendedPoint {
        let table = &*constants::ED25519_BASEPOINT_TABLE;
        let e = a.to_radix_16();
        let mut h = ExtendedPoint::identity();

        for i in (0..64).filter(|x| x % 2 == 1) {
            h = (&h + &select_precomputed_point(e[i], &table[i / 2])).to_extended();
        }

        h = h.mult_by_pow_2(4);

        for i in (0..64).filter(|x| x % 2 == 0) {
            h = (&h + &select_precomputed_point(e[i], &table[i / 2])).to_extended();
        }

        h
    }
}

/// Given a point `A` and scalars `a` and `b`, compute the point
/// `aA + bB`, where `B` is the Ed25519 basepoint.
///
/// # Warning
///
/// This function is *not* constant time, hence its name.  It is used
/// only during verification, where all inputs are public.
pub fn double_scalar_mult_vartime(
    a: &Scalar,
    A: &ExtendedPoint,
    b: &Scalar,
) -> ProjectivePoint {
    let odd_multiples_of_B = &*constants::AFFINE_ODD_MULTIPLES_OF_BASEPOINT;

    let a_naf = a.non_adjacent_form();
    let b_naf = b.non_adjacent_form();

    // Build a lookup table of odd multiples of A.
    let mut Ai = [A.to_projective_niels(); 8];
    let A2 = A.double();
    for i in 0..7 {
        Ai[i + 1] = (&A2 + &Ai[i]).to_extended().to_projective_niels();
    }
    // Now Ai = [A, 3A, 5A, 7A, 9A, 11A, 13A, 15A]

    // Find the starting index: the most significant nonzero
    // coefficient of either NAF.
    let mut i: usize = 255;
    while i > 0 && a_naf[i] == 0 && b_naf[i] == 0 {
        i -= 1;
    }

    let mut r = ProjectivePoint::identity();
    loop {
        let mut t = r.double();

        if a_naf[i] > 0 {
            t = &t.to_extended() + &Ai[(a_naf[i] / 2) as usize];
        } else if a_naf[i] < 0 {
            t = &t.to_extended() - &Ai[(-a_naf[i] / 2) as usize];
        }

        if b_naf[i] > 0 {
            t = &t.to_extended() + &odd_multiples_of_B[(b_naf[i] / 2) as usize];
        } else if b_naf[i] < 0 {
            t = &t.to_extended() - &odd_multiples_of_B[(-b_naf[i] / 2) as usize];
        }

        r = t.to_projective();

        if i == 0 {
            break;
        }
        i -= 1;
    }

    r
}

/// Given precomputed points `[P, 2P, 3P, ..., 8P]`, as well as
/// `-8 ≤ x ≤ 8`, compute `x * P` in constant time, i.e., without
/// branching on `x` or using it as an array index.
pub(crate) fn select_precomputed_point<T>(x: i8, points: &[T; 8]) -> T
where
    T: Identity + ConditionallySelectable,
    for<'a> &'a T: Neg<Output = T>,
{
    debug_assert!((-8..=8).contains(&x));

    // Compute xabs = |x|
    let xmask = x >> 7;
    let xabs = ((x + xmask) ^ xmask) as u8;

    // Set t = 0 * P = identity
    let mut t = T::identity();
    for j in 1..9u8 {
        // Copy `points[j-1] == j*P` onto `t` in constant time if
        // `|x| == j`.
        t.conditional_assign(&points[(j - 1) as usize], xabs.ct_eq(&j));
    }
    // Now t == |x| * P.

    let neg_mask = Choice::from((xmask & 1) as u8);
    t.conditional_negate(neg_mask);
    // Now t == x * P.

    t
}

// ------------------------------------------------------------------------
// Debug traits
// ------------------------------------------------------------------------

impl Debug for ExtendedPoint {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(
            f,
            "ExtendedPoint(\n\tX: {:?},\n\tY: {:?},\n\tZ: {:?},\n\tT: {:?}\n)",
            &self.X, &self.Y, &self.Z, &self.T
        )
    }
}

impl Debug for ProjectivePoint {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(
            f,
            "ProjectivePoint(\n\tX: {:?},\n\tY: {:?},\n\tZ: {:?}\n)",
            &self.X, &self.Y, &self.Z
        )
    }
}

impl Debug for AffineNielsPoint {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(
            f,
            "AffineNielsPoint(\n\ty_plus_x: {:?},\n\ty_minus_x: {:?},\n\txy2d: {:?}\n)",
            &self.y_plus_x, &self.y_minus_x, &self.xy2d
        )
    }
}

impl Debug for ProjectiveNielsPoint {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(
            f,
            "ProjectiveNielsPoint(\n\tY_plus_X: {:?},\n\tY_minus_X: {:?},\n\tZ: {:?},\n\tT2d: {:?}\n)",
            &self.Y_plus_X, &self.Y_minus_X, &self.Z, &self.T2d
        )
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants;
    use crate::scalar::Scalar;

    /// The encoding of the identity point.
    fn identity_compressed() -> CompressedEdwardsY {
        CompressedEdwardsY::identity()
    }

    /// A scalar with a small value.
    fn scalar_u8(x: u8) -> Scalar {
        let mut bytes = [0u8; 32];
        bytes[0] = x;
        Scalar(bytes)
    }

    #[test]
    fn basepoint_encodes_canonically() {
        assert_eq!(
            constants::ED25519_BASEPOINT_POINT.compress(),
            constants::BASE_CMPRSSD
        );
    }

    #[test]
    fn basepoint_decompresses() {
        let B = constants::BASE_CMPRSSD.decompress().unwrap();
        assert!(B.is_valid());
        assert_eq!(B.compress(), constants::BASE_CMPRSSD);
        assert_eq!(B, constants::ED25519_BASEPOINT_POINT);
    }

    #[test]
    fn decompression_sign_handling() {
        // Flipping the sign bit negates the decompressed point.
        let mut negated = constants::BASE_CMPRSSD.to_bytes();
        negated[31] ^= 1 << 7;
        let minus_B = CompressedEdwardsY(negated).decompress().unwrap();
        assert!(minus_B.is_valid());
        assert_eq!(minus_B, -(&constants::ED25519_BASEPOINT_POINT));
    }

    #[test]
    fn decompression_tolerates_noncanonical_y() {
        // The bytes of p itself: a non-canonical encoding of y = 0,
        // which is the y-coordinate of the order-4 points (±√-1, 0).
        let mut p_bytes = [0xffu8; 32];
        p_bytes[0] = 0xed;
        p_bytes[31] = 0x7f;
        let point = CompressedEdwardsY(p_bytes).decompress().unwrap();
        assert!(point.is_valid());
        assert!(point.is_small_order());
        // Re-encoding is canonical: y = 0 with the sign of x.
        let reencoded = point.compress();
        assert_eq!(&reencoded.as_bytes()[..31], &[0u8; 31][..]);
    }

    #[test]
    fn identity_roundtrip() {
        let id = identity_compressed().decompress().unwrap();
        assert!(id.is_identity());
        assert!(id.is_valid());
        assert_eq!(id.compress(), identity_compressed());
    }

    #[test]
    fn extended_add_vs_double() {
        let B = &constants::ED25519_BASEPOINT_POINT;
        let B2 = B.double();
        assert!(B2.is_valid());
        assert_eq!(B + B, B2);
    }

    #[test]
    fn mixed_add_matches_cached_add() {
        let B = &constants::ED25519_BASEPOINT_POINT;
        let cached = (B + &B.to_projective_niels()).to_extended();
        let mixed = (B + &B.to_affine_niels()).to_extended();
        assert_eq!(cached, mixed);
    }

    #[test]
    fn basepoint_mult_one_vs_basepoint() {
        let aB = ExtendedPoint::basepoint_mult(&Scalar::one());
        assert_eq!(aB.compress(), constants::BASE_CMPRSSD);
    }

    #[test]
    fn basepoint_mult_vs_repeated_doubling() {
        let eight_B = ExtendedPoint::basepoint_mult(&scalar_u8(8));
        assert_eq!(
            eight_B,
            constants::ED25519_BASEPOINT_POINT.mult_by_pow_2(3)
        );
        assert_eq!(
            eight_B,
            constants::ED25519_BASEPOINT_POINT.mult_by_cofactor()
        );
    }

    #[test]
    fn basepoint_mult_is_additive() {
        // aB + bB == (a + b)B, with the scalar sum computed as a·1 + b.
        let a = Scalar([
            0x1a, 0x0e, 0x97, 0x8a, 0x90, 0xf6, 0x62, 0x2d,
            0x37, 0x47, 0x02, 0x3f, 0x8a, 0xd8, 0x26, 0x4d,
            0xa7, 0x58, 0xaa, 0x1b, 0x88, 0xe0, 0x40, 0xd1,
            0x58, 0x9e, 0x7b, 0x7f, 0x23, 0x76, 0xef, 0x09,
        ]);
        let b = scalar_u8(127);
        let a_plus_b = Scalar::multiply_add(&a, &Scalar::one(), &b);

        let sum = &ExtendedPoint::basepoint_mult(&a) + &ExtendedPoint::basepoint_mult(&b);
        assert_eq!(sum, ExtendedPoint::basepoint_mult(&a_plus_b));
    }

    #[test]
    fn double_scalar_mult_vs_basepoint_mult() {
        // a·B + b·B == (a·1 + b)·B exercises the NAF path against the
        // fixed-window path.
        let a = Scalar([
            0x1a, 0x0e, 0x97, 0x8a, 0x90, 0xf6, 0x62, 0x2d,
            0x37, 0x47, 0x02, 0x3f, 0x8a, 0xd8, 0x26, 0x4d,
            0xa7, 0x58, 0xaa, 0x1b, 0x88, 0xe0, 0x40, 0xd1,
            0x58, 0x9e, 0x7b, 0x7f, 0x23, 0x76, 0xef, 0x09,
        ]);
        let b = scalar_u8(250);
        let a_plus_b = Scalar::multiply_add(&a, &Scalar::one(), &b);

        let B = constants::ED25519_BASEPOINT_POINT;
        let r = double_scalar_mult_vartime(&a, &B, &b);
        assert_eq!(
            r.compress(),
            ExtendedPoint::basepoint_mult(&a_plus_b).compress()
        );
    }

    #[test]
    fn select_precomputed_point_signs() {
        let table = &constants::ED25519_BASEPOINT_TABLE[0];
        // 0 selects the identity.
        assert_eq!(
            select_precomputed_point(0, table),
            AffineNielsPoint::identity()
        );
        // +1 selects B itself.
        assert_eq!(
            select_precomputed_point(1, table),
            constants::ED25519_BASEPOINT_POINT.to_affine_niels()
        );
        // -1 selects -B.
        assert_eq!(
            select_precomputed_point(-1, table),
            -(&constants::ED25519_BASEPOINT_POINT.to_affine_niels())
        );
    }

    #[test]
    fn basepoint_table_row_zero() {
        // Entry j of row 0 is (j+1)·B.
        let B = constants::ED25519_BASEPOINT_POINT;
        let mut expected = B;
        for j in 0..8 {
            assert_eq!(
                constants::ED25519_BASEPOINT_TABLE[0][j],
                expected.to_affine_niels()
            );
            expected = &expected + &B;
        }
    }

    #[test]
    fn odd_multiples_table() {
        // Entry j is (2j+1)·B.
        let B = constants::ED25519_BASEPOINT_POINT;
        let B2 = B.double();
        let mut expected = B;
        for j in 0..8 {
            assert_eq!(
                constants::AFFINE_ODD_MULTIPLES_OF_BASEPOINT[j],
                expected.to_affine_niels()
            );
            expected = &expected + &B2;
        }
    }

    #[test]
    fn cofactor_equality() {
        let B = constants::ED25519_BASEPOINT_POINT;
        assert!(B.cofactor_equal(&B));
        assert!(!B.cofactor_equal(&B.double()));

        // A small-order point is cofactor-equal to the identity.
        let mut p_bytes = [0xffu8; 32];
        p_bytes[0] = 0xed;
        p_bytes[31] = 0x7f;
        let torsion = CompressedEdwardsY(p_bytes).decompress().unwrap();
        let id = ExtendedPoint::identity();
        assert!(torsion.cofactor_equal(&id));
        assert!(id.cofactor_equal(&torsion));
        assert!(!torsion.is_identity());

        // Adding a small-order point moves B within its coset.
        let B_plus_torsion = &B + &torsion;
        assert!(B.cofactor_equal(&B_plus_torsion));
        assert_ne!(B.compress(), B_plus_torsion.compress());
    }

    #[test]
    fn small_order_checks() {
        assert!(ExtendedPoint::identity().is_small_order());
        assert!(!constants::ED25519_BASEPOINT_POINT.is_small_order());
    }
}
