// -*- mode: rust; -*-
//
// This file is part of ledger-ed25519.
// See LICENSE for licensing information.

//! Field arithmetic for ℤ/(2²⁵⁵-19), using 32-bit limbs with 64-bit
//! products.
//!
//! This implementation is intended for platforms that can multiply
//! 32-bit inputs to produce 64-bit outputs.

use core::fmt::Debug;
use core::ops::Neg;
use core::ops::{Add, AddAssign};
use core::ops::{Mul, MulAssign};
use core::ops::{Sub, SubAssign};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// A `FieldElement` represents an element of the field GF(2^255 - 19).
///
/// It is represented in radix 2^25.5 as ten `i32`s, so that an element
/// t, entries t[0],...,t[9], represents the integer t[0] + 2^26 t[1] +
/// 2^51 t[2] + 2^77 t[3] + 2^102 t[4] + ... + 2^230 t[9].
///
/// The limbs t[i] are allowed to grow between multiplications; after
/// `combine`, |t[i]| is bounded by 1.1*2^25, 1.1*2^24, 1.1*2^25,
/// 1.1*2^24, etc., so that products of two combined elements fit in 64
/// bits with headroom to spare.
#[derive(Copy, Clone)]
pub struct FieldElement(pub(crate) [i32; 10]);

impl Debug for FieldElement {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "FieldElement: {:?}", &self.0[..])
    }
}

impl<'b> AddAssign<&'b FieldElement> for FieldElement {
    fn add_assign(&mut self, rhs: &'b FieldElement) {
        for i in 0..10 {
            self.0[i] += rhs.0[i];
        }
    }
}

impl<'a, 'b> Add<&'b FieldElement> for &'a FieldElement {
    type Output = FieldElement;
    fn add(self, rhs: &'b FieldElement) -> FieldElement {
        let mut output = *self;
        output += rhs;
        output
    }
}

impl<'b> SubAssign<&'b FieldElement> for FieldElement {
    fn sub_assign(&mut self, rhs: &'b FieldElement) {
        for i in 0..10 {
            self.0[i] -= rhs.0[i];
        }
    }
}

impl<'a, 'b> Sub<&'b FieldElement> for &'a FieldElement {
    type Output = FieldElement;
    fn sub(self, rhs: &'b FieldElement) -> FieldElement {
        let mut output = *self;
        output -= rhs;
        output
    }
}

impl<'b> MulAssign<&'b FieldElement> for FieldElement {
    fn mul_assign(&mut self, rhs: &'b FieldElement) {
        let result = (self as &FieldElement) * rhs;
        self.0 = result.0;
    }
}

impl<'a, 'b> Mul<&'b FieldElement> for &'a FieldElement {
    type Output = FieldElement;
    /// Calculates h = f * g.
    ///
    /// # Preconditions
    ///
    /// * |f[i]| bounded by 1.1*2^26, 1.1*2^25, 1.1*2^26, 1.1*2^25, etc.
    /// * |g[i]| bounded by 1.1*2^26, 1.1*2^25, 1.1*2^26, 1.1*2^25, etc.
    ///
    /// # Postconditions
    ///
    /// * |h[i]| bounded by 1.1*2^25, 1.1*2^24, 1.1*2^25, 1.1*2^24, etc.
    ///
    /// ## Notes on implementation strategy
    ///
    /// * Using schoolbook multiplication.
    ///
    /// * Most multiplications by 2 and 19 are 32-bit precomputations;
    ///   cheaper than 64-bit postcomputations.
    ///
    /// * There is one remaining multiplication by 19 in the carry
    ///   chain, representing the wraparound from limb 9 to limb 0
    ///   modulo 2^255 - 19.
    fn mul(self, rhs: &'b FieldElement) -> FieldElement {
        let f0 = self.0[0] as i64;
        let f1 = self.0[1] as i64;
        let f2 = self.0[2] as i64;
        let f3 = self.0[3] as i64;
        let f4 = self.0[4] as i64;
        let f5 = self.0[5] as i64;
        let f6 = self.0[6] as i64;
        let f7 = self.0[7] as i64;
        let f8 = self.0[8] as i64;
        let f9 = self.0[9] as i64;

        let f1_2 = (2 * self.0[1]) as i64;
        let f3_2 = (2 * self.0[3]) as i64;
        let f5_2 = (2 * self.0[5]) as i64;
        let f7_2 = (2 * self.0[7]) as i64;
        let f9_2 = (2 * self.0[9]) as i64;

        let g0 = rhs.0[0] as i64;
        let g1 = rhs.0[1] as i64;
        let g2 = rhs.0[2] as i64;
        let g3 = rhs.0[3] as i64;
        let g4 = rhs.0[4] as i64;
        let g5 = rhs.0[5] as i64;
        let g6 = rhs.0[6] as i64;
        let g7 = rhs.0[7] as i64;
        let g8 = rhs.0[8] as i64;
        let g9 = rhs.0[9] as i64;

        let g1_19 = (19 * rhs.0[1]) as i64; /* 1.4*2^29 */
        let g2_19 = (19 * rhs.0[2]) as i64; /* 1.4*2^30; still ok */
        let g3_19 = (19 * rhs.0[3]) as i64;
        let g4_19 = (19 * rhs.0[4]) as i64;
        let g5_19 = (19 * rhs.0[5]) as i64;
        let g6_19 = (19 * rhs.0[6]) as i64;
        let g7_19 = (19 * rhs.0[7]) as i64;
        let g8_19 = (19 * rhs.0[8]) as i64;
        let g9_19 = (19 * rhs.0[9]) as i64;

        let h0 = f0*g0 + f1_2*g9_19 + f2*g8_19 + f3_2*g7_19 + f4*g6_19 + f5_2*g5_19 + f6*g4_19 + f7_2*g3_19 + f8*g2_19 + f9_2*g1_19;
        let h1 = f0*g1 + f1*g0 + f2*g9_19 + f3*g8_19 + f4*g7_19 + f5*g6_19 + f6*g5_19 + f7*g4_19 + f8*g3_19 + f9*g2_19;
        let h2 = f0*g2 + f1_2*g1 + f2*g0 + f3_2*g9_19 + f4*g8_19 + f5_2*g7_19 + f6*g6_19 + f7_2*g5_19 + f8*g4_19 + f9_2*g3_19;
        let h3 = f0*g3 + f1*g2 + f2*g1 + f3*g0 + f4*g9_19 + f5*g8_19 + f6*g7_19 + f7*g6_19 + f8*g5_19 + f9*g4_19;
        let h4 = f0*g4 + f1_2*g3 + f2*g2 + f3_2*g1 + f4*g0 + f5_2*g9_19 + f6*g8_19 + f7_2*g7_19 + f8*g6_19 + f9_2*g5_19;
        let h5 = f0*g5 + f1*g4 + f2*g3 + f3*g2 + f4*g1 + f5*g0 + f6*g9_19 + f7*g8_19 + f8*g7_19 + f9*g6_19;
        let h6 = f0*g6 + f1_2*g5 + f2*g4 + f3_2*g3 + f4*g2 + f5_2*g1 + f6*g0 + f7_2*g9_19 + f8*g8_19 + f9_2*g7_19;
        let h7 = f0*g7 + f1*g6 + f2*g5 + f3*g4 + f4*g3 + f5*g2 + f6*g1 + f7*g0 + f8*g9_19 + f9*g8_19;
        let h8 = f0*g8 + f1_2*g7 + f2*g6 + f3_2*g5 + f4*g4 + f5_2*g3 + f6*g2 + f7_2*g1 + f8*g0 + f9_2*g9_19;
        let h9 = f0*g9 + f1*g8 + f2*g7 + f3*g6 + f4*g5 + f5*g4 + f6*g3 + f7*g2 + f8*g1 + f9*g0;

        FieldElement::combine(&[h0, h1, h2, h3, h4, h5, h6, h7, h8, h9])
    }
}

impl<'a> Neg for &'a FieldElement {
    type Output = FieldElement;
    fn neg(self) -> FieldElement {
        let mut output = *self;
        output.negate();
        output
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(
        a: &FieldElement,
        b: &FieldElement,
        choice: Choice,
    ) -> FieldElement {
        let mask = -(choice.unwrap_u8() as i32);
        let mut limbs = [0i32; 10];
        for i in 0..10 {
            limbs[i] = a.0[i] ^ (mask & (a.0[i] ^ b.0[i]));
        }
        FieldElement(limbs)
    }
}

impl ConstantTimeEq for FieldElement {
    /// Test equality between two `FieldElement`s by comparing their
    /// canonical encodings.
    fn ct_eq(&self, other: &FieldElement) -> Choice {
        self.to_bytes().ct_eq(&other.to_bytes())
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &FieldElement) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for FieldElement {}

/// Convert an array of (at least) three bytes into an i64.
#[inline]
pub(crate) fn load3(input: &[u8]) -> i64 {
    (input[0] as i64) | ((input[1] as i64) << 8) | ((input[2] as i64) << 16)
}

/// Convert an array of (at least) four bytes into an i64.
#[inline]
pub(crate) fn load4(input: &[u8]) -> i64 {
    (input[0] as i64)
        | ((input[1] as i64) << 8)
        | ((input[2] as i64) << 16)
        | ((input[3] as i64) << 24)
}

impl FieldElement {
    /// Invert the sign of this field element.
    pub fn negate(&mut self) {
        for i in 0..10 {
            self.0[i] = -self.0[i];
        }
    }

    /// Construct the additive identity.
    pub fn zero() -> FieldElement {
        FieldElement([0, 0, 0, 0, 0, 0, 0, 0, 0, 0])
    }

    /// Construct the multiplicative identity.
    pub fn one() -> FieldElement {
        FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0])
    }

    /// Construct -1.
    pub fn minus_one() -> FieldElement {
        FieldElement([-1, 0, 0, 0, 0, 0, 0, 0, 0, 0])
    }

    /// Carry-propagate unreduced 64-bit coefficients back into bounded
    /// 32-bit limbs.
    ///
    /// The carry chain alternates 26- and 25-bit shifts, with the carry
    /// out of limb 9 multiplied by 19 and folded into limb 0
    /// (2^255 ≡ 19 mod p).
    fn combine(input: &[i64; 10]) -> FieldElement {
        let mut c = [0i64; 10];
        let mut h = *input;

        /*
          |h[0]| <= (1.1*1.1*2^52*(1+19+19+19+19)+1.1*1.1*2^50*(38+38+38+38+38))
            i.e. |h[0]| <= 1.2*2^59; narrower ranges for h[2], h[4], h[6], h[8]
          |h[1]| <= (1.1*1.1*2^51*(1+1+19+19+19+19+19+19+19+19))
            i.e. |h[1]| <= 1.5*2^58; narrower ranges for h[3], h[5], h[7], h[9]
        */

        c[0] = (h[0] + (1 << 25)) >> 26;
        h[1] += c[0];
        h[0] -= c[0] << 26;
        c[4] = (h[4] + (1 << 25)) >> 26;
        h[5] += c[4];
        h[4] -= c[4] << 26;
        /* |h[0]| <= 2^25 */
        /* |h[4]| <= 2^25 */
        /* |h[1]| <= 1.51*2^58 */
        /* |h[5]| <= 1.51*2^58 */

        c[1] = (h[1] + (1 << 24)) >> 25;
        h[2] += c[1];
        h[1] -= c[1] << 25;
        c[5] = (h[5] + (1 << 24)) >> 25;
        h[6] += c[5];
        h[5] -= c[5] << 25;
        /* |h[1]| <= 2^24; from now on fits into int32 */
        /* |h[5]| <= 2^24; from now on fits into int32 */
        /* |h[2]| <= 1.21*2^59 */
        /* |h[6]| <= 1.21*2^59 */

        c[2] = (h[2] + (1 << 25)) >> 26;
        h[3] += c[2];
        h[2] -= c[2] << 26;
        c[6] = (h[6] + (1 << 25)) >> 26;
        h[7] += c[6];
        h[6] -= c[6] << 26;
        /* |h[2]| <= 2^25; from now on fits into int32 unchanged */
        /* |h[6]| <= 2^25; from now on fits into int32 unchanged */
        /* |h[3]| <= 1.51*2^58 */
        /* |h[7]| <= 1.51*2^58 */

        c[3] = (h[3] + (1 << 24)) >> 25;
        h[4] += c[3];
        h[3] -= c[3] << 25;
        c[7] = (h[7] + (1 << 24)) >> 25;
        h[8] += c[7];
        h[7] -= c[7] << 25;
        /* |h[3]| <= 2^24; from now on fits into int32 unchanged */
        /* |h[7]| <= 2^24; from now on fits into int32 unchanged */
        /* |h[4]| <= 1.52*2^33 */
        /* |h[8]| <= 1.52*2^33 */

        c[4] = (h[4] + (1 << 25)) >> 26;
        h[5] += c[4];
        h[4] -= c[4] << 26;
        c[8] = (h[8] + (1 << 25)) >> 26;
        h[9] += c[8];
        h[8] -= c[8] << 26;
        /* |h[4]| <= 2^25; from now on fits into int32 unchanged */
        /* |h[8]| <= 2^25; from now on fits into int32 unchanged */
        /* |h[5]| <= 1.01*2^24 */
        /* |h[9]| <= 1.51*2^58 */

        c[9] = (h[9] + (1 << 24)) >> 25;
        h[0] += c[9] * 19;
        h[9] -= c[9] << 25;
        /* |h[9]| <= 2^24; from now on fits into int32 unchanged */
        /* |h[0]| <= 1.8*2^37 */

        c[0] = (h[0] + (1 << 25)) >> 26;
        h[1] += c[0];
        h[0] -= c[0] << 26;
        /* |h[0]| <= 2^25; from now on fits into int32 unchanged */
        /* |h[1]| <= 1.01*2^24 */

        let mut output = FieldElement([0i32; 10]);
        for i in 0..10 {
            output.0[i] = h[i] as i32;
        }
        output
    }

    /// Load a `FieldElement` from the low 255 bits of a 256-bit input.
    ///
    /// # Warning
    ///
    /// This function does not check that the input used the canonical
    /// representative.  It masks the high bit, but it will happily
    /// decode 2^255 - 18 to 1.  This tolerance is relied upon by the
    /// ZIP215 verification path; callers that need a canonical encoding
    /// must re-encode and compare.
    pub fn from_bytes(data: &[u8; 32]) -> FieldElement {
        let mut h = [0i64; 10];
        h[0] = load4(&data[0..]);
        h[1] = load3(&data[4..]) << 6;
        h[2] = load3(&data[7..]) << 5;
        h[3] = load3(&data[10..]) << 3;
        h[4] = load3(&data[13..]) << 2;
        h[5] = load4(&data[16..]);
        h[6] = load3(&data[20..]) << 7;
        h[7] = load3(&data[23..]) << 5;
        h[8] = load3(&data[26..]) << 4;
        h[9] = (load3(&data[29..]) & 8388607) << 2;

        FieldElement::combine(&h)
    }

    /// Serialize this `FieldElement` to a 32-byte array.  The encoding
    /// is canonical: the output is the unique little-endian
    /// representative in [0, p).
    ///
    /// # Preconditions
    ///
    /// * `|h[i]|` bounded by 1.1*2^25, 1.1*2^24, 1.1*2^25, 1.1*2^24, etc.
    ///
    /// # Lemma
    ///
    /// Write p = 2^255 - 19 and q = floor(h/p).
    ///
    /// Basic claim: q = floor(2^(-255)(h + 19 * 2^-25 h9 + 2^-1)).
    ///
    /// The final subtraction of pq is folded into the carry chain by
    /// seeding limb 0 with 19q.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut carry = [0i32; 10];
        let mut h: [i32; 10] = self.0;

        let mut q: i32 = (19 * h[9] + (1 << 24)) >> 25;
        q = (h[0] + q) >> 26;
        q = (h[1] + q) >> 25;
        q = (h[2] + q) >> 26;
        q = (h[3] + q) >> 25;
        q = (h[4] + q) >> 26;
        q = (h[5] + q) >> 25;
        q = (h[6] + q) >> 26;
        q = (h[7] + q) >> 25;
        q = (h[8] + q) >> 26;
        q = (h[9] + q) >> 25;

        // Goal: Output h-(2^255-19)q, which is between 0 and 2^255-20.
        h[0] += 19 * q;
        // Goal: Output h-2^255 q, which is between 0 and 2^255-20.

        carry[0] = h[0] >> 26;
        h[1] += carry[0];
        h[0] -= carry[0] << 26;
        carry[1] = h[1] >> 25;
        h[2] += carry[1];
        h[1] -= carry[1] << 25;
        carry[2] = h[2] >> 26;
        h[3] += carry[2];
        h[2] -= carry[2] << 26;
        carry[3] = h[3] >> 25;
        h[4] += carry[3];
        h[3] -= carry[3] << 25;
        carry[4] = h[4] >> 26;
        h[5] += carry[4];
        h[4] -= carry[4] << 26;
        carry[5] = h[5] >> 25;
        h[6] += carry[5];
        h[5] -= carry[5] << 25;
        carry[6] = h[6] >> 26;
        h[7] += carry[6];
        h[6] -= carry[6] << 26;
        carry[7] = h[7] >> 25;
        h[8] += carry[7];
        h[7] -= carry[7] << 25;
        carry[8] = h[8] >> 26;
        h[9] += carry[8];
        h[8] -= carry[8] << 26;
        carry[9] = h[9] >> 25;
        h[9] -= carry[9] << 25;
        // h10 = carry9

        let mut s = [0u8; 32];
        s[0] = h[0] as u8;
        s[1] = (h[0] >> 8) as u8;
        s[2] = (h[0] >> 16) as u8;
        s[3] = ((h[0] >> 24) | (h[1] << 2)) as u8;
        s[4] = (h[1] >> 6) as u8;
        s[5] = (h[1] >> 14) as u8;
        s[6] = ((h[1] >> 22) | (h[2] << 3)) as u8;
        s[7] = (h[2] >> 5) as u8;
        s[8] = (h[2] >> 13) as u8;
        s[9] = ((h[2] >> 21) | (h[3] << 5)) as u8;
        s[10] = (h[3] >> 3) as u8;
        s[11] = (h[3] >> 11) as u8;
        s[12] = ((h[3] >> 19) | (h[4] << 6)) as u8;
        s[13] = (h[4] >> 2) as u8;
        s[14] = (h[4] >> 10) as u8;
        s[15] = (h[4] >> 18) as u8;
        s[16] = h[5] as u8;
        s[17] = (h[5] >> 8) as u8;
        s[18] = (h[5] >> 16) as u8;
        s[19] = ((h[5] >> 24) | (h[6] << 1)) as u8;
        s[20] = (h[6] >> 7) as u8;
        s[21] = (h[6] >> 15) as u8;
        s[22] = ((h[6] >> 23) | (h[7] << 3)) as u8;
        s[23] = (h[7] >> 5) as u8;
        s[24] = (h[7] >> 13) as u8;
        s[25] = ((h[7] >> 21) | (h[8] << 4)) as u8;
        s[26] = (h[8] >> 4) as u8;
        s[27] = (h[8] >> 12) as u8;
        s[28] = ((h[8] >> 20) | (h[9] << 6)) as u8;
        s[29] = (h[9] >> 2) as u8;
        s[30] = (h[9] >> 10) as u8;
        s[31] = (h[9] >> 18) as u8;

        debug_assert!((s[31] & 0b1000_0000u8) == 0u8);

        s
    }

    /// Determine if this `FieldElement` is negative, in the sense used
    /// by point compression: a field element is negative if the low bit
    /// of its canonical encoding is set.
    ///
    /// # Return
    ///
    /// `1u8` if negative, `0u8` otherwise.
    pub fn is_negative(&self) -> u8 {
        let bytes = self.to_bytes();
        bytes[0] & 1
    }

    /// Determine whether this `FieldElement` is non-zero.
    pub fn is_nonzero(&self) -> Choice {
        let bytes = self.to_bytes();
        let mut x = 0u8;
        for b in &bytes {
            x |= *b;
        }
        !x.ct_eq(&0u8)
    }

    fn square_inner(&self) -> [i64; 10] {
        let f0 = self.0[0] as i64;
        let f1 = self.0[1] as i64;
        let f2 = self.0[2] as i64;
        let f3 = self.0[3] as i64;
        let f4 = self.0[4] as i64;
        let f5 = self.0[5] as i64;
        let f6 = self.0[6] as i64;
        let f7 = self.0[7] as i64;
        let f8 = self.0[8] as i64;
        let f9 = self.0[9] as i64;
        let f0_2 = (2 * self.0[0]) as i64;
        let f1_2 = (2 * self.0[1]) as i64;
        let f2_2 = (2 * self.0[2]) as i64;
        let f3_2 = (2 * self.0[3]) as i64;
        let f4_2 = (2 * self.0[4]) as i64;
        let f5_2 = (2 * self.0[5]) as i64;
        let f6_2 = (2 * self.0[6]) as i64;
        let f7_2 = (2 * self.0[7]) as i64;
        let f5_38 = 38 * f5; // 1.31*2^30
        let f6_19 = 19 * f6; // 1.31*2^30
        let f7_38 = 38 * f7; // 1.31*2^30
        let f8_19 = 19 * f8; // 1.31*2^30
        let f9_38 = 38 * f9; // 1.31*2^30

        let mut h = [0i64; 10];
        h[0] =   f0*f0 + f1_2*f9_38 + f2_2*f8_19 + f3_2*f7_38 + f4_2*f6_19 + f5*f5_38;
        h[1] = f0_2*f1 +   f2*f9_38 + f3_2*f8_19 +   f4*f7_38 + f5_2*f6_19;
        h[2] = f0_2*f2 + f1_2*f1    + f3_2*f9_38 + f4_2*f8_19 + f5_2*f7_38 + f6*f6_19;
        h[3] = f0_2*f3 + f1_2*f2    +   f4*f9_38 + f5_2*f8_19 +   f6*f7_38;
        h[4] = f0_2*f4 + f1_2*f3_2  +   f2*f2    + f5_2*f9_38 + f6_2*f8_19 + f7*f7_38;
        h[5] = f0_2*f5 + f1_2*f4    +   f2_2*f3  +   f6*f9_38 + f7_2*f8_19;
        h[6] = f0_2*f6 + f1_2*f5_2  +   f2_2*f4  + f3_2*f3    + f7_2*f9_38 + f8*f8_19;
        h[7] = f0_2*f7 + f1_2*f6    +   f2_2*f5  + f3_2*f4    +   f8*f9_38;
        h[8] = f0_2*f8 + f1_2*f7_2  +   f2_2*f6  + f3_2*f5_2  +   f4*f4    + f9*f9_38;
        h[9] = f0_2*f9 + f1_2*f8    +   f2_2*f7  + f3_2*f6    + f4_2*f5;

        h
    }

    /// Calculates h = f*f.
    ///
    /// # Preconditions
    ///
    /// * |f[i]| bounded by 1.1*2^26, 1.1*2^25, 1.1*2^26, 1.1*2^25, etc.
    ///
    /// # Postconditions
    ///
    /// * |h[i]| bounded by 1.1*2^25, 1.1*2^24, 1.1*2^25, 1.1*2^24, etc.
    pub fn square(&self) -> FieldElement {
        FieldElement::combine(&self.square_inner())
    }

    /// Square this field element and multiply the result by 2.
    ///
    /// # Preconditions
    ///
    /// * |f[i]| bounded by 1.65*2^26, 1.65*2^25, 1.65*2^26, 1.65*2^25, etc.
    ///
    /// # Postconditions
    ///
    /// * |h[i]| bounded by 1.01*2^25, 1.01*2^24, 1.01*2^25, 1.01*2^24, etc.
    pub fn square2(&self) -> FieldElement {
        let mut coeffs = self.square_inner();
        for i in 0..10 {
            coeffs[i] += coeffs[i];
        }
        FieldElement::combine(&coeffs)
    }

    /// Requires k > 0; raise self to the 2^k-th power.
    #[inline]
    fn pow2k(&self, k: u32) -> FieldElement {
        let mut z = self.square();
        for _ in 1..k {
            z = z.square();
        }
        z
    }

    /// Compute (self^(2^250-1), self^11), used as a helper function
    /// within invert() and pow_p58().
    fn pow22501(&self) -> (FieldElement, FieldElement) {
        // Each temporary variable t_i is of the form (self)^e_i.
        // Squaring t_i corresponds to multiplying e_i by 2, so the
        // pow2k function shifts e_i left by k places.  Multiplying t_i
        // and t_j corresponds to adding e_i + e_j.
        //
        // Temporary t_i                      Nonzero bits of e_i
        //
        let t0 = self.square();             // 1         e_0 = 2^1
        let t1 = t0.square().square();      // 3         e_1 = 2^3
        let t2 = self * &t1;                // 3,0       e_2 = 2^3 + 2^0
        let t3 = &t0 * &t2;                 // 3,1,0
        let t4 = t3.square();               // 4,2,1
        let t5 = &t2 * &t4;                 // 4,3,2,1,0
        let t6 = t5.pow2k(5);               // 9,8,7,6,5
        let t7 = &t6 * &t5;                 // 9,8,7,6,5,4,3,2,1,0
        let t8 = t7.pow2k(10);              // 19..10
        let t9 = &t8 * &t7;                 // 19..0
        let t10 = t9.pow2k(20);             // 39..20
        let t11 = &t10 * &t9;               // 39..0
        let t12 = t11.pow2k(10);            // 49..10
        let t13 = &t12 * &t7;               // 49..0
        let t14 = t13.pow2k(50);            // 99..50
        let t15 = &t14 * &t13;              // 99..0
        let t16 = t15.pow2k(100);           // 199..100
        let t17 = &t16 * &t15;              // 199..0
        let t18 = t17.pow2k(50);            // 249..50
        let t19 = &t18 * &t13;              // 249..0

        (t19, t3)
    }

    /// Given a nonzero field element, compute its inverse.
    ///
    /// The inverse is computed as self^(p-2), since
    /// x^(p-2)x = x^(p-1) = 1 (mod p), using the fixed addition chain
    /// of the reference implementation.
    pub fn invert(&self) -> FieldElement {
        // The bits of p-2 = 2^255 -19 -2 are 11010111111...11.
        //
        //                                 nonzero bits of exponent
        let (t19, t3) = self.pow22501();   // t19: 249..0 ; t3: 3,1,0
        let t20 = t19.pow2k(5);            // 254..5
        &t20 * &t3                         // 254..5,3,1,0
    }

    /// Raise this field element to the power (p-5)/8 = 2^252 - 3, using
    /// the fixed addition chain.  Used in point decompression.
    pub fn pow_p58(&self) -> FieldElement {
        // The bits of (p-5)/8 are 101111.....11.
        //
        //                                 nonzero bits of exponent
        let (t19, _) = self.pow22501();    // 249..0
        let t20 = t19.pow2k(2);            // 251..2
        self * &t20                        // 251..2,0
    }
}
