// -*- mode: rust; -*-
//
// This file is part of ledger-ed25519.
// See LICENSE for licensing information.

//! Arithmetic on scalars modulo the group order.
//!
//! The Ed25519 basepoint B has prime order
//!
//! l = 2^252 + 27742317777372353535851937790883648493.
//!
//! Thus a multiple `aB` of the basepoint (with a ∈ ℤ) depends only on
//! the value of `a (mod l)`.  The `Scalar` struct represents an element
//! in ℤ/lℤ.
//!
//! Arithmetic on `Scalar`s is done using 21-bit limbs.  However, in
//! contrast to `FieldElement`s, `Scalar`s are stored in memory as
//! little-endian bytes, allowing easy access to the bits of the scalar.

use core::fmt::Debug;

use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

use crate::field::{load3, load4};

/// Convert an array of (at least) eight bytes into a u64.
#[inline]
fn load8(input: &[u8]) -> u64 {
    (input[0] as u64)
        | ((input[1] as u64) << 8)
        | ((input[2] as u64) << 16)
        | ((input[3] as u64) << 24)
        | ((input[4] as u64) << 32)
        | ((input[5] as u64) << 40)
        | ((input[6] as u64) << 48)
        | ((input[7] as u64) << 56)
}

/// The group order l, as four little-endian 64-bit words.
const ORDER_WORDS: [u64; 4] = [
    0x5812_631a_5cf5_d3ed,
    0x14de_f9de_a2f7_9cd6,
    0x0000_0000_0000_0000,
    0x1000_0000_0000_0000,
];

/// The `Scalar` struct represents an element in ℤ/lℤ, stored as 32
/// little-endian bytes.
#[derive(Copy, Clone)]
pub struct Scalar(pub [u8; 32]);

impl Debug for Scalar {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "Scalar: {:?}", &self.0[..])
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Scalar) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Scalar) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for Scalar {}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Scalar {
    /// Construct the additive identity.
    pub fn zero() -> Scalar {
        Scalar([0u8; 32])
    }

    /// Construct the multiplicative identity.
    pub fn one() -> Scalar {
        let mut bytes = [0u8; 32];
        bytes[0] = 1;
        Scalar(bytes)
    }

    /// View this scalar as an array of bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Copy this scalar to an array of bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Test whether this scalar is the canonical representative of its
    /// residue class, i.e. whether it lies in [0, l).
    ///
    /// The comparison reads the scalar and the group order as four
    /// 64-bit words, most significant first.  RFC 8032 §5.1.7 requires
    /// the `s` component of a signature to pass this check; accepting
    /// s ≥ l would make signatures malleable.
    pub fn is_canonical(&self) -> bool {
        let mut i = 3;
        loop {
            let v = load8(&self.0[i * 8..]);
            if v > ORDER_WORDS[i] {
                return false;
            } else if v < ORDER_WORDS[i] {
                break;
            } else if i == 0 {
                return false;
            }
            i -= 1;
        }
        true
    }

    /// Compute a width-5 "Non-Adjacent Form" of this scalar.
    ///
    /// A width-w NAF of a positive integer k is an expression
    /// `k = sum(k[i]*2^i for i in range(l))`, where each nonzero
    /// coefficient k[i] is odd and bounded by |k[i]| < 2^(w-1), and at
    /// most one of any w consecutive coefficients is nonzero.
    ///
    /// Intuitively, this is like a binary expansion, except that we
    /// allow some coefficients to grow so that the nonzero
    /// coefficients are as sparse as possible.
    pub fn non_adjacent_form(&self) -> [i8; 256] {
        // Step 1: write out the bits of the scalar.
        let mut naf = [0i8; 256];
        for i in 0..256 {
            // As i runs from 0..256, the bottom 3 bits index the bit,
            // while the upper bits index the byte.
            naf[i] = ((self.0[i >> 3] >> (i & 7)) & 1u8) as i8;
        }

        // Step 2: zero coefficients by carrying them upwards or
        // downwards.
        'bits: for i in 0..256 {
            if naf[i] == 0 {
                continue 'bits;
            }
            'window: for b in 1..6 {
                if i + b >= 256 {
                    break 'window;
                }
                if naf[i + b] == 0 {
                    continue 'window;
                }
                let potential_carry = naf[i + b] << b;
                if naf[i] + potential_carry <= 15 {
                    // Eliminate naf[i+b] by carrying its value onto
                    // naf[i].
                    naf[i] += potential_carry;
                    naf[i + b] = 0;
                } else if naf[i] - potential_carry >= -15 {
                    // Eliminate naf[i+b] by carrying its value upwards.
                    naf[i] -= potential_carry; // Subtract 2^(i+b)
                    'carry: for k in i + b..256 {
                        if naf[k] != 0 {
                            // Since naf[k] = 0 or 1 for k > i,
                            // naf[k] == 1.
                            naf[k] = 0; // Subtract 2^k
                        } else {
                            // By now we have subtracted 2^k =
                            // 2^(i+b) + 2^(i+b) + 2^(i+b+1) + ... + 2^(k-1).
                            naf[k] = 1; // Add back 2^k.
                            break 'carry;
                        }
                    }
                } else {
                    break 'window;
                }
            }
        }

        naf
    }

    /// Write this scalar in radix 16, with coefficients in [-8,8),
    /// i.e., compute `a_i` such that
    ///
    ///    a = a_0 + a_1*16^1 + ... + a_63*16^63,
    ///
    /// with `-8 ≤ a_i < 8` for `0 ≤ i < 63` and `-8 ≤ a_63 ≤ 8`.
    ///
    /// Precondition: self[31] <= 127.  This is the case whenever `self`
    /// is reduced.
    pub fn to_radix_16(&self) -> [i8; 64] {
        debug_assert!(self.0[31] <= 127);
        let mut output = [0i8; 64];

        // Step 1: change radix.
        // Convert from radix 256 (bytes) to radix 16 (nibbles).
        #[inline(always)]
        fn bot_half(x: u8) -> u8 {
            x & 15
        }
        #[inline(always)]
        fn top_half(x: u8) -> u8 {
            (x >> 4) & 15
        }

        for i in 0..32 {
            output[2 * i] = bot_half(self.0[i]) as i8;
            output[2 * i + 1] = top_half(self.0[i]) as i8;
        }
        // Precondition note: since self[31] <= 127, output[63] <= 7

        // Step 2: recenter coefficients from [0,16) to [-8,8)
        for i in 0..63 {
            let carry = (output[i] + 8) >> 4;
            output[i] -= carry << 4;
            output[i + 1] += carry;
        }
        // Precondition note: output[63] is not recentered.  It
        // increases by carry <= 1.  Thus output[63] <= 8.

        output
    }

    /// Pack 12 21-bit limbs into 32 bytes.
    fn pack_limbs(limbs: &[i64; 12]) -> Scalar {
        let mut s = Scalar::zero();
        s.0[0] = limbs[0] as u8;
        s.0[1] = (limbs[0] >> 8) as u8;
        s.0[2] = ((limbs[0] >> 16) | (limbs[1] << 5)) as u8;
        s.0[3] = (limbs[1] >> 3) as u8;
        s.0[4] = (limbs[1] >> 11) as u8;
        s.0[5] = ((limbs[1] >> 19) | (limbs[2] << 2)) as u8;
        s.0[6] = (limbs[2] >> 6) as u8;
        s.0[7] = ((limbs[2] >> 14) | (limbs[3] << 7)) as u8;
        s.0[8] = (limbs[3] >> 1) as u8;
        s.0[9] = (limbs[3] >> 9) as u8;
        s.0[10] = ((limbs[3] >> 17) | (limbs[4] << 4)) as u8;
        s.0[11] = (limbs[4] >> 4) as u8;
        s.0[12] = (limbs[4] >> 12) as u8;
        s.0[13] = ((limbs[4] >> 20) | (limbs[5] << 1)) as u8;
        s.0[14] = (limbs[5] >> 7) as u8;
        s.0[15] = ((limbs[5] >> 15) | (limbs[6] << 6)) as u8;
        s.0[16] = (limbs[6] >> 2) as u8;
        s.0[17] = (limbs[6] >> 10) as u8;
        s.0[18] = ((limbs[6] >> 18) | (limbs[7] << 3)) as u8;
        s.0[19] = (limbs[7] >> 5) as u8;
        s.0[20] = (limbs[7] >> 13) as u8;
        s.0[21] = limbs[8] as u8;
        s.0[22] = (limbs[8] >> 8) as u8;
        s.0[23] = ((limbs[8] >> 16) | (limbs[9] << 5)) as u8;
        s.0[24] = (limbs[9] >> 3) as u8;
        s.0[25] = (limbs[9] >> 11) as u8;
        s.0[26] = ((limbs[9] >> 19) | (limbs[10] << 2)) as u8;
        s.0[27] = (limbs[10] >> 6) as u8;
        s.0[28] = ((limbs[10] >> 14) | (limbs[11] << 7)) as u8;
        s.0[29] = (limbs[11] >> 1) as u8;
        s.0[30] = (limbs[11] >> 9) as u8;
        s.0[31] = (limbs[11] >> 17) as u8;

        s
    }

    /// Unpack this scalar into 12 21-bit limbs.
    fn unpack_limbs(&self) -> [i64; 12] {
        let mask_21bits: i64 = (1 << 21) - 1;
        let mut a = [0i64; 12];
        a[0] = mask_21bits & load3(&self.0[0..]);
        a[1] = mask_21bits & (load4(&self.0[2..]) >> 5);
        a[2] = mask_21bits & (load3(&self.0[5..]) >> 2);
        a[3] = mask_21bits & (load4(&self.0[7..]) >> 7);
        a[4] = mask_21bits & (load4(&self.0[10..]) >> 4);
        a[5] = mask_21bits & (load3(&self.0[13..]) >> 1);
        a[6] = mask_21bits & (load4(&self.0[15..]) >> 6);
        a[7] = mask_21bits & (load3(&self.0[18..]) >> 3);
        a[8] = mask_21bits & load3(&self.0[21..]);
        a[9] = mask_21bits & (load4(&self.0[23..]) >> 5);
        a[10] = mask_21bits & (load3(&self.0[26..]) >> 2);
        a[11] = load4(&self.0[28..]) >> 7;

        a
    }

    /// Reduce 24 21-bit limbs in place modulo
    ///
    ///   l = 2^252 + 27742317777372353535851937790883648493,
    ///
    /// so
    ///
    ///   2^252 = -27742317777372353535851937790883648493 (mod l).
    ///
    /// We can write the right-hand side in 21-bit limbs as
    ///
    /// rhs =    666643 * 2^0
    ///        + 470296 * 2^21
    ///        + 654183 * 2^42
    ///        - 997805 * 2^63
    ///        + 136657 * 2^84
    ///        - 683901 * 2^105
    ///
    /// The (12+k)-th limb of `limbs` is the coefficient of
    /// 2^(252 + 21*k) since 12*21 = 252, so it can be eliminated by
    /// adding those values to the lower limbs.  Reduction mod l amounts
    /// to eliminating all of the high limbs top-down while carrying as
    /// appropriate to prevent overflows in the lower limbs, then
    /// carry-propagating bottom-up.
    fn reduce_limbs(limbs: &mut [i64; 24]) {
        /// Fold limb `i` into limbs `i-12 .. i-6` using the structure
        /// of l.
        #[inline]
        fn do_reduction(limbs: &mut [i64; 24], i: usize) {
            limbs[i - 12] += limbs[i] * 666643;
            limbs[i - 11] += limbs[i] * 470296;
            limbs[i - 10] += limbs[i] * 654183;
            limbs[i - 9] -= limbs[i] * 997805;
            limbs[i - 8] += limbs[i] * 136657;
            limbs[i - 7] -= limbs[i] * 683901;
            limbs[i] = 0;
        }
        /// Carry excess from the `i`-th limb into the `(i+1)`-th limb.
        /// Postcondition: `0 <= limbs[i] < 2^21`.
        #[inline]
        fn do_carry_uncentered(limbs: &mut [i64; 24], i: usize) {
            let carry: i64 = limbs[i] >> 21;
            limbs[i + 1] += carry;
            limbs[i] -= carry << 21;
        }
        /// Carry excess from the `i`-th limb into the `(i+1)`-th limb.
        /// Postcondition: `-2^20 <= limbs[i] < 2^20`.
        #[inline]
        fn do_carry_centered(limbs: &mut [i64; 24], i: usize) {
            let carry: i64 = (limbs[i] + (1 << 20)) >> 21;
            limbs[i + 1] += carry;
            limbs[i] -= carry << 21;
        }

        for i in 0..23 {
            do_carry_centered(limbs, i);
        }
        for i in (0..23).filter(|x| x % 2 == 1) {
            do_carry_centered(limbs, i);
        }

        do_reduction(limbs, 23);
        do_reduction(limbs, 22);
        do_reduction(limbs, 21);
        do_reduction(limbs, 20);
        do_reduction(limbs, 19);
        do_reduction(limbs, 18);

        for i in (6..18).filter(|x| x % 2 == 0) {
            do_carry_centered(limbs, i);
        }
        for i in (6..16).filter(|x| x % 2 == 1) {
            do_carry_centered(limbs, i);
        }

        do_reduction(limbs, 17);
        do_reduction(limbs, 16);
        do_reduction(limbs, 15);
        do_reduction(limbs, 14);
        do_reduction(limbs, 13);
        do_reduction(limbs, 12);

        for i in (0..12).filter(|x| x % 2 == 0) {
            do_carry_centered(limbs, i);
        }
        for i in (0..12).filter(|x| x % 2 == 1) {
            do_carry_centered(limbs, i);
        }

        do_reduction(limbs, 12);

        for i in 0..12 {
            do_carry_uncentered(limbs, i);
        }

        do_reduction(limbs, 12);

        for i in 0..11 {
            do_carry_uncentered(limbs, i);
        }
    }

    /// Compute `ab + c (mod l)`.
    ///
    /// This is the central operation of deterministic signing:
    /// `s = H(R,A,M)·a + r (mod l)`.
    pub fn multiply_add(a: &Scalar, b: &Scalar, c: &Scalar) -> Scalar {
        let al = a.unpack_limbs();
        let bl = b.unpack_limbs();
        let cl = c.unpack_limbs();

        let mut result = [0i64; 24];

        // Multiply a and b, and add c.
        result[0]  =         cl[0] +  al[0]*bl[0];
        result[1]  =         cl[1] +  al[0]*bl[1]  +  al[1]*bl[0];
        result[2]  =         cl[2] +  al[0]*bl[2]  +  al[1]*bl[1] +  al[2]*bl[0];
        result[3]  =         cl[3] +  al[0]*bl[3]  +  al[1]*bl[2] +  al[2]*bl[1] +  al[3]*bl[0];
        result[4]  =         cl[4] +  al[0]*bl[4]  +  al[1]*bl[3] +  al[2]*bl[2] +  al[3]*bl[1] +  al[4]*bl[0];
        result[5]  =         cl[5] +  al[0]*bl[5]  +  al[1]*bl[4] +  al[2]*bl[3] +  al[3]*bl[2] +  al[4]*bl[1] +  al[5]*bl[0];
        result[6]  =         cl[6] +  al[0]*bl[6]  +  al[1]*bl[5] +  al[2]*bl[4] +  al[3]*bl[3] +  al[4]*bl[2] +  al[5]*bl[1] +  al[6]*bl[0];
        result[7]  =         cl[7] +  al[0]*bl[7]  +  al[1]*bl[6] +  al[2]*bl[5] +  al[3]*bl[4] +  al[4]*bl[3] +  al[5]*bl[2] +  al[6]*bl[1] +  al[7]*bl[0];
        result[8]  =         cl[8] +  al[0]*bl[8]  +  al[1]*bl[7] +  al[2]*bl[6] +  al[3]*bl[5] +  al[4]*bl[4] +  al[5]*bl[3] +  al[6]*bl[2] +  al[7]*bl[1] +  al[8]*bl[0];
        result[9]  =         cl[9] +  al[0]*bl[9]  +  al[1]*bl[8] +  al[2]*bl[7] +  al[3]*bl[6] +  al[4]*bl[5] +  al[5]*bl[4] +  al[6]*bl[3] +  al[7]*bl[2] +  al[8]*bl[1] +  al[9]*bl[0];
        result[10] =        cl[10] +  al[0]*bl[10] +  al[1]*bl[9] +  al[2]*bl[8] +  al[3]*bl[7] +  al[4]*bl[6] +  al[5]*bl[5] +  al[6]*bl[4] +  al[7]*bl[3] +  al[8]*bl[2] +  al[9]*bl[1] + al[10]*bl[0];
        result[11] =        cl[11] +  al[0]*bl[11] + al[1]*bl[10] +  al[2]*bl[9] +  al[3]*bl[8] +  al[4]*bl[7] +  al[5]*bl[6] +  al[6]*bl[5] +  al[7]*bl[4] +  al[8]*bl[3] +  al[9]*bl[2] + al[10]*bl[1] + al[11]*bl[0];
        result[12] =  al[1]*bl[11] +  al[2]*bl[10] +  al[3]*bl[9] +  al[4]*bl[8] +  al[5]*bl[7] +  al[6]*bl[6] +  al[7]*bl[5] +  al[8]*bl[4] +  al[9]*bl[3] + al[10]*bl[2] + al[11]*bl[1];
        result[13] =  al[2]*bl[11] +  al[3]*bl[10] +  al[4]*bl[9] +  al[5]*bl[8] +  al[6]*bl[7] +  al[7]*bl[6] +  al[8]*bl[5] +  al[9]*bl[4] + al[10]*bl[3] + al[11]*bl[2];
        result[14] =  al[3]*bl[11] +  al[4]*bl[10] +  al[5]*bl[9] +  al[6]*bl[8] +  al[7]*bl[7] +  al[8]*bl[6] +  al[9]*bl[5] + al[10]*bl[4] + al[11]*bl[3];
        result[15] =  al[4]*bl[11] +  al[5]*bl[10] +  al[6]*bl[9] +  al[7]*bl[8] +  al[8]*bl[7] +  al[9]*bl[6] + al[10]*bl[5] + al[11]*bl[4];
        result[16] =  al[5]*bl[11] +  al[6]*bl[10] +  al[7]*bl[9] +  al[8]*bl[8] +  al[9]*bl[7] + al[10]*bl[6] + al[11]*bl[5];
        result[17] =  al[6]*bl[11] +  al[7]*bl[10] +  al[8]*bl[9] +  al[9]*bl[8] + al[10]*bl[7] + al[11]*bl[6];
        result[18] =  al[7]*bl[11] +  al[8]*bl[10] +  al[9]*bl[9] + al[10]*bl[8] + al[11]*bl[7];
        result[19] =  al[8]*bl[11] +  al[9]*bl[10] + al[10]*bl[9] + al[11]*bl[8];
        result[20] =  al[9]*bl[11] + al[10]*bl[10] + al[11]*bl[9];
        result[21] = al[10]*bl[11] + al[11]*bl[10];
        result[22] = al[11]*bl[11];
        result[23] = 0i64;

        Scalar::reduce_limbs(&mut result);

        let mut lo = [0i64; 12];
        lo.copy_from_slice(&result[..12]);
        Scalar::pack_limbs(&lo)
    }

    /// Reduce a 512-bit little-endian number modulo l.
    ///
    /// Used to turn 64-byte hash outputs into scalars.
    pub fn reduce(input: &[u8; 64]) -> Scalar {
        let mask_21bits: i64 = (1 << 21) - 1;

        let mut s = [0i64; 24];
        s[0] = mask_21bits & load3(&input[0..]);
        s[1] = mask_21bits & (load4(&input[2..]) >> 5);
        s[2] = mask_21bits & (load3(&input[5..]) >> 2);
        s[3] = mask_21bits & (load4(&input[7..]) >> 7);
        s[4] = mask_21bits & (load4(&input[10..]) >> 4);
        s[5] = mask_21bits & (load3(&input[13..]) >> 1);
        s[6] = mask_21bits & (load4(&input[15..]) >> 6);
        s[7] = mask_21bits & (load3(&input[18..]) >> 3);
        s[8] = mask_21bits & load3(&input[21..]);
        s[9] = mask_21bits & (load4(&input[23..]) >> 5);
        s[10] = mask_21bits & (load3(&input[26..]) >> 2);
        s[11] = mask_21bits & (load4(&input[28..]) >> 7);
        s[12] = mask_21bits & (load4(&input[31..]) >> 4);
        s[13] = mask_21bits & (load3(&input[34..]) >> 1);
        s[14] = mask_21bits & (load4(&input[36..]) >> 6);
        s[15] = mask_21bits & (load3(&input[39..]) >> 3);
        s[16] = mask_21bits & load3(&input[42..]);
        s[17] = mask_21bits & (load4(&input[44..]) >> 5);
        s[18] = mask_21bits & (load3(&input[47..]) >> 2);
        s[19] = mask_21bits & (load4(&input[49..]) >> 7);
        s[20] = mask_21bits & (load4(&input[52..]) >> 4);
        s[21] = mask_21bits & (load3(&input[55..]) >> 1);
        s[22] = mask_21bits & (load4(&input[57..]) >> 6);
        s[23] = load4(&input[60..]) >> 3;

        Scalar::reduce_limbs(&mut s);

        let mut lo = [0i64; 12];
        lo.copy_from_slice(&s[..12]);
        Scalar::pack_limbs(&lo)
    }
}
