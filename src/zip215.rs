// -*- mode: rust; -*-
//
// This file is part of ledger-ed25519.
// See LICENSE for licensing information.

//! Ed25519 verification with the precisely-specified validation
//! criteria of ZIP215, suitable for consensus-critical contexts.
//!
//! Consensus protocols need every validator to accept or reject a
//! signature identically, including signatures whose point encodings
//! are valid but non-canonical.  ZIP215 verification therefore differs
//! from the RFC 8032 rules in exactly two places:
//!
//! 1. the public key and the signature's `R` component are decompressed
//!    without requiring canonical encodings, and the claimed `R` is
//!    never re-encoded for comparison;
//! 2. the final check is `[8](R' - R) == 0` rather than byte equality,
//!    so encodings differing by a small-order component are treated
//!    alike everywhere.
//!
//! The bound `s < l` is still required, as it is by RFC 8032.
//!
//! This is deliberately a separate entry point rather than a flag on
//! [`crate::verify`]: conflating the two behind a boolean risks
//! accidentally weakening the standard path.

#![allow(non_snake_case)]

use sha2::{Digest, Sha512};

use crate::ed25519::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use crate::edwards::{double_scalar_mult_vartime, CompressedEdwardsY};
use crate::scalar::Scalar;

/// Verification following the ZIP215 rules.
pub struct Zip215;

impl Zip215 {
    /// Report whether `signature` is a valid signature of `message` by
    /// `public_key`, using the ZIP215 validation criteria.
    ///
    /// Total over all byte strings: wrong lengths, unusable encodings
    /// and non-canonical scalars all yield `false`, never a panic.
    ///
    /// Every signature accepted by [`crate::verify`] is accepted here;
    /// the converse does not hold.
    pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        if public_key.len() != PUBLIC_KEY_LENGTH {
            return false;
        }
        if signature.len() != SIGNATURE_LENGTH || (signature[63] & 224) != 0 {
            return false;
        }

        let mut pk_bits = [0u8; 32];
        pk_bits.copy_from_slice(public_key);

        // Non-canonical encodings decompress rather than fail here;
        // that tolerance is the first ZIP215 divergence.
        let A = match CompressedEdwardsY(pk_bits).decompress() {
            Some(point) => point,
            None => return false,
        };
        let minus_A = -&A;

        let mut h = Sha512::new();
        h.update(&signature[..32]);
        h.update(public_key);
        h.update(message);
        let mut k_digest: [u8; 64] = [0u8; 64];
        k_digest.copy_from_slice(h.finalize().as_slice());
        let k = Scalar::reduce(&k_digest);

        let mut R_bits = [0u8; 32];
        R_bits.copy_from_slice(&signature[..32]);
        let R_claimed = match CompressedEdwardsY(R_bits).decompress() {
            Some(point) => point,
            None => return false,
        };

        let mut s_bits = [0u8; 32];
        s_bits.copy_from_slice(&signature[32..]);
        let s = Scalar(s_bits);

        // RFC 8032 §5.1.7 requires that s be in the range [0, l) in
        // order to prevent signature malleability; ZIP215 keeps this
        // requirement.
        if !s.is_canonical() {
            return false;
        }

        let R = double_scalar_mult_vartime(&k, &minus_A, &s).to_extended();

        // The second ZIP215 divergence: [8](R' - R) == 0 instead of
        // byte equality of encodings.
        R.cofactor_equal(&R_claimed)
    }
}
