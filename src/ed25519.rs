// -*- mode: rust; -*-
//
// This file is part of ledger-ed25519.
// See LICENSE for licensing information.

//! Ed25519 key generation, deterministic signing, and RFC 8032
//! verification.
//!
//! Private keys use the ledger wire format: 64 bytes, holding the
//! 32-byte RFC 8032 seed followed by the 32-byte public key, so that a
//! private key alone is sufficient to sign and to recover the public
//! key.

#![allow(non_snake_case)]

use core::fmt::Debug;

use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};
use zeroize::Zeroize;

use crate::edwards::{double_scalar_mult_vartime, CompressedEdwardsY, ExtendedPoint};
use crate::errors::{InternalError, SignatureError};
use crate::scalar::Scalar;

use subtle::ConstantTimeEq;

/// The length of an Ed25519 seed, in bytes.  Seeds are the private key
/// representation used by RFC 8032.
pub const SEED_LENGTH: usize = 32;

/// The length of an Ed25519 public key, in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// The length of a ledger-format Ed25519 private key, in bytes: the
/// seed concatenated with the public key.
pub const PRIVATE_KEY_LENGTH: usize = SEED_LENGTH + PUBLIC_KEY_LENGTH;

/// The length of an Ed25519 signature, in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

// ------------------------------------------------------------------------
// Signatures
// ------------------------------------------------------------------------

/// An Ed25519 signature: the compressed point `R` followed by the
/// scalar `s`.
///
/// Signatures are "detached": they do not include a copy of the signed
/// message.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Signature {
    /// `R` is the encoding of `r·B`, where `r` is the deterministic
    /// nonce derived from the private key and the message.
    pub(crate) R: CompressedEdwardsY,

    /// `s = H(R ‖ A ‖ M)·a + r (mod l)`.
    ///
    /// `s` is stored as loaded; verification rejects values ≥ l.
    pub(crate) s: Scalar,
}

impl Debug for Signature {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "Signature( R: {:?}, s: {:?} )", &self.R, &self.s)
    }
}

impl Signature {
    /// Convert this `Signature` to a byte array.
    #[inline]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut signature_bytes: [u8; SIGNATURE_LENGTH] = [0u8; SIGNATURE_LENGTH];

        signature_bytes[..32].copy_from_slice(&self.R.as_bytes()[..]);
        signature_bytes[32..].copy_from_slice(&self.s.as_bytes()[..]);
        signature_bytes
    }

    /// Construct a `Signature` from a slice of bytes.
    ///
    /// Fails if the slice is not exactly 64 bytes long, or if any of
    /// the three reserved high bits of the final byte are set (such a
    /// value cannot be a scalar below the group order).
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Signature, SignatureError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError(InternalError::BytesLengthError {
                name: "Signature",
                length: SIGNATURE_LENGTH,
            }));
        }
        let mut lower: [u8; 32] = [0u8; 32];
        let mut upper: [u8; 32] = [0u8; 32];

        lower.copy_from_slice(&bytes[..32]);
        upper.copy_from_slice(&bytes[32..]);

        if upper[31] & 224 != 0 {
            return Err(SignatureError(InternalError::ScalarFormatError));
        }

        Ok(Signature {
            R: CompressedEdwardsY(lower),
            s: Scalar(upper),
        })
    }
}

// ------------------------------------------------------------------------
// Secret material
// ------------------------------------------------------------------------

/// An Ed25519 seed: the 32-byte private key representation of RFC 8032.
pub struct SecretKey(pub(crate) [u8; SEED_LENGTH]);

impl Debug for SecretKey {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "SecretKey: <omitted>")
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl SecretKey {
    /// View this secret key as an array of bytes.
    pub fn as_bytes(&self) -> &[u8; SEED_LENGTH] {
        &self.0
    }

    /// Construct a `SecretKey` from a slice of bytes.
    ///
    /// Fails with a length error unless `bytes.len() == 32`.
    pub fn from_bytes(bytes: &[u8]) -> Result<SecretKey, SignatureError> {
        if bytes.len() != SEED_LENGTH {
            return Err(SignatureError(InternalError::BytesLengthError {
                name: "SecretKey",
                length: SEED_LENGTH,
            }));
        }
        let mut bits: [u8; 32] = [0u8; 32];
        bits.copy_from_slice(bytes);

        Ok(SecretKey(bits))
    }

    /// Generate a `SecretKey` from a cryptographically secure random
    /// number generator supplied by the caller.
    ///
    /// This is the only entry point of the crate which consumes
    /// randomness; everything else is a deterministic function of its
    /// inputs.
    pub fn generate<T>(csprng: &mut T) -> SecretKey
    where
        T: CryptoRng + RngCore,
    {
        let mut seed: [u8; SEED_LENGTH] = [0u8; SEED_LENGTH];
        csprng.fill_bytes(&mut seed);

        SecretKey(seed)
    }
}

/// An "expanded" secret key: the clamped signing scalar `a` and the
/// nonce prefix, both halves of `SHA-512(seed)`.
pub(crate) struct ExpandedSecretKey {
    pub(crate) key: Scalar,
    pub(crate) nonce: [u8; 32],
}

impl Drop for ExpandedSecretKey {
    fn drop(&mut self) {
        self.key.zeroize();
        self.nonce.zeroize();
    }
}

impl ExpandedSecretKey {
    /// Expand a seed into a signing scalar and a nonce prefix.
    ///
    /// The low half of the digest is clamped (clear the low 3 bits,
    /// clear bit 255, set bit 254) so the scalar is a multiple of the
    /// cofactor and lies in the range forced by the key-generation
    /// contract.
    pub(crate) fn from_secret_key(secret_key: &SecretKey) -> ExpandedSecretKey {
        let mut h = Sha512::new();
        h.update(secret_key.as_bytes());
        let mut hash: [u8; 64] = [0u8; 64];
        hash.copy_from_slice(h.finalize().as_slice());

        let mut lower: [u8; 32] = [0u8; 32];
        let mut upper: [u8; 32] = [0u8; 32];
        lower.copy_from_slice(&hash[00..32]);
        upper.copy_from_slice(&hash[32..64]);
        hash.zeroize();

        lower[0] &= 248;
        lower[31] &= 63;
        lower[31] |= 64;

        ExpandedSecretKey {
            key: Scalar(lower),
            nonce: upper,
        }
    }

    /// Sign a message with this expanded secret key, per RFC 8032:
    ///
    /// ```text
    /// r = reduce(SHA-512(nonce ‖ M))
    /// R = r·B
    /// k = reduce(SHA-512(R ‖ A ‖ M))
    /// s = k·a + r (mod l)
    /// ```
    pub(crate) fn sign(&self, message: &[u8], public_key: &PublicKey) -> Signature {
        let mut h = Sha512::new();
        h.update(&self.nonce);
        h.update(message);
        let mut r_digest: [u8; 64] = [0u8; 64];
        r_digest.copy_from_slice(h.finalize().as_slice());
        let r = Scalar::reduce(&r_digest);

        let R = ExtendedPoint::basepoint_mult(&r).compress();

        let mut h = Sha512::new();
        h.update(R.as_bytes());
        h.update(public_key.as_bytes());
        h.update(message);
        let mut k_digest: [u8; 64] = [0u8; 64];
        k_digest.copy_from_slice(h.finalize().as_slice());
        let k = Scalar::reduce(&k_digest);

        let s = Scalar::multiply_add(&k, &self.key, &r);

        Signature { R, s }
    }
}

// ------------------------------------------------------------------------
// Public keys
// ------------------------------------------------------------------------

/// An Ed25519 public key: the compressed encoding of `a·B`.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct PublicKey(pub(crate) CompressedEdwardsY);

impl Debug for PublicKey {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "PublicKey( {:?} )", self.0)
    }
}

impl PublicKey {
    /// View this public key as an array of bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        self.0.as_bytes()
    }

    /// Copy this public key to an array of bytes.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.to_bytes()
    }

    /// Construct a `PublicKey` from a slice of bytes.
    ///
    /// Only the length is checked here; a public key that is not the
    /// encoding of a curve point makes `verify` return false, rather
    /// than failing construction, so that verification stays total.
    pub fn from_bytes(bytes: &[u8]) -> Result<PublicKey, SignatureError> {
        if bytes.len() != PUBLIC_KEY_LENGTH {
            return Err(SignatureError(InternalError::BytesLengthError {
                name: "PublicKey",
                length: PUBLIC_KEY_LENGTH,
            }));
        }
        let mut bits: [u8; 32] = [0u8; 32];
        bits.copy_from_slice(bytes);

        Ok(PublicKey(CompressedEdwardsY(bits)))
    }

    /// Derive this public key from its secret counterpart.
    pub(crate) fn from_expanded_key(expanded: &ExpandedSecretKey) -> PublicKey {
        let A = ExtendedPoint::basepoint_mult(&expanded.key);
        PublicKey(A.compress())
    }

    /// Verify a signature on a message with this public key, per
    /// RFC 8032 §5.1.7.
    ///
    /// Returns `false` on any malformed input; this function never
    /// panics on attacker-controlled data.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        // Decompress the public key, failing closed.
        let A = match self.0.decompress() {
            Some(point) => point,
            None => return false,
        };
        let minus_A = -&A;

        let mut h = Sha512::new();
        h.update(signature.R.as_bytes());
        h.update(self.as_bytes());
        h.update(message);
        let mut k_digest: [u8; 64] = [0u8; 64];
        k_digest.copy_from_slice(h.finalize().as_slice());
        let k = Scalar::reduce(&k_digest);

        // RFC 8032 §5.1.7 requires that s be in the range [0, l) in
        // order to prevent signature malleability.
        if !signature.s.is_canonical() {
            return false;
        }

        let R = double_scalar_mult_vartime(&k, &minus_A, &signature.s);

        bool::from(R.compress().as_bytes().ct_eq(signature.R.as_bytes()))
    }
}

// ------------------------------------------------------------------------
// Private keys and keypairs
// ------------------------------------------------------------------------

/// A ledger-format Ed25519 private key: the 32-byte seed followed by
/// the 32-byte public key.
pub struct PrivateKey(pub(crate) [u8; PRIVATE_KEY_LENGTH]);

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "PrivateKey: <omitted>")
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl PrivateKey {
    /// View this private key as an array of bytes.
    pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_LENGTH] {
        &self.0
    }

    /// Copy this private key to an array of bytes.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.0
    }

    /// Calculate a private key from a 32-byte seed.
    ///
    /// The seed length is an exact contract: anything other than 32
    /// bytes fails with a length error.
    pub fn from_seed(seed: &[u8]) -> Result<PrivateKey, SignatureError> {
        let secret_key = SecretKey::from_bytes(seed)?;
        Ok(PrivateKey::from_secret_key(&secret_key))
    }

    /// Calculate a private key from a `SecretKey` seed.
    pub fn from_secret_key(secret_key: &SecretKey) -> PrivateKey {
        let expanded = ExpandedSecretKey::from_secret_key(secret_key);
        let public_key = PublicKey::from_expanded_key(&expanded);

        let mut bytes = [0u8; PRIVATE_KEY_LENGTH];
        bytes[..SEED_LENGTH].copy_from_slice(secret_key.as_bytes());
        bytes[SEED_LENGTH..].copy_from_slice(public_key.as_bytes());

        PrivateKey(bytes)
    }

    /// Construct a `PrivateKey` from a slice of bytes.
    ///
    /// Fails with a length error unless `bytes.len() == 64`.
    pub fn from_bytes(bytes: &[u8]) -> Result<PrivateKey, SignatureError> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(SignatureError(InternalError::BytesLengthError {
                name: "PrivateKey",
                length: PRIVATE_KEY_LENGTH,
            }));
        }
        let mut bits: [u8; PRIVATE_KEY_LENGTH] = [0u8; PRIVATE_KEY_LENGTH];
        bits.copy_from_slice(bytes);

        Ok(PrivateKey(bits))
    }

    /// The seed half of this private key.
    pub fn secret_key(&self) -> SecretKey {
        let mut seed = [0u8; SEED_LENGTH];
        seed.copy_from_slice(&self.0[..SEED_LENGTH]);
        SecretKey(seed)
    }

    /// The public half of this private key.
    pub fn public_key(&self) -> PublicKey {
        let mut bits = [0u8; PUBLIC_KEY_LENGTH];
        bits.copy_from_slice(&self.0[SEED_LENGTH..]);
        PublicKey(CompressedEdwardsY(bits))
    }

    /// Sign a message with this private key, deterministically.
    ///
    /// Signing is a pure function of `(private key, message)`: the
    /// nonce is derived from the hash of the seed and the message, per
    /// RFC 8032, never from ambient randomness.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let expanded = ExpandedSecretKey::from_secret_key(&self.secret_key());
        expanded.sign(message, &self.public_key())
    }
}

/// An Ed25519 keypair.
pub struct Keypair {
    /// The public half of this keypair.
    pub public: PublicKey,
    /// The private half of this keypair.
    pub private: PrivateKey,
}

impl Keypair {
    /// Derive a keypair from a 32-byte seed.
    pub fn from_seed(seed: &[u8]) -> Result<Keypair, SignatureError> {
        let private = PrivateKey::from_seed(seed)?;
        let public = private.public_key();
        Ok(Keypair { public, private })
    }

    /// Generate a fresh keypair from a caller-supplied CSPRNG.
    pub fn generate<T>(csprng: &mut T) -> Keypair
    where
        T: CryptoRng + RngCore,
    {
        let secret_key = SecretKey::generate(csprng);
        let private = PrivateKey::from_secret_key(&secret_key);
        let public = private.public_key();
        Keypair { public, private }
    }

    /// Sign a message with this keypair.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.private.sign(message)
    }

    /// Verify a signature on a message with this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.public.verify(message, signature)
    }
}

// ------------------------------------------------------------------------
// Slice-level entry points
// ------------------------------------------------------------------------

/// Sign `message` with a 64-byte ledger-format private key, returning
/// the 64-byte signature.
///
/// Fails with a length error if the private key is not 64 bytes.
pub fn sign(private_key: &[u8], message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], SignatureError> {
    let private = PrivateKey::from_bytes(private_key)?;
    Ok(private.sign(message).to_bytes())
}

/// Report whether `signature` is a valid signature of `message` by
/// `public_key`, per RFC 8032.
///
/// Total over all byte strings: wrong lengths, unusable encodings and
/// non-canonical scalars all yield `false`, never a panic or an error.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let public = match PublicKey::from_bytes(public_key) {
        Ok(public) => public,
        Err(_) => return false,
    };
    let signature = match Signature::from_bytes(signature) {
        Ok(signature) => signature,
        Err(_) => return false,
    };
    public.verify(message, &signature)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seed_length_is_exact() {
        assert!(PrivateKey::from_seed(&[0u8; 31]).is_err());
        assert!(PrivateKey::from_seed(&[0u8; 33]).is_err());
        assert!(PrivateKey::from_seed(&[0u8; 32]).is_ok());
        assert!(SecretKey::from_bytes(&[]).is_err());
    }

    #[test]
    fn private_key_length_is_exact() {
        assert!(PrivateKey::from_bytes(&[0u8; 63]).is_err());
        let err = sign(&[0u8; 63], b"message").unwrap_err();
        assert_eq!(
            err.to_string(),
            "PrivateKey must be 64 bytes in length"
        );
    }

    #[test]
    fn signature_parsing() {
        assert!(Signature::from_bytes(&[0u8; 63]).is_err());
        assert!(Signature::from_bytes(&[0u8; 65]).is_err());

        let mut high_bits = [0u8; 64];
        high_bits[63] = 0xe0;
        assert!(Signature::from_bytes(&high_bits).is_err());

        let ok = Signature::from_bytes(&[0u8; 64]).unwrap();
        assert_eq!(ok.to_bytes(), [0u8; 64]);
    }

    #[test]
    fn private_key_embeds_public_key() {
        let seed = [0x42u8; 32];
        let keypair = Keypair::from_seed(&seed).unwrap();
        assert_eq!(
            &keypair.private.as_bytes()[..32],
            &seed[..]
        );
        assert_eq!(
            &keypair.private.as_bytes()[32..],
            &keypair.public.as_bytes()[..]
        );
    }

    #[test]
    fn sign_verify_roundtrip() {
        let keypair = Keypair::from_seed(&[7u8; 32]).unwrap();
        let message = b"ledger message";
        let signature = keypair.sign(message);
        assert!(keypair.verify(message, &signature));
        assert!(!keypair.verify(b"ledger massage", &signature));
    }

    #[test]
    fn signing_is_deterministic() {
        let keypair = Keypair::from_seed(&[9u8; 32]).unwrap();
        let message = b"determinism is load-bearing";
        let one = keypair.sign(message);
        let two = keypair.sign(message);
        assert_eq!(one.to_bytes(), two.to_bytes());
    }

    #[test]
    fn verify_is_total() {
        // Wrong lengths fail closed, without panicking.
        assert!(!verify(&[0u8; 31], b"m", &[0u8; 64]));
        assert!(!verify(&[0u8; 32], b"m", &[0u8; 63]));
        // A public key that is not a curve point fails closed.  y = 2
        // is not on the curve.
        let mut not_a_point = [0u8; 32];
        not_a_point[0] = 2;
        assert!(!verify(&not_a_point, b"m", &[0u8; 64]));
    }
}
