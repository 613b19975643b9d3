// -*- mode: rust; -*-
//
// This file is part of ledger-ed25519.
// See LICENSE for licensing information.

//! # ledger-ed25519
//!
//! Ed25519 key derivation, deterministic signing, and signature
//! verification for ledger clients, built on a 32-bit serial
//! implementation of the underlying Curve25519 arithmetic.
//!
//! Two verification procedures are provided:
//!
//! * [`verify`] (and [`PublicKey::verify`]) follow RFC 8032 §5.1.7,
//!   including the rejection of non-canonical `s` scalars;
//! * [`Zip215::verify`] follows the ZIP215 rules used by
//!   consensus-critical validators, which accept non-canonical point
//!   encodings and compare points up to cofactor multiplication.
//!
//! Signing is deterministic: the signature is a pure function of the
//! private key and the message.  Randomness enters only through the
//! caller-supplied CSPRNG at seed generation.
//!
//! ## Example
//!
//! ```
//! use ledger_ed25519::{Keypair, Zip215, verify};
//!
//! let keypair = Keypair::from_seed(&[42u8; 32]).unwrap();
//! let message = b"value transfer";
//! let signature = keypair.sign(message).to_bytes();
//!
//! assert!(verify(keypair.public.as_bytes(), message, &signature));
//! assert!(Zip215::verify(keypair.public.as_bytes(), message, &signature));
//! ```

// Useful constants, like the basepoint and its precomputed tables
pub mod constants;

// Point operations on the Edwards form of Curve25519
pub mod edwards;

// Scalar arithmetic mod l = 2^252 + ..., the order of the basepoint
pub mod scalar;

// Finite field arithmetic mod p = 2^255 - 19
pub(crate) mod field;

// Errors for the fallible byte-level constructors
mod errors;

// Keys, deterministic signing, and RFC 8032 verification
pub mod ed25519;

// The ZIP215 consensus verification variant
pub mod zip215;

pub use crate::ed25519::{
    sign, verify, Keypair, PrivateKey, PublicKey, SecretKey, Signature,
    PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SEED_LENGTH, SIGNATURE_LENGTH,
};
pub use crate::errors::SignatureError;
pub use crate::zip215::Zip215;
