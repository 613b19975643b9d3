// -*- mode: rust; -*-
//
// This file is part of ledger-ed25519.
// See LICENSE for licensing information.

//! Errors which may occur when constructing keys and signatures from
//! bytes.
//!
//! Verification itself never produces an error: `verify` and
//! `Zip215::verify` are total functions returning `bool`, since a
//! verifier must give an answer for every byte string an attacker can
//! present.

use core::fmt;
use core::fmt::Display;

/// Internal errors.  Most application-level developers will likely not
/// need to pay any attention to these.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum InternalError {
    /// An error in the length of bytes handed to a constructor.
    ///
    /// To use this, pass a string specifying the `name` of the type
    /// which is returning the error, and the `length` in bytes which
    /// its constructor expects.
    BytesLengthError {
        name: &'static str,
        length: usize,
    },
    /// A signature's `s` scalar had one of the three reserved high bits
    /// of its final byte set.
    ScalarFormatError,
}

impl Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            InternalError::BytesLengthError { name: n, length: l } => {
                write!(f, "{} must be {} bytes in length", n, l)
            }
            InternalError::ScalarFormatError => {
                write!(f, "Cannot use scalar with high-bit set")
            }
        }
    }
}

impl std::error::Error for InternalError {}

/// Errors which may occur while processing signatures and keypairs.
///
/// All these errors represent a contract violation by the caller
/// (malformed lengths or encodings handed to a constructor), never a
/// runtime condition of a well-formed input.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SignatureError(pub(crate) InternalError);

impl Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SignatureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}
