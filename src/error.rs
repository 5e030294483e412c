//! Error type returned by every fallible encoding step.

use thiserror::Error;

use crate::qrcode::{EccLevel, Version};

/// Why a text could not be turned into a symbol.
///
/// Every variant carries enough detail to build a user-facing message. An
/// encode that fails never hands out a partially populated grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The text was rejected by [`validate_text`](crate::validate::validate_text).
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A character has no single-byte (ISO-8859-1) representation.
    #[error("unsupported character {character:?} at position {position}; only Latin-1 characters can be encoded")]
    UnsupportedCharacter { character: char, position: usize },

    /// The assembled bitstream does not fit the resolved version and level.
    #[error(
        "version {version} with ECC level {ecc} supports {capacity} characters, text is {excess_chars} characters ({excess_bits} bits) over"
    )]
    CapacityExceeded {
        version: Version,
        ecc: EccLevel,
        capacity: usize,
        excess_chars: usize,
        excess_bits: usize,
    },

    /// A manual version, level or mask selection does not name a valid symbol.
    #[error("unresolvable request: {reason}")]
    UnresolvableRequest { reason: String },
}

impl EncodeError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }

    pub(crate) fn unresolvable(reason: impl Into<String>) -> Self {
        Self::UnresolvableRequest { reason: reason.into() }
    }
}
