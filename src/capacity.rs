//! Capacity tables and version/level resolution.
//!
//! Both supported versions use a single Reed-Solomon block at every level, so a symbol's
//! layout is fully described by its data codeword count and EC codeword count.

use crate::error::EncodeError;
use crate::qrcode::{EccLevel, SizeMode, Version};

/// Bits taken by the byte-mode indicator plus the 8-bit character count.
pub const HEADER_BITS: usize = 4 + 8;

// Indexed by [version - 1][ecc ordinal], ordinal L, M, Q, H
static DATA_CODEWORDS: [[usize; 4]; 2] = [
    [19, 16, 13, 9],
    [34, 28, 22, 16],
];

static EC_CODEWORDS: [[usize; 4]; 2] = [
    [7, 10, 13, 17],
    [10, 16, 22, 28],
];

static BYTE_CAPACITY: [[usize; 4]; 2] = [
    [17, 14, 11, 7],
    [32, 26, 20, 14],
];

// Modules left over after the last whole codeword
static REMAINDER_BITS: [usize; 2] = [0, 7];

fn table_get(table: &'static [[usize; 4]; 2], ver: Version, ecc: EccLevel) -> usize {
    table[usize::from(ver.value() - 1)][ecc.ordinal()]
}

/// Maximum number of byte-mode characters for the given version and level.
pub fn capacity(ver: Version, ecc: EccLevel) -> usize {
    table_get(&BYTE_CAPACITY, ver, ecc)
}

pub fn data_codewords(ver: Version, ecc: EccLevel) -> usize {
    table_get(&DATA_CODEWORDS, ver, ecc)
}

pub fn ec_codewords(ver: Version, ecc: EccLevel) -> usize {
    table_get(&EC_CODEWORDS, ver, ecc)
}

pub fn remainder_bits(ver: Version) -> usize {
    REMAINDER_BITS[usize::from(ver.value() - 1)]
}

/// Returns whether `text_len` characters fit the given version and level.
pub fn fits(ver: Version, ecc: EccLevel, text_len: usize) -> bool {
    text_len <= capacity(ver, ecc)
}

/// Concrete parameters for one symbol.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Resolution {
    pub version: Version,
    pub ecc: EccLevel,
    /// Side length in modules.
    pub size: usize,
    /// Exact length of the padded data bitstream.
    pub data_bits: usize,
    pub ec_codewords: usize,
}

impl Resolution {
    pub fn new(version: Version, ecc: EccLevel) -> Self {
        Self {
            version,
            ecc,
            size: version.size(),
            data_bits: data_codewords(version, ecc) * 8,
            ec_codewords: ec_codewords(version, ecc),
        }
    }

    pub fn capacity(&self) -> usize {
        capacity(self.version, self.ecc)
    }
}

/// Resolves a size mode and text length to concrete symbol parameters.
///
/// Automatic mode picks the smallest version that holds the text at level L, then raises the
/// level as far as the text still fits in that version. When nothing holds the text the
/// largest version at level L is returned, so the bitstream stage can report the exact excess.
///
/// Manual mode uses whatever the caller pinned. A missing version becomes the smallest one that
/// fits at the requested level; a missing level becomes the strongest one that fits the
/// requested version. Giving neither is an error.
pub fn resolve(mode: SizeMode, text_len: usize) -> Result<Resolution, EncodeError> {
    let (version, ecc) = match mode {
        SizeMode::Automatic => {
            let version = smallest_version(EccLevel::Low, text_len);
            (version, strongest_level(version, text_len))
        }
        SizeMode::Manual { version: Some(version), ecc: Some(ecc) } => (version, ecc),
        SizeMode::Manual { version: Some(version), ecc: None } => {
            (version, strongest_level(version, text_len))
        }
        SizeMode::Manual { version: None, ecc: Some(ecc) } => {
            (smallest_version(ecc, text_len), ecc)
        }
        SizeMode::Manual { version: None, ecc: None } => {
            return Err(EncodeError::unresolvable(
                "manual mode needs a version, an ECC level, or both"
            ));
        }
    };
    Ok(Resolution::new(version, ecc))
}

fn smallest_version(ecc: EccLevel, text_len: usize) -> Version {
    Version::all()
        .find(|&ver| fits(ver, ecc, text_len))
        .unwrap_or(Version::MAX)
}

fn strongest_level(ver: Version, text_len: usize) -> EccLevel {
    EccLevel::ALL
        .iter()
        .rev()
        .copied()
        .find(|&ecc| fits(ver, ecc, text_len))
        .unwrap_or(EccLevel::Low)
}
