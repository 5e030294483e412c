//! Byte-mode data bitstream assembly.

use core::convert::TryFrom;

use crate::capacity::{Resolution, HEADER_BITS};
use crate::error::EncodeError;

/// Mode indicator for 8-bit byte data.
const MODE_BYTE: u32 = 0b0100;

const PAD_BYTES: [u32; 2] = [0xEC, 0x11];

/// An appendable sequence of bits, packed MSB first into bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            data: Vec::with_capacity((bits + 7) / 8),
            length: 0,
        }
    }

    /// Number of bits appended so far.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Appends the low `len` bits of `val`, most significant first.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && (val >> len) == 0);
        for i in (0..len).rev() {
            let shift: u8 = 7 - ((self.length as u8) & 7);
            let bit: u8 = ((val >> i) as u8) & 1;
            if shift == 7 {
                self.data.push(bit << shift);
            } else if let Some(last) = self.data.last_mut() {
                *last |= bit << shift;
            }
            self.length += 1;
        }
    }

    /// Shortens the buffer to `len` bits. Has no effect if it is already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.length {
            return;
        }
        self.length = len;
        self.data.truncate((len + 7) / 8);
        if len % 8 != 0 {
            if let Some(last) = self.data.last_mut() {
                *last &= 0xFFu8 << (8 - len % 8);
            }
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Maps each character to its ISO-8859-1 byte.
///
/// Fails on the first character above U+00FF, naming it and its character position.
pub fn to_latin1(text: &str) -> Result<Vec<u8>, EncodeError> {
    text.chars()
        .enumerate()
        .map(|(position, character)| {
            u8::try_from(u32::from(character))
                .map_err(|_| EncodeError::UnsupportedCharacter { character, position })
        })
        .collect()
}

/// Builds the data codewords for `text`: mode indicator, character count, payload,
/// terminator, byte alignment and pad bytes, exactly `resolution.data_bits` long.
pub fn encode_data(text: &str, resolution: &Resolution) -> Result<Vec<u8>, EncodeError> {
    let payload = to_latin1(text)?;
    let capacitybits = resolution.data_bits;

    let usedbits = HEADER_BITS + payload.len() * 8;
    if usedbits > capacitybits {
        return Err(EncodeError::CapacityExceeded {
            version: resolution.version,
            ecc: resolution.ecc,
            capacity: resolution.capacity(),
            excess_chars: payload.len().saturating_sub(resolution.capacity()),
            excess_bits: usedbits - capacitybits,
        });
    }

    let mut bb = BitBuffer::with_capacity(capacitybits);
    bb.append_bits(MODE_BYTE, 4);
    // Fits in 8 bits: every supported capacity is below 256 characters
    bb.append_bits(payload.len() as u32, 8);
    for &b in &payload {
        bb.append_bits(u32::from(b), 8);
    }
    debug_assert_eq!(bb.len(), usedbits);

    // Add terminator and pad up to a byte if applicable
    let numzerobits: usize = core::cmp::min(4, capacitybits - bb.len());
    bb.append_bits(0, numzerobits as u8);
    let numzerobits: usize = bb.len().wrapping_neg() & 7;
    bb.append_bits(0, numzerobits as u8);
    debug_assert_eq!(bb.len() % 8, 0);

    // Pad with alternating bytes until data capacity is reached
    for &padbyte in PAD_BYTES.iter().cycle() {
        if bb.len() >= capacitybits {
            break;
        }
        bb.append_bits(padbyte, 8);
    }

    debug_assert_eq!(bb.len(), capacitybits);
    bb.truncate(capacitybits);
    Ok(bb.into_bytes())
}
