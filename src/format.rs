//! Format information: the BCH(15,5) protected ECC level and mask id.

use crate::matrix::ModuleGrid;
use crate::qrcode::{EccLevel, Mask};

/// Generator polynomial x^10 + x^8 + x^5 + x^4 + x^2 + x + 1.
const GENERATOR: u16 = 0b101_0011_0111;

/// XOR applied so that no format word is all zeros.
const FORMAT_MASK: u16 = 0b101_0100_0001_0010;

/// Maximum bit errors a format word can be corrected from.
const MAX_CORRECTABLE: u32 = 3;

/// A 15-bit masked format word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FormatWord(u16);

impl FormatWord {
    pub fn new(ecc: EccLevel, mask: Mask) -> Self {
        let data = (u16::from(ecc.format_bits()) << 3) | u16::from(mask.value());
        Self(((data << 10) | bch_remainder(data)) ^ FORMAT_MASK)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    /// Bit `i` counted from the most significant end (0 is written first).
    fn bit(self, i: usize) -> bool {
        (self.0 >> (14 - i)) & 1 != 0
    }

    /// Decodes a raw 15-bit value to the nearest valid format word, tolerating up to three
    /// flipped bits.
    pub fn decode(raw: u16) -> Option<(EccLevel, Mask)> {
        let mut best: Option<(u32, EccLevel, Mask)> = None;
        for data in 0u8..32 {
            let ecc = EccLevel::from_format_bits(data >> 3);
            let mask = Mask::new(data & 0b111);
            let distance = (FormatWord::new(ecc, mask).0 ^ raw).count_ones();
            if best.map_or(true, |(d, _, _)| distance < d) {
                best = Some((distance, ecc, mask));
            }
        }
        best.filter(|&(d, _, _)| d <= MAX_CORRECTABLE).map(|(_, ecc, mask)| (ecc, mask))
    }
}

/// Remainder of `data · x^10` divided by the generator, by long division from the top bit.
pub fn bch_remainder(data: u16) -> u16 {
    let mut rem: u16 = data << 10;
    for i in (0..5).rev() {
        if rem & (1 << (i + 10)) != 0 {
            rem ^= GENERATOR << i;
        }
    }
    rem
}

/// Cell positions (x, y) of both copies, in write order.
fn positions(size: usize) -> [[(usize, usize); 15]; 2] {
    let mut first = [(0, 0); 15];
    let mut second = [(0, 0); 15];

    // Along row 8 next to the top-left locator, then up column 8
    let row = [0, 1, 2, 3, 4, 5, 7, 8];
    let col = [7, 5, 4, 3, 2, 1, 0];
    for (i, &x) in row.iter().enumerate() {
        first[i] = (x, 8);
    }
    for (i, &y) in col.iter().enumerate() {
        first[8 + i] = (8, y);
    }

    // Up column 8 beside the bottom-left locator, then along row 8 under the top-right one
    for i in 0..7 {
        second[i] = (8, size - 1 - i);
    }
    for i in 0..8 {
        second[7 + i] = (size - 8 + i, 8);
    }
    [first, second]
}

/// Writes both copies of the format word.
pub fn place_format(grid: &mut ModuleGrid, word: FormatWord) {
    for copy in positions(grid.size()) {
        for (i, &(x, y)) in copy.iter().enumerate() {
            grid.set_function(x, y, word.bit(i));
        }
    }
}

/// Reads both copies back and decodes whichever is readable, top-left first.
pub fn read_format(grid: &ModuleGrid) -> Option<(EccLevel, Mask)> {
    positions(grid.size()).iter().find_map(|copy| {
        let raw = copy
            .iter()
            .fold(0u16, |acc, &(x, y)| (acc << 1) | u16::from(grid.get(x, y)));
        FormatWord::decode(raw)
    })
}
