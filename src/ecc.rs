//! Error correction codeword generation.

/// Generates error correction codewords for a block of data codewords.
///
/// Implementations must return `data` followed by exactly `ec_len` correction codewords,
/// computed so that any `ec_len / 2` corrupted codewords can be recovered.
pub trait ErrorCorrector {
    fn encode(&self, data: &[u8], ec_len: usize) -> Vec<u8>;
}

impl<T: ErrorCorrector + ?Sized> ErrorCorrector for &T {
    fn encode(&self, data: &[u8], ec_len: usize) -> Vec<u8> {
        (**self).encode(data, ec_len)
    }
}

/// The QR Code Reed-Solomon code over GF(2^8/0x11D), with generator roots α^0 … α^(n-1).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReedSolomon;

impl ErrorCorrector for ReedSolomon {
    fn encode(&self, data: &[u8], ec_len: usize) -> Vec<u8> {
        let mut result = Vec::with_capacity(data.len() + ec_len);
        result.extend_from_slice(data);
        if ec_len > 0 {
            let mut ecc = vec![0u8; ec_len];
            ReedSolomonGenerator::new(ec_len).compute_remainder(data, &mut ecc);
            result.extend_from_slice(&ecc);
        }
        result
    }
}

struct ReedSolomonGenerator {
    divisor: Vec<u8>,
}

impl ReedSolomonGenerator {
    /// Builds the generator polynomial of the given degree, highest coefficient dropped.
    fn new(degree: usize) -> Self {
        let mut divisor = vec![0u8; degree];
        divisor[degree - 1] = 1;
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = multiply(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = multiply(root, 0x02);
        }
        Self { divisor }
    }

    fn compute_remainder(&self, data: &[u8], result: &mut [u8]) {
        assert_eq!(result.len(), self.divisor.len());
        result.fill(0);
        for b in data {
            let factor: u8 = b ^ result[0];
            result.copy_within(1.., 0);
            let last = result.len() - 1;
            result[last] = 0;
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= multiply(y, factor);
            }
        }
    }
}

/// Multiplies two field elements modulo x^8 + x^4 + x^3 + x^2 + 1.
pub(crate) fn multiply(x: u8, y: u8) -> u8 {
    let mut z: u8 = 0;
    for i in (0..8).rev() {
        z = (z << 1) ^ ((z >> 7) * 0x1d);
        z ^= ((y >> i) & 1) * x;
    }
    z
}

#[cfg(test)]
mod tests {
    use super::*;

    // Evaluates the codeword polynomial (first byte highest degree) at `x`
    fn evaluate(codeword: &[u8], x: u8) -> u8 {
        codeword.iter().fold(0u8, |acc, &c| multiply(acc, x) ^ c)
    }

    #[test]
    fn test_multiply() {
        assert_eq!(multiply(0, 0x53), 0);
        assert_eq!(multiply(1, 0x53), 0x53);
        assert_eq!(multiply(0x80, 0x02), 0x1d);
        assert_eq!(multiply(0x57, 0x13), multiply(0x13, 0x57));
    }

    #[test]
    fn test_known_vector_v1_m() {
        // "HELLO WORLD" at version 1-M, alphanumeric mode
        let data = [32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17];
        let out = ReedSolomon.encode(&data, 10);
        assert_eq!(&out[..16], &data);
        assert_eq!(&out[16..], &[196, 35, 39, 119, 235, 215, 231, 226, 93, 23]);
    }

    #[test]
    fn test_syndromes_vanish() {
        let data: Vec<u8> = (0u8..34).map(|i| i.wrapping_mul(37) ^ 0x5a).collect();
        for ec_len in [7, 10, 13, 17, 22, 28] {
            let out = ReedSolomon.encode(&data, ec_len);
            assert_eq!(out.len(), data.len() + ec_len);
            let mut root: u8 = 1;
            for _ in 0..ec_len {
                assert_eq!(evaluate(&out, root), 0);
                root = multiply(root, 0x02);
            }
        }
    }

    #[test]
    fn test_zero_length_is_passthrough() {
        assert_eq!(ReedSolomon.encode(&[1, 2, 3], 0), vec![1, 2, 3]);
    }
}
