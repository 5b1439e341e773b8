//! Fixed-width bitmap encoder for the low bits of integers.
use crate::bit_vector::{unary::UnaryIter, BitVector};

/// Number of addressable positions in the bitmap.
pub const WIDTH: usize = 10;

/// Encodes the low [`WIDTH`] bits of an integer into a bitmap in reversed position order.
///
/// Bit `i` of the value, counted from the least significant bit, is written to
/// position `WIDTH - 1 - i`. Higher bits are ignored, and negative values
/// contribute their two's-complement low bits.
///
/// # Examples
///
/// ```
/// use kds::BitEncoder;
///
/// let mut enc = BitEncoder::new();
/// assert_eq!(enc.encode(5), vec![7, 9]);
/// assert_eq!(enc.encode(512), vec![0]);
///
/// enc.clear();
/// assert!(enc.is_clear());
/// assert!(enc.encode(0).is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitEncoder {
    bits: BitVector,
}

impl Default for BitEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BitEncoder {
    /// Creates an encoder with a zeroed bitmap.
    pub fn new() -> Self {
        Self {
            bits: BitVector::from_bit(false, WIDTH),
        }
    }

    /// Replaces the bitmap with the low bits of `value` and returns the set positions
    /// in ascending order.
    pub fn encode(&mut self, value: i64) -> Vec<usize> {
        let low = value as u64;
        self.bits = BitVector::from_bits(
            (0..WIDTH).map(|pos| (low >> (WIDTH - 1 - pos)) & 1 == 1),
        );
        self.positions().collect()
    }

    /// Zeroes the bitmap.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Checks if no position is set.
    pub fn is_clear(&self) -> bool {
        self.bits.num_ones() == 0
    }

    /// Creates an iterator over the set positions in ascending order.
    pub fn positions(&self) -> UnaryIter<'_> {
        self.bits.unary_iter(0)
    }

    /// Returns the underlying bitmap.
    pub const fn bits(&self) -> &BitVector {
        &self.bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_positions() {
        let mut enc = BitEncoder::new();
        assert_eq!(enc.encode(1), vec![9]);
        assert_eq!(enc.encode(0b10_0000_0000), vec![0]);
        assert_eq!(enc.encode(1023), (0..WIDTH).collect::<Vec<_>>());
        assert_eq!(enc.encode(1000), vec![0, 1, 2, 3, 4, 6]);
    }

    #[test]
    fn test_encode_zeroes_first() {
        let mut enc = BitEncoder::new();
        enc.encode(1023);
        assert!(enc.encode(0).is_empty());
        assert!(enc.is_clear());
    }

    #[test]
    fn test_encode_replaces_previous_bits() {
        let mut enc = BitEncoder::new();
        let cases = [
            (1023, (0..WIDTH).collect::<Vec<_>>()),
            (5, vec![7, 9]),
            (2, vec![8]),
        ];
        for (v, expected) in cases {
            assert_eq!(enc.encode(v), expected);
            assert_eq!(enc.bits().len(), WIDTH);
            assert_eq!(enc.bits().num_ones(), expected.len());
            for pos in 0..WIDTH {
                assert_eq!(enc.bits().get_bit(pos), Some(expected.contains(&pos)));
            }
        }
    }

    #[test]
    fn test_truncation() {
        let mut enc = BitEncoder::new();
        assert_eq!(enc.encode(1024 + 5), vec![7, 9]);
        assert_eq!(enc.encode(-1), (0..WIDTH).collect::<Vec<_>>());
        // -5 is ...1111111011 in two's complement.
        assert_eq!(enc.encode(-5), vec![0, 1, 2, 3, 4, 5, 6, 8, 9]);
        assert_eq!(enc.bits().len(), WIDTH);
    }
}
