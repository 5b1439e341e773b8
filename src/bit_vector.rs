//! Updatable bit vector in a plain format.
pub mod unary;

use anyhow::{anyhow, Result};

use unary::UnaryIter;

/// The number of bits in a machine word.
pub const WORD_LEN: usize = u64::BITS as usize;

/// Updatable bit vector in a plain format.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kds::bit_vector::BitVector;
///
/// let mut bv = BitVector::from_bit(false, 10);
/// bv.set_bit(7, true)?;
/// bv.set_bit(9, true)?;
///
/// assert_eq!(bv.get_bit(7), Some(true));
/// assert_eq!(bv.unary_iter(0).collect::<Vec<_>>(), vec![7, 9]);
///
/// bv.clear();
/// assert_eq!(bv.num_ones(), 0);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone, PartialEq, Eq)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
}

impl BitVector {
    /// Creates a new empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new vector that stores `len` bits,
    /// where each bit is initialized by `bit`.
    ///
    /// # Arguments
    ///
    ///  - `bit`: Bit value used for intinialization.
    ///  - `len`: Number of elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use kds::bit_vector::BitVector;
    ///
    /// let bv = BitVector::from_bit(false, 5);
    /// assert_eq!(bv.len(), 5);
    /// assert_eq!(bv.get_bit(0), Some(false));
    /// ```
    pub fn from_bit(bit: bool, len: usize) -> Self {
        let word = if bit { u64::MAX } else { 0 };
        let mut words = vec![word; Self::words_for(len)];
        let shift = len % WORD_LEN;
        if shift != 0 {
            let mask = (1 << shift) - 1;
            if let Some(last) = words.last_mut() {
                *last &= mask;
            }
        }
        Self { words, len }
    }

    /// Creates a new vector from input bit stream `bits`.
    ///
    /// # Arguments
    ///
    ///  - `bits`: Bit stream.
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut this = Self::new();
        bits.into_iter().for_each(|b| this.push_bit(b));
        this
    }

    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    ///
    /// # Arguments
    ///
    ///  - `pos`: Bit position.
    pub fn get_bit(&self, pos: usize) -> Option<bool> {
        if pos < self.len {
            let (block, shift) = (pos / WORD_LEN, pos % WORD_LEN);
            Some((self.words[block] >> shift) & 1 == 1)
        } else {
            None
        }
    }

    /// Updates the `pos`-th bit to `bit`.
    ///
    /// # Arguments
    ///
    ///  - `pos`: Bit position.
    ///  - `bit`: Bit value set.
    ///
    /// # Errors
    ///
    /// An error is returned if `self.len() <= pos`.
    #[inline(always)]
    pub fn set_bit(&mut self, pos: usize, bit: bool) -> Result<()> {
        if self.len() <= pos {
            return Err(anyhow!(
                "pos must be less than self.len()={}, but got {pos}.",
                self.len()
            ));
        }
        let word = pos / WORD_LEN;
        let pos_in_word = pos % WORD_LEN;
        self.words[word] &= !(1 << pos_in_word);
        self.words[word] |= (bit as u64) << pos_in_word;
        Ok(())
    }

    /// Pushes `bit` at the end.
    #[inline(always)]
    pub fn push_bit(&mut self, bit: bool) {
        let pos_in_word = self.len % WORD_LEN;
        if pos_in_word == 0 {
            self.words.push(bit as u64);
        } else if let Some(cur_word) = self.words.last_mut() {
            *cur_word |= (bit as u64) << pos_in_word;
        }
        self.len += 1;
    }

    /// Unsets every bit, keeping the length.
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Returns the number of bits set.
    pub fn num_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Creates an iterator for enumerating bits.
    pub const fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Creates an iterator for enumerating positions of set bits, starting at bit position `pos`.
    ///
    /// # Arguments
    ///
    ///  - `pos`: Bit position.
    ///
    /// # Examples
    ///
    /// ```
    /// use kds::bit_vector::BitVector;
    ///
    /// let bv = BitVector::from_bits([true, true, false, true]);
    /// let mut it = bv.unary_iter(1);
    /// assert_eq!(it.next(), Some(1));
    /// assert_eq!(it.next(), Some(3));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn unary_iter(&self, pos: usize) -> UnaryIter<'_> {
        UnaryIter::new(self, pos)
    }

    /// Returns the number of bits stored.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the vector is empty.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the slice of raw words.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Gets the number of words.
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    #[inline(always)]
    const fn words_for(n: usize) -> usize {
        (n + WORD_LEN - 1) / WORD_LEN
    }
}

/// Iterator for enumerating bits, created by [`BitVector::iter()`].
pub struct Iter<'a> {
    bv: &'a BitVector,
    pos: usize,
}

impl<'a> Iter<'a> {
    /// Creates a new iterator.
    pub const fn new(bv: &'a BitVector) -> Self {
        Self { bv, pos: 0 }
    }
}

impl Iterator for Iter<'_> {
    type Item = bool;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.bv.get_bit(self.pos)?;
        self.pos += 1;
        Some(x)
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.bv.len() - self.pos;
        (rest, Some(rest))
    }
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits: String = self.iter().map(|b| if b { '1' } else { '0' }).collect();
        f.debug_struct("BitVector")
            .field("bits", &bits)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_bit_oob() {
        let mut bv = BitVector::from_bit(false, 3);
        let e = bv.set_bit(3, true);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("pos must be less than self.len()=3, but got 3.".to_string())
        );
    }

    #[test]
    fn test_from_bit_masks_tail() {
        let bv = BitVector::from_bit(true, 10);
        assert_eq!(bv.num_ones(), 10);
        assert_eq!(bv.words(), &[0b11_1111_1111]);
    }

    #[test]
    fn test_clear_keeps_len() {
        let mut bv = BitVector::from_bit(true, 70);
        bv.clear();
        assert_eq!(bv.len(), 70);
        assert_eq!(bv.num_ones(), 0);
        assert_eq!(bv.unary_iter(0).next(), None);
    }

    #[test]
    fn test_iter() {
        let bv = BitVector::from_bits([false, true, false]);
        assert_eq!(bv.iter().collect::<Vec<_>>(), vec![false, true, false]);
    }

    #[test]
    fn test_debug() {
        let bv = BitVector::from_bits([true, false, true]);
        assert_eq!(
            format!("{bv:?}"),
            "BitVector { bits: \"101\", len: 3 }".to_string()
        );
    }
}
