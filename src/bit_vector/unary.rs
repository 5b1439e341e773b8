//! Unary iterator on bit vectors.
use super::{BitVector, WORD_LEN};

/// Iterator for enumerating positions of set bits, created by [`BitVector::unary_iter`].
pub struct UnaryIter<'a> {
    bv: &'a BitVector,
    pos: usize,
    buf: u64,
}

impl<'a> UnaryIter<'a> {
    /// Creates the iterator from the given bit position.
    pub fn new(bv: &'a BitVector, pos: usize) -> Self {
        let buf = bv
            .words()
            .get(pos / WORD_LEN)
            .map_or(0, |&w| w & u64::MAX.wrapping_shl((pos % WORD_LEN) as u32));
        Self { bv, pos, buf }
    }

    /// Gets the current bit position.
    #[inline(always)]
    pub const fn position(&self) -> usize {
        self.pos
    }
}

impl Iterator for UnaryIter<'_> {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = self.buf;
        while buf == 0 {
            self.pos += WORD_LEN;
            let word_pos = self.pos / WORD_LEN;
            if self.bv.num_words() <= word_pos {
                self.buf = 0;
                return None;
            }
            buf = self.bv.words()[word_pos];
        }
        let pos_in_word = buf.trailing_zeros() as usize;
        self.buf = buf & (buf - 1); // clear LSB
        self.pos = (self.pos & !(WORD_LEN - 1)) + pos_in_word;
        Some(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_all_zeros() {
        let bv = BitVector::from_bit(false, 100);
        let mut it = bv.unary_iter(0);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_across_words() {
        let mut bv = BitVector::from_bit(false, 200);
        for pos in [0, 63, 64, 130, 199] {
            bv.set_bit(pos, true).unwrap();
        }
        assert_eq!(
            bv.unary_iter(0).collect::<Vec<_>>(),
            vec![0, 63, 64, 130, 199]
        );
        assert_eq!(bv.unary_iter(64).collect::<Vec<_>>(), vec![64, 130, 199]);
        assert_eq!(bv.unary_iter(65).collect::<Vec<_>>(), vec![130, 199]);
    }

    #[test]
    fn test_start_past_end() {
        let bv = BitVector::from_bit(true, 10);
        assert_eq!(bv.unary_iter(64).next(), None);
    }
}
