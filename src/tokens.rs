//! Integer tokens from a space-separated configuration string.
use std::str::Split;

/// Splits `s` on single spaces and parses every non-empty token as an [`i64`].
///
/// Malformed tokens are dropped and parsing continues with the next one.
/// The returned iterator is single-pass; call [`parse`] again to restart.
///
/// # Examples
///
/// ```
/// use kds::tokens::parse;
///
/// let vals: Vec<i64> = parse("1 x 2  3").collect();
/// assert_eq!(vals, vec![1, 2, 3]);
/// ```
pub fn parse(s: &str) -> Tokens<'_> {
    Tokens {
        inner: s.split(' '),
        skipped: 0,
    }
}

/// Iterator over the integers of a configuration string, created by [`parse`].
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    inner: Split<'a, char>,
    skipped: usize,
}

impl Tokens<'_> {
    /// Returns the number of non-empty tokens dropped so far.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for Tokens<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        for token in self.inner.by_ref() {
            if token.is_empty() {
                continue;
            }
            match token.parse() {
                Ok(x) => return Some(x),
                Err(e) => {
                    log::trace!("dropping token {token:?}: {e}");
                    self.skipped += 1;
                }
            }
        }
        None
    }
}
