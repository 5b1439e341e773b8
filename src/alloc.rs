//! Allocation accounting shared by every structure in the crate.
//!
//! Each structure owns one [`Allocs`] counter. A successful node or entry
//! allocation calls [`Allocs::acquire`], a free calls [`Allocs::release`].
//! After a structure's teardown, [`Allocs::is_balanced`] tells whether every
//! allocation was freed exactly once.
//!
//! An optional limit turns the counter into a budget: once `limit` entries are
//! live, [`Allocs::acquire`] fails and the caller skips the value, which is how
//! the out-of-memory path is exercised.
use anyhow::{anyhow, Result};

/// Counter of live, total and freed allocations with an optional budget.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kds::alloc::Allocs;
///
/// let mut allocs = Allocs::with_limit(Some(1));
/// allocs.acquire()?;
/// assert!(allocs.acquire().is_err());
///
/// allocs.release();
/// assert!(allocs.is_balanced());
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocs {
    allocated: usize,
    freed: usize,
    limit: Option<usize>,
}

impl Allocs {
    /// Creates a counter without a limit.
    pub const fn new() -> Self {
        Self {
            allocated: 0,
            freed: 0,
            limit: None,
        }
    }

    /// Creates a counter that allows at most `limit` live allocations.
    ///
    /// # Arguments
    ///
    ///  - `limit`: Maximum number of live allocations, or [`None`] for no limit.
    pub const fn with_limit(limit: Option<usize>) -> Self {
        Self {
            allocated: 0,
            freed: 0,
            limit,
        }
    }

    /// Records one allocation.
    ///
    /// # Errors
    ///
    /// An error is returned if the number of live allocations already reached the limit.
    #[inline(always)]
    pub fn acquire(&mut self) -> Result<()> {
        if let Some(limit) = self.limit {
            if self.live() >= limit {
                return Err(anyhow!("allocation limit of {limit} reached."));
            }
        }
        self.allocated += 1;
        Ok(())
    }

    /// Records one free.
    #[inline(always)]
    pub fn release(&mut self) {
        debug_assert!(self.freed < self.allocated, "double free");
        self.freed += 1;
    }

    /// Returns the number of successful allocations so far.
    pub const fn allocated(&self) -> usize {
        self.allocated
    }

    /// Returns the number of frees so far.
    pub const fn freed(&self) -> usize {
        self.freed
    }

    /// Returns the number of allocations not freed yet.
    pub const fn live(&self) -> usize {
        self.allocated - self.freed
    }

    /// Returns the configured limit.
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Checks if every allocation has been freed exactly once.
    pub const fn is_balanced(&self) -> bool {
        self.allocated == self.freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_reached() {
        let mut allocs = Allocs::with_limit(Some(2));
        allocs.acquire().unwrap();
        allocs.acquire().unwrap();
        let e = allocs.acquire();
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("allocation limit of 2 reached.".to_string())
        );
        assert_eq!(allocs.allocated(), 2);
    }

    #[test]
    fn test_limit_counts_live_only() {
        let mut allocs = Allocs::with_limit(Some(1));
        for _ in 0..5 {
            allocs.acquire().unwrap();
            allocs.release();
        }
        assert_eq!(allocs.allocated(), 5);
        assert_eq!(allocs.freed(), 5);
        assert!(allocs.is_balanced());
    }

    #[test]
    fn test_unbalanced() {
        let mut allocs = Allocs::new();
        allocs.acquire().unwrap();
        allocs.acquire().unwrap();
        allocs.release();
        assert_eq!(allocs.live(), 1);
        assert!(!allocs.is_balanced());
    }
}
