//! Chained hash table of integers with a fixed number of buckets.
use anyhow::{anyhow, Result};

use crate::alloc::Allocs;
use crate::arena::{Arena, NodeId};
use crate::Accounted;

/// Default number of bucket bits, giving 1024 buckets.
pub const DEFAULT_BITS: u32 = 10;

/// Largest number of bucket bits accepted by [`HashIndex::new`].
pub const MAX_BITS: u32 = 20;

#[derive(Clone, Debug)]
struct Node {
    value: i64,
    next: Option<NodeId>,
}

/// Chained hash table keyed by the integer itself.
///
/// The table has `1 << bits` buckets and never resizes.
/// A value goes to bucket `value mod buckets`, computed on its two's-complement bits,
/// and is pushed at the head of that bucket's chain.
/// Chains are multisets, so the same value may be stored more than once.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kds::HashIndex;
///
/// let mut ht = HashIndex::new(10)?;
/// ht.insert(3)?;
/// ht.insert(1027)?;
/// assert_eq!(ht.bucket_of(3), ht.bucket_of(1027));
///
/// let mut seen = vec![];
/// ht.drain_safe(|ht, v| {
///     assert_eq!(ht.for_each_possible(v).count(), 1);
///     seen.push(v);
/// });
/// assert_eq!(seen.len(), 2);
/// assert!(ht.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HashIndex {
    heads: Vec<Option<NodeId>>,
    nodes: Arena<Node>,
    mask: u64,
}

impl Default for HashIndex {
    fn default() -> Self {
        Self::with_buckets(DEFAULT_BITS, None)
    }
}

impl HashIndex {
    /// Creates a new empty table with `1 << bits` buckets.
    ///
    /// # Arguments
    ///
    ///  - `bits`: Number of bucket bits.
    ///
    /// # Errors
    ///
    /// An error is returned if `bits` is not in `1..=MAX_BITS`.
    pub fn new(bits: u32) -> Result<Self> {
        Self::with_limit(bits, None)
    }

    /// Creates a new empty table with `1 << bits` buckets holding at most `limit` entries.
    ///
    /// # Errors
    ///
    /// An error is returned if `bits` is not in `1..=MAX_BITS`.
    pub fn with_limit(bits: u32, limit: Option<usize>) -> Result<Self> {
        if !(1..=MAX_BITS).contains(&bits) {
            return Err(anyhow!(
                "hash bits must be in 1..={MAX_BITS}, but got {bits}."
            ));
        }
        Ok(Self::with_buckets(bits, limit))
    }

    fn with_buckets(bits: u32, limit: Option<usize>) -> Self {
        Self {
            heads: vec![None; 1 << bits],
            nodes: Arena::with_limit(limit),
            mask: (1 << bits) - 1,
        }
    }

    /// Returns the bucket `value` hashes to.
    #[inline(always)]
    pub const fn bucket_of(&self, value: i64) -> usize {
        (value as u64 & self.mask) as usize
    }

    /// Inserts `value` at the head of its bucket.
    ///
    /// # Errors
    ///
    /// An error is returned if the node cannot be allocated;
    /// the value is then not indexed.
    pub fn insert(&mut self, value: i64) -> Result<()> {
        let bkt = self.bucket_of(value);
        let id = self.nodes.alloc(Node {
            value,
            next: self.heads[bkt],
        })?;
        self.heads[bkt] = Some(id);
        Ok(())
    }

    /// Creates an iterator over the entries equal to `key` in `key`'s bucket.
    pub fn for_each_possible(&self, key: i64) -> Possible<'_> {
        Possible {
            index: self,
            key,
            cur: self.heads[self.bucket_of(key)],
        }
    }

    /// Checks if `key` is stored.
    pub fn contains(&self, key: i64) -> bool {
        self.for_each_possible(key).next().is_some()
    }

    /// Removes one entry equal to `key`, returning `true` if one was found.
    pub fn remove(&mut self, key: i64) -> bool {
        let bkt = self.bucket_of(key);
        let mut cur = self.heads[bkt];
        while let Some(id) = cur {
            if self.nodes[id].value == key {
                self.unlink(bkt, id);
                self.nodes.free(id);
                return true;
            }
            cur = self.nodes[id].next;
        }
        false
    }

    /// Visits every entry bucket by bucket, unlinking and freeing each one after its visit.
    ///
    /// The visitor gets a shared view of the table, in which the visited entry is still
    /// present, so it can run [`Self::for_each_possible`] for the current value.
    /// The table is empty afterwards.
    ///
    /// # Arguments
    ///
    ///  - `visit`: Callback invoked once per entry.
    pub fn drain_safe<F>(&mut self, mut visit: F)
    where
        F: FnMut(&Self, i64),
    {
        for bkt in 0..self.heads.len() {
            let mut cur = self.heads[bkt];
            while let Some(id) = cur {
                let (value, next) = (self.nodes[id].value, self.nodes[id].next);
                visit(self, value);
                self.unlink(bkt, id);
                self.nodes.free(id);
                cur = next;
            }
        }
    }

    /// Creates an iterator over all values, bucket by bucket.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            index: self,
            bkt: 0,
            cur: None,
        }
    }

    /// Returns the number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.heads.len()
    }

    /// Returns the number of entries stored.
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks if the table is empty.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn unlink(&mut self, bkt: usize, id: NodeId) {
        let next = self.nodes[id].next;
        if self.heads[bkt] == Some(id) {
            self.heads[bkt] = next;
            return;
        }
        let mut cur = self.heads[bkt];
        while let Some(c) = cur {
            if self.nodes[c].next == Some(id) {
                self.nodes[c].next = next;
                return;
            }
            cur = self.nodes[c].next;
        }
    }
}

impl Accounted for HashIndex {
    fn allocs(&self) -> &Allocs {
        self.nodes.allocs()
    }
}

/// Iterator over the entries matching a key, created by [`HashIndex::for_each_possible`].
pub struct Possible<'a> {
    index: &'a HashIndex,
    key: i64,
    cur: Option<NodeId>,
}

impl Iterator for Possible<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.cur {
            let node = &self.index.nodes[id];
            self.cur = node.next;
            if node.value == self.key {
                return Some(node.value);
            }
        }
        None
    }
}

/// Iterator over all entries, created by [`HashIndex::iter`].
pub struct Iter<'a> {
    index: &'a HashIndex,
    bkt: usize,
    cur: Option<NodeId>,
}

impl Iterator for Iter<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.cur {
                let node = &self.index.nodes[id];
                self.cur = node.next;
                return Some(node.value);
            }
            if self.bkt == self.index.heads.len() {
                return None;
            }
            self.cur = self.index.heads[self.bkt];
            self.bkt += 1;
        }
    }
}
