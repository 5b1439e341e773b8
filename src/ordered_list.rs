//! Insertion-ordered list of integers.
use anyhow::Result;

use crate::alloc::Allocs;
use crate::arena::{Arena, NodeId};
use crate::Accounted;

#[derive(Clone, Debug)]
struct Node {
    value: i64,
    next: Option<NodeId>,
}

/// Singly-linked list that keeps integers in insertion order.
///
/// Nodes live in an [`Arena`] and are linked head to tail, so appending is
/// $`O(1)`$ and draining visits values in the order they were appended.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kds::OrderedList;
///
/// let mut list = OrderedList::new();
/// list.append(3)?;
/// list.append(1)?;
///
/// let mut seen = vec![];
/// list.drain_and_consume(|v| seen.push(v));
///
/// assert_eq!(seen, vec![3, 1]);
/// assert!(list.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct OrderedList {
    nodes: Arena<Node>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl OrderedList {
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty list holding at most `limit` entries.
    pub const fn with_limit(limit: Option<usize>) -> Self {
        Self {
            nodes: Arena::with_limit(limit),
            head: None,
            tail: None,
        }
    }

    /// Appends `value` at the tail.
    ///
    /// # Errors
    ///
    /// An error is returned if the node cannot be allocated.
    pub fn append(&mut self, value: i64) -> Result<()> {
        let id = self.nodes.alloc(Node { value, next: None })?;
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        Ok(())
    }

    /// Visits every value in insertion order, freeing each node after its visit.
    ///
    /// The list is empty afterwards.
    ///
    /// # Arguments
    ///
    ///  - `visit`: Callback invoked once per value.
    pub fn drain_and_consume<F>(&mut self, mut visit: F)
    where
        F: FnMut(i64),
    {
        let mut cur = self.head.take();
        self.tail = None;
        while let Some(id) = cur {
            let Some(node) = self.nodes.free(id) else {
                break;
            };
            visit(node.value);
            cur = node.next;
        }
    }

    /// Creates an iterator over the values in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cur: self.head,
        }
    }

    /// Returns the number of values stored.
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks if the list is empty.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Accounted for OrderedList {
    fn allocs(&self) -> &Allocs {
        self.nodes.allocs()
    }
}

/// Iterator over the values of an [`OrderedList`], created by [`OrderedList::iter`].
pub struct Iter<'a> {
    list: &'a OrderedList,
    cur: Option<NodeId>,
}

impl Iterator for Iter<'_> {
    type Item = i64;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.nodes.get(self.cur?)?;
        self.cur = node.next;
        Some(node.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn gen_random_ints(len: usize, seed: u64) -> Vec<i64> {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen_range(0..=1000)).collect()
    }

    #[test]
    fn test_random_order() {
        for seed in 0..10 {
            let vals = gen_random_ints(500, seed);
            let mut list = OrderedList::new();
            for &v in &vals {
                list.append(v).unwrap();
            }
            assert_eq!(list.len(), vals.len());
            assert_eq!(list.iter().collect::<Vec<_>>(), vals);

            let mut drained = vec![];
            list.drain_and_consume(|v| drained.push(v));
            assert_eq!(drained, vals);
            assert!(list.is_empty());
            assert!(list.allocs().is_balanced());
        }
    }

    #[test]
    fn test_reuse_after_drain() {
        let mut list = OrderedList::new();
        list.append(1).unwrap();
        list.drain_and_consume(|_| {});
        list.append(2).unwrap();
        list.append(3).unwrap();
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_limit_skips() {
        let mut list = OrderedList::with_limit(Some(2));
        list.append(1).unwrap();
        list.append(2).unwrap();
        assert!(list.append(3).is_err());
        let mut drained = vec![];
        list.drain_and_consume(|v| drained.push(v));
        assert_eq!(drained, vec![1, 2]);
        assert_eq!(list.allocs().allocated(), 2);
        assert!(list.allocs().is_balanced());
    }
}
