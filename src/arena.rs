//! Slot arena owning the nodes of the linked structures.
//!
//! Nodes are addressed by [`NodeId`] handles. A freed slot goes on a free
//! list and is reused by the next allocation, so a handle is only meaningful
//! until the node it names is freed.
use anyhow::Result;

use crate::alloc::Allocs;

/// Handle to a node stored in an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Returns the slot index of the handle.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Slot arena with a free list and allocation accounting.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kds::arena::Arena;
///
/// let mut arena = Arena::new();
/// let a = arena.alloc(7)?;
/// assert_eq!(arena.get(a), Some(&7));
///
/// assert_eq!(arena.free(a), Some(7));
/// assert_eq!(arena.get(a), None);
/// assert!(arena.allocs().is_balanced());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<u32>,
    allocs: Allocs,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Creates a new empty arena without an allocation limit.
    pub const fn new() -> Self {
        Self::with_limit(None)
    }

    /// Creates a new empty arena holding at most `limit` live nodes.
    pub const fn with_limit(limit: Option<usize>) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            allocs: Allocs::with_limit(limit),
        }
    }

    /// Moves `node` into the arena and returns its handle.
    ///
    /// # Errors
    ///
    /// An error is returned if the allocation limit is reached
    /// or the slot vector cannot grow.
    pub fn alloc(&mut self, node: T) -> Result<NodeId> {
        self.allocs.acquire()?;
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize] = Some(node);
            return Ok(NodeId(idx));
        }
        if let Err(e) = self.slots.try_reserve(1) {
            self.allocs.release();
            return Err(e.into());
        }
        let idx = self.slots.len() as u32;
        self.slots.push(Some(node));
        Ok(NodeId(idx))
    }

    /// Removes the node at `id` and returns it, or [`None`] if the slot is vacant.
    pub fn free(&mut self, id: NodeId) -> Option<T> {
        let node = self.slots.get_mut(id.index())?.take()?;
        self.free.push(id.0);
        self.allocs.release();
        Some(node)
    }

    /// Returns a reference to the node at `id`, or [`None`] if the slot is vacant.
    #[inline(always)]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.index())?.as_ref()
    }

    /// Returns a mutable reference to the node at `id`, or [`None`] if the slot is vacant.
    #[inline(always)]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Returns the number of live nodes.
    pub const fn len(&self) -> usize {
        self.allocs.live()
    }

    /// Checks if the arena holds no live node.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the allocation accounting of the arena.
    pub const fn allocs(&self) -> &Allocs {
        &self.allocs
    }
}

impl<T> std::ops::Index<NodeId> for Arena<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, id: NodeId) -> &T {
        self.get(id).expect("dangling node handle")
    }
}

impl<T> std::ops::IndexMut<NodeId> for Arena<T> {
    #[inline(always)]
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        self.get_mut(id).expect("dangling node handle")
    }
}
