//! Radix-indexed sparse array of integers with per-key marks.
//!
//! # Layout
//!
//! Keys are split into 6-bit digits, so each node has 64 slots.
//! Leaf nodes (shift 0) hold entries and internal nodes hold children.
//! The tree is only as tall as the largest key needs: the root grows on demand
//! up to shift 60, which covers the whole `u64` key space, and shrinks back
//! when the large keys are erased.
//!
//! Every node keeps an occupancy bitmap and one summary bitmap per mark.
//! A summary bit is set if and only if the entry in that slot, or some entry
//! below it, carries the mark. Marked searches follow summary bits only and
//! skip unmarked subtrees without visiting them.
use anyhow::{anyhow, Result};

use crate::alloc::Allocs;
use crate::Accounted;

/// Number of independent marks a key can carry.
pub const NUM_MARKS: usize = 3;

const SLOT_BITS: u32 = 6;
const SLOTS: usize = 1 << SLOT_BITS;
const SLOT_MASK: u64 = SLOTS as u64 - 1;

/// Maps an integer to its key, reinterpreting the two's-complement bits.
///
/// Negative values therefore land above every non-negative value.
///
/// # Examples
///
/// ```
/// use kds::sparse_array::key_of;
///
/// assert_eq!(key_of(3), 3);
/// assert_eq!(key_of(-5), u64::MAX - 4);
/// ```
pub const fn key_of(value: i64) -> u64 {
    value as u64
}

/// A named boolean flag attachable to a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Mark(u8);

impl Mark {
    /// The first mark.
    pub const MARK_0: Self = Self(0);
    /// The second mark.
    pub const MARK_1: Self = Self(1);
    /// The third mark.
    pub const MARK_2: Self = Self(2);

    /// Creates the `idx`-th mark.
    ///
    /// # Errors
    ///
    /// An error is returned if `idx` is not less than [`NUM_MARKS`].
    pub fn new(idx: usize) -> Result<Self> {
        if NUM_MARKS <= idx {
            return Err(anyhow!("mark must be in 0..{NUM_MARKS}, but got {idx}."));
        }
        Ok(Self(idx as u8))
    }

    /// Returns the index of the mark.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
enum Slot {
    Node(Box<Node>),
    Entry(i64),
}

#[derive(Debug)]
struct Node {
    shift: u32,
    present: u64,
    marks: [u64; NUM_MARKS],
    slots: [Option<Slot>; SLOTS],
}

impl Node {
    fn boxed(shift: u32) -> Box<Self> {
        Box::new(Self {
            shift,
            present: 0,
            marks: [0; NUM_MARKS],
            slots: std::array::from_fn(|_| None),
        })
    }

    #[inline(always)]
    const fn offset(&self, key: u64) -> usize {
        ((key >> self.shift) & SLOT_MASK) as usize
    }

    fn child(&self, off: usize) -> Option<&Node> {
        match &self.slots[off] {
            Some(Slot::Node(child)) => Some(&**child),
            _ => None,
        }
    }

    fn child_mut(&mut self, off: usize) -> Option<&mut Node> {
        match &mut self.slots[off] {
            Some(Slot::Node(child)) => Some(&mut **child),
            _ => None,
        }
    }

    fn count_nodes(&self) -> usize {
        1 + (0..SLOTS)
            .filter_map(|off| self.child(off))
            .map(Node::count_nodes)
            .sum::<usize>()
    }
}

/// Returns the largest key a node at `shift` covers.
const fn max_key(shift: u32) -> u64 {
    if shift + SLOT_BITS >= u64::BITS {
        u64::MAX
    } else {
        (1 << (shift + SLOT_BITS)) - 1
    }
}

/// Returns the smallest shift whose node covers `key`.
const fn shift_for(key: u64) -> u32 {
    let mut shift = 0;
    while max_key(shift) < key {
        shift += SLOT_BITS;
    }
    shift
}

/// Sparse array mapping `u64` keys to integers, with marks and gang lookups.
///
/// At most one entry lives at a key, and storing to an occupied key overwrites it.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kds::sparse_array::{key_of, Mark, SparseArray};
///
/// let mut xa = SparseArray::new();
/// for v in [3, 1, 2, -5, 1000] {
///     xa.insert(key_of(v), v)?;
/// }
///
/// xa.for_each(|xa, key, v| {
///     if v & 1 == 1 {
///         xa.set_mark(key, Mark::MARK_0);
///     }
/// });
///
/// assert_eq!(xa.gang_lookup(0, 5), vec![1, 2, 3, 1000, -5]);
/// assert_eq!(xa.gang_lookup_by_mark(Mark::MARK_0, 0, 5), vec![1, 3, -5]);
///
/// assert_eq!(xa.erase(key_of(1000)), Some(1000));
/// assert_eq!(xa.len(), 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SparseArray {
    root: Option<Box<Node>>,
    len: usize,
    allocs: Allocs,
}

impl SparseArray {
    /// Creates a new empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty array using at most `limit` radix nodes.
    pub const fn with_limit(limit: Option<usize>) -> Self {
        Self {
            root: None,
            len: 0,
            allocs: Allocs::with_limit(limit),
        }
    }

    /// Stores `value` at `key`, returning the value previously stored there.
    ///
    /// Marks already set on `key` are kept.
    ///
    /// # Errors
    ///
    /// An error is returned if a radix node cannot be allocated;
    /// the array is then left as it was.
    pub fn insert(&mut self, key: u64, value: i64) -> Result<Option<i64>> {
        if let Err(e) = self.grow_to(key) {
            self.shrink();
            return Err(e);
        }
        let res = match self.root.as_deref_mut() {
            Some(root) => insert_in(root, key, value, &mut self.allocs),
            None => Ok(None),
        };
        match res {
            Ok(None) => self.len += 1,
            Ok(Some(_)) => {}
            Err(_) => self.shrink(),
        }
        res
    }

    /// Returns the value at `key`, or [`None`] if vacant.
    pub fn get(&self, key: u64) -> Option<i64> {
        let mut node = self.root.as_deref().filter(|r| key <= max_key(r.shift))?;
        loop {
            match node.slots[node.offset(key)].as_ref()? {
                Slot::Node(child) => node = &**child,
                Slot::Entry(v) => return Some(*v),
            }
        }
    }

    /// Removes the entry at `key` and returns its value, or [`None`] if vacant.
    ///
    /// The marks of `key` are cleared, and radix nodes left empty are freed.
    pub fn erase(&mut self, key: u64) -> Option<i64> {
        let root = self.root.as_deref_mut().filter(|r| key <= max_key(r.shift))?;
        let v = erase_in(root, key, &mut self.allocs)?;
        self.len -= 1;
        self.shrink();
        Some(v)
    }

    /// Sets `mark` on `key`, returning `false` if `key` is vacant.
    pub fn set_mark(&mut self, key: u64, mark: Mark) -> bool {
        match self.root.as_deref_mut() {
            Some(root) if key <= max_key(root.shift) => set_mark_in(root, key, mark.index()),
            _ => false,
        }
    }

    /// Clears `mark` from `key`, returning `false` if `key` is vacant.
    pub fn clear_mark(&mut self, key: u64, mark: Mark) -> bool {
        match self.root.as_deref_mut() {
            Some(root) if key <= max_key(root.shift) => clear_mark_in(root, key, mark.index()),
            _ => false,
        }
    }

    /// Checks if `key` carries `mark`.
    pub fn get_mark(&self, key: u64, mark: Mark) -> bool {
        let Some(mut node) = self.root.as_deref().filter(|r| key <= max_key(r.shift)) else {
            return false;
        };
        loop {
            let off = node.offset(key);
            if node.marks[mark.index()] & (1 << off) == 0 {
                return false;
            }
            match node.child(off) {
                Some(child) => node = child,
                None => return true,
            }
        }
    }

    /// Visits every entry in ascending key order.
    ///
    /// The visitor gets mutable access to the array, so it may set or clear marks
    /// (or even erase) while iterating. Each step resumes after the last visited key.
    ///
    /// # Arguments
    ///
    ///  - `visit`: Callback invoked with the array, the key and the value.
    pub fn for_each<F>(&mut self, visit: F)
    where
        F: FnMut(&mut Self, u64, i64),
    {
        self.walk(None, visit);
    }

    /// Visits every entry carrying `mark` in ascending key order.
    ///
    /// Marks set by the visitor on keys not visited yet are honored in the same pass.
    pub fn for_each_marked<F>(&mut self, mark: Mark, visit: F)
    where
        F: FnMut(&mut Self, u64, i64),
    {
        self.walk(Some(mark), visit);
    }

    /// Returns up to `max` values whose keys are no less than `start`, in ascending key order.
    pub fn gang_lookup(&self, start: u64, max: usize) -> Vec<i64> {
        Iter::new(self, start, None).take(max).map(|(_, v)| v).collect()
    }

    /// Returns up to `max` values carrying `mark` whose keys are no less than `start`,
    /// in ascending key order.
    pub fn gang_lookup_by_mark(&self, mark: Mark, start: u64, max: usize) -> Vec<i64> {
        Iter::new(self, start, Some(mark))
            .take(max)
            .map(|(_, v)| v)
            .collect()
    }

    /// Creates an iterator over `(key, value)` pairs in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self, 0, None)
    }

    /// Creates an iterator over `(key, value)` pairs carrying `mark` in ascending key order.
    pub fn iter_marked(&self, mark: Mark) -> Iter<'_> {
        Iter::new(self, 0, Some(mark))
    }

    /// Removes every entry and frees every radix node.
    pub fn clear(&mut self) {
        if let Some(root) = self.root.take() {
            for _ in 0..root.count_nodes() {
                self.allocs.release();
            }
        }
        self.len = 0;
    }

    /// Returns the number of entries stored.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the array is empty.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of live radix nodes.
    pub const fn num_nodes(&self) -> usize {
        self.allocs.live()
    }

    /// Returns the first entry with key no less than `start`, optionally carrying `mark`.
    fn find(&self, start: u64, mark: Option<Mark>) -> Option<(u64, i64)> {
        let root = self.root.as_deref().filter(|r| start <= max_key(r.shift))?;
        find_in(root, 0, start, mark)
    }

    fn walk<F>(&mut self, mark: Option<Mark>, mut visit: F)
    where
        F: FnMut(&mut Self, u64, i64),
    {
        let mut next = Some(0);
        while let Some(start) = next {
            let Some((key, v)) = self.find(start, mark) else {
                break;
            };
            visit(self, key, v);
            next = key.checked_add(1);
        }
    }

    fn grow_to(&mut self, key: u64) -> Result<()> {
        loop {
            let shift = match self.root.as_deref() {
                Some(root) if key <= max_key(root.shift) => return Ok(()),
                Some(root) => root.shift + SLOT_BITS,
                None => shift_for(key),
            };
            self.allocs.acquire()?;
            let mut top = Node::boxed(shift);
            if let Some(old) = self.root.take() {
                for (m, bits) in old.marks.iter().enumerate() {
                    if *bits != 0 {
                        top.marks[m] |= 1;
                    }
                }
                top.present |= 1;
                top.slots[0] = Some(Slot::Node(old));
            }
            self.root = Some(top);
        }
    }

    fn shrink(&mut self) {
        loop {
            let Some(root) = self.root.as_deref_mut() else {
                return;
            };
            if root.present == 0 {
                self.root = None;
                self.allocs.release();
                return;
            }
            if root.shift == 0 || root.present != 1 {
                return;
            }
            match root.slots[0].take() {
                Some(Slot::Node(child)) => {
                    self.root = Some(child);
                    self.allocs.release();
                }
                other => {
                    root.slots[0] = other;
                    return;
                }
            }
        }
    }
}

impl Accounted for SparseArray {
    fn allocs(&self) -> &Allocs {
        &self.allocs
    }
}

fn insert_in(node: &mut Node, key: u64, value: i64, allocs: &mut Allocs) -> Result<Option<i64>> {
    let off = node.offset(key);
    let bit = 1 << off;
    if node.shift == 0 {
        node.present |= bit;
        return Ok(match node.slots[off].replace(Slot::Entry(value)) {
            Some(Slot::Entry(prev)) => Some(prev),
            _ => None,
        });
    }
    if node.slots[off].is_none() {
        allocs.acquire()?;
        node.slots[off] = Some(Slot::Node(Node::boxed(node.shift - SLOT_BITS)));
        node.present |= bit;
    }
    let Some(child) = node.child_mut(off) else {
        unreachable!("entry stored above the leaf level");
    };
    let res = insert_in(child, key, value, allocs);
    if res.is_err() && child.present == 0 {
        node.slots[off] = None;
        node.present &= !bit;
        allocs.release();
    }
    res
}

fn erase_in(node: &mut Node, key: u64, allocs: &mut Allocs) -> Option<i64> {
    let off = node.offset(key);
    let bit = 1 << off;
    if node.present & bit == 0 {
        return None;
    }
    if node.shift == 0 {
        let Some(Slot::Entry(v)) = node.slots[off].take() else {
            return None;
        };
        node.present &= !bit;
        for bits in &mut node.marks {
            *bits &= !bit;
        }
        return Some(v);
    }
    let child = node.child_mut(off)?;
    let v = erase_in(child, key, allocs)?;
    let (empty, child_marks) = (child.present == 0, child.marks);
    if empty {
        node.slots[off] = None;
        node.present &= !bit;
        allocs.release();
    }
    for (bits, child_bits) in node.marks.iter_mut().zip(child_marks) {
        if child_bits == 0 {
            *bits &= !bit;
        }
    }
    Some(v)
}

fn set_mark_in(node: &mut Node, key: u64, m: usize) -> bool {
    let off = node.offset(key);
    let bit = 1 << off;
    if node.present & bit == 0 {
        return false;
    }
    let found = match node.child_mut(off) {
        Some(child) => set_mark_in(child, key, m),
        None => true,
    };
    if found {
        node.marks[m] |= bit;
    }
    found
}

fn clear_mark_in(node: &mut Node, key: u64, m: usize) -> bool {
    let off = node.offset(key);
    let bit = 1 << off;
    if node.present & bit == 0 {
        return false;
    }
    let (found, still_marked) = match node.child_mut(off) {
        Some(child) => (clear_mark_in(child, key, m), child.marks[m] != 0),
        None => (true, false),
    };
    if found && !still_marked {
        node.marks[m] &= !bit;
    }
    found
}

/// Searches the subtree of `node`, whose first key is `base`.
fn find_in(node: &Node, base: u64, start: u64, mark: Option<Mark>) -> Option<(u64, i64)> {
    let first = if start <= base {
        0
    } else {
        ((start - base) >> node.shift) as u32
    };
    let mut bits = mark.map_or(node.present, |m| node.marks[m.index()]) & (u64::MAX << first);
    while bits != 0 {
        let off = bits.trailing_zeros() as usize;
        bits &= bits - 1;
        let slot_base = base + ((off as u64) << node.shift);
        match &node.slots[off] {
            Some(Slot::Entry(v)) => return Some((slot_base, *v)),
            Some(Slot::Node(child)) => {
                if let Some(hit) = find_in(child, slot_base, start.max(slot_base), mark) {
                    return Some(hit);
                }
            }
            None => {}
        }
    }
    None
}

/// Iterator over `(key, value)` pairs of a [`SparseArray`] in ascending key order,
/// created by [`SparseArray::iter`] or [`SparseArray::iter_marked`].
pub struct Iter<'a> {
    xa: &'a SparseArray,
    next: Option<u64>,
    mark: Option<Mark>,
}

impl<'a> Iter<'a> {
    fn new(xa: &'a SparseArray, start: u64, mark: Option<Mark>) -> Self {
        Self {
            xa,
            next: Some(start),
            mark,
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = (u64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        let hit = self.xa.find(self.next?, self.mark);
        self.next = hit.and_then(|(key, _)| key.checked_add(1));
        hit
    }
}
