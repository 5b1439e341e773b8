//! Red-black balanced binary search tree of integers.
use anyhow::{anyhow, Result};

use crate::alloc::Allocs;
use crate::arena::{Arena, NodeId};
use crate::Accounted;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Clone, Debug)]
struct Node {
    value: i64,
    color: Color,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// Red-black tree keeping integers in ascending order.
///
/// Equal values are allowed. Insertion sends ties to the right, so draining
/// yields equal values in the order they were inserted.
///
/// # Complexity
///
/// Insertion and erasure take $`O(\lg n)`$ time and the height stays below
/// $`2 \lg (n+1)`$.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kds::OrderedTree;
///
/// let mut tree = OrderedTree::new();
/// for v in [3, 1, 2, -5, 1000] {
///     tree.insert(v)?;
/// }
///
/// let mut seen = vec![];
/// tree.drain_in_order(|v| seen.push(v));
///
/// assert_eq!(seen, vec![-5, 1, 2, 3, 1000]);
/// assert!(tree.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct OrderedTree {
    nodes: Arena<Node>,
    root: Option<NodeId>,
}

impl OrderedTree {
    /// Creates a new empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty tree holding at most `limit` nodes.
    pub const fn with_limit(limit: Option<usize>) -> Self {
        Self {
            nodes: Arena::with_limit(limit),
            root: None,
        }
    }

    /// Inserts `value` and returns the handle of its node.
    ///
    /// # Errors
    ///
    /// An error is returned if the node cannot be allocated.
    pub fn insert(&mut self, value: i64) -> Result<NodeId> {
        let mut parent = None;
        let mut go_left = false;
        let mut cur = self.root;
        while let Some(id) = cur {
            parent = Some(id);
            go_left = value < self.nodes[id].value;
            cur = if go_left {
                self.nodes[id].left
            } else {
                self.nodes[id].right
            };
        }

        let z = self.nodes.alloc(Node {
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        })?;
        match parent {
            None => self.root = Some(z),
            Some(p) if go_left => self.nodes[p].left = Some(z),
            Some(p) => self.nodes[p].right = Some(z),
        }
        self.insert_fixup(z);
        Ok(z)
    }

    /// Returns the value of node `id`, or [`None`] if the handle is stale.
    pub fn get(&self, id: NodeId) -> Option<i64> {
        self.nodes.get(id).map(|n| n.value)
    }

    /// Returns the node holding the smallest value, or [`None`] if empty.
    pub fn first(&self) -> Option<NodeId> {
        self.root.map(|r| self.minimum(r))
    }

    /// Returns the in-order successor of node `id`,
    /// or [`None`] if `id` is the last node or the handle is stale.
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        if let Some(r) = self.nodes.get(id)?.right {
            return Some(self.minimum(r));
        }
        let mut cur = id;
        let mut parent = self.nodes[cur].parent;
        while let Some(p) = parent {
            if self.nodes[p].right != Some(cur) {
                break;
            }
            cur = p;
            parent = self.nodes[p].parent;
        }
        parent
    }

    /// Unlinks node `id`, rebalances, and returns its value.
    ///
    /// Other handles stay valid, so a successor taken with [`Self::next`]
    /// before the call can still be used afterwards.
    /// [`None`] is returned if the handle is stale.
    pub fn erase(&mut self, z: NodeId) -> Option<i64> {
        self.nodes.get(z)?;
        let (zl, zr) = (self.nodes[z].left, self.nodes[z].right);

        let removed;
        let x;
        let x_parent;
        match (zl, zr) {
            (None, _) => {
                removed = self.nodes[z].color;
                x = zr;
                x_parent = self.nodes[z].parent;
                self.transplant(z, zr);
            }
            (Some(_), None) => {
                removed = self.nodes[z].color;
                x = zl;
                x_parent = self.nodes[z].parent;
                self.transplant(z, zl);
            }
            (Some(zl), Some(zr)) => {
                let y = self.minimum(zr);
                removed = self.nodes[y].color;
                x = self.nodes[y].right;
                if self.nodes[y].parent == Some(z) {
                    x_parent = Some(y);
                } else {
                    x_parent = self.nodes[y].parent;
                    self.transplant(y, x);
                    self.nodes[y].right = Some(zr);
                    self.nodes[zr].parent = Some(y);
                }
                self.transplant(z, Some(y));
                self.nodes[y].left = Some(zl);
                self.nodes[zl].parent = Some(y);
                self.nodes[y].color = self.nodes[z].color;
            }
        }

        if removed == Color::Black {
            self.erase_fixup(x, x_parent);
        }
        self.nodes.free(z).map(|n| n.value)
    }

    /// Visits every value in ascending order, freeing each node after its visit.
    ///
    /// The tree is empty afterwards.
    ///
    /// # Arguments
    ///
    ///  - `visit`: Callback invoked once per value.
    pub fn drain_in_order<F>(&mut self, mut visit: F)
    where
        F: FnMut(i64),
    {
        let mut cur = self.first();
        while let Some(id) = cur {
            cur = self.next(id);
            visit(self.nodes[id].value);
            self.erase(id);
        }
        debug_assert!(self.root.is_none());
    }

    /// Creates an iterator over the values in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            cur: self.first(),
        }
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.height_from(self.root)
    }

    /// Returns the number of values stored.
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks if the tree is empty.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verifies ordering, parent links and red-black coloring,
    /// returning the black height.
    ///
    /// # Errors
    ///
    /// An error describing the first violation found.
    pub fn check(&self) -> Result<usize> {
        if let Some(r) = self.root {
            if self.nodes[r].color != Color::Black {
                return Err(anyhow!("root must be black."));
            }
            if self.nodes[r].parent.is_some() {
                return Err(anyhow!("root must not have a parent."));
            }
        }
        self.check_from(self.root, None, None)
    }

    fn check_from(&self, id: Option<NodeId>, lo: Option<i64>, hi: Option<i64>) -> Result<usize> {
        let Some(id) = id else {
            return Ok(1);
        };
        let node = &self.nodes[id];
        if lo.map_or(false, |lo| node.value < lo) || hi.map_or(false, |hi| hi < node.value) {
            return Err(anyhow!("value {} is out of order.", node.value));
        }
        for child in [node.left, node.right].into_iter().flatten() {
            if self.nodes[child].parent != Some(id) {
                return Err(anyhow!("broken parent link below value {}.", node.value));
            }
            if node.color == Color::Red && self.nodes[child].color == Color::Red {
                return Err(anyhow!("red value {} has a red child.", node.value));
            }
        }
        let lh = self.check_from(node.left, lo, Some(node.value))?;
        let rh = self.check_from(node.right, Some(node.value), hi)?;
        if lh != rh {
            return Err(anyhow!(
                "black heights differ below value {}: {lh} vs {rh}.",
                node.value
            ));
        }
        Ok(lh + usize::from(node.color == Color::Black))
    }

    fn height_from(&self, id: Option<NodeId>) -> usize {
        id.map_or(0, |id| {
            1 + self
                .height_from(self.nodes[id].left)
                .max(self.height_from(self.nodes[id].right))
        })
    }

    fn minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(l) = self.nodes[id].left {
            id = l;
        }
        id
    }

    #[inline(always)]
    fn is_red(&self, id: Option<NodeId>) -> bool {
        id.map_or(false, |id| self.nodes[id].color == Color::Red)
    }

    #[inline(always)]
    fn paint(&mut self, id: Option<NodeId>, color: Color) {
        if let Some(id) = id {
            self.nodes[id].color = color;
        }
    }

    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) if self.nodes[p].left == Some(old) => self.nodes[p].left = new,
            Some(p) => self.nodes[p].right = new,
        }
    }

    /// Puts `v` where `u` hangs. `u` keeps its own links.
    fn transplant(&mut self, u: NodeId, v: Option<NodeId>) {
        let parent = self.nodes[u].parent;
        self.replace_child(parent, u, v);
        if let Some(v) = v {
            self.nodes[v].parent = parent;
        }
    }

    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].right else {
            return;
        };
        let b = self.nodes[y].left;
        self.nodes[x].right = b;
        if let Some(b) = b {
            self.nodes[b].parent = Some(x);
        }
        self.transplant(x, Some(y));
        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].left else {
            return;
        };
        let b = self.nodes[y].right;
        self.nodes[x].left = b;
        if let Some(b) = b {
            self.nodes[b].parent = Some(x);
        }
        self.transplant(x, Some(y));
        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while let Some(p) = self.nodes[z].parent {
            if !self.is_red(Some(p)) {
                break;
            }
            // A red node is never the root, so the grandparent exists.
            let Some(g) = self.nodes[p].parent else {
                break;
            };
            if self.nodes[g].left == Some(p) {
                let u = self.nodes[g].right;
                if self.is_red(u) {
                    self.paint(Some(p), Color::Black);
                    self.paint(u, Color::Black);
                    self.paint(Some(g), Color::Red);
                    z = g;
                } else {
                    if self.nodes[p].right == Some(z) {
                        z = p;
                        self.rotate_left(z);
                    }
                    self.paint(self.nodes[z].parent, Color::Black);
                    self.paint(Some(g), Color::Red);
                    self.rotate_right(g);
                }
            } else {
                let u = self.nodes[g].left;
                if self.is_red(u) {
                    self.paint(Some(p), Color::Black);
                    self.paint(u, Color::Black);
                    self.paint(Some(g), Color::Red);
                    z = g;
                } else {
                    if self.nodes[p].left == Some(z) {
                        z = p;
                        self.rotate_right(z);
                    }
                    self.paint(self.nodes[z].parent, Color::Black);
                    self.paint(Some(g), Color::Red);
                    self.rotate_left(g);
                }
            }
        }
        self.paint(self.root, Color::Black);
    }

    /// Restores the black height after a black node was unlinked.
    ///
    /// `x` is the node that took its place and may be empty, hence `parent`
    /// is passed separately.
    fn erase_fixup(&mut self, mut x: Option<NodeId>, mut parent: Option<NodeId>) {
        while x != self.root && !self.is_red(x) {
            let Some(p) = parent else {
                break;
            };
            if x == self.nodes[p].left {
                let Some(mut w) = self.nodes[p].right else {
                    break;
                };
                if self.is_red(Some(w)) {
                    self.paint(Some(w), Color::Black);
                    self.paint(Some(p), Color::Red);
                    self.rotate_left(p);
                    match self.nodes[p].right {
                        Some(n) => w = n,
                        None => break,
                    }
                }
                if !self.is_red(self.nodes[w].left) && !self.is_red(self.nodes[w].right) {
                    self.paint(Some(w), Color::Red);
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if !self.is_red(self.nodes[w].right) {
                        self.paint(self.nodes[w].left, Color::Black);
                        self.paint(Some(w), Color::Red);
                        self.rotate_right(w);
                        match self.nodes[p].right {
                            Some(n) => w = n,
                            None => break,
                        }
                    }
                    self.nodes[w].color = self.nodes[p].color;
                    self.paint(Some(p), Color::Black);
                    self.paint(self.nodes[w].right, Color::Black);
                    self.rotate_left(p);
                    x = self.root;
                    parent = None;
                }
            } else {
                let Some(mut w) = self.nodes[p].left else {
                    break;
                };
                if self.is_red(Some(w)) {
                    self.paint(Some(w), Color::Black);
                    self.paint(Some(p), Color::Red);
                    self.rotate_right(p);
                    match self.nodes[p].left {
                        Some(n) => w = n,
                        None => break,
                    }
                }
                if !self.is_red(self.nodes[w].left) && !self.is_red(self.nodes[w].right) {
                    self.paint(Some(w), Color::Red);
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if !self.is_red(self.nodes[w].left) {
                        self.paint(self.nodes[w].right, Color::Black);
                        self.paint(Some(w), Color::Red);
                        self.rotate_left(w);
                        match self.nodes[p].left {
                            Some(n) => w = n,
                            None => break,
                        }
                    }
                    self.nodes[w].color = self.nodes[p].color;
                    self.paint(Some(p), Color::Black);
                    self.paint(self.nodes[w].left, Color::Black);
                    self.rotate_right(p);
                    x = self.root;
                    parent = None;
                }
            }
        }
        self.paint(x, Color::Black);
    }
}

impl Accounted for OrderedTree {
    fn allocs(&self) -> &Allocs {
        self.nodes.allocs()
    }
}

/// Iterator over the values of an [`OrderedTree`] in ascending order,
/// created by [`OrderedTree::iter`].
pub struct Iter<'a> {
    tree: &'a OrderedTree,
    cur: Option<NodeId>,
}

impl Iterator for Iter<'_> {
    type Item = i64;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = self.tree.next(id);
        self.tree.get(id)
    }
}
