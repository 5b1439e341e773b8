//! # `kds`: Five in-memory index structures over one integer set
//!
//! `kds` builds several classic kernel-style containers from the same set of integers,
//! walks them, and tears them down without leaking a single node.
//!
//! ## Data structures
//!
//! - [`OrderedList`]
//!   - Singly-linked list keeping insertion order.
//! - [`OrderedTree`]
//!   - Red-black tree with parent links, supporting in-order draining and handle-based erase.
//! - [`HashIndex`]
//!   - Chained hash table with a fixed power-of-two number of buckets.
//! - [`SparseArray`]
//!   - Radix-indexed sparse array with three [`Mark`]s per key and gang lookups.
//! - [`BitEncoder`]
//!   - Fixed 10-bit bitmap encoder on top of a plain [`BitVector`].
//!
//! The node-based structures allocate from an [`arena::Arena`] and expose their
//! allocation counters through [`Accounted`], so a caller can verify that a teardown
//! freed everything it allocated.
//!
//! ## Lifecycle
//!
//! [`Suite`] runs every structure over the integers of a [`Config`] in sequence and
//! records the produced lines in a [`Trace`].
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kds::{Config, Suite};
//!
//! let mut suite = Suite::new(Config::new("3 1 2"))?;
//! suite.init();
//! suite.exit();
//!
//! let tree: Vec<_> = suite.trace().section("red black tree").unwrap().to_vec();
//! assert_eq!(tree, vec!["1", "2", "3"]);
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]

pub mod alloc;
pub mod arena;
pub mod bit_encoder;
pub mod bit_vector;
pub mod config;
pub mod hash_index;
pub mod ordered_list;
pub mod ordered_tree;
pub mod sparse_array;
pub mod suite;
pub mod tokens;
pub mod trace;

pub use bit_encoder::BitEncoder;
pub use bit_vector::BitVector;
pub use config::Config;
pub use hash_index::HashIndex;
pub use ordered_list::OrderedList;
pub use ordered_tree::OrderedTree;
pub use sparse_array::{Mark, SparseArray};
pub use suite::Suite;
pub use trace::Trace;

use crate::alloc::Allocs;

/// An interface for inspecting the allocation counters of a container.
pub trait Accounted {
    /// Returns the allocation counters.
    fn allocs(&self) -> &Allocs;

    /// Checks if every allocated node has been freed.
    fn is_torn_down(&self) -> bool {
        self.allocs().is_balanced()
    }
}
