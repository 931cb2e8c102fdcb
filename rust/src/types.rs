//! Core types and data structures for BPlusTree.
//!
//! This module contains the fundamental data structures, type definitions,
//! and constants used throughout the B+ tree implementation.

use crate::arena::{Arena, NodeId};
use crate::comparator::ScalarOrder;
use crate::path_stack::PathStack;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Smallest degree a tree accepts.
pub const MIN_DEGREE: usize = 2;

/// Degree used when none is given.
pub const DEFAULT_DEGREE: usize = 16;

/// Expected key count used when none is given.
pub const DEFAULT_EXPECTED_CAPACITY: usize = 1024;

/// Ceiling on the nodes reserved up front; the arena grows past it on demand.
pub const MAX_PREALLOCATED_NODES: usize = 1 << 14;

/// Ceiling on the slots reserved up front in a single node.
pub(crate) const MAX_PREALLOCATED_SLOTS: usize = 1 << 10;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// In-memory B+ tree index.
///
/// Keys are ordered by the comparator `C`; values live only in leaves, and
/// leaves are chained left to right so ordered scans never re-descend from the
/// root. Every node is owned by the tree's arena and addressed by [`NodeId`].
///
/// # Type Parameters
///
/// * `K` - Key type
/// * `V` - Value type
/// * `C` - [`Comparator`](crate::Comparator) over `K`, [`ScalarOrder`] by default
///
/// # Examples
///
/// ```
/// use bplus_index::BPlusTree;
///
/// let mut tree = BPlusTree::new(64, 5).unwrap();
/// tree.insert(25, "a");
/// tree.insert(104, "b");
/// tree.insert(210, "c");
///
/// assert_eq!(tree.get(&104), Some(&"b"));
/// assert_eq!(tree.len(), 3);
///
/// let keys: Vec<_> = tree.keys().copied().collect();
/// assert_eq!(keys, [25, 104, 210]);
/// ```
///
/// # Concurrency
///
/// There is no internal locking. Cursors and iterators borrow the tree
/// immutably, so an insert or reset cannot run while one is alive.
#[derive(Debug)]
pub struct BPlusTree<K, V, C = ScalarOrder> {
    /// Maximum occupied slots before a node splits.
    pub(crate) degree: usize,
    /// Index of the slot promoted on split, `degree / 2`.
    pub(crate) separator: usize,
    /// Root node; `None` exactly when the tree holds no keys.
    pub(crate) root: Option<NodeId>,
    /// Owner of every node.
    pub(crate) arena: Arena<Node<K, V>>,
    /// Descent indices of the insert in progress.
    pub(crate) path: PathStack,
    pub(crate) comparator: C,
    /// Number of distinct keys.
    pub(crate) len: usize,
}

/// One key position in a node.
#[derive(Debug, Clone)]
pub struct Slot<K, V> {
    pub(crate) key: K,
    /// Present in leaf slots only.
    pub(crate) value: Option<V>,
    /// Subtree of keys strictly less than `key`; `None` in leaves.
    pub(crate) child: Option<NodeId>,
}

/// Tree node: ordered slots plus the spare-slot child and link bookkeeping.
#[derive(Debug, Clone)]
pub struct Node<K, V> {
    pub(crate) slots: Vec<Slot<K, V>>,
    /// Child for keys greater than or equal to the last key.
    pub(crate) last_child: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

// ============================================================================
// ENUMS
// ============================================================================

/// Which split policy applies to an overflowing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SplitKind {
    /// The separator is copied up and stays in the right sibling.
    Leaf,
    /// The separator moves up and leaves both halves.
    Branch,
}

impl SplitKind {
    /// Slots skipped past the separator when carving out the right half.
    pub(crate) fn adjustment(self) -> usize {
        match self {
            SplitKind::Leaf => 0,
            SplitKind::Branch => 1,
        }
    }
}
