//! Construction, configuration and reset for BPlusTree.
//!
//! A tree is sized up front from the number of keys it is expected to hold:
//! that figure pre-allocates the arena and fixes the depth hint of the path
//! stack. Neither is a hard limit.

use tracing::debug;

use crate::arena::Arena;
use crate::comparator::{ByteOrder, Comparator, ScalarOrder};
use crate::error::{BPlusTreeError, InitResult};
use crate::path_stack::PathStack;
use crate::types::{
    BPlusTree, DEFAULT_DEGREE, DEFAULT_EXPECTED_CAPACITY, MAX_PREALLOCATED_NODES, MIN_DEGREE,
};

/// Sizing parameters for a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Advisory number of keys; sizes the arena and the path stack.
    pub expected_capacity: usize,
    /// Maximum occupied slots per node before it splits.
    pub degree: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            expected_capacity: DEFAULT_EXPECTED_CAPACITY,
            degree: DEFAULT_DEGREE,
        }
    }
}

impl TreeConfig {
    pub fn new(expected_capacity: usize, degree: usize) -> Self {
        Self {
            expected_capacity,
            degree,
        }
    }

    /// Reject degrees below [`MIN_DEGREE`] and a zero expected capacity.
    pub fn validate(&self) -> InitResult<()> {
        if self.degree < MIN_DEGREE {
            return Err(BPlusTreeError::invalid_degree(self.degree, MIN_DEGREE));
        }
        if self.expected_capacity == 0 {
            return Err(BPlusTreeError::invalid_config(
                "expected_capacity",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Slot index promoted when a node splits.
    pub fn separator_index(&self) -> usize {
        self.degree / 2
    }

    /// `ceil(log2(expected_capacity))`, at least 1.
    pub fn path_depth(&self) -> usize {
        let depth = self
            .expected_capacity
            .checked_next_power_of_two()
            .map(|p| p.trailing_zeros() as usize)
            .unwrap_or(usize::BITS as usize);
        depth.max(1)
    }

    /// Number of nodes to pre-allocate in the arena, at most
    /// [`MAX_PREALLOCATED_NODES`].
    pub fn node_hint(&self) -> usize {
        (self.expected_capacity / self.degree.max(1)).min(MAX_PREALLOCATED_NODES)
    }
}

impl<K, V> BPlusTree<K, V, ScalarOrder> {
    /// Create an empty tree ordered by the keys' native order.
    ///
    /// # Arguments
    ///
    /// * `expected_capacity` - Advisory number of keys the tree will hold
    /// * `degree` - Maximum occupied slots per node (minimum 2)
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let tree = BPlusTree::<i32, String>::new(1000, 16).unwrap();
    /// assert!(tree.is_empty());
    /// assert!(BPlusTree::<i32, String>::new(1000, 1).is_err());
    /// ```
    pub fn new(expected_capacity: usize, degree: usize) -> InitResult<Self> {
        Self::with_comparator(expected_capacity, degree, ScalarOrder)
    }

    /// Create a tree with [`DEFAULT_DEGREE`] and [`DEFAULT_EXPECTED_CAPACITY`].
    pub fn with_default_degree() -> InitResult<Self> {
        Self::from_config(TreeConfig::default(), ScalarOrder)
    }
}

impl<K, V> BPlusTree<K, V, ByteOrder> {
    /// Create an empty tree ordered lexicographically by key bytes.
    ///
    /// ```
    /// use bplus_index::ByteTree;
    ///
    /// let mut tree = ByteTree::new_bytes(100, 4).unwrap();
    /// tree.insert(b"beta".to_vec(), 2);
    /// tree.insert(b"alpha".to_vec(), 1);
    /// assert_eq!(tree.first(), Some((&b"alpha".to_vec(), &1)));
    /// ```
    pub fn new_bytes(expected_capacity: usize, degree: usize) -> InitResult<Self> {
        Self::with_comparator(expected_capacity, degree, ByteOrder)
    }
}

impl<K, V, C> BPlusTree<K, V, C> {
    /// Create an empty tree ordered by `comparator`.
    pub fn with_comparator(
        expected_capacity: usize,
        degree: usize,
        comparator: C,
    ) -> InitResult<Self> {
        Self::from_config(TreeConfig::new(expected_capacity, degree), comparator)
    }

    /// Create an empty tree from a validated [`TreeConfig`].
    pub fn from_config(config: TreeConfig, comparator: C) -> InitResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config, comparator))
    }

    fn from_valid_config(config: TreeConfig, comparator: C) -> Self {
        Self {
            degree: config.degree,
            separator: config.separator_index(),
            root: None,
            arena: Arena::with_capacity(config.node_hint()),
            path: PathStack::new(config.path_depth()),
            comparator,
            len: 0,
        }
    }

    /// Drop every node and start over with an empty tree.
    ///
    /// Node ids handed out before the reset belong to an older arena epoch
    /// and are reported as stale from then on.
    pub fn reset(&mut self) {
        let dropped = self.arena.reset();
        self.root = None;
        self.path.clear();
        self.len = 0;
        debug!(epoch = self.arena.epoch(), dropped, "tree reset");
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn separator_index(&self) -> usize {
        self.separator
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }
}

impl<K, V, C> Default for BPlusTree<K, V, C>
where
    C: Comparator<K> + Default,
{
    fn default() -> Self {
        Self::from_valid_config(TreeConfig::default(), C::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degree_below_two() {
        let err = BPlusTree::<i32, i32>::new(10, 1).unwrap_err();
        assert!(err.is_config_error());
        assert!(BPlusTree::<i32, i32>::new(10, 2).is_ok());
    }

    #[test]
    fn rejects_zero_expected_capacity() {
        assert!(matches!(
            BPlusTree::<i32, i32>::new(0, 4),
            Err(BPlusTreeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn derives_separator_and_path_depth() {
        let config = TreeConfig::new(20_000, 50);
        assert_eq!(config.separator_index(), 25);
        assert_eq!(config.path_depth(), 15);
        assert_eq!(config.node_hint(), 400);

        assert_eq!(TreeConfig::new(1, 5).path_depth(), 1);
        assert_eq!(TreeConfig::new(1024, 5).path_depth(), 10);
        assert_eq!(TreeConfig::new(1025, 5).path_depth(), 11);
    }

    #[test]
    fn huge_expected_capacity_only_caps_preallocation() {
        let mut tree = BPlusTree::<i32, i32>::new(usize::MAX, 2).unwrap();
        assert_eq!(tree.path.depth_hint(), usize::BITS as usize);
        assert_eq!(tree.arena.len(), 0);
        assert!(tree.arena_stats().total_capacity >= MAX_PREALLOCATED_NODES);
        assert!(tree.arena_stats().total_capacity < MAX_PREALLOCATED_NODES * 2);

        for key in 0..100 {
            tree.insert(key, -key);
        }
        assert_eq!(tree.get(&42), Some(&-42));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn huge_degree_is_accepted_without_reserving_it() {
        let config = TreeConfig::new(64, usize::MAX);
        assert_eq!(config.node_hint(), 0);

        let mut tree = BPlusTree::from_config(config, ScalarOrder).unwrap();
        for key in [3u8, 1, 2] {
            tree.insert(key, ());
        }
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn default_matches_default_config() {
        let tree: BPlusTree<u32, u32> = BPlusTree::default();
        let config = TreeConfig::default();
        assert_eq!(tree.separator_index(), config.separator_index());
        assert_eq!(tree.path.depth_hint(), config.path_depth());
        assert!(tree.arena_stats().total_capacity >= config.node_hint());
    }

    #[test]
    fn new_tree_has_no_root() {
        let tree = BPlusTree::<u64, ()>::new(50, 5).unwrap();
        assert!(tree.root.is_none());
        assert_eq!(tree.degree(), 5);
        assert_eq!(tree.separator_index(), 2);
        assert_eq!(tree.path.depth_hint(), 6);
    }

    #[test]
    fn default_uses_default_config() {
        let tree: BPlusTree<i64, i64> = BPlusTree::default();
        assert_eq!(tree.degree(), DEFAULT_DEGREE);
        assert!(tree.is_empty());
    }

    #[test]
    fn reset_clears_root_and_length() {
        let mut tree = BPlusTree::new(100, 4).unwrap();
        for i in 0..50 {
            tree.insert(i, i);
        }
        let epoch = tree.arena.epoch();
        tree.reset();

        assert!(tree.root.is_none());
        assert!(tree.is_empty());
        assert_eq!(tree.arena.len(), 0);
        assert_eq!(tree.arena.epoch(), epoch + 1);

        tree.insert(7, 70);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&7), Some(&70));
        assert_eq!(tree.get(&3), None);
    }
}
