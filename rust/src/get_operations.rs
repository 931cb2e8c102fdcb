//! GET operations for BPlusTree.
//!
//! Point lookups share the insert descent but record no path: follow
//! `Node::search` from the root until a slot without a child is reached. The
//! leaf index returned sits one past any equal key.

use crate::arena::{ArenaStats, NodeId};
use crate::comparator::Comparator;
use crate::error::BTreeResult;
use crate::types::{BPlusTree, Node};

impl<K, V, C: Comparator<K>> BPlusTree<K, V, C> {
    // ============================================================================
    // PUBLIC GET OPERATIONS
    // ============================================================================

    /// Leaf and slot index for `key`, or `None` on an empty tree.
    ///
    /// The index is one past the slot holding `key` when `key` is present,
    /// and the insertion point for `key` otherwise.
    pub fn search(&self, key: &K) -> Option<(NodeId, usize)> {
        let root = self.root?;
        match self.descend(root, key) {
            Ok(position) => Some(position),
            Err(e) => panic!("B+ tree search failed: {}", e),
        }
    }

    /// Get a reference to the value associated with a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(16, 4).unwrap();
    /// tree.insert(1, "one");
    /// assert_eq!(tree.get(&1), Some(&"one"));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// The slot stored for `key`, as a key-value pair.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let (leaf, index) = self.search(key)?;
        let slot = self.arena.get(leaf)?.slot(index.checked_sub(1)?)?;
        if self.comparator.equal(&slot.key, key) {
            slot.value.as_ref().map(|value| (&slot.key, value))
        } else {
            None
        }
    }

    /// Check if key exists in the tree.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get_key_value(key).is_some()
    }

    /// Found flag together with the stored value.
    pub fn contains(&self, key: &K) -> (bool, Option<&V>) {
        let value = self.get(key);
        (value.is_some(), value)
    }

    // ============================================================================
    // DESCENT
    // ============================================================================

    pub(crate) fn descend(&self, root: NodeId, key: &K) -> BTreeResult<(NodeId, usize)> {
        let mut current = root;
        loop {
            let node = self.arena.try_get(current)?;
            let index = node.search(key, &self.comparator);
            match node.child(index) {
                Some(child) => current = child,
                None => return Ok((current, index)),
            }
        }
    }
}

impl<K, V, C> BPlusTree<K, V, C> {
    // ============================================================================
    // NODE ACCESS
    // ============================================================================

    /// Borrow a node by id; ids from before a reset are rejected.
    pub fn node(&self, id: NodeId) -> BTreeResult<&Node<K, V>> {
        self.arena.try_get(id)
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Leftmost leaf, the head of the leaf chain.
    pub fn first_leaf(&self) -> Option<NodeId> {
        self.edge_leaf(|_| 0)
    }

    /// Rightmost leaf, the tail of the leaf chain.
    pub fn last_leaf(&self) -> Option<NodeId> {
        self.edge_leaf(|node| node.len())
    }

    fn edge_leaf(&self, pick: impl Fn(&Node<K, V>) -> usize) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            let node = self.arena.get(current)?;
            match node.child(pick(node)) {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    // ============================================================================
    // OTHER API OPERATIONS
    // ============================================================================

    /// Returns the number of distinct keys in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels; 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(id) = current {
            height += 1;
            current = self.arena.get(id).and_then(|node| node.child(0));
        }
        height
    }

    /// Number of nodes allocated since the last reset.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// Returns the first key-value pair in the tree.
    pub fn first(&self) -> Option<(&K, &V)> {
        let leaf = self.arena.get(self.first_leaf()?)?;
        leaf.slots().first().and_then(|slot| Some((slot.key(), slot.value()?)))
    }

    /// Returns the last key-value pair in the tree.
    pub fn last(&self) -> Option<(&K, &V)> {
        let leaf = self.arena.get(self.last_leaf()?)?;
        leaf.slots().last().and_then(|slot| Some((slot.key(), slot.value()?)))
    }
}
