//! INSERT operations for BPlusTree.
//!
//! An insert descends from the root recording the slot index taken at every
//! level, upserts into the leaf, and then resolves overflow bottom-up: each
//! node that reaches `degree` slots is split around its separator, the
//! separator goes into the parent at the index recorded on the way down, and
//! the parent is checked next. A root split grows the tree by one level.

use tracing::{debug, trace};

use crate::arena::NodeId;
use crate::comparator::Comparator;
use crate::error::{BPlusTreeError, ModifyResult};
use crate::node::link_sibling;
use crate::types::{BPlusTree, Node, Slot, SplitKind};

impl<K: Clone, V, C: Comparator<K>> BPlusTree<K, V, C> {
    // ============================================================================
    // PUBLIC INSERT OPERATIONS
    // ============================================================================

    /// Insert a key-value pair, replacing the value of an existing key.
    ///
    /// # Returns
    ///
    /// The previous value if `key` was already present.
    ///
    /// # Panics
    ///
    /// If the tree's internal links are inconsistent. That can only follow
    /// from a bug in this crate; use [`try_insert`](Self::try_insert) to get
    /// the error instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(16, 4).unwrap();
    /// assert_eq!(tree.insert(1, "one"), None);
    /// assert_eq!(tree.insert(1, "uno"), Some("one"));
    /// assert_eq!(tree.get(&1), Some(&"uno"));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.try_insert(key, value) {
            Ok(old_value) => old_value,
            Err(e) => panic!("B+ tree insert failed: {}", e),
        }
    }

    /// Insert a key-value pair, surfacing internal inconsistencies as errors.
    pub fn try_insert(&mut self, key: K, value: V) -> ModifyResult<Option<V>> {
        let result = self.insert_and_split(key, value);
        self.path.clear();

        let old_value = result?;
        if old_value.is_none() {
            self.len += 1;
        }
        Ok(old_value)
    }

    // ============================================================================
    // HELPERS FOR INSERT OPERATIONS
    // ============================================================================

    fn insert_and_split(&mut self, key: K, value: V) -> ModifyResult<Option<V>> {
        let root = match self.root {
            Some(root) => root,
            None => {
                let root = self.arena.allocate(Node::new(self.degree));
                self.root = Some(root);
                root
            }
        };

        let leaf = self.descend_recording(root, &key)?;
        let old_value = self.upsert_into_leaf(leaf, key, value)?;

        if self.arena.try_get(leaf)?.len() == self.degree {
            let mut current = self.split_node(leaf, SplitKind::Leaf)?;
            while self.arena.try_get(current)?.len() == self.degree {
                current = self.split_node(current, SplitKind::Branch)?;
            }
        }

        Ok(old_value)
    }

    /// Walk from `root` to the leaf for `key`, pushing each index taken.
    fn descend_recording(&mut self, root: NodeId, key: &K) -> ModifyResult<NodeId> {
        let mut current = root;
        loop {
            let node = self.arena.try_get(current)?;
            let index = node.search(key, &self.comparator);
            self.path.push(index);
            match node.child(index) {
                Some(child) => current = child,
                None => return Ok(current),
            }
        }
    }

    /// Overwrite the payload of an equal key or insert a new slot.
    fn upsert_into_leaf(&mut self, leaf: NodeId, key: K, value: V) -> ModifyResult<Option<V>> {
        let index = self.path.pop().ok_or_else(|| {
            BPlusTreeError::corrupted_tree("Path stack", "no index recorded for leaf")
        })?;
        let node = self.arena.try_get_mut(leaf)?;

        if index > 0 {
            if let Some(slot) = node.slots.get_mut(index - 1) {
                if self.comparator.equal(&slot.key, &key) {
                    return Ok(slot.value.replace(value));
                }
            }
        }

        node.insert_at(index, Slot::leaf(key, value));
        Ok(None)
    }

    /// Split the full node `node_id` and promote its separator.
    ///
    /// Returns the parent, which has gained one slot and may now be full.
    fn split_node(&mut self, node_id: NodeId, kind: SplitKind) -> ModifyResult<NodeId> {
        let (parent_id, parent_index) = self.ensure_parent(node_id)?;

        let (separator, sibling) = self
            .arena
            .try_get_mut(node_id)?
            .split_off(self.separator, kind, self.degree)?;
        let sibling_id = self.arena.allocate(sibling);

        if kind == SplitKind::Branch {
            let moved: Vec<NodeId> = self.arena.try_get(sibling_id)?.children().collect();
            for child in moved {
                self.arena.try_get_mut(child)?.parent = Some(sibling_id);
            }
        }

        {
            let parent = self.arena.try_get_mut(parent_id)?;
            parent.insert_at(parent_index, Slot::separator(separator, node_id));
            parent.set_child(parent_index + 1, sibling_id);
        }

        link_sibling(&mut self.arena, node_id, sibling_id)?;

        trace!(
            node = %node_id,
            sibling = %sibling_id,
            parent = %parent_id,
            ?kind,
            "node split"
        );
        Ok(parent_id)
    }

    /// Parent of `node_id` and the index it was reached through.
    ///
    /// A node without a parent is the root; it gets a fresh empty parent that
    /// becomes the new root, reached through index 0.
    fn ensure_parent(&mut self, node_id: NodeId) -> ModifyResult<(NodeId, usize)> {
        if let Some(parent) = self.arena.try_get(node_id)?.parent {
            let index = self.path.pop().ok_or_else(|| {
                BPlusTreeError::corrupted_tree("Path stack", "no index recorded for parent")
            })?;
            return Ok((parent, index));
        }

        let new_root = self.arena.allocate(Node::new(self.degree));
        self.arena.try_get_mut(node_id)?.parent = Some(new_root);
        self.root = Some(new_root);
        debug!(root = %new_root, height = self.height(), "root split, tree grew");
        Ok((new_root, 0))
    }
}
