//! Cursor and iterator implementations for BPlusTree.
//!
//! A [`Cursor`] is a `(node, index)` position on the leaf chain. Index `i`
//! means "slot `i - 1` is current", so index 0 has nothing to report yet and
//! one [`Cursor::advance`] is needed before a value can be read. Advancing
//! past the last slot of a node moves to its right sibling at index 0.
//!
//! Cursors and iterators hold a shared borrow of the tree, which rules out
//! inserts and resets for as long as they are alive.

use crate::arena::NodeId;
use crate::comparator::{Comparator, ScalarOrder};
use crate::error::{BPlusTreeError, KeyResult};
use crate::types::BPlusTree;

// ============================================================================
// CURSOR
// ============================================================================

/// Forward position on the leaf chain of a tree.
pub struct Cursor<'a, K, V, C = ScalarOrder> {
    tree: &'a BPlusTree<K, V, C>,
    node: Option<NodeId>,
    index: usize,
}

impl<'a, K, V, C> Clone for Cursor<'a, K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            node: self.node,
            index: self.index,
        }
    }
}

impl<'a, K, V, C> Cursor<'a, K, V, C> {
    /// A cursor before the first key of `tree`.
    pub fn new(tree: &'a BPlusTree<K, V, C>) -> Self {
        Self {
            tree,
            node: tree.first_leaf(),
            index: 0,
        }
    }

    /// Move before the first key again.
    pub fn seek_first(&mut self) -> KeyResult<()> {
        self.node = Some(self.tree.first_leaf().ok_or(BPlusTreeError::EmptyTree)?);
        self.index = 0;
        Ok(())
    }

    /// Step to the next slot, crossing to the right sibling when the current
    /// node is exhausted.
    ///
    /// Fails with `EndOfSequence` from the last slot of the rightmost node,
    /// leaving the position unchanged.
    pub fn advance(&mut self) -> KeyResult<()> {
        let id = self.node.ok_or(BPlusTreeError::EmptyTree)?;
        let node = self.tree.node(id)?;

        if self.index < node.len() {
            self.index += 1;
            return Ok(());
        }

        match node.right_sibling() {
            Some(next) => {
                self.node = Some(next);
                self.index = 0;
                Ok(())
            }
            None => Err(BPlusTreeError::EndOfSequence),
        }
    }

    /// Key and value of the slot just behind the cursor.
    pub fn current(&self) -> KeyResult<(&'a K, &'a V)> {
        let tree: &'a BPlusTree<K, V, C> = self.tree;
        let id = self.node.ok_or(BPlusTreeError::EmptyTree)?;
        let slot_index = self
            .index
            .checked_sub(1)
            .ok_or(BPlusTreeError::NoCurrentKey)?;
        let slot = tree
            .node(id)?
            .slot(slot_index)
            .ok_or(BPlusTreeError::NoCurrentKey)?;
        let value = slot.value().ok_or_else(|| {
            let detail = format!("slot {} of {} has no value", slot_index, id);
            BPlusTreeError::corrupted_tree("Cursor", &detail)
        })?;
        Ok((slot.key(), value))
    }

    /// Node and index the cursor sits at, `None` on an empty tree.
    pub fn position(&self) -> Option<(NodeId, usize)> {
        self.node.map(|id| (id, self.index))
    }
}

impl<'a, K, V, C: Comparator<K>> Cursor<'a, K, V, C> {
    /// Reposition at the search result for `key`.
    ///
    /// When `key` is present it becomes the current key. Otherwise the
    /// current key is the greatest smaller key in the same leaf, or there is
    /// none if `key` sorts before every key of that leaf.
    pub fn position_search(&mut self, key: &K) -> KeyResult<()> {
        let root = self.tree.root.ok_or(BPlusTreeError::EmptyTree)?;
        let (leaf, index) = self.tree.descend(root, key)?;
        self.node = Some(leaf);
        self.index = index;
        Ok(())
    }
}

impl<'a, K, V, C> Iterator for Cursor<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    /// Advance and yield the new current entry, skipping the empty position
    /// at the head of each node.
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.advance().ok()?;
            match self.current() {
                Ok(item) => return Some(item),
                Err(BPlusTreeError::NoCurrentKey) => continue,
                Err(_) => return None,
            }
        }
    }
}

// ============================================================================
// ITERATOR STRUCTS
// ============================================================================

/// Iterator over key-value pairs in the B+ tree using the leaf linked list.
pub struct ItemIterator<'a, K, V, C = ScalarOrder> {
    cursor: Cursor<'a, K, V, C>,
    remaining: usize,
}

/// Iterator over keys in the B+ tree.
pub struct KeyIterator<'a, K, V, C = ScalarOrder> {
    items: ItemIterator<'a, K, V, C>,
}

/// Iterator over values in the B+ tree.
pub struct ValueIterator<'a, K, V, C = ScalarOrder> {
    items: ItemIterator<'a, K, V, C>,
}

// ============================================================================
// BPLUSTREE ITERATOR METHODS
// ============================================================================

impl<K, V, C> BPlusTree<K, V, C> {
    /// A cursor before the first key.
    pub fn cursor(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(self)
    }

    /// Returns an iterator over all key-value pairs in sorted order.
    pub fn items(&self) -> ItemIterator<'_, K, V, C> {
        ItemIterator {
            cursor: Cursor::new(self),
            remaining: self.len,
        }
    }

    /// Returns an iterator over all keys in sorted order.
    pub fn keys(&self) -> KeyIterator<'_, K, V, C> {
        KeyIterator {
            items: self.items(),
        }
    }

    /// Returns an iterator over all values in key order.
    pub fn values(&self) -> ValueIterator<'_, K, V, C> {
        ValueIterator {
            items: self.items(),
        }
    }
}

impl<K, V, C: Comparator<K>> BPlusTree<K, V, C> {
    /// A cursor positioned by [`Cursor::position_search`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::{BPlusTree, BPlusTreeError};
    ///
    /// let mut tree = BPlusTree::new(16, 4).unwrap();
    /// for key in [10, 20, 30] {
    ///     tree.insert(key, key * 2);
    /// }
    ///
    /// let mut cursor = tree.position_search(&20).unwrap();
    /// assert_eq!(cursor.current().unwrap(), (&20, &40));
    /// cursor.advance().unwrap();
    /// assert_eq!(cursor.current().unwrap(), (&30, &60));
    /// assert_eq!(cursor.advance(), Err(BPlusTreeError::EndOfSequence));
    /// ```
    pub fn position_search(&self, key: &K) -> KeyResult<Cursor<'_, K, V, C>> {
        let mut cursor = Cursor::new(self);
        cursor.position_search(key)?;
        Ok(cursor)
    }
}

// ============================================================================
// ITERATOR IMPLEMENTATIONS
// ============================================================================

impl<'a, K, V, C> Iterator for ItemIterator<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.cursor.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V, C> Iterator for KeyIterator<'a, K, V, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(k, _)| k)
    }
}

impl<'a, K, V, C> Iterator for ValueIterator<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(_, v)| v)
    }
}

impl<'a, K, V, C> IntoIterator for &'a BPlusTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = ItemIterator<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.items()
    }
}
