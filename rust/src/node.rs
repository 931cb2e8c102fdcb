//! Node implementation for BPlusTree.
//!
//! A node is an ordered run of [`Slot`]s plus one trailing child reference
//! (the spare slot). Slot `i` points at the subtree holding keys strictly less
//! than its own key; the trailing reference points at the subtree holding keys
//! greater than or equal to the last key. Leaves carry values in their slots
//! and no child references at all.

use crate::arena::{Arena, NodeId};
use crate::comparator::Comparator;
use crate::error::{BPlusTreeError, BTreeResult};
use crate::types::{Node, Slot, SplitKind, MAX_PREALLOCATED_SLOTS};

// ============================================================================
// SLOT
// ============================================================================

impl<K, V> Slot<K, V> {
    /// A leaf slot holding `value`.
    pub(crate) fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value: Some(value),
            child: None,
        }
    }

    /// A separator slot bounding `child` from above.
    pub(crate) fn separator(key: K, child: NodeId) -> Self {
        Self {
            key,
            value: None,
            child: Some(child),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// The payload; only leaf slots have one.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn child(&self) -> Option<NodeId> {
        self.child
    }
}

// ============================================================================
// NODE
// ============================================================================

impl<K, V> Node<K, V> {
    /// Creates an empty node able to hold `degree` slots plus the spare.
    pub(crate) fn new(degree: usize) -> Self {
        let reserved = degree.saturating_add(1).min(MAX_PREALLOCATED_SLOTS);
        Self {
            slots: Vec::with_capacity(reserved),
            last_child: None,
            parent: None,
            left: None,
            right: None,
        }
    }

    // ============================================================================
    // ACCESSORS
    // ============================================================================

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// A node is a leaf iff it has no child references. Splits always give a
    /// branch its trailing child, so checking that one reference suffices.
    pub fn is_leaf(&self) -> bool {
        self.last_child.is_none()
    }

    pub fn slots(&self) -> &[Slot<K, V>] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&Slot<K, V>> {
        self.slots.get(index)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn left_sibling(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right_sibling(&self) -> Option<NodeId> {
        self.right
    }

    /// Child reference at `index`; `index == len()` reads the spare slot.
    pub fn child(&self, index: usize) -> Option<NodeId> {
        match self.slots.get(index) {
            Some(slot) => slot.child,
            None if index == self.slots.len() => self.last_child,
            None => None,
        }
    }

    /// All child references in key order, spare slot last.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.child)
            .chain(self.last_child)
    }

    pub(crate) fn set_child(&mut self, index: usize, child: NodeId) {
        match self.slots.get_mut(index) {
            Some(slot) => slot.child = Some(child),
            None => self.last_child = Some(child),
        }
    }

    // ============================================================================
    // SEARCH
    // ============================================================================

    /// Smallest index whose key is strictly greater than `key`, or `len()`.
    ///
    /// This is both the insertion point for `key` and the child to follow
    /// when descending. An equal key, if present, sits at `index - 1`.
    pub fn search<C: Comparator<K>>(&self, key: &K, cmp: &C) -> usize {
        self.slots
            .iter()
            .position(|slot| cmp.less(key, &slot.key))
            .unwrap_or(self.slots.len())
    }

    // ============================================================================
    // INSERT OPERATIONS
    // ============================================================================

    /// Shift slots `[index, len)` right by one and write `slot` at `index`.
    pub(crate) fn insert_at(&mut self, index: usize, slot: Slot<K, V>) {
        self.slots.insert(index, slot);
    }

    /// Fill a fresh node from a contiguous run of slots.
    ///
    /// A branch split hands over the run that followed the separator together
    /// with the old spare-slot child, which becomes this node's `tail`.
    pub(crate) fn append_range<I>(&mut self, slots: I, tail: Option<NodeId>)
    where
        I: IntoIterator<Item = Slot<K, V>>,
    {
        self.slots.extend(slots);
        self.last_child = tail;
    }

    // ============================================================================
    // SPLIT
    // ============================================================================

    /// Move everything from the separator at `at` onward into a new sibling.
    ///
    /// Returns the separator key to promote and the sibling, which shares this
    /// node's parent. A leaf keeps the separator in the sibling's first slot;
    /// a branch hands the separator's child to itself as the new spare-slot
    /// child and gives its old spare child to the sibling.
    pub(crate) fn split_off(
        &mut self,
        at: usize,
        kind: SplitKind,
        degree: usize,
    ) -> BTreeResult<(K, Node<K, V>)>
    where
        K: Clone,
    {
        if at >= self.slots.len() {
            return Err(BPlusTreeError::corrupted_tree(
                "Split",
                &format!("separator {} outside occupancy {}", at, self.slots.len()),
            ));
        }

        let moved = self.slots.split_off(at + kind.adjustment());
        let (separator, tail) = match kind {
            SplitKind::Leaf => {
                let separator = moved
                    .first()
                    .map(|slot| slot.key.clone())
                    .ok_or_else(|| BPlusTreeError::corrupted_tree("Leaf split", "no slots moved"))?;
                (separator, None)
            }
            SplitKind::Branch => {
                let promoted = self.slots.pop().ok_or_else(|| {
                    BPlusTreeError::corrupted_tree("Branch split", "missing separator slot")
                })?;
                let tail = self.last_child.take();
                self.last_child = promoted.child;
                (promoted.key, tail)
            }
        };

        let mut sibling = Node::new(degree);
        sibling.append_range(moved, tail);
        sibling.parent = self.parent;
        Ok((separator, sibling))
    }
}

/// Insert `new_right` into the sibling chain directly after `node`.
pub(crate) fn link_sibling<K, V>(
    arena: &mut Arena<Node<K, V>>,
    node: NodeId,
    new_right: NodeId,
) -> BTreeResult<()> {
    let old_right = arena.try_get(node)?.right;

    if let Some(old_right) = old_right {
        arena.try_get_mut(old_right)?.left = Some(new_right);
    }
    {
        let sibling = arena.try_get_mut(new_right)?;
        sibling.left = Some(node);
        sibling.right = old_right;
    }
    arena.try_get_mut(node)?.right = Some(new_right);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::ScalarOrder;

    fn leaf_of(keys: &[i32]) -> Node<i32, i32> {
        let mut node = Node::new(5);
        node.append_range(keys.iter().map(|&k| Slot::leaf(k, k * 10)), None);
        node
    }

    #[test]
    fn search_returns_first_strictly_greater_index() {
        let node = leaf_of(&[10, 20, 30]);
        assert_eq!(node.search(&5, &ScalarOrder), 0);
        assert_eq!(node.search(&10, &ScalarOrder), 1);
        assert_eq!(node.search(&25, &ScalarOrder), 2);
        assert_eq!(node.search(&30, &ScalarOrder), 3);
        assert_eq!(node.search(&99, &ScalarOrder), 3);
    }

    #[test]
    fn search_on_empty_node_is_zero() {
        let node: Node<i32, i32> = Node::new(4);
        assert_eq!(node.search(&1, &ScalarOrder), 0);
        assert!(node.is_leaf());
    }

    #[test]
    fn insert_at_shifts_right() {
        let mut node = leaf_of(&[10, 30]);
        node.insert_at(1, Slot::leaf(20, 200));
        let keys: Vec<i32> = node.slots().iter().map(|s| *s.key()).collect();
        assert_eq!(keys, vec![10, 20, 30]);
        assert_eq!(node.slot(1).and_then(Slot::value), Some(&200));
    }

    #[test]
    fn leaf_split_keeps_separator_on_the_right() {
        let mut node = leaf_of(&[104, 105, 106, 150, 185]);
        let (separator, sibling) = node.split_off(2, SplitKind::Leaf, 5).unwrap();

        assert_eq!(separator, 106);
        assert_eq!(node.len(), 2);
        let right: Vec<i32> = sibling.slots().iter().map(|s| *s.key()).collect();
        assert_eq!(right, vec![106, 150, 185]);
        assert!(sibling.is_leaf());
    }

    #[test]
    fn branch_split_drops_separator_and_moves_tail() {
        let ids: Vec<NodeId> = {
            let mut arena: Arena<()> = Arena::new();
            (0..6).map(|_| arena.allocate(())).collect()
        };
        let mut node: Node<i32, i32> = Node::new(5);
        node.append_range(
            [10, 20, 30, 40, 50]
                .iter()
                .zip(&ids)
                .map(|(&k, &id)| Slot::separator(k, id)),
            Some(ids[5]),
        );

        let (separator, sibling) = node.split_off(2, SplitKind::Branch, 5).unwrap();

        assert_eq!(separator, 30);
        assert_eq!(node.len(), 2);
        assert_eq!(node.child(2), Some(ids[2]));
        assert_eq!(sibling.len(), 2);
        assert_eq!(sibling.children().collect::<Vec<_>>(), vec![ids[3], ids[4], ids[5]]);
    }

    #[test]
    fn split_outside_occupancy_is_an_error() {
        let mut node = leaf_of(&[1]);
        assert!(node.split_off(3, SplitKind::Leaf, 5).is_err());
    }

    #[test]
    fn link_sibling_preserves_existing_right_neighbour() {
        let mut arena: Arena<Node<i32, i32>> = Arena::new();
        let a = arena.allocate(Node::new(4));
        let c = arena.allocate(Node::new(4));
        link_sibling(&mut arena, a, c).unwrap();

        let b = arena.allocate(Node::new(4));
        link_sibling(&mut arena, a, b).unwrap();

        assert_eq!(arena.get(a).unwrap().right_sibling(), Some(b));
        assert_eq!(arena.get(b).unwrap().left_sibling(), Some(a));
        assert_eq!(arena.get(b).unwrap().right_sibling(), Some(c));
        assert_eq!(arena.get(c).unwrap().left_sibling(), Some(b));
    }
}
