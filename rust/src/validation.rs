//! Validation and debugging utilities for BPlusTree.
//!
//! These walk the whole structure and are meant for tests and debugging, not
//! for hot paths.

use std::cmp::Ordering;

use crate::arena::NodeId;
use crate::comparator::Comparator;
use crate::error::{BPlusTreeError, BTreeResult, BTreeResultExt};
use crate::types::BPlusTree;

/// Summary of a left-to-right walk over the leaf chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainReport {
    /// Keys seen, in chain order.
    pub total: usize,
    /// Keys strictly greater than their predecessor (the first key counts).
    pub ascending: usize,
    /// Distinct keys seen.
    pub distinct: usize,
    /// Leaves visited.
    pub leaves: usize,
}

impl ChainReport {
    /// True when the chain is strictly ascending, i.e. sorted without duplicates.
    pub fn is_sorted(&self) -> bool {
        self.ascending == self.total && self.distinct == self.total
    }
}

/// Key bounds a subtree must respect: `lower <= key < upper`.
struct Bounds<'a, K> {
    lower: Option<&'a K>,
    upper: Option<&'a K>,
}

impl<K, V, C: Comparator<K>> BPlusTree<K, V, C> {
    // ============================================================================
    // VALIDATION METHODS
    // ============================================================================

    /// Check every structural invariant of the tree.
    ///
    /// Verifies the occupancy bound, ordering within nodes, separator bounds
    /// between levels, uniform leaf depth, parent back-references, symmetric
    /// sibling links and that the leaf chain holds exactly `len()` keys.
    pub fn check_invariants(&self) -> BTreeResult<()> {
        let root = match self.root {
            Some(root) => root,
            None if self.len == 0 => return Ok(()),
            None => {
                return Err(BPlusTreeError::data_integrity(
                    "Root",
                    &format!("no root but {} keys recorded", self.len),
                ))
            }
        };

        let mut leaves = Vec::new();
        let mut leaf_depth = None;
        let bounds = Bounds {
            lower: None,
            upper: None,
        };
        self.check_node(root, None, bounds, 1, &mut leaf_depth, &mut leaves)
            .with_context("Tree structure")?;

        let reachable = self.count_reachable(root);
        if reachable != self.arena.len() {
            return Err(BPlusTreeError::data_integrity(
                "Arena",
                &format!("{} nodes reachable, {} allocated", reachable, self.arena.len()),
            ));
        }

        self.check_sibling_links().with_context("Sibling links")?;
        self.check_leaf_chain(&leaves).with_context("Leaf chain")
    }

    /// Returns true if all invariants are satisfied.
    pub fn is_valid(&self) -> bool {
        self.check_invariants().is_ok()
    }

    /// Walk the leaf chain left to right and count what it holds.
    pub fn leaf_chain_report(&self) -> ChainReport {
        let mut report = ChainReport {
            total: 0,
            ascending: 0,
            distinct: 0,
            leaves: 0,
        };
        let mut keys: Vec<&K> = Vec::with_capacity(self.len);
        let mut current = self.first_leaf();

        while let Some(id) = current {
            let Some(node) = self.arena.get(id) else {
                break;
            };
            report.leaves += 1;
            for slot in node.slots() {
                let ascending = keys
                    .last()
                    .map_or(true, |prev| self.comparator.less(*prev, slot.key()));
                if ascending {
                    report.ascending += 1;
                }
                keys.push(slot.key());
            }
            current = node.right_sibling();
        }

        report.total = keys.len();
        keys.sort_by(|a, b| self.comparator.compare(*a, *b));
        keys.dedup_by(|a, b| self.comparator.equal(*a, *b));
        report.distinct = keys.len();
        report
    }

    /// Keys in leaf-chain order walked from the rightmost leaf leftwards.
    pub fn keys_right_to_left(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len);
        let mut current = self.last_leaf();
        while let Some(node) = current.and_then(|id| self.arena.get(id)) {
            keys.extend(node.slots().iter().rev().map(|slot| slot.key()));
            current = node.left_sibling();
        }
        keys
    }

    // ============================================================================
    // VALIDATION HELPERS
    // ============================================================================

    fn check_node<'a>(
        &'a self,
        id: NodeId,
        parent: Option<NodeId>,
        bounds: Bounds<'a, K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        leaves: &mut Vec<NodeId>,
    ) -> BTreeResult<()> {
        let node = self.arena.try_get(id)?;

        if node.parent() != parent {
            return Err(BPlusTreeError::corrupted_tree(
                "Parent link",
                &format!("{} points at {:?}, expected {:?}", id, node.parent(), parent),
            ));
        }
        if node.len() >= self.degree {
            return Err(BPlusTreeError::corrupted_tree(
                "Occupancy",
                &format!("{} holds {} slots with degree {}", id, node.len(), self.degree),
            ));
        }

        for (index, slot) in node.slots().iter().enumerate() {
            if index > 0 && !self.comparator.less(node.slots()[index - 1].key(), slot.key()) {
                return Err(BPlusTreeError::corrupted_tree(
                    "Ordering",
                    &format!("{} slot {} is not above its predecessor", id, index),
                ));
            }
            let below_lower = bounds
                .lower
                .map_or(false, |lower| self.comparator.less(slot.key(), lower));
            let above_upper = bounds.upper.map_or(false, |upper| {
                self.comparator.compare(slot.key(), upper) != Ordering::Less
            });
            if below_lower || above_upper {
                return Err(BPlusTreeError::corrupted_tree(
                    "Separator bounds",
                    &format!("{} slot {} escapes its parent's range", id, index),
                ));
            }
        }

        if node.is_leaf() {
            if node.slots().iter().any(|slot| slot.child().is_some() || slot.value().is_none()) {
                return Err(BPlusTreeError::corrupted_tree(
                    "Leaf",
                    &format!("{} mixes leaf and branch slots", id),
                ));
            }
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(BPlusTreeError::corrupted_tree(
                        "Balance",
                        &format!("{} is a leaf at depth {}, expected {}", id, depth, expected),
                    ))
                }
                Some(_) => {}
            }
            leaves.push(id);
            return Ok(());
        }

        let mut lower = bounds.lower;
        for index in 0..=node.len() {
            let child = node.child(index).ok_or_else(|| {
                BPlusTreeError::corrupted_tree(
                    "Branch",
                    &format!("{} has no child at {}", id, index),
                )
            })?;
            let upper = node.slot(index).map(|slot| slot.key()).or(bounds.upper);
            self.check_node(
                child,
                Some(id),
                Bounds { lower, upper },
                depth + 1,
                leaf_depth,
                leaves,
            )?;
            if let Some(slot) = node.slot(index) {
                lower = Some(slot.key());
            }
        }
        Ok(())
    }

    fn count_reachable(&self, id: NodeId) -> usize {
        self.arena
            .get(id)
            .map(|node| 1 + node.children().map(|child| self.count_reachable(child)).sum::<usize>())
            .unwrap_or(0)
    }

    fn check_sibling_links(&self) -> BTreeResult<()> {
        for (id, node) in self.arena.iter() {
            if let Some(right) = node.right_sibling() {
                if self.arena.try_get(right)?.left_sibling() != Some(id) {
                    return Err(BPlusTreeError::corrupted_tree(
                        "Sibling",
                        &format!("{} -> {} is not mirrored", id, right),
                    ));
                }
            }
            if let Some(left) = node.left_sibling() {
                if self.arena.try_get(left)?.right_sibling() != Some(id) {
                    return Err(BPlusTreeError::corrupted_tree(
                        "Sibling",
                        &format!("{} <- {} is not mirrored", left, id),
                    ));
                }
            }
        }
        Ok(())
    }

    /// The chain must visit exactly the leaves found by descent, in order.
    fn check_leaf_chain(&self, leaves: &[NodeId]) -> BTreeResult<()> {
        let mut chain = Vec::with_capacity(leaves.len());
        let mut current = self.first_leaf();
        while let Some(id) = current {
            if chain.len() > leaves.len() {
                return Err(BPlusTreeError::corrupted_tree(
                    "Linked list",
                    "chain is longer than the leaf level",
                ));
            }
            chain.push(id);
            current = self.arena.try_get(id)?.right_sibling();
        }
        if chain != leaves {
            return Err(BPlusTreeError::corrupted_tree(
                "Linked list",
                &format!("tree has {:?}, linked list has {:?}", leaves, chain),
            ));
        }

        let report = self.leaf_chain_report();
        if !report.is_sorted() || report.total != self.len {
            return Err(BPlusTreeError::data_integrity(
                "Leaf chain",
                &format!("{:?} for {} recorded keys", report, self.len),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::ByteOrder;

    #[test]
    fn empty_tree_is_valid() {
        let tree = BPlusTree::<i32, i32>::new(10, 3).unwrap();
        assert!(tree.is_valid());
        assert_eq!(tree.leaf_chain_report().total, 0);
        assert!(tree.keys_right_to_left().is_empty());
    }

    #[test]
    fn report_counts_chain_contents() {
        let mut tree = BPlusTree::new(100, 4).unwrap();
        for key in [5, 1, 9, 3, 7, 1, 5, 11, 13, 2] {
            tree.insert(key, ());
        }
        let report = tree.leaf_chain_report();
        assert_eq!(report.total, 8);
        assert_eq!(report.ascending, 8);
        assert_eq!(report.distinct, 8);
        assert!(report.leaves > 1);
        assert!(report.is_sorted());
    }

    #[test]
    fn right_to_left_walk_is_descending() {
        let mut tree = BPlusTree::new(100, 3).unwrap();
        for key in 0..50 {
            tree.insert((key * 7) % 50, key);
        }
        let keys: Vec<i32> = tree.keys_right_to_left().into_iter().copied().collect();
        assert_eq!(keys, (0..50).rev().collect::<Vec<_>>());
    }

    #[test]
    fn detects_broken_sibling_link() {
        let mut tree = BPlusTree::new(100, 4).unwrap();
        for key in 0..20 {
            tree.insert(key, key);
        }
        tree.check_invariants().unwrap();

        let first = tree.first_leaf().unwrap();
        tree.arena.get_mut(first).unwrap().right = None;
        assert!(matches!(
            tree.check_invariants(),
            Err(BPlusTreeError::CorruptedTree(_))
        ));
    }

    #[test]
    fn detects_misordered_slots() {
        let mut tree = BPlusTree::new(100, 8).unwrap();
        for key in [1, 2, 3] {
            tree.insert(key, key);
        }
        let root = tree.root.unwrap();
        tree.arena.get_mut(root).unwrap().slots.swap(0, 2);
        assert!(!tree.is_valid());
    }

    #[test]
    fn byte_trees_validate() {
        let mut tree = BPlusTree::new_bytes(100, 4).unwrap();
        for word in ["pear", "apple", "fig", "banana", "kiwi", "cherry", "date"] {
            tree.insert(word.as_bytes().to_vec(), word.len());
        }
        tree.check_invariants().unwrap();
        let _: &ByteOrder = tree.comparator();
    }
}
