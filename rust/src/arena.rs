//! Append-only, epoch-tagged arena that owns every node of a tree.
//!
//! Nodes never move and are never freed individually. The only way storage is
//! reclaimed is [`Arena::reset`], which truncates the arena and advances its
//! epoch. Every [`NodeId`] carries the epoch it was allocated in, so an id that
//! survived a reset is detected instead of silently aliasing a newer node.

use std::fmt;

use crate::error::{BPlusTreeError, BTreeResult};

/// Index of a node in the arena, tagged with the arena epoch it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    epoch: u32,
}

impl NodeId {
    /// Position of the node in arena storage.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Arena epoch the node was allocated in.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}@{}", self.index, self.epoch)
    }
}

/// Statistics for an arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaStats {
    pub total_capacity: usize,
    pub allocated_count: usize,
    pub epoch: u32,
    pub utilization: f64,
}

/// Append-only arena addressed by epoch-tagged indices.
#[derive(Debug)]
pub(crate) struct Arena<T> {
    storage: Vec<T>,
    epoch: u32,
}

impl<T> Arena<T> {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            epoch: 0,
        }
    }

    /// Create a new arena with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Vec::with_capacity(capacity),
            epoch: 0,
        }
    }

    /// Append `item` and return its id.
    ///
    /// # Panics
    /// If the arena already holds `u32::MAX` items.
    #[inline]
    pub fn allocate(&mut self, item: T) -> NodeId {
        let index = match u32::try_from(self.storage.len()) {
            Ok(index) if index < u32::MAX => index,
            _ => panic!("arena is at maximum capacity ({})", u32::MAX),
        };
        self.storage.push(item);
        NodeId {
            index,
            epoch: self.epoch,
        }
    }

    /// Get a reference to an item in the arena
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        if id.epoch != self.epoch {
            return None;
        }
        self.storage.get(id.index())
    }

    /// Get a mutable reference to an item in the arena
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        if id.epoch != self.epoch {
            return None;
        }
        self.storage.get_mut(id.index())
    }

    /// Like [`get`](Self::get), but a dead id becomes a `StaleNode` error.
    #[inline]
    pub fn try_get(&self, id: NodeId) -> BTreeResult<&T> {
        let epoch = self.epoch;
        self.get(id).ok_or_else(|| BPlusTreeError::stale_node(id, epoch))
    }

    /// Like [`get_mut`](Self::get_mut), but a dead id becomes a `StaleNode` error.
    #[inline]
    pub fn try_get_mut(&mut self, id: NodeId) -> BTreeResult<&mut T> {
        let epoch = self.epoch;
        self.get_mut(id).ok_or_else(|| BPlusTreeError::stale_node(id, epoch))
    }

    /// Drop every item and start a new epoch. Returns the number of items dropped.
    ///
    /// # Panics
    /// If the arena has already used its last epoch. Wrapping around would let
    /// ids from epoch 0 alias live nodes again.
    pub fn reset(&mut self) -> usize {
        let next_epoch = match self.epoch.checked_add(1) {
            Some(epoch) => epoch,
            None => panic!("arena epochs exhausted after {} resets", u32::MAX),
        };
        let dropped = self.storage.len();
        self.storage.clear();
        self.epoch = next_epoch;
        dropped
    }

    /// Current epoch
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Get the number of allocated items
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Get arena statistics
    pub fn stats(&self) -> ArenaStats {
        let total_capacity = self.storage.capacity();
        let allocated_count = self.storage.len();
        let utilization = if total_capacity > 0 {
            allocated_count as f64 / total_capacity as f64
        } else {
            0.0
        };

        ArenaStats {
            total_capacity,
            allocated_count,
            epoch: self.epoch,
            utilization,
        }
    }

    /// Iterate over live items together with their ids, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        let epoch = self.epoch;
        self.storage.iter().enumerate().map(move |(index, item)| {
            (
                NodeId {
                    index: index as u32,
                    epoch,
                },
                item,
            )
        })
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_basic_operations() {
        let mut arena = Arena::new();

        let id1 = arena.allocate(42);
        let id2 = arena.allocate(84);
        let id3 = arena.allocate(126);

        assert_eq!(arena.get(id1), Some(&42));
        assert_eq!(arena.get(id2), Some(&84));
        assert_eq!(arena.get(id3), Some(&126));
        assert_eq!(id3.index(), 2);

        assert_eq!(arena.len(), 3);
        let stats = arena.stats();
        assert_eq!(stats.allocated_count, 3);
        assert_eq!(stats.epoch, 0);
    }

    #[test]
    fn test_reset_invalidates_old_ids() {
        let mut arena = Arena::with_capacity(4);
        let old = arena.allocate("old");

        assert_eq!(arena.reset(), 1);
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.epoch(), 1);
        assert_eq!(arena.get(old), None);

        // The new node reuses index 0 but lives in a different epoch.
        let new = arena.allocate("new");
        assert_eq!(new.index(), old.index());
        assert_ne!(new, old);
        assert_eq!(arena.get(old), None);
        assert_eq!(arena.get(new), Some(&"new"));
        assert!(matches!(arena.try_get(old), Err(BPlusTreeError::StaleNode(_))));
    }

    #[test]
    fn test_mutable_access() {
        let mut arena = Arena::new();
        let id = arena.allocate(42);
        *arena.try_get_mut(id).unwrap() = 84;
        assert_eq!(arena.get(id), Some(&84));
        let live: Vec<(usize, i32)> = arena.iter().map(|(id, v)| (id.index(), *v)).collect();
        assert_eq!(live, vec![(0, 84)]);
    }

    #[test]
    fn test_last_epoch_still_detects_stale_ids() {
        let mut arena = Arena::new();
        arena.epoch = u32::MAX - 1;
        let old = arena.allocate(1);

        arena.reset();
        assert_eq!(arena.epoch(), u32::MAX);
        assert_eq!(arena.get(old), None);
        let live = arena.allocate(2);
        assert_eq!(arena.get(live), Some(&2));
    }

    #[test]
    #[should_panic(expected = "arena epochs exhausted")]
    fn test_reset_refuses_to_wrap_epoch() {
        let mut arena: Arena<u8> = Arena::new();
        arena.epoch = u32::MAX;
        arena.reset();
    }
}
