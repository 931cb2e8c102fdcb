//! Descent record for a single insert.
//!
//! Every level visited on the way down pushes the slot index it followed, so
//! split propagation can pop its way back up and learn where each promoted
//! separator belongs in its parent.

use tracing::warn;

/// Per-operation stack of descent indices, root first.
#[derive(Debug, Clone)]
pub(crate) struct PathStack {
    entries: Vec<usize>,
    depth_hint: usize,
    overflow_reported: bool,
}

impl PathStack {
    /// Creates a stack sized for trees of at most `depth_hint` levels.
    pub fn new(depth_hint: usize) -> Self {
        let depth_hint = depth_hint.max(1);
        Self {
            entries: Vec::with_capacity(depth_hint),
            depth_hint,
            overflow_reported: false,
        }
    }

    /// Record the index taken at the next level down.
    ///
    /// The stack grows past its hint rather than failing, but the first
    /// overflow during an operation is logged since it means the tree is
    /// taller than the capacity it was sized for.
    #[inline]
    pub fn push(&mut self, index: usize) {
        if self.entries.len() == self.depth_hint && !self.overflow_reported {
            warn!(
                depth_hint = self.depth_hint,
                "descent deeper than path stack hint; tree exceeds its expected capacity"
            );
            self.overflow_reported = true;
        }
        self.entries.push(index);
    }

    /// Index recorded at the deepest level not yet popped.
    #[inline]
    pub fn pop(&mut self) -> Option<usize> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.overflow_reported = false;
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn depth_hint(&self) -> usize {
        self.depth_hint
    }
}
