//! Error handling and result types for BPlusTree operations.
//!
//! Errors fall into two groups. Boundary conditions (an empty tree, a cursor
//! that ran off the end of the leaf chain, a cursor that has not yet reached a
//! readable slot) are ordinary results a caller is expected to handle.
//! Everything else signals a broken contract: a bad degree, a stale node id
//! from before a [`reset`](crate::BPlusTree::reset), or a structural
//! inconsistency found by the validator.

use thiserror::Error;

use crate::arena::NodeId;

/// Error type for B+ tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BPlusTreeError {
    /// The tree holds no keys.
    #[error("tree is empty")]
    EmptyTree,
    /// The cursor was advanced past the last slot of the rightmost node.
    #[error("end of sequence")]
    EndOfSequence,
    /// The cursor sits at position 0 and has no slot to report yet.
    #[error("cursor has no current key")]
    NoCurrentKey,
    /// Invalid degree specified.
    #[error("invalid degree: {0}")]
    InvalidDegree(String),
    /// Invalid construction parameters other than the degree.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A node id that belongs to an earlier arena epoch or was never allocated.
    #[error("stale node reference: {0}")]
    StaleNode(String),
    /// Tree corruption detected.
    #[error("corrupted tree: {0}")]
    CorruptedTree(String),
    /// Internal data structure integrity violation.
    #[error("data integrity error: {0}")]
    DataIntegrityError(String),
}

impl BPlusTreeError {
    /// Create an InvalidDegree error with context
    pub fn invalid_degree(degree: usize, min_required: usize) -> Self {
        Self::InvalidDegree(format!(
            "degree {} is invalid (minimum required: {})",
            degree, min_required
        ))
    }

    /// Create an InvalidConfig error with context
    pub fn invalid_config(field: &str, details: &str) -> Self {
        Self::InvalidConfig(format!("{}: {}", field, details))
    }

    /// Create a StaleNode error for `id` observed against arena epoch `epoch`
    pub fn stale_node(id: NodeId, epoch: u32) -> Self {
        Self::StaleNode(format!("{} is not live in arena epoch {}", id, epoch))
    }

    /// Create a CorruptedTree error with context
    pub fn corrupted_tree(component: &str, details: &str) -> Self {
        Self::CorruptedTree(format!("{} corruption: {}", component, details))
    }

    /// Create a DataIntegrityError with context
    pub fn data_integrity(context: &str, details: &str) -> Self {
        Self::DataIntegrityError(format!("{}: {}", context, details))
    }

    /// True for expected, recoverable end-of-data conditions.
    pub fn is_boundary(&self) -> bool {
        matches!(
            self,
            Self::EmptyTree | Self::EndOfSequence | Self::NoCurrentKey
        )
    }

    /// Check if this error is a degree or configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidDegree(_) | Self::InvalidConfig(_))
    }
}

/// Public result type for tree operations that may fail
pub type BTreeResult<T> = Result<T, BPlusTreeError>;

/// Result type for key lookup and cursor operations
pub type KeyResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree modification operations
pub type ModifyResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree construction and validation
pub type InitResult<T> = Result<T, BPlusTreeError>;

/// Result extension trait for attaching context to errors
pub trait BTreeResultExt<T> {
    /// Prefix the error message with `context`
    fn with_context(self, context: &str) -> BTreeResult<T>;
}

impl<T> BTreeResultExt<T> for Result<T, BPlusTreeError> {
    fn with_context(self, context: &str) -> BTreeResult<T> {
        self.map_err(|e| match e {
            BPlusTreeError::InvalidDegree(msg) => {
                BPlusTreeError::InvalidDegree(format!("{}: {}", context, msg))
            }
            BPlusTreeError::InvalidConfig(msg) => BPlusTreeError::invalid_config(context, &msg),
            BPlusTreeError::StaleNode(msg) => {
                BPlusTreeError::StaleNode(format!("{}: {}", context, msg))
            }
            BPlusTreeError::CorruptedTree(msg) => BPlusTreeError::corrupted_tree(context, &msg),
            BPlusTreeError::DataIntegrityError(msg) => {
                BPlusTreeError::data_integrity(context, &msg)
            }
            boundary => boundary,
        })
    }
}
