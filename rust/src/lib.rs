//! In-memory B+ tree index.
//!
//! An ordered map with upsert, point lookup and forward ordered scans over
//! the leaf chain. Nodes live in an epoch-tagged arena and refer to each
//! other by [`NodeId`], so parent and sibling back-references never own
//! anything. Keys are ordered by a pluggable [`Comparator`]: native order for
//! scalars ([`ScalarOrder`]) or lexicographic order for byte strings
//! ([`ByteOrder`]), over one shared engine.
//!
//! ```
//! use bplus_index::{BPlusTree, BPlusTreeError};
//!
//! let mut tree = BPlusTree::new(1_000, 5).unwrap();
//! for key in [104, 105, 106, 150, 185, 110] {
//!     tree.insert(key, key * 2);
//! }
//! assert!(tree.contains_key(&110));
//! assert_eq!(tree.keys().copied().collect::<Vec<_>>(), [104, 105, 106, 110, 150, 185]);
//!
//! let mut cursor = tree.position_search(&185).unwrap();
//! assert_eq!(cursor.current().unwrap(), (&185, &370));
//! assert_eq!(cursor.advance(), Err(BPlusTreeError::EndOfSequence));
//! ```

#[macro_use]
mod macros;

mod arena;
mod comparator;
mod construction;
mod error;
mod get_operations;
mod insert_operations;
mod iteration;
mod node;
mod path_stack;
mod types;
mod validation;

pub use arena::{ArenaStats, NodeId};
pub use comparator::{
    BoolTree, ByteOrder, ByteTree, CharTree, Comparator, F32Tree, F64Tree, I128Tree, I16Tree,
    I32Tree, I64Tree, I8Tree, IsizeTree, ScalarKey, ScalarOrder, StringTree, U128Tree, U16Tree,
    U32Tree, U64Tree, U8Tree, UsizeTree,
};
pub use construction::TreeConfig;
pub use error::{BPlusTreeError, BTreeResult, BTreeResultExt, InitResult, KeyResult, ModifyResult};
pub use iteration::{Cursor, ItemIterator, KeyIterator, ValueIterator};
pub use types::{
    BPlusTree, Node, Slot, DEFAULT_DEGREE, DEFAULT_EXPECTED_CAPACITY, MAX_PREALLOCATED_NODES,
    MIN_DEGREE,
};
pub use validation::ChainReport;
