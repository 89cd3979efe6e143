//! Tree construction and traversal
//!
//! Two complementary views of tree objects:
//!
//! - `segment_tree`: builds nested tree objects bottom-up from the flat,
//!   path-sorted index (used by commit/write-tree)
//! - `flat_tree`: flattens a stored tree back into a `path -> entry` map
//!   (used by diff-index and recursive ls-tree)
//! - `database_entry`: the (oid, mode) pair both views share

pub mod database_entry;
pub mod flat_tree;
pub mod segment_tree;
