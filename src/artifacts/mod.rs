//! Data structures and algorithms
//!
//! This module contains the core types and algorithms:
//!
//! - `diff`: Myers' shortest-edit-script diff
//! - `index`: Index/staging area binary format
//! - `objects`: Object types (blob, tree, commit)
//! - `reference`: Reference names and revision parsing
//! - `trees`: Segment tree builder and flat tree walker

pub mod diff;
pub mod index;
pub mod objects;
pub mod reference;
pub mod trees;
