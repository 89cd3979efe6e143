//! Diff algorithms
//!
//! Line-by-line comparison via Myers' shortest-edit-script algorithm.
//! Tree-level comparison (which files changed) is handled by the flat tree
//! walker plus a sorted merge-join in the diff command; this module only
//! answers what changed within a file.

pub mod diff_target;
pub mod myers;
