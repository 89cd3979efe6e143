//! Reference naming and revision resolution
//!
//! - `reference`: typed ref names (branches, remotes, tags, notes, stash,
//!   replace, bisect) and their `refs/...` path mapping
//! - `revision`: user-supplied revision strings resolved to object IDs

pub mod reference;
pub mod revision;
