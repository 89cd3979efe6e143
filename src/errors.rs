//! Typed error kinds for the storage engine
//!
//! Most fallible paths propagate `anyhow::Error` with context, following the
//! convention used throughout the crate. The kinds below exist where callers
//! need to match on the failure: expected absence vs corrupt data vs
//! conflicting state. They implement `std::error::Error`, so they flow
//! through `?` into `anyhow::Result` and remain reachable via `downcast_ref`.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while decoding or locating objects in the database.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// The sharded object path does not exist.
    #[error("object {0} not found in database")]
    NotFound(ObjectId),

    /// The object header could not be decoded (missing NUL separator,
    /// missing or non-numeric length field).
    #[error("malformed object: {0}")]
    Malformed(String),

    /// The header's type token is not blob, tree, or commit.
    #[error("unknown object type '{0}'")]
    UnknownType(String),
}

/// Conflicting-state failures on reference files.
///
/// Kept distinct so callers can implement safe-update semantics: `create`
/// refuses to clobber, `update` refuses to invent.
#[derive(Debug, Error)]
pub enum RefError {
    #[error("reference '{0}' already exists")]
    AlreadyExists(String),

    #[error("reference '{0}' not found")]
    NotFound(String),
}

/// Precondition violations while building tree objects from the index.
#[derive(Debug, Error)]
pub enum TreeBuildError {
    /// An index entry references an object that is not in the database.
    #[error("invalid object {mode} {oid} for '{}'", .path.display())]
    InvalidObject {
        mode: String,
        oid: ObjectId,
        path: PathBuf,
    },
}
