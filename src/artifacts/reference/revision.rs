//! Revision resolution
//!
//! A revision is any user-supplied string identifying a commit-ish. The
//! candidates are tried in a fixed order:
//!
//! 1. a literal 40-hex-character hash, which resolves to itself without
//!    consulting the reference store
//! 2. the literal token `HEAD`, following the symbolic/direct HEAD branch
//! 3. a well-formed ref path that exists (`refs/heads/main`, or a bare name
//!    tried as a local branch)
//!
//! A string matching none of these resolves to `None`; callers decide
//! whether that is fatal. Abbreviated hashes are not handled here - the
//! rev-parse command falls back to a database prefix search for those.

use crate::areas::refs::{HEAD_REF_NAME, Refs};
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::reference::reference::Reference;

/// A classified revision string, before any file system access
#[derive(Debug, Clone, PartialEq)]
pub enum Revision {
    /// A full 40-hex object ID
    Oid(ObjectId),
    /// The literal `HEAD` token
    Head,
    /// A candidate reference (typed path or bare local branch name)
    Ref(Reference),
    /// Nothing this resolver understands
    Unknown,
}

impl Revision {
    /// Classify a revision string without touching the repository.
    pub fn classify(revision: &str) -> Revision {
        if revision.len() == OBJECT_ID_LENGTH
            && let Ok(oid) = ObjectId::try_parse(revision.to_string())
        {
            // full hashes never reach the ref store
            return Revision::Oid(oid);
        }

        if revision == HEAD_REF_NAME {
            return Revision::Head;
        }

        if let Some(reference) = Reference::try_from_path(revision) {
            return Revision::Ref(reference);
        }

        if Reference::is_valid_name(revision) {
            return Revision::Ref(Reference::local(revision));
        }

        Revision::Unknown
    }

    /// Resolve a revision string against the reference store.
    ///
    /// Returns `Ok(None)` when the revision matches nothing - an unresolved
    /// revision is an expected outcome, not an error.
    pub fn resolve(revision: &str, refs: &Refs) -> anyhow::Result<Option<ObjectId>> {
        match Self::classify(revision) {
            Revision::Oid(oid) => Ok(Some(oid)),
            Revision::Head => refs.resolve_head(),
            Revision::Ref(reference) => {
                if refs.exists(&reference) {
                    Ok(Some(refs.resolve(&reference)?))
                } else {
                    Ok(None)
                }
            }
            Revision::Unknown => Ok(None),
        }
    }
}
