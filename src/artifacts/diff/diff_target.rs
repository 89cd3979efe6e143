//! Diff sources
//!
//! A `DiffTarget` is one side of a file comparison: a staged blob, a stored
//! tree entry, a working-tree file, or nothing (for added/deleted files).
//! Each carries the oid, mode, and content lines the diff printer needs.

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::trees::database_entry::DatabaseEntry;
use std::path::{Path, PathBuf};

pub struct DiffTarget {
    pub file: PathBuf,
    pub oid: Option<ObjectId>,
    pub mode: Option<EntryMode>,
    pub lines: Vec<String>,
}

impl DiffTarget {
    /// The staged version of a file, content loaded from the database.
    pub fn from_index(entry: &IndexEntry, database: &Database) -> anyhow::Result<Self> {
        let blob = database
            .parse_object_as_blob(&entry.oid)?
            .ok_or_else(|| anyhow::anyhow!("staged object {} is not a blob", entry.oid))?;

        Ok(DiffTarget {
            file: entry.name.clone(),
            oid: Some(entry.oid.clone()),
            mode: Some(entry.metadata.mode),
            lines: Self::split_lines(&blob.display()),
        })
    }

    /// A committed tree entry, content loaded from the database.
    pub fn from_head(
        path: &str,
        entry: &DatabaseEntry,
        database: &Database,
    ) -> anyhow::Result<Self> {
        let blob = database
            .parse_object_as_blob(&entry.oid)?
            .ok_or_else(|| anyhow::anyhow!("tree entry {} is not a blob", entry.oid))?;

        Ok(DiffTarget {
            file: PathBuf::from(path),
            oid: Some(entry.oid.clone()),
            mode: Some(entry.mode),
            lines: Self::split_lines(&blob.display()),
        })
    }

    /// The working-tree version of a file.
    pub fn from_file(path: &Path, workspace: &Workspace) -> anyhow::Result<Self> {
        let blob = workspace.parse_blob(path)?;
        let stat = workspace.stat_file(path)?;

        Ok(DiffTarget {
            file: path.to_path_buf(),
            oid: Some(blob.object_id()?),
            mode: Some(stat.mode),
            lines: Self::split_lines(&blob.display()),
        })
    }

    /// The absent side of an added or deleted file.
    pub fn from_nothing(path: &Path) -> Self {
        DiffTarget {
            file: path.to_path_buf(),
            oid: None,
            mode: None,
            lines: Vec::new(),
        }
    }

    pub fn short_oid(&self) -> String {
        self.oid
            .as_ref()
            .unwrap_or(&ObjectId::zero())
            .to_short_oid()
    }

    fn split_lines(content: &str) -> Vec<String> {
        content.lines().map(String::from).collect()
    }
}
