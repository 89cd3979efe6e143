//! Git tree object
//!
//! Trees represent directory snapshots. They list child entries (files and
//! subdirectories) with their names, modes, and object IDs.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>` with the mode in octal and no
//! leading zero for directories.
//!
//! Trees are read here; they are written by the segment tree builder, which
//! assembles `Tree` values bottom-up from the index.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::trees::database_entry::DatabaseEntry;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Git tree object representing a directory snapshot
///
/// Entries are kept name-sorted; the builder keys subdirectories with a
/// trailing `/` so siblings order the way git orders them, and the slash is
/// stripped on serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    entries: BTreeMap<String, DatabaseEntry>,
}

impl Tree {
    pub fn new(entries: BTreeMap<String, DatabaseEntry>) -> Self {
        Tree { entries }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &DatabaseEntry)> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, DatabaseEntry)> {
        self.entries.into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();

        for (name, entry) in &self.entries {
            let name = name.trim_end_matches('/'); // Remove trailing '/' for directories

            let header = format!("{:o} {}", entry.mode.as_u32(), name);
            content_bytes.write_all(header.as_bytes())?;
            content_bytes.push(0);
            entry.oid.write_h40_to(&mut content_bytes)?;
        }

        let mut tree_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();
        let mut reader = reader;

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            // Read "mode " (space-delimited)
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if *mode_bytes.last().unwrap() != b' ' {
                return Err(anyhow::anyhow!("unexpected EOF in mode"));
            }
            mode_bytes.pop(); // drop the space

            let mode_str = std::str::from_utf8(&mode_bytes)?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            // Read "name\0"
            name_bytes.clear();
            let n = reader.read_until(b'\0', &mut name_bytes)?;
            if n == 0 || *name_bytes.last().unwrap() != b'\0' {
                return Err(anyhow::anyhow!("unexpected EOF in name"));
            }
            name_bytes.pop(); // drop NUL
            let name = std::str::from_utf8(&name_bytes)?.to_owned();

            let oid =
                ObjectId::read_h40_from(&mut reader).context("unexpected EOF in object id")?;

            entries.insert(name, DatabaseEntry::new(oid, mode));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|(name, entry)| {
                let name = name.trim_end_matches('/');
                let object_type = if entry.is_tree() {
                    ObjectType::Tree
                } else {
                    ObjectType::Blob
                };

                format!(
                    "{} {} {}\t{}",
                    entry.mode.as_str(),
                    object_type.as_str(),
                    entry.oid.as_ref(),
                    name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
