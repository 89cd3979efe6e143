//! Staging area (index)
//!
//! The index records which files go into the next commit, with enough stat
//! metadata for fast change detection. On disk it is a single binary file
//! (see `artifacts::index` for the entry layout).
//!
//! ## In-memory shape
//!
//! - `entries`: staged files keyed by their repo-relative POSIX path string,
//!   so iteration is byte-wise ascending exactly as the file format requires
//! - `children`: directory path -> staged descendants, for the
//!   file/directory conflict eviction that `add` performs
//!
//! The index is always read in full, mutated in memory, and rewritten
//! wholesale; readers never observe a partially-written file.

use crate::artifacts::index::index_entry::{
    ENTRY_BLOCK, ENTRY_MIN_SIZE, EntryMetadata, IndexEntry,
};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::Packable;
use anyhow::anyhow;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    /// Staged files keyed by POSIX path, byte-wise ascending
    entries: BTreeMap<String, IndexEntry>,
    /// Directory hierarchy for conflict eviction
    children: BTreeMap<String, BTreeSet<String>>,
    /// Index file header metadata
    header: IndexHeader,
    /// Whether the in-memory state diverged from disk
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            header: IndexHeader::new(String::from(SIGNATURE), VERSION, 0),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        path.to_str().and_then(|key| self.entries.get(key))
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_directly_tracked(&self, path: &Path) -> bool {
        path.to_str()
            .map(|key| self.entries.contains_key(key) || self.children.contains_key(key))
            .unwrap_or(false)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.header = IndexHeader::empty();
        self.changed = false;
    }

    /// Load the index from disk.
    ///
    /// The whole file is read under a shared lock and parsed in memory. A
    /// missing or empty file yields an empty index; anything else must parse
    /// completely or the index is considered corrupt.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        if !self.path().exists() {
            self.clear();
            // create the index file
            std::fs::File::create(self.path())?;
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        self.clear();

        let mut bytes = Vec::new();
        lock.deref_mut().read_to_end(&mut bytes)?;

        if bytes.is_empty() {
            return Ok(());
        }

        self.load_from_bytes(&Bytes::from(bytes))
    }

    /// Parse a serialized index wholesale.
    pub fn load_from_bytes(&mut self, bytes: &Bytes) -> anyhow::Result<()> {
        self.clear();

        if bytes.len() < HEADER_SIZE {
            return Err(anyhow!("Unexpected end-of-file while reading index"));
        }
        let header = IndexHeader::parse(&bytes[..HEADER_SIZE])?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("Invalid index file signature"));
        }
        if header.version != VERSION {
            return Err(anyhow!(
                "Unsupported index file version: {}",
                header.version
            ));
        }

        let mut offset = HEADER_SIZE;
        for _ in 0..header.entries_count {
            let entry_end = Self::entry_boundary(bytes, offset)?;
            let entry = IndexEntry::parse(&bytes[offset..entry_end])?;
            self.store_entry(&entry)?;
            offset = entry_end;
        }

        self.header.entries_count = header.entries_count;

        Ok(())
    }

    /// Find the end of the entry starting at `offset`.
    ///
    /// Entries occupy at least `ENTRY_MIN_SIZE` bytes and extend in
    /// `ENTRY_BLOCK` increments until the block ends in a NUL (the path
    /// terminator or its padding). Running out of bytes means the index is
    /// truncated.
    fn entry_boundary(bytes: &Bytes, offset: usize) -> anyhow::Result<usize> {
        let mut end = offset + ENTRY_MIN_SIZE;
        loop {
            if end > bytes.len() {
                return Err(anyhow!("Unexpected end-of-file while reading index"));
            }
            if bytes[end - 1] == 0 {
                return Ok(end);
            }
            end += ENTRY_BLOCK;
        }
    }

    /// Serialize the whole index: header, then entries in key order.
    pub fn to_bytes(&self) -> anyhow::Result<Bytes> {
        let header = IndexHeader {
            entries_count: self.entries.len() as u32,
            ..self.header.clone()
        };

        let mut bytes = Vec::new();
        bytes.write_all(&header.serialize()?)?;
        for entry in self.entries.values() {
            bytes.write_all(&entry.serialize()?)?;
        }

        Ok(Bytes::from(bytes))
    }

    /// Rewrite the index file wholesale under an exclusive lock.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let bytes = self.to_bytes()?;

        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        lock.deref_mut().write_all(&bytes)?;

        self.header.entries_count = self.entries.len() as u32;
        self.changed = false;

        Ok(())
    }

    pub fn add(&mut self, entry: IndexEntry) -> anyhow::Result<()> {
        Self::validate_entry_path(&entry.name)?;

        self.discard_conflicts(&entry)?;
        self.store_entry(&entry)?;

        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;

        Ok(())
    }

    pub fn remove(&mut self, path: PathBuf) -> anyhow::Result<()> {
        let key = Self::path_key(&path)?;
        self.remove_entry(&key);
        self.remove_children(&key);

        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;

        Ok(())
    }

    /// Staged paths are repo-relative POSIX paths: never absolute, never
    /// containing `.` or `..` segments.
    fn validate_entry_path(path: &Path) -> anyhow::Result<()> {
        if path.as_os_str().is_empty() {
            return Err(anyhow!("Empty index entry path"));
        }

        for component in path.components() {
            match component {
                Component::Normal(_) => {}
                _ => {
                    return Err(anyhow!(
                        "Invalid index entry path {:?}: must be repo-relative without '.' or '..'",
                        path
                    ));
                }
            }
        }

        Ok(())
    }

    fn path_key(path: &Path) -> anyhow::Result<String> {
        path.to_str()
            .map(String::from)
            .ok_or_else(|| anyhow!("Invalid index entry path {:?}", path))
    }

    fn parent_keys(key: &str) -> Vec<String> {
        let mut parents = Vec::new();
        for (i, _) in key.match_indices('/') {
            parents.push(key[..i].to_string());
        }
        parents
    }

    /// Remove entries that cannot coexist with the new one: any ancestor
    /// staged as a file, and any staged descendants if the new entry
    /// replaces a directory.
    fn discard_conflicts(&mut self, entry: &IndexEntry) -> anyhow::Result<()> {
        let key = Self::path_key(&entry.name)?;

        for parent in Self::parent_keys(&key) {
            self.remove_entry(&parent);
        }
        self.remove_children(&key);

        Ok(())
    }

    fn store_entry(&mut self, entry: &IndexEntry) -> anyhow::Result<()> {
        let key = Self::path_key(&entry.name)?;

        for parent in Self::parent_keys(&key) {
            self.children
                .entry(parent)
                .or_default()
                .insert(key.clone());
        }
        self.entries.insert(key, entry.clone());

        Ok(())
    }

    fn remove_children(&mut self, key: &str) {
        if let Some(children) = self.children.remove(key) {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    fn remove_entry(&mut self, key: &str) {
        if self.entries.remove(key).is_none() {
            return;
        }

        for parent in Self::parent_keys(key) {
            if let Some(children) = self.children.get_mut(&parent) {
                children.remove(key);
                if children.is_empty() {
                    self.children.remove(&parent);
                }
            }
        }
    }

    pub fn update_entry_stat(&mut self, entry: &IndexEntry, stat: EntryMetadata) {
        if let Some(key) = entry.name.to_str()
            && let Some(existing_entry) = self.entries.get_mut(key)
        {
            existing_entry.metadata = stat;
            self.changed = true;
        }
    }
}
