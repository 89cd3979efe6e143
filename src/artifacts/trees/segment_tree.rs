//! Segment tree builder
//!
//! Turns the flat, path-sorted index into nested tree objects. Each staged
//! path is split on `/` and threaded into a tagged-union node tree: files at
//! the leaves, owned subtrees at the directories. The structure is transient;
//! it exists only to drive bottom-up tree-object construction and is dropped
//! afterwards.
//!
//! Saving is post-order: a directory's subtree is stored first so its oid is
//! known when the parent's entry list is assembled.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::trees::database_entry::DatabaseEntry;
use crate::errors::TreeBuildError;
use anyhow::Context;
use std::collections::BTreeMap;

/// One segment of the staged namespace: a file or a subdirectory
#[derive(Debug, Clone)]
pub enum Node {
    File(IndexEntry),
    Dir(SegmentTree),
}

/// Nested map from path segment to file or subdirectory
///
/// Directory keys carry a trailing `/` so siblings iterate in the order git
/// serializes them; the slash is stripped when the tree object is written.
#[derive(Debug, Clone, Default)]
pub struct SegmentTree {
    nodes: BTreeMap<String, Node>,
}

impl SegmentTree {
    /// Build the segment tree for every staged entry.
    ///
    /// Every referenced object must already exist in the database; a missing
    /// one is a precondition violation, not a recoverable condition.
    pub fn build(index: &Index, database: &Database) -> anyhow::Result<Self> {
        let mut root = Self::default();

        for entry in index.entries() {
            if !database.exists(&entry.oid) {
                return Err(TreeBuildError::InvalidObject {
                    mode: entry.metadata.mode.as_str().to_string(),
                    oid: entry.oid.clone(),
                    path: entry.name.clone(),
                }
                .into());
            }

            let path = entry
                .name
                .to_str()
                .with_context(|| format!("Invalid entry path {:?}", entry.name))?;
            let segments = path.split('/').collect::<Vec<_>>();
            root.insert(&segments, entry.clone())?;
        }

        Ok(root)
    }

    fn insert(&mut self, segments: &[&str], entry: IndexEntry) -> anyhow::Result<()> {
        if segments.len() == 1 {
            self.nodes
                .insert(segments[0].to_string(), Node::File(entry));
            return Ok(());
        }

        let key = format!("{}/", segments[0]);
        let node = self
            .nodes
            .entry(key)
            .or_insert_with(|| Node::Dir(SegmentTree::default()));

        match node {
            Node::Dir(tree) => tree.insert(&segments[1..], entry),
            // index add() evicts file/directory conflicts before they reach
            // the builder
            Node::File(_) => Err(anyhow::anyhow!(
                "'{}' is staged as both a file and a directory",
                segments[0]
            )),
        }
    }

    /// Persist the tree objects depth-first and return the root tree's oid.
    ///
    /// An empty segment tree yields the empty tree object, which is valid,
    /// hashable, and stored like any other.
    pub fn save(&self, database: &Database) -> anyhow::Result<ObjectId> {
        let mut entries = BTreeMap::new();

        for (name, node) in &self.nodes {
            match node {
                Node::Dir(subtree) => {
                    let oid = subtree.save(database)?;
                    entries.insert(name.clone(), DatabaseEntry::new(oid, EntryMode::Directory));
                }
                Node::File(entry) => {
                    entries.insert(
                        name.clone(),
                        DatabaseEntry::new(entry.oid.clone(), entry.metadata.mode),
                    );
                }
            }
        }

        database.store(&Tree::new(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use crate::artifacts::index::index_entry::EntryMetadata;
    use crate::artifacts::objects::blob::Blob;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::path::PathBuf;

    #[fixture]
    fn database() -> (assert_fs::TempDir, Database) {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        (dir, database)
    }

    fn index_with(database: &Database, paths: &[&str]) -> Index {
        let mut index = Index::new(PathBuf::from("/nonexistent/index").into_boxed_path());
        for path in paths {
            let blob = Blob::new(Bytes::from_static(b"Hello, World!\n"), FileMode::Regular);
            let oid = database.store(&blob).unwrap();
            index
                .add(IndexEntry::new(
                    PathBuf::from(path),
                    oid,
                    EntryMetadata {
                        mode: EntryMode::File(FileMode::Regular),
                        flags: path.len() as u32,
                        ..Default::default()
                    },
                ))
                .unwrap();
        }
        index
    }

    #[rstest]
    fn test_single_file_tree_hash(database: (assert_fs::TempDir, Database)) {
        let (_dir, database) = database;
        let index = index_with(&database, &["README.md"]);

        let tree = SegmentTree::build(&index, &database).unwrap();
        let root_oid = tree.save(&database).unwrap();

        assert_eq!(
            root_oid.as_ref(),
            "42986d465a13fdda7fc0f28b0eefd0f002f31aa8"
        );
        assert!(database.exists(&root_oid));
    }

    #[rstest]
    fn test_root_hash_independent_of_staging_order(database: (assert_fs::TempDir, Database)) {
        let (_dir, database) = database;

        let forward = index_with(&database, &["a.txt", "lib/core.rs", "lib/util.rs", "z.txt"]);
        let backward = index_with(&database, &["z.txt", "lib/util.rs", "lib/core.rs", "a.txt"]);

        let forward_oid = SegmentTree::build(&forward, &database)
            .unwrap()
            .save(&database)
            .unwrap();
        let backward_oid = SegmentTree::build(&backward, &database)
            .unwrap()
            .save(&database)
            .unwrap();

        assert_eq!(forward_oid, backward_oid);
    }

    #[rstest]
    fn test_nested_directories_store_intermediate_trees(
        database: (assert_fs::TempDir, Database),
    ) {
        let (_dir, database) = database;
        let index = index_with(&database, &["a/b/c.txt"]);

        let root_oid = SegmentTree::build(&index, &database)
            .unwrap()
            .save(&database)
            .unwrap();

        // root -> a -> b -> c.txt, each level a stored tree
        let root = database.parse_object_as_tree(&root_oid).unwrap().unwrap();
        let (name, entry) = root.entries().next().unwrap();
        assert_eq!(name.trim_end_matches('/'), "a");
        assert!(entry.is_tree());

        let a_tree = database.parse_object_as_tree(&entry.oid).unwrap().unwrap();
        let (name, entry) = a_tree.entries().next().unwrap();
        assert_eq!(name.trim_end_matches('/'), "b");
        assert!(entry.is_tree());

        let b_tree = database.parse_object_as_tree(&entry.oid).unwrap().unwrap();
        let (name, entry) = b_tree.entries().next().unwrap();
        assert_eq!(name, "c.txt");
        assert!(!entry.is_tree());
    }

    #[rstest]
    fn test_empty_index_yields_empty_tree(database: (assert_fs::TempDir, Database)) {
        let (_dir, database) = database;
        let index = index_with(&database, &[]);

        let root_oid = SegmentTree::build(&index, &database)
            .unwrap()
            .save(&database)
            .unwrap();

        assert_eq!(
            root_oid.as_ref(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }

    #[rstest]
    fn test_missing_object_violates_precondition(database: (assert_fs::TempDir, Database)) {
        let (_dir, database) = database;

        let mut index = Index::new(PathBuf::from("/nonexistent/index").into_boxed_path());
        let absent = ObjectId::try_parse("b".repeat(40)).unwrap();
        index
            .add(IndexEntry::new(
                PathBuf::from("ghost.txt"),
                absent.clone(),
                EntryMetadata {
                    mode: EntryMode::File(FileMode::Regular),
                    flags: 9,
                    ..Default::default()
                },
            ))
            .unwrap();

        let err = SegmentTree::build(&index, &database).unwrap_err();
        match err.downcast_ref::<TreeBuildError>() {
            Some(TreeBuildError::InvalidObject { mode, oid, path }) => {
                assert_eq!(mode, "100644");
                assert_eq!(*oid, absent);
                assert_eq!(path, &PathBuf::from("ghost.txt"));
            }
            None => panic!("expected TreeBuildError"),
        }
    }
}
