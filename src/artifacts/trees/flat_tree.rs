//! Flat tree walker
//!
//! Flattens a stored tree into a map from repo-relative path to leaf entry,
//! loading child trees from the database as it descends. Directory entries
//! never appear in the output, only their leaf descendants. This is the
//! read-side complement of the segment tree builder and feeds the
//! diff-index comparison and recursive ls-tree.

use crate::areas::database::Database;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::trees::database_entry::DatabaseEntry;
use derive_new::new;
use std::collections::BTreeMap;

#[derive(Debug, new)]
pub struct FlatTreeWalker<'r> {
    database: &'r Database,
}

impl FlatTreeWalker<'_> {
    /// Flatten the tree named by `oid` (a tree, or a commit whose tree is
    /// used) into `path -> entry` for every blob leaf.
    pub fn flatten(&self, oid: &ObjectId) -> anyhow::Result<BTreeMap<String, DatabaseEntry>> {
        let tree = self.inflate(oid)?;
        let mut flattened = BTreeMap::new();
        self.walk(&tree, "", &mut flattened)?;
        Ok(flattened)
    }

    fn inflate(&self, oid: &ObjectId) -> anyhow::Result<Tree> {
        match self.database.parse_object(oid)? {
            ObjectBox::Tree(tree) => Ok(*tree),
            ObjectBox::Commit(commit) => self.inflate(commit.tree_oid()),
            ObjectBox::Blob(_) => Err(anyhow::anyhow!("object {} is not a tree", oid)),
        }
    }

    fn walk(
        &self,
        tree: &Tree,
        prefix: &str,
        flattened: &mut BTreeMap<String, DatabaseEntry>,
    ) -> anyhow::Result<()> {
        for (name, entry) in tree.entries() {
            let name = name.trim_end_matches('/');
            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}/{name}")
            };

            if entry.is_tree() {
                let child = self
                    .database
                    .parse_object_as_tree(&entry.oid)?
                    .ok_or_else(|| {
                        anyhow::anyhow!("tree entry {} does not name a tree object", entry.oid)
                    })?;
                self.walk(&child, &path, flattened)?;
            } else {
                flattened.insert(path, entry.clone());
            }
        }

        Ok(())
    }
}
