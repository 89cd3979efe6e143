use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::reference::revision::Revision;
use crate::artifacts::trees::flat_tree::FlatTreeWalker;
use std::io::Write;

impl Repository {
    /// List a tree's entries, optionally flattening the whole hierarchy.
    pub fn ls_tree(&self, revision: &str, recursive: bool) -> anyhow::Result<()> {
        let oid = Revision::resolve(revision, self.refs())?
            .ok_or_else(|| anyhow::anyhow!("unknown revision '{}'", revision))?;

        if recursive {
            let flattened = FlatTreeWalker::new(self.database()).flatten(&oid)?;
            for (path, entry) in flattened {
                writeln!(
                    self.writer(),
                    "{} {} {}\t{}",
                    entry.mode.as_str(),
                    ObjectType::Blob.as_str(),
                    entry.oid.as_ref(),
                    path
                )?;
            }
            return Ok(());
        }

        let tree = match self.database().parse_object(&oid)? {
            ObjectBox::Tree(tree) => *tree,
            ObjectBox::Commit(commit) => self
                .database()
                .parse_object_as_tree(commit.tree_oid())?
                .ok_or_else(|| anyhow::anyhow!("commit {} has no tree", oid))?,
            ObjectBox::Blob(_) => anyhow::bail!("object {} is not a tree", oid),
        };

        writeln!(self.writer(), "{}", tree.display())?;

        Ok(())
    }
}
