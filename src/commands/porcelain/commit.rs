use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::trees::segment_tree::SegmentTree;
use std::io::Write;

impl Repository {
    /// Record the staged tree as a new commit and advance HEAD.
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        let mut index = self.index();

        // Load the index file from the disk
        index.rehydrate()?;

        let tree = SegmentTree::build(&index, self.database())?;
        let tree_id = tree.save(self.database())?;

        let parent = self.refs().resolve_head()?;
        let is_root = match parent {
            Some(_) => "",
            None => "(root-commit) ",
        };

        let author = Author::load_from_env()?;
        let message = message.trim().to_string();

        let commit = Commit::new(parent, tree_id, author, message);
        let commit_id = self.database().store(&commit)?;
        self.refs().update_head(&commit_id)?;

        write!(
            self.writer(),
            "[{}{}] {}",
            is_root,
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
