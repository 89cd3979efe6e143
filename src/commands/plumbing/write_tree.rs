use crate::areas::repository::Repository;
use crate::artifacts::trees::segment_tree::SegmentTree;
use std::io::Write;

impl Repository {
    /// Write the staged tree objects and print the root tree's oid.
    pub fn write_tree(&self) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        let tree = SegmentTree::build(&index, self.database())?;
        let root_oid = tree.save(self.database())?;

        writeln!(self.writer(), "{}", root_oid)?;

        Ok(())
    }
}
