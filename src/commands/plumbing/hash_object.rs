use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Hash a file as a blob, optionally writing it to the object database.
    pub fn hash_object(&self, file: &str, write: bool) -> anyhow::Result<()> {
        let blob = self.workspace().parse_blob(Path::new(file))?;

        let object_id = if write {
            self.database().store(&blob)?
        } else {
            blob.object_id()?
        };

        writeln!(self.writer(), "{}", object_id)?;

        Ok(())
    }
}
