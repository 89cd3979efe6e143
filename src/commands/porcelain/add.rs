use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use std::path::Path;

impl Repository {
    /// Stage files: store their blobs and record index entries.
    ///
    /// Directories are expanded to the files beneath them. The index is
    /// loaded in full, mutated in memory, and rewritten wholesale.
    pub fn add(&self, paths: &[String]) -> anyhow::Result<()> {
        let mut index = self.index();

        // Load the index file from the disk
        index.rehydrate()?;

        // Expand each provided path: directories become their files
        let paths = paths
            .iter()
            .map(|path| {
                let absolute_path = Path::new(path).canonicalize()?;
                self.workspace().list_files(Some(absolute_path))
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten();

        for path in paths {
            let blob = self.workspace().parse_blob(&path)?;
            let stat = self.workspace().stat_file(&path)?;

            let blob_id = self.database().store(&blob)?;
            index.add(IndexEntry::new(path, blob_id, stat))?;
        }

        index.write_updates()?;

        Ok(())
    }
}
