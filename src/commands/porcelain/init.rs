use crate::areas::repository::Repository;
use crate::artifacts::reference::reference::Reference;
use anyhow::Context;
use std::fs;
use std::io::Write;

const DEFAULT_BRANCH: &str = "master";

impl Repository {
    pub fn init(&self) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .git/objects directory")?;

        fs::create_dir_all(self.refs().refs_path())
            .context("Failed to create .git/refs directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create .git/refs/heads directory")?;

        self.refs()
            .set_head_symbolic(&Reference::local(DEFAULT_BRANCH))
            .context("Failed to create initial HEAD reference")?;

        // create the index file if it does not exist
        let index = self.index();
        if !index.path().exists() {
            fs::write(index.path(), b"").context("Failed to create .git/index file")?;
        }

        write!(
            self.writer(),
            "Initialized empty Git repository in {}",
            self.path().display()
        )?;

        Ok(())
    }
}
