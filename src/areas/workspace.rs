//! Working-tree file access
//!
//! The workspace is the file-access provider the engine consumes: existence
//! checks, raw byte reads, and stat metadata for repo-relative paths. All
//! returned paths are relative to the repository root; the `.git` directory
//! is never listed.

use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 3] = [".git", ".", ".."];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).exists()
    }

    /// Read a working-tree file's raw bytes.
    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let file_path = self.path.join(file_path);

        let content = std::fs::read(&file_path)
            .map_err(|e| anyhow::anyhow!("Unable to read {}: {e}", file_path.display()))?;

        Ok(Bytes::from(content))
    }

    pub fn stat_file(&self, file_path: &Path) -> anyhow::Result<EntryMetadata> {
        let metadata = std::fs::metadata(self.path.join(file_path))
            .map_err(|e| anyhow::anyhow!("Unable to stat {}: {e}", file_path.display()))?;

        (file_path, metadata).try_into()
    }

    /// Read a file into a blob carrying its stat-derived mode.
    pub fn parse_blob(&self, file_path: &Path) -> anyhow::Result<Blob> {
        let data = self.read_file(file_path)?;
        let stat = self.stat_file(file_path)?;

        Ok(Blob::new(data, stat.mode.try_into()?))
    }

    /// List workspace files under `root_file_path` (or everything), as
    /// repo-relative paths.
    pub fn list_files(&self, root_file_path: Option<PathBuf>) -> anyhow::Result<Vec<PathBuf>> {
        let root_file_path = match root_file_path {
            Some(p) => std::fs::canonicalize(p)?,
            None => self.path.clone().into(),
        };

        if !root_file_path.exists() {
            anyhow::bail!("The specified path does not exist: {:?}", root_file_path);
        }

        if root_file_path.is_dir() {
            Ok(WalkDir::new(&root_file_path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| self.check_if_not_ignored_file_path(entry.path()))
                .collect::<Vec<_>>())
        } else {
            Ok(vec![
                root_file_path
                    .strip_prefix(self.path.as_ref())
                    .map(PathBuf::from)
                    .unwrap_or_default(),
            ])
        }
    }

    fn is_ignored(path: &Path) -> bool {
        // Check if any component of the path is in IGNORED_PATHS
        path.components().any(|component| {
            if let std::path::Component::Normal(name) = component {
                let name_str = name.to_string_lossy();
                IGNORED_PATHS.contains(&name_str.as_ref())
            } else {
                false
            }
        })
    }

    fn check_if_not_ignored_file_path(&self, path: &Path) -> Option<PathBuf> {
        if path.is_file() && !Self::is_ignored(path) {
            Some(path.strip_prefix(self.path.as_ref()).ok()?.to_path_buf())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::fixture::{FileWriteStr, PathChild};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_list_files_skips_git_directory() {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        dir.child("sub/b.txt").write_str("b").unwrap();
        dir.child(".git/HEAD").write_str("ref: refs/heads/master").unwrap();

        let workspace = Workspace::new(
            dir.path().canonicalize().unwrap().into_boxed_path(),
        );
        let files = workspace.list_files(None).unwrap();

        assert_eq!(files, vec![PathBuf::from("a.txt"), PathBuf::from("sub/b.txt")]);
    }

    #[test]
    fn test_read_and_stat() {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("a.txt").write_str("hello").unwrap();

        let workspace = Workspace::new(
            dir.path().canonicalize().unwrap().into_boxed_path(),
        );

        assert!(workspace.exists(Path::new("a.txt")));
        assert!(!workspace.exists(Path::new("b.txt")));

        let content = workspace.read_file(Path::new("a.txt")).unwrap();
        assert_eq!(&content[..], b"hello");

        let stat = workspace.stat_file(Path::new("a.txt")).unwrap();
        assert_eq!(stat.size, 5);
    }
}
