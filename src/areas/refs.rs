//! Reference store (branches, tags, HEAD)
//!
//! References are human-readable names pointing at commits, stored as text
//! files under the git directory. A ref file contains exactly
//! `"<40-hex-hash>\n"`. HEAD is special: it holds either a direct hash line
//! (detached) or `"ref: refs/heads/<branch>"` (attached).
//!
//! Create/update are distinct operations with distinct failures so callers
//! get safe-update semantics: `create` refuses to clobber an existing ref,
//! `update` refuses to invent a missing one.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::reference::reference::Reference;
use crate::errors::RefError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Reference store rooted at the git directory
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the git directory (typically `.git`)
    path: Box<Path>,
}

/// Content of a ref file: a symbolic pointer or a direct object ID
#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(SymRefOrOid::SymRef(symref_match[1].to_string())))
        } else {
            Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }
}

impl Refs {
    pub fn exists(&self, reference: &Reference) -> bool {
        reference.full_path(&self.path).exists()
    }

    /// Create a new ref; fails if one already exists at that path.
    pub fn create(&self, reference: &Reference, oid: &ObjectId) -> anyhow::Result<()> {
        if self.exists(reference) {
            return Err(RefError::AlreadyExists(reference.to_string()).into());
        }
        self.write_ref_file(&reference.full_path(&self.path), oid)
    }

    /// Update an existing ref; fails if it does not exist.
    pub fn update(&self, reference: &Reference, oid: &ObjectId) -> anyhow::Result<()> {
        if !self.exists(reference) {
            return Err(RefError::NotFound(reference.to_string()).into());
        }
        self.write_ref_file(&reference.full_path(&self.path), oid)
    }

    /// Write a ref unconditionally, creating or replacing it.
    pub fn create_or_update(&self, reference: &Reference, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(&reference.full_path(&self.path), oid)
    }

    pub fn delete(&self, reference: &Reference) -> anyhow::Result<()> {
        let ref_path = reference.full_path(&self.path);
        if !ref_path.exists() {
            return Err(RefError::NotFound(reference.to_string()).into());
        }

        std::fs::remove_file(&ref_path)
            .with_context(|| format!("failed to delete ref file at {:?}", ref_path))
    }

    /// Read a ref file's single hash line.
    pub fn resolve(&self, reference: &Reference) -> anyhow::Result<ObjectId> {
        let ref_path = reference.full_path(&self.path);

        match SymRefOrOid::read(&ref_path)? {
            Some(SymRefOrOid::Oid(oid)) => Ok(oid),
            Some(SymRefOrOid::SymRef(_)) => Err(anyhow::anyhow!(
                "reference {} is symbolic, expected a hash line",
                reference
            )),
            None => Err(RefError::NotFound(reference.to_string()).into()),
        }
    }

    /// The reference HEAD points at, if HEAD is symbolic.
    ///
    /// A detached HEAD (bare hash line) or a missing HEAD file yields `None`;
    /// callers fall back to treating HEAD as a direct hash.
    pub fn head(&self) -> anyhow::Result<Option<Reference>> {
        match SymRefOrOid::read(&self.head_path())? {
            Some(SymRefOrOid::SymRef(target)) => Ok(Reference::try_from_path(&target)),
            Some(SymRefOrOid::Oid(_)) | None => Ok(None),
        }
    }

    /// Follow HEAD through to a final hash.
    ///
    /// `None` when HEAD is missing, or symbolic to a branch with no commits
    /// yet.
    pub fn resolve_head(&self) -> anyhow::Result<Option<ObjectId>> {
        match SymRefOrOid::read(&self.head_path())? {
            Some(SymRefOrOid::SymRef(target)) => {
                match Reference::try_from_path(&target) {
                    Some(reference) if self.exists(&reference) => {
                        Ok(Some(self.resolve(&reference)?))
                    }
                    _ => Ok(None),
                }
            }
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            None => Ok(None),
        }
    }

    /// Point HEAD at a branch symbolically.
    pub fn set_head_symbolic(&self, branch: &Reference) -> anyhow::Result<()> {
        self.write_head_file(format!("ref: {}", branch.path().display()))
    }

    /// Advance HEAD to a new commit.
    ///
    /// When HEAD is attached, the branch it names is created or updated;
    /// when detached (or missing), HEAD itself receives the hash line.
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        match self.head()? {
            Some(branch) => self.create_or_update(&branch, oid),
            None => self.write_head_file(format!("{}\n", oid.as_ref())),
        }
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }

    /// Ref files hold exactly `"<40-hex>\n"`.
    fn write_ref_file(&self, path: &Path, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_locked(path, format!("{}\n", oid.as_ref()))
    }

    fn write_head_file(&self, raw: String) -> anyhow::Result<()> {
        self.write_locked(&self.head_path(), raw)
    }

    fn write_locked(&self, path: &Path, content: String) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(content.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn refs() -> (assert_fs::TempDir, Refs) {
        let dir = assert_fs::TempDir::new().unwrap();
        let git_dir = dir.path().join(".git");
        std::fs::create_dir_all(&git_dir).unwrap();
        let refs = Refs::new(git_dir.into_boxed_path());
        (dir, refs)
    }

    fn oid(fill: char) -> ObjectId {
        ObjectId::try_parse(fill.to_string().repeat(40)).unwrap()
    }

    #[rstest]
    fn test_create_then_resolve(refs: (assert_fs::TempDir, Refs)) {
        let (_dir, refs) = refs;
        let main = Reference::local("main");

        refs.create(&main, &oid('a')).unwrap();
        assert!(refs.exists(&main));
        assert_eq!(refs.resolve(&main).unwrap(), oid('a'));

        // ref file content is exactly "<hash>\n"
        let content = std::fs::read_to_string(refs.heads_path().join("main")).unwrap();
        assert_eq!(content, format!("{}\n", "a".repeat(40)));
    }

    #[rstest]
    fn test_create_refuses_to_clobber(refs: (assert_fs::TempDir, Refs)) {
        let (_dir, refs) = refs;
        let main = Reference::local("main");

        refs.create(&main, &oid('a')).unwrap();
        let err = refs.create(&main, &oid('b')).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RefError>(),
            Some(RefError::AlreadyExists(_))
        ));
        assert_eq!(refs.resolve(&main).unwrap(), oid('a'));
    }

    #[rstest]
    fn test_update_requires_existing_ref(refs: (assert_fs::TempDir, Refs)) {
        let (_dir, refs) = refs;
        let main = Reference::local("main");

        let err = refs.update(&main, &oid('a')).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RefError>(),
            Some(RefError::NotFound(_))
        ));

        refs.create(&main, &oid('a')).unwrap();
        refs.update(&main, &oid('b')).unwrap();
        assert_eq!(refs.resolve(&main).unwrap(), oid('b'));
    }

    #[rstest]
    fn test_create_or_update_is_unconditional(refs: (assert_fs::TempDir, Refs)) {
        let (_dir, refs) = refs;
        let tag = Reference::new(crate::artifacts::reference::reference::RefKind::Tag, "v1");

        refs.create_or_update(&tag, &oid('a')).unwrap();
        refs.create_or_update(&tag, &oid('b')).unwrap();
        assert_eq!(refs.resolve(&tag).unwrap(), oid('b'));
    }

    #[rstest]
    fn test_delete(refs: (assert_fs::TempDir, Refs)) {
        let (_dir, refs) = refs;
        let main = Reference::local("main");

        refs.create(&main, &oid('a')).unwrap();
        refs.delete(&main).unwrap();
        assert!(!refs.exists(&main));

        let err = refs.delete(&main).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RefError>(),
            Some(RefError::NotFound(_))
        ));
    }

    #[rstest]
    fn test_symbolic_head(refs: (assert_fs::TempDir, Refs)) {
        let (_dir, refs) = refs;
        let master = Reference::local("master");

        refs.set_head_symbolic(&master).unwrap();
        let content = std::fs::read_to_string(refs.head_path()).unwrap();
        assert_eq!(content, "ref: refs/heads/master");

        assert_eq!(refs.head().unwrap(), Some(master.clone()));
        // branch has no commits yet
        assert_eq!(refs.resolve_head().unwrap(), None);

        refs.update_head(&oid('c')).unwrap();
        // attached HEAD advances the branch, not HEAD itself
        assert_eq!(refs.head().unwrap(), Some(master.clone()));
        assert_eq!(refs.resolve(&master).unwrap(), oid('c'));
        assert_eq!(refs.resolve_head().unwrap(), Some(oid('c')));
    }

    #[rstest]
    fn test_detached_head(refs: (assert_fs::TempDir, Refs)) {
        let (_dir, refs) = refs;

        std::fs::write(refs.head_path(), format!("{}\n", "d".repeat(40))).unwrap();
        assert_eq!(refs.head().unwrap(), None);
        assert_eq!(refs.resolve_head().unwrap(), Some(oid('d')));
    }

    #[rstest]
    fn test_missing_head(refs: (assert_fs::TempDir, Refs)) {
        let (_dir, refs) = refs;
        assert_eq!(refs.head().unwrap(), None);
        assert_eq!(refs.resolve_head().unwrap(), None);
    }
}
