//! Typed reference names
//!
//! A reference is a named, mutable pointer to an object hash, stored as a
//! text file under `refs/`. The kind determines the directory prefix:
//! `refs/heads/<name>` for local branches, `refs/tags/<name>` for tags, and
//! so on.

use std::path::{Path, PathBuf};

/// Kind of reference, determining its `refs/` prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RefKind {
    Local,
    Remote,
    Tag,
    Note,
    Stash,
    Replace,
    Bisect,
}

impl RefKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            RefKind::Local => "refs/heads",
            RefKind::Remote => "refs/remotes",
            RefKind::Tag => "refs/tags",
            RefKind::Note => "refs/notes",
            RefKind::Stash => "refs/stash",
            RefKind::Replace => "refs/replace",
            RefKind::Bisect => "refs/bisect",
        }
    }

    fn all() -> [RefKind; 7] {
        [
            RefKind::Local,
            RefKind::Remote,
            RefKind::Tag,
            RefKind::Note,
            RefKind::Stash,
            RefKind::Replace,
            RefKind::Bisect,
        ]
    }
}

/// A named reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    kind: RefKind,
    name: String,
}

impl Reference {
    pub fn new(kind: RefKind, name: impl Into<String>) -> Self {
        Reference {
            kind,
            name: name.into(),
        }
    }

    /// A local branch under `refs/heads/`
    pub fn local(name: impl Into<String>) -> Self {
        Self::new(RefKind::Local, name)
    }

    pub fn kind(&self) -> RefKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the git directory, e.g. `refs/heads/main`
    pub fn path(&self) -> PathBuf {
        Path::new(self.kind.prefix()).join(&self.name)
    }

    /// Absolute path of the ref file within `git_dir`
    pub fn full_path(&self, git_dir: &Path) -> PathBuf {
        git_dir.join(self.path())
    }

    /// Parse a `refs/<prefix>/<name>` path into a typed reference.
    ///
    /// Returns `None` for paths outside the known prefixes or with an
    /// ill-formed name.
    pub fn try_from_path(path: &str) -> Option<Self> {
        for kind in RefKind::all() {
            if let Some(name) = path.strip_prefix(kind.prefix())
                && let Some(name) = name.strip_prefix('/')
                && Self::is_valid_name(name)
            {
                return Some(Self::new(kind, name));
            }
        }
        None
    }

    /// Check a ref name for the patterns git refuses.
    ///
    /// Names may nest with `/` but must not start or end with one, must not
    /// contain `..`, control characters, or the special characters that
    /// clash with revision syntax.
    pub fn is_valid_name(name: &str) -> bool {
        if name.is_empty()
            || name.starts_with('/')
            || name.ends_with('/')
            || name.starts_with('.')
            || name.ends_with(".lock")
            || name.contains("..")
            || name.contains("/.")
            || name.contains("@{")
        {
            return false;
        }

        !name
            .chars()
            .any(|c| c.is_control() || matches!(c, ' ' | '*' | ':' | '?' | '[' | '\\' | '^' | '~'))
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::proptest;
    use rstest::rstest;

    #[rstest]
    #[case(RefKind::Local, "main", "refs/heads/main")]
    #[case(RefKind::Remote, "origin/main", "refs/remotes/origin/main")]
    #[case(RefKind::Tag, "v1.0", "refs/tags/v1.0")]
    #[case(RefKind::Note, "commits", "refs/notes/commits")]
    #[case(RefKind::Stash, "0", "refs/stash/0")]
    #[case(RefKind::Replace, "abc", "refs/replace/abc")]
    #[case(RefKind::Bisect, "bad", "refs/bisect/bad")]
    fn test_kind_prefixes(#[case] kind: RefKind, #[case] name: &str, #[case] expected: &str) {
        let reference = Reference::new(kind, name);
        assert_eq!(reference.path(), PathBuf::from(expected));

        let parsed = Reference::try_from_path(expected).unwrap();
        assert_eq!(parsed, reference);
    }

    #[test]
    fn test_unknown_prefix_is_rejected() {
        assert_eq!(Reference::try_from_path("refs/wip/foo"), None);
        assert_eq!(Reference::try_from_path("HEAD"), None);
    }

    proptest! {
        #[test]
        fn test_valid_names(name in "[a-zA-Z0-9_-]+") {
            assert!(Reference::is_valid_name(&name));
        }

        #[test]
        fn test_nested_names(prefix in "[a-zA-Z0-9_-]+", suffix in "[a-zA-Z0-9_-]+") {
            assert!(Reference::is_valid_name(&format!("{}/{}", prefix, suffix)));
        }

        #[test]
        fn test_consecutive_dots_rejected(prefix in "[a-zA-Z0-9_-]+", suffix in "[a-zA-Z0-9_-]+") {
            assert!(!Reference::is_valid_name(&format!("{}..{}", prefix, suffix)));
        }

        #[test]
        fn test_lock_suffix_rejected(prefix in "[a-zA-Z0-9_-]+") {
            assert!(!Reference::is_valid_name(&format!("{}.lock", prefix)));
        }

        #[test]
        fn test_special_characters_rejected(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+",
            special in r"[\*:\?\[\\^~ ]",
        ) {
            assert!(!Reference::is_valid_name(&format!("{}{}{}", prefix, special, suffix)));
        }
    }

    #[test]
    fn test_boundary_slashes_and_dots_rejected() {
        assert!(!Reference::is_valid_name(""));
        assert!(!Reference::is_valid_name("/main"));
        assert!(!Reference::is_valid_name("main/"));
        assert!(!Reference::is_valid_name(".hidden"));
        assert!(!Reference::is_valid_name("feature/.wip"));
        assert!(!Reference::is_valid_name("a@{1}"));
    }
}
