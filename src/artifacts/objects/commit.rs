//! Git commit object
//!
//! Commits represent snapshots of the repository at specific points in time.
//! They contain:
//! - A tree object ID (directory snapshot)
//! - An optional parent commit ID (for history)
//! - Author and committer information
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Author or committer information
///
/// Contains name, email, and timestamp with timezone information.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create a new author with the current timestamp
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    /// Create a new author with a specific timestamp
    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Format author name and email for display
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Wire form: "Name <email> <unix-timestamp> ±HHMM"
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Load author information from environment variables
    ///
    /// Reads GIT_AUTHOR_NAME, GIT_AUTHOR_EMAIL, and optionally
    /// GIT_AUTHOR_DATE. If no date is provided, uses current time.
    pub fn load_from_env() -> anyhow::Result<Self> {
        let name = std::env::var("GIT_AUTHOR_NAME").context("GIT_AUTHOR_NAME not set")?;
        let email = std::env::var("GIT_AUTHOR_EMAIL").context("GIT_AUTHOR_EMAIL not set")?;
        let timestamp = std::env::var("GIT_AUTHOR_DATE").ok().and_then(|date_str| {
            chrono::DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        });

        match timestamp {
            Some(ts) => Ok(Author::new_with_timestamp(name, email, ts)),
            None => Ok(Author::new(name, email)),
        }
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Format: "name <email> timestamp timezone"
        // Split from right to get timezone and timestamp first
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(anyhow::anyhow!("Invalid author format"));
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("Invalid timestamp"))?;
        let name_email_part = parts[2]; // "name <email>"

        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '<'"))?;
        let email_end = name_email_part
            .find('>')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '>'"))?;

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        let datetime = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))?;
        let datetime = chrono::DateTime::parse_from_str(
            &format!("{} {}", datetime.format("%Y-%m-%d %H:%M:%S"), timezone),
            "%Y-%m-%d %H:%M:%S %z",
        )
        .map_err(|_| anyhow::anyhow!("Invalid timezone"))?;

        Ok(Author {
            name,
            email,
            timestamp: datetime,
        })
    }
}

/// Git commit object
///
/// Contains references to:
/// - The tree representing the state of files
/// - The parent commit, absent for a root commit
/// - Author and committer information
/// - Commit message (stored without its trailing newline; the codec adds
///   exactly one back on serialization)
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parent: Option<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// Create a new commit
    ///
    /// # Arguments
    ///
    /// * `parent` - Parent commit ID (None for a root commit)
    /// * `tree_oid` - Tree object representing the snapshot
    /// * `author` - Author (also used as committer)
    /// * `message` - Commit message
    pub fn new(
        parent: Option<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            parent,
            tree_oid,
            author: author.clone(),
            committer: author,
            message,
        }
    }

    /// Get the first line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    fn render(&self) -> String {
        let mut lines = vec![];

        lines.push(format!("tree {}", self.tree_oid.as_ref()));
        if let Some(parent) = &self.parent {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines.join("\n")
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();
        content_bytes.write_all(self.render().as_bytes())?;
        content_bytes.push(b'\n');

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;
        let content = content.strip_suffix('\n').unwrap_or(&content);
        let mut lines = content.lines();

        let tree_line = lines
            .next()
            .context("Invalid commit object: missing tree line")?;
        let tree_oid = tree_line
            .strip_prefix("tree ")
            .context("Invalid commit object: invalid tree line")?
            .to_string();
        let tree_oid = ObjectId::try_parse(tree_oid)?;

        let mut next_line = lines
            .next()
            .context("Invalid commit object: missing author line")?;

        let parent = if let Some(parent_oid) = next_line.strip_prefix("parent ") {
            let parent = ObjectId::try_parse(parent_oid.to_string())?;
            next_line = lines
                .next()
                .context("Invalid commit object: missing author line")?;
            Some(parent)
        } else {
            None
        };

        let author = next_line
            .strip_prefix("author ")
            .context("Invalid commit object: invalid author line")?;
        let author = Author::try_from(author)?;

        let committer_line = lines
            .next()
            .context("Invalid commit object: missing committer line")?;
        let committer = committer_line
            .strip_prefix("committer ")
            .context("Invalid commit object: invalid committer line")?;
        let _committer = Author::try_from(committer)?;

        // skip the empty line
        lines.next();

        let message = lines.collect::<Vec<&str>>().join("\n");
        Ok(Self::new(parent, tree_oid, author, message))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn author() -> Author {
        let timestamp =
            chrono::DateTime::parse_from_str("2024-03-01 12:00:00 +0200", "%Y-%m-%d %H:%M:%S %z")
                .unwrap();
        Author::new_with_timestamp("Alice".into(), "alice@example.com".into(), timestamp)
    }

    #[fixture]
    fn tree_oid() -> ObjectId {
        ObjectId::try_parse("42986d465a13fdda7fc0f28b0eefd0f002f31aa8".into()).unwrap()
    }

    #[rstest]
    fn test_author_wire_form(author: Author) {
        assert_eq!(
            author.display(),
            "Alice <alice@example.com> 1709287200 +0200"
        );
        let parsed = Author::try_from(author.display().as_str()).unwrap();
        assert_eq!(parsed, author);
    }

    #[rstest]
    fn test_root_commit_round_trip(author: Author, tree_oid: ObjectId) {
        let commit = Commit::new(None, tree_oid, author, "Initial commit".into());
        let encoded = commit.serialize().unwrap();

        let mut reader = std::io::Cursor::new(encoded);
        let (object_type, size) =
            crate::artifacts::objects::object_type::ObjectType::parse_header(&mut reader).unwrap();
        assert_eq!(object_type, ObjectType::Commit);

        let decoded = Commit::deserialize(reader).unwrap();
        assert_eq!(decoded, commit);

        // declared length matches the actual body length
        let encoded = commit.serialize().unwrap();
        let body_start = encoded.iter().position(|&b| b == 0).unwrap() + 1;
        assert_eq!(encoded.len() - body_start, size);
    }

    #[rstest]
    fn test_child_commit_round_trip(author: Author, tree_oid: ObjectId) {
        let parent =
            ObjectId::try_parse("8ab686eafeb1f44702738c8b0f24f2567c36da6d".into()).unwrap();
        let commit = Commit::new(
            Some(parent.clone()),
            tree_oid,
            author,
            "Second commit\n\nwith a body".into(),
        );

        let encoded = commit.serialize().unwrap();
        let mut reader = std::io::Cursor::new(encoded);
        let _ = crate::artifacts::objects::object_type::ObjectType::parse_header(&mut reader)
            .unwrap();
        let decoded = Commit::deserialize(reader).unwrap();

        assert_eq!(decoded.parent(), Some(&parent));
        assert_eq!(decoded.message(), "Second commit\n\nwith a body");
        assert_eq!(decoded.short_message(), "Second commit");
        assert_eq!(decoded, commit);
    }

    #[rstest]
    fn test_serialized_body_ends_with_newline(author: Author, tree_oid: ObjectId) {
        let commit = Commit::new(None, tree_oid, author, "msg".into());
        let bytes = commit.serialize().unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'));
    }
}
