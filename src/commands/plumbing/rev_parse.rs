use crate::areas::repository::Repository;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::reference::revision::Revision;
use std::io::Write;

impl Repository {
    /// Resolve a revision string and print the full oid.
    ///
    /// Falls back to an abbreviated-oid prefix search when the revision
    /// resolver finds nothing; a unique match wins, an ambiguous one is
    /// reported with its candidates.
    pub fn rev_parse(&self, revision: &str) -> anyhow::Result<()> {
        if let Some(oid) = Revision::resolve(revision, self.refs())? {
            writeln!(self.writer(), "{}", oid)?;
            return Ok(());
        }

        if Self::looks_like_abbreviated_oid(revision) {
            let matches = self.database().find_objects_by_prefix(revision)?;
            match matches.len() {
                0 => {}
                1 => {
                    writeln!(self.writer(), "{}", matches[0])?;
                    return Ok(());
                }
                _ => {
                    let mut message = format!(
                        "short SHA1 {} is ambiguous\nhint: The candidates are:",
                        revision
                    );
                    for oid in &matches {
                        let object_type = self.database().get_object_type(oid)?;
                        message.push_str(&format!(
                            "\nhint:   {} {}",
                            oid.to_short_oid(),
                            object_type
                        ));
                    }
                    anyhow::bail!(message);
                }
            }
        }

        anyhow::bail!("unknown revision '{}'", revision)
    }

    fn looks_like_abbreviated_oid(revision: &str) -> bool {
        (4..OBJECT_ID_LENGTH).contains(&revision.len())
            && revision.chars().all(|c| c.is_ascii_hexdigit())
    }
}
