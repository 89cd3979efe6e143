use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::diff::diff_target::DiffTarget;
use crate::artifacts::diff::myers::MyersDiff;
use crate::artifacts::trees::flat_tree::FlatTreeWalker;
use anyhow::Context;
use colored::Colorize;
use std::cmp::Ordering;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Show content changes.
    ///
    /// Without `--cached`: staged entries against the working tree.
    /// With `--cached`: the HEAD commit's tree against the staged entries.
    pub fn diff(&self, cached: bool) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        if cached {
            self.diff_head_index(&index)
        } else {
            self.diff_index_workspace(&index)
        }
    }

    fn diff_index_workspace(&self, index: &Index) -> anyhow::Result<()> {
        for entry in index.entries() {
            if !self.workspace().exists(&entry.name) {
                self.print_diff(
                    DiffTarget::from_index(entry, self.database())?,
                    DiffTarget::from_nothing(&entry.name),
                )?;
                continue;
            }

            // cheap stat comparison first; re-hash only when it is
            // inconclusive
            let stat = self.workspace().stat_file(&entry.name)?;
            if entry.stat_match(&stat) && entry.times_match(&stat) {
                continue;
            }

            let target = DiffTarget::from_file(&entry.name, self.workspace())?;
            if target.oid.as_ref() == Some(&entry.oid) && target.mode == Some(entry.metadata.mode)
            {
                continue;
            }

            self.print_diff(DiffTarget::from_index(entry, self.database())?, target)?;
        }

        Ok(())
    }

    /// Compare the flattened HEAD tree against the index with two sorted
    /// cursors merged by path (both sides iterate in byte-wise ascending
    /// order).
    fn diff_head_index(&self, index: &Index) -> anyhow::Result<()> {
        let head_tree = match self.refs().resolve_head()? {
            Some(oid) => FlatTreeWalker::new(self.database()).flatten(&oid)?,
            None => Default::default(),
        };

        let mut head_iter = head_tree.iter().peekable();
        let mut index_iter = index.entries().peekable();

        loop {
            // decide which cursor is behind, then advance outside the peek
            let ordering = match (head_iter.peek(), index_iter.peek()) {
                (None, None) => break,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some((head_path, _)), Some(index_entry)) => {
                    let index_path = index_entry
                        .name
                        .to_str()
                        .context("Invalid staged path")?;
                    head_path.as_str().cmp(index_path)
                }
            };

            match ordering {
                Ordering::Less => {
                    if let Some((path, entry)) = head_iter.next() {
                        self.print_diff(
                            DiffTarget::from_head(path, entry, self.database())?,
                            DiffTarget::from_nothing(Path::new(path)),
                        )?;
                    }
                }
                Ordering::Greater => {
                    if let Some(entry) = index_iter.next() {
                        self.print_diff(
                            DiffTarget::from_nothing(&entry.name),
                            DiffTarget::from_index(entry, self.database())?,
                        )?;
                    }
                }
                Ordering::Equal => {
                    if let (Some((path, head_entry)), Some(index_entry)) =
                        (head_iter.next(), index_iter.next())
                        && (head_entry.oid != index_entry.oid
                            || head_entry.mode != index_entry.metadata.mode)
                    {
                        self.print_diff(
                            DiffTarget::from_head(path, head_entry, self.database())?,
                            DiffTarget::from_index(index_entry, self.database())?,
                        )?;
                    }
                }
            }
        }

        Ok(())
    }

    fn print_diff(&self, a: DiffTarget, b: DiffTarget) -> anyhow::Result<()> {
        if a.oid == b.oid && a.mode == b.mode {
            return Ok(());
        }

        let a_file = Path::new("a").join(&a.file);
        let b_file = Path::new("b").join(&b.file);

        writeln!(
            self.writer(),
            "{}",
            format!("diff --git {} {}", a_file.display(), b_file.display()).bold()
        )?;

        match (&a.mode, &b.mode) {
            (None, Some(mode)) => {
                writeln!(self.writer(), "new file mode {}", mode.as_str())?;
            }
            (Some(mode), None) => {
                writeln!(self.writer(), "deleted file mode {}", mode.as_str())?;
            }
            (Some(old), Some(new)) if old != new => {
                writeln!(self.writer(), "old mode {}", old.as_str())?;
                writeln!(self.writer(), "new mode {}", new.as_str())?;
            }
            _ => {}
        }

        if a.oid != b.oid {
            let mode_suffix = match (&a.mode, &b.mode) {
                (Some(old), Some(new)) if old == new => format!(" {}", old.as_str()),
                _ => String::new(),
            };
            writeln!(
                self.writer(),
                "index {}..{}{}",
                a.short_oid(),
                b.short_oid(),
                mode_suffix
            )?;

            match &a.oid {
                Some(_) => writeln!(self.writer(), "--- {}", a_file.display())?,
                None => writeln!(self.writer(), "--- /dev/null")?,
            }
            match &b.oid {
                Some(_) => writeln!(self.writer(), "+++ {}", b_file.display())?,
                None => writeln!(self.writer(), "+++ /dev/null")?,
            }

            let body = MyersDiff::new(&a.lines, &b.lines).format_diff();
            if !body.is_empty() {
                writeln!(self.writer(), "{}", body)?;
            }
        }

        Ok(())
    }
}
