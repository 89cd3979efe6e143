//! Myers' shortest-edit-script diff
//!
//! Works over the edit graph of two sequences: position `(x, y)` means `x`
//! items of `a` and `y` items of `b` have been consumed. Horizontal moves
//! delete from `a`, vertical moves insert from `b`, and diagonal moves
//! ("snakes") are free where the items match. Diagonal `k = x - y`.
//!
//! The forward search records, for each edit distance `d`, the furthest `x`
//! reached on every diagonal (a snapshot); the snapshots across all `d`
//! values form the trace. Backtracking re-derives each step's predecessor
//! from the trace using the same move-selection rule, so deletions come
//! before insertions wherever both are equally valid.

use derive_new::new;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Delete,
    Insert,
    Equal,
}

/// One operation of the edit script.
///
/// `line` is 1-based: the old-sequence line for `Delete`/`Equal`, the
/// new-sequence line for `Insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit<T> {
    pub kind: EditKind,
    pub line: usize,
    pub value: T,
}

impl<T> Edit<T>
where
    T: Clone + Into<String>,
{
    pub fn as_string(&self) -> String {
        match self.kind {
            EditKind::Delete => format!("- {}", self.value.clone().into()),
            EditKind::Insert => format!("+ {}", self.value.clone().into()),
            EditKind::Equal => self.value.clone().into(),
        }
    }
}

impl<T> Display for Edit<T>
where
    T: Clone + Into<String>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

/// Furthest-reaching x per diagonal for one edit distance
pub type Snapshot = Vec<isize>;

/// Snapshots across the whole forward search, indexed by edit distance
pub type Trace = Vec<Snapshot>;

/// Predecessor-to-position moves, recorded goal-first during backtracking
pub type EditPath = Vec<(isize, isize, isize, isize)>;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct MyersDiff<'d, T> {
    a: &'d [T],
    b: &'d [T],
}

impl<'d, T: Eq + Clone> MyersDiff<'d, T> {
    /// Index of diagonal `k` in a snapshot.
    ///
    /// The offset leaves one slot of headroom on each side so `k - 1` and
    /// `k + 1` are always in bounds, including for empty inputs.
    fn idx(&self, k: isize) -> usize {
        let offset = (self.a.len() + self.b.len()) as isize + 1;
        (offset + k) as usize
    }

    /// Whether the step onto diagonal `k` at distance `d` came from an
    /// insertion (diagonal `k + 1`) rather than a deletion (`k - 1`).
    ///
    /// On the boundary diagonals there is only one predecessor. Elsewhere
    /// the insert predecessor is taken only when it is strictly further
    /// along, so on ties the deletion wins and is reported first.
    fn step_is_insert(&self, snapshot: &Snapshot, d: isize, k: isize) -> bool {
        k == -d || (k != d && snapshot[self.idx(k - 1)] < snapshot[self.idx(k + 1)])
    }

    /// Forward search: furthest-reaching x per diagonal for each `d`,
    /// stopping the instant any diagonal reaches `(|a|, |b|)`.
    pub fn compute_shortest_edit(&self) -> Trace {
        let (n, m) = (self.a.len() as isize, self.b.len() as isize);

        let mut v: Snapshot = vec![0; 2 * ((n + m) as usize + 1) + 1];
        let mut trace = Vec::new();

        for d in 0..=(n + m) {
            trace.push(v.clone());

            for k in (-d..=d).step_by(2) {
                let mut x = if self.step_is_insert(&v, d, k) {
                    v[self.idx(k + 1)]
                } else {
                    v[self.idx(k - 1)] + 1
                };

                let mut y = x - k;
                while x < n && y < m && self.a[x as usize] == self.b[y as usize] {
                    // snake
                    x += 1;
                    y += 1;
                }

                v[self.idx(k)] = x;

                if x >= n && y >= m {
                    trace.push(v);
                    return trace;
                }
            }
        }

        // every pair of finite sequences is reachable within |a| + |b| edits
        unreachable!("no edit path within {} steps", n + m)
    }

    /// Re-derive the edit path from the trace, goal-first.
    pub fn backtrack(&self) -> EditPath {
        let (mut x, mut y) = (self.a.len() as isize, self.b.len() as isize);
        let mut edit_path = Vec::new();

        let trace = self.compute_shortest_edit();

        // trace[d] holds the snapshot taken before distance d was expanded,
        // i.e. the furthest-reaching state of distance d - 1
        for d in (1..trace.len() - 1).rev() {
            let v = &trace[d];
            let k = x - y;

            let prev_k = if self.step_is_insert(v, d as isize, k) {
                k + 1
            } else {
                k - 1
            };
            let prev_x = v[self.idx(prev_k)];
            let prev_y = prev_x - prev_k;

            // consume the snake before attributing the single edit move
            while x > prev_x && y > prev_y {
                edit_path.push((x - 1, y - 1, x, y));
                x -= 1;
                y -= 1;
            }
            edit_path.push((prev_x, prev_y, x, y));

            (x, y) = (prev_x, prev_y);
        }

        // leftover snake on the k = 0 diagonal
        while x > 0 && y > 0 {
            edit_path.push((x - 1, y - 1, x, y));
            x -= 1;
            y -= 1;
        }

        edit_path
    }

    /// The minimal edit script transforming `a` into `b`.
    pub fn diff(&self) -> Vec<Edit<T>> {
        let mut diff = Vec::new();

        let path = self.backtrack();

        for (prev_x, prev_y, x, y) in path {
            if x == prev_x {
                // Insert: only y increased
                diff.push(Edit {
                    kind: EditKind::Insert,
                    line: y as usize,
                    value: self.b[prev_y as usize].clone(),
                });
            } else if y == prev_y {
                // Delete: only x increased
                diff.push(Edit {
                    kind: EditKind::Delete,
                    line: x as usize,
                    value: self.a[prev_x as usize].clone(),
                });
            } else {
                // Equal: both increased (diagonal move)
                diff.push(Edit {
                    kind: EditKind::Equal,
                    line: x as usize,
                    value: self.a[prev_x as usize].clone(),
                });
            }
        }

        diff.reverse();
        diff
    }

    /// Unified rendering: `+ text` / `- text` / bare `text`, one per line.
    pub fn format_diff(&self) -> String
    where
        T: Into<String>,
    {
        self.diff()
            .iter()
            .map(|edit| edit.as_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    fn apply<T: Eq + Clone>(old: &[T], edits: &[Edit<T>]) -> Vec<T> {
        // deletes drop old items, equals keep them, inserts add new ones
        let mut result = Vec::new();
        let mut cursor = 0;
        for edit in edits {
            match edit.kind {
                EditKind::Delete => cursor += 1,
                EditKind::Equal => {
                    result.push(old[cursor].clone());
                    cursor += 1;
                }
                EditKind::Insert => result.push(edit.value.clone()),
            }
        }
        assert_eq!(cursor, old.len());
        result
    }

    #[fixture]
    fn spec_lines() -> (Vec<&'static str>, Vec<&'static str>) {
        (vec!["A", "G", "C", "A", "T"], vec!["G", "A", "C"])
    }

    #[rstest]
    fn test_deletions_reported_before_insertions(spec_lines: (Vec<&'static str>, Vec<&'static str>)) {
        let (a, b) = spec_lines;
        assert_eq!(
            MyersDiff::new(&a, &b).format_diff(),
            "- A\nG\n- C\nA\n- T\n+ C"
        );
    }

    #[rstest]
    fn test_line_numbers(spec_lines: (Vec<&'static str>, Vec<&'static str>)) {
        let (a, b) = spec_lines;
        let edits = MyersDiff::new(&a, &b).diff();
        let positions = edits
            .iter()
            .map(|e| (e.kind, e.line))
            .collect::<Vec<_>>();
        assert_eq!(
            positions,
            vec![
                (EditKind::Delete, 1),
                (EditKind::Equal, 2),
                (EditKind::Delete, 3),
                (EditKind::Equal, 4),
                (EditKind::Delete, 5),
                (EditKind::Insert, 3),
            ]
        );
    }

    #[rstest]
    fn test_applying_script_reproduces_target(spec_lines: (Vec<&'static str>, Vec<&'static str>)) {
        let (a, b) = spec_lines;
        let edits = MyersDiff::new(&a, &b).diff();
        assert_eq!(apply(&a, &edits), b);
    }

    #[rstest]
    fn test_reverse_diff_swaps_operation_kinds(spec_lines: (Vec<&'static str>, Vec<&'static str>)) {
        let (a, b) = spec_lines;
        let forward = MyersDiff::new(&a, &b).diff();
        let reverse = MyersDiff::new(&b, &a).diff();

        let count = |edits: &[Edit<&str>], kind: EditKind| {
            edits.iter().filter(|e| e.kind == kind).count()
        };
        assert_eq!(
            count(&forward, EditKind::Delete),
            count(&reverse, EditKind::Insert)
        );
        assert_eq!(
            count(&forward, EditKind::Insert),
            count(&reverse, EditKind::Delete)
        );
        assert_eq!(
            count(&forward, EditKind::Equal),
            count(&reverse, EditKind::Equal)
        );
        assert_eq!(apply(&b, &reverse), a);
    }

    #[test]
    fn test_diff_of_identical_sequences_is_all_equal() {
        let a = vec!["x", "y", "z"];
        let edits = MyersDiff::new(&a, &a).diff();
        assert!(edits.iter().all(|e| e.kind == EditKind::Equal));
        assert_eq!(edits.len(), 3);
    }

    #[test]
    fn test_diff_characters() {
        let a: Vec<char> = "abcabba".chars().collect();
        let b: Vec<char> = "cbabac".chars().collect();
        let edits = MyersDiff::new(&a, &b).diff();

        let rendered = edits
            .iter()
            .map(|e| {
                let sign = match e.kind {
                    EditKind::Delete => '-',
                    EditKind::Insert => '+',
                    EditKind::Equal => '=',
                };
                format!("{}{}", sign, e.value)
            })
            .collect::<String>();
        assert_eq!(rendered, "-a-b=c+b=a=b-b=a+c");
        assert_eq!(apply(&a, &edits), b);
    }

    #[test]
    fn test_empty_sequences() {
        let empty: Vec<&str> = vec![];
        let one = vec!["x"];

        assert!(MyersDiff::new(&empty, &empty).diff().is_empty());

        let inserted = MyersDiff::new(&empty, &one).diff();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].kind, EditKind::Insert);

        let deleted = MyersDiff::new(&one, &empty).diff();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].kind, EditKind::Delete);
    }

    proptest! {
        #[test]
        fn test_edit_script_always_applies(
            a in proptest::collection::vec("[ab]{0,3}", 0..12),
            b in proptest::collection::vec("[ab]{0,3}", 0..12),
        ) {
            let edits = MyersDiff::new(&a, &b).diff();
            prop_assert_eq!(apply(&a, &edits), b);
        }

        #[test]
        fn test_self_diff_has_no_edits(a in proptest::collection::vec("[ab]{0,3}", 0..12)) {
            let edits = MyersDiff::new(&a, &a).diff();
            prop_assert!(edits.iter().all(|e| e.kind == EditKind::Equal));
        }
    }
}
