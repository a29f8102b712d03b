//! Row traversal.
//!
//! [`Dataset::traverse`](crate::Dataset::traverse) returns a [`Traversal`], a
//! lazy iterator of [`Entry`] values. Every call builds a fresh iterator; it
//! borrows the row store, so the dataset cannot be mutated while one is alive.
//! Collect what you need first, then write it back.
//!
//! Three shapes are supported:
//!
//! - **plain**: every row in row store order;
//! - **filtered** (`filter_by`): only rows matching every condition, each
//!   entry carrying its running `filtered_index`;
//! - **grouped** (`group_by`, optionally filtered): rows in group traversal
//!   order, each entry carrying its position `path` in the group tree, the
//!   chain of group keys, and links to the preceding row at every level.
//!
//! ```
//! use visitframe::{Coercion, Dataset, DatasetConfig, TraverseOptions};
//!
//! let csv = "person,day\np1,1\np2,5\np1,3\n";
//! let config = DatasetConfig::new().with_type("day", Coercion::Number);
//! let data = Dataset::from_text(csv, &config)?;
//!
//! let options = TraverseOptions::new().group_by(["person"]);
//! let gaps: Vec<Option<f64>> = data
//!     .traverse(&options)?
//!     .map(|entry| {
//!         let day = entry.get("day")?.as_f64()?;
//!         let prev = entry.preceding(1)?.get("day")?.as_f64()?;
//!         Some(day - prev)
//!     })
//!     .collect();
//! assert_eq!(gaps, vec![None, Some(2.0), None]);
//! # Ok::<(), visitframe::DatasetError>(())
//! ```

use crate::error::Result;
use crate::group::{GroupNode, GroupTree};
use crate::row::Row;
use crate::schema::Schema;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Test applied to one cell by a traversal filter.
#[derive(Clone)]
pub enum Condition {
    /// The cell equals the value. A row lacking the column never matches.
    Equals(Value),
    /// The cell satisfies the predicate. Rows lacking the column are tested
    /// against [`Value::Absent`].
    Matches(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

impl Condition {
    pub fn matches<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Matches(Arc::new(predicate))
    }

    fn test(&self, cell: Option<&Value>) -> bool {
        match self {
            Self::Equals(expected) => cell.is_some_and(|v| v == expected),
            Self::Matches(predicate) => predicate(cell.unwrap_or(&Value::Absent)),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(value) => f.debug_tuple("Equals").field(value).finish(),
            Self::Matches(_) => f.write_str("Matches(..)"),
        }
    }
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        Self::Equals(value)
    }
}

/// Options of [`Dataset::traverse`](crate::Dataset::traverse).
#[derive(Debug, Clone, Default)]
pub struct TraverseOptions {
    filter_by: Vec<(String, Condition)>,
    group_by: Vec<String>,
    ignore_groups: bool,
}

impl TraverseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition; a row is visited only if it meets all of them.
    #[must_use]
    pub fn filter_by(mut self, column: impl Into<String>, condition: impl Into<Condition>) -> Self {
        self.filter_by.push((column.into(), condition.into()));
        self
    }

    /// Shorthand for an [`Condition::Equals`] filter.
    #[must_use]
    pub fn equals(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter_by(column, Condition::Equals(value.into()))
    }

    /// Shorthand for a [`Condition::Matches`] filter.
    #[must_use]
    pub fn matching<F>(self, column: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.filter_by(column, Condition::matches(predicate))
    }

    /// Grouping columns, outermost first.
    #[must_use]
    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Leave [`Entry::groups`] empty for grouped traversals.
    #[must_use]
    pub const fn ignore_groups(mut self, ignore: bool) -> Self {
        self.ignore_groups = ignore;
        self
    }

    #[must_use]
    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty()
    }

    #[must_use]
    pub fn is_filtered(&self) -> bool {
        !self.filter_by.is_empty()
    }

    pub(crate) fn validate(&self, schema: &Schema) -> Result<()> {
        for (column, _) in &self.filter_by {
            schema.require(column)?;
        }
        schema.require_all(&self.group_by)
    }

    fn admits(&self, row: &Row) -> bool {
        self.filter_by
            .iter()
            .all(|(column, condition)| condition.test(row.get(column)))
    }
}

/// One step of a traversal.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    row: &'a Row,
    index: usize,
    store: &'a [Row],
    filtered_index: Option<usize>,
    path: Option<Vec<usize>>,
    groups: Option<Vec<Value>>,
    preceding: Vec<Option<usize>>,
}

impl<'a> Entry<'a> {
    #[must_use]
    pub const fn row(&self) -> &'a Row {
        self.row
    }

    /// Shorthand for `self.row().get(column)`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.row.get(column)
    }

    /// Index of the row in the row store.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The whole row store, for look-behind and look-ahead.
    #[must_use]
    pub const fn store(&self) -> &'a [Row] {
        self.store
    }

    /// Position among the rows that passed `filter_by`. `None` when the
    /// traversal is unfiltered.
    #[must_use]
    pub const fn filtered_index(&self) -> Option<usize> {
        self.filtered_index
    }

    /// Position at each grouping level, then within the terminal group.
    /// `None` for ungrouped traversals.
    #[must_use]
    pub fn path(&self) -> Option<&[usize]> {
        self.path.as_deref()
    }

    /// Group keys from the outermost level inwards. `None` for ungrouped
    /// traversals and when groups are ignored.
    #[must_use]
    pub fn groups(&self) -> Option<&[Value]> {
        self.groups.as_deref()
    }

    /// Whether the entry opens its group at `level`.
    ///
    /// For ungrouped traversals only level 0 exists and means "first visited
    /// row". Out-of-range levels are never first.
    #[must_use]
    pub fn is_first(&self, level: usize) -> bool {
        match &self.path {
            Some(path) => path.get(level) == Some(&0),
            None => level == 0 && self.preceding[0].is_none(),
        }
    }

    /// The row right before this entry's level-`level` subtree among its
    /// siblings: the last row of the previous group at that level, or the
    /// previous row of the same terminal group at the deepest level.
    ///
    /// `None` when the subtree is the first of its siblings. For ungrouped
    /// traversals level 0 is the previously visited row.
    #[must_use]
    pub fn preceding(&self, level: usize) -> Option<&'a Row> {
        let idx = (*self.preceding.get(level)?)?;
        self.store.get(idx)
    }

    /// Row store index of [`Entry::preceding`].
    #[must_use]
    pub fn preceding_index(&self, level: usize) -> Option<usize> {
        self.preceding.get(level).copied().flatten()
    }
}

enum Cursor {
    Flat {
        next: usize,
        previous: Option<usize>,
    },
    Grouped {
        tree: GroupTree,
        path: Vec<usize>,
        started: bool,
    },
    Done,
}

/// Lazy iterator of [`Entry`] values. See the [module docs](self).
pub struct Traversal<'a> {
    rows: &'a [Row],
    options: TraverseOptions,
    emitted: usize,
    cursor: Cursor,
}

impl<'a> Traversal<'a> {
    pub(crate) fn new(rows: &'a [Row], options: &TraverseOptions) -> Result<Self> {
        let cursor = if options.is_grouped() {
            let admitted = (0..rows.len()).filter(|&i| options.admits(&rows[i]));
            let tree = GroupTree::build(rows, admitted, options.group_by.clone())?;
            Cursor::Grouped {
                path: vec![0; tree.depth() + 1],
                tree,
                started: false,
            }
        } else {
            Cursor::Flat {
                next: 0,
                previous: None,
            }
        };
        Ok(Self {
            rows,
            options: options.clone(),
            emitted: 0,
            cursor,
        })
    }

    fn next_flat(&mut self) -> Option<Entry<'a>> {
        let rows = self.rows;
        let Cursor::Flat { next, previous } = &mut self.cursor else {
            return None;
        };
        while *next < rows.len() {
            let index = *next;
            *next += 1;
            if !self.options.admits(&rows[index]) {
                continue;
            }
            let preceding = vec![previous.replace(index)];
            let entry = Entry {
                row: &rows[index],
                index,
                store: rows,
                filtered_index: self.options.is_filtered().then_some(self.emitted),
                path: None,
                groups: None,
                preceding,
            };
            self.emitted += 1;
            return Some(entry);
        }
        self.cursor = Cursor::Done;
        None
    }

    fn next_grouped(&mut self) -> Option<Entry<'a>> {
        let Cursor::Grouped {
            tree,
            path,
            started,
        } = &mut self.cursor
        else {
            return None;
        };
        let found = if *started {
            advance(tree.root(), path)
        } else {
            *started = true;
            descend(tree.root(), path, 0)
        };
        if !found {
            self.cursor = Cursor::Done;
            return None;
        }
        let (index, preceding, groups) = locate(tree.root(), path, !self.options.ignore_groups)?;
        let entry = Entry {
            row: &self.rows[index],
            index,
            store: self.rows,
            filtered_index: self.options.is_filtered().then_some(self.emitted),
            path: Some(path.clone()),
            groups,
            preceding,
        };
        self.emitted += 1;
        Some(entry)
    }
}

impl<'a> Iterator for Traversal<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor {
            Cursor::Flat { .. } => self.next_flat(),
            Cursor::Grouped { .. } => self.next_grouped(),
            Cursor::Done => None,
        }
    }
}

impl fmt::Debug for Traversal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traversal")
            .field("options", &self.options)
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}

/// Node reached by following `path[..level]` from `root`.
fn node_at<'t>(root: &'t GroupNode, path: &[usize]) -> Option<&'t GroupNode> {
    path.iter().try_fold(root, |node, &i| {
        node.children()?.get_index(i).map(|(_, child)| child)
    })
}

/// Set `path[level..]` to the first row below the node at `path[..level]`.
/// `level` never exceeds the tree depth.
fn descend(root: &GroupNode, path: &mut [usize], level: usize) -> bool {
    path[level..].iter_mut().for_each(|p| *p = 0);
    let Some(mut node) = node_at(root, &path[..level]) else {
        return false;
    };
    while let Some(children) = node.children() {
        match children.get_index(0) {
            Some((_, child)) => node = child,
            None => return false,
        }
    }
    !node.is_empty()
}

/// Move `path` to the next row in depth-first order.
fn advance(root: &GroupNode, path: &mut [usize]) -> bool {
    let depth = path.len() - 1;
    for level in (0..=depth).rev() {
        let Some(parent) = node_at(root, &path[..level]) else {
            continue;
        };
        if path[level] + 1 < parent.len() {
            path[level] += 1;
            return level == depth || descend(root, path, level + 1);
        }
    }
    false
}

type Located = (usize, Vec<Option<usize>>, Option<Vec<Value>>);

/// Row index, preceding rows per level and key chain at `path`.
fn locate(root: &GroupNode, path: &[usize], with_groups: bool) -> Option<Located> {
    let depth = path.len() - 1;
    let mut preceding = Vec::with_capacity(path.len());
    let mut groups = with_groups.then(|| Vec::with_capacity(depth));
    let mut node = root;
    for &pos in &path[..depth] {
        let children = node.children()?;
        let before = pos
            .checked_sub(1)
            .and_then(|p| children.get_index(p))
            .and_then(|(_, sibling)| sibling.last_row());
        preceding.push(before);
        let (key, child) = children.get_index(pos)?;
        if let Some(groups) = groups.as_mut() {
            groups.push(key.clone());
        }
        node = child;
    }
    let rows = node.rows()?;
    let pos = path[depth];
    preceding.push(pos.checked_sub(1).map(|p| rows[p]));
    Some((*rows.get(pos)?, preceding, groups))
}
