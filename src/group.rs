//! Recursive grouping of rows.
//!
//! A [`GroupTree`] partitions row indices by a sequence of columns, one tree
//! level per column. Internal nodes map the values of their level's column to
//! child nodes in first-seen order; terminal nodes hold row indices in row
//! store order. Every grouped row lands in exactly one terminal node.
//!
//! Trees hold indices into the dataset's row store, never rows, so they stay
//! valid only until the next mutating call on the dataset.

use crate::error::{DatasetError, Result};
use crate::row::Row;
use crate::value::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Ordered key → child mapping of an internal node.
#[derive(Debug, Clone, Default)]
pub struct Children {
    entries: Vec<(Value, GroupNode)>,
    index: HashMap<Value, usize>,
}

impl Children {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&GroupNode> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Child at position `i` in key order.
    #[must_use]
    pub fn get_index(&self, i: usize) -> Option<(&Value, &GroupNode)> {
        self.entries.get(i).map(|(k, n)| (k, n))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &GroupNode)> {
        self.entries.iter().map(|(k, n)| (k, n))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut GroupNode> {
        self.entries.iter_mut().map(|(_, n)| n)
    }

    fn get_or_insert(&mut self, key: &Value, depth: usize) -> &mut GroupNode {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key.clone(), GroupNode::empty(depth)));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Stable sort of the children by key.
    pub(crate) fn sort_keys_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        self.entries.sort_by(|(a, _), (b, _)| compare(a, b));
        self.reindex();
    }

    /// Keep the children for which `keep` returns true, in order.
    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Value, &GroupNode) -> bool,
    {
        self.entries.retain(|(k, n)| keep(k, n));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.clone(), i))
            .collect();
    }
}

/// One node of a group tree.
#[derive(Debug, Clone)]
pub enum GroupNode {
    /// Children keyed by the values of this level's column.
    Internal(Children),
    /// Row indices, in row store order.
    Terminal(Vec<usize>),
}

impl GroupNode {
    /// An empty node with `depth` levels of internal nodes above its terminals.
    fn empty(depth: usize) -> Self {
        if depth == 0 {
            Self::Terminal(Vec::new())
        } else {
            Self::Internal(Children::default())
        }
    }

    fn insert(&mut self, keys: &[&Value], row: usize) {
        match self {
            Self::Terminal(rows) => rows.push(row),
            Self::Internal(children) => {
                if let Some((key, rest)) = keys.split_first() {
                    children.get_or_insert(key, rest.len()).insert(rest, row);
                }
            }
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// Number of direct entries: child groups, or rows for a terminal node.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Internal(children) => children.len(),
            Self::Terminal(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of rows below this node.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            Self::Internal(children) => children.iter().map(|(_, n)| n.row_count()).sum(),
            Self::Terminal(rows) => rows.len(),
        }
    }

    #[must_use]
    pub const fn children(&self) -> Option<&Children> {
        match self {
            Self::Internal(children) => Some(children),
            Self::Terminal(_) => None,
        }
    }

    /// Row indices of a terminal node.
    #[must_use]
    pub fn rows(&self) -> Option<&[usize]> {
        match self {
            Self::Terminal(rows) => Some(rows),
            Self::Internal(_) => None,
        }
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&GroupNode> {
        self.children()?.get(key)
    }

    /// All row indices below this node, depth-first in key order.
    #[must_use]
    pub fn flatten(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.row_count());
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<usize>) {
        match self {
            Self::Internal(children) => {
                for (_, child) in children.iter() {
                    child.flatten_into(out);
                }
            }
            Self::Terminal(rows) => out.extend_from_slice(rows),
        }
    }

    /// Last row below this node in depth-first order.
    #[must_use]
    pub fn last_row(&self) -> Option<usize> {
        match self {
            Self::Internal(children) => children
                .entries
                .iter()
                .rev()
                .find_map(|(_, n)| n.last_row()),
            Self::Terminal(rows) => rows.last().copied(),
        }
    }

    /// Terminal row lists, depth-first in key order.
    #[must_use]
    pub fn terminals(&self) -> Vec<&[usize]> {
        let mut out = Vec::new();
        self.collect_terminals(&mut out);
        out
    }

    fn collect_terminals<'a>(&'a self, out: &mut Vec<&'a [usize]>) {
        match self {
            Self::Internal(children) => {
                for (_, child) in children.iter() {
                    child.collect_terminals(out);
                }
            }
            Self::Terminal(rows) => out.push(rows),
        }
    }

    pub(crate) fn rows_mut(&mut self) -> Option<&mut Vec<usize>> {
        match self {
            Self::Terminal(rows) => Some(rows),
            Self::Internal(_) => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Children> {
        match self {
            Self::Internal(children) => Some(children),
            Self::Terminal(_) => None,
        }
    }
}

/// A group tree together with the columns that shaped it.
#[derive(Debug, Clone)]
pub struct GroupTree {
    columns: Vec<String>,
    root: GroupNode,
}

impl GroupTree {
    /// Group the rows at `indices` by `columns`.
    ///
    /// Columns are expected to be schema columns; a row that lacks one
    /// entirely is an error. [`Value::Absent`] is an ordinary key.
    ///
    /// # Errors
    /// [`DatasetError::RowOutOfRange`] for an index past the end of `rows`, and
    /// [`DatasetError::ColumnMissingFromRow`] for the first row lacking a column.
    pub(crate) fn build<I>(rows: &[Row], indices: I, columns: Vec<String>) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut root = GroupNode::empty(columns.len());
        let mut keys: Vec<&Value> = Vec::with_capacity(columns.len());
        for idx in indices {
            let row = rows.get(idx).ok_or(DatasetError::RowOutOfRange {
                row: idx,
                len: rows.len(),
            })?;
            keys.clear();
            for column in &columns {
                let key = row.get(column).ok_or_else(|| DatasetError::ColumnMissingFromRow {
                    column: column.clone(),
                    row: idx,
                })?;
                keys.push(key);
            }
            root.insert(&keys, idx);
        }
        Ok(Self { columns, root })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of grouping levels.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub const fn root(&self) -> &GroupNode {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut GroupNode {
        &mut self.root
    }

    /// Follow a key path from the root.
    #[must_use]
    pub fn get(&self, path: &[Value]) -> Option<&GroupNode> {
        path.iter().try_fold(&self.root, |node, key| node.get(key))
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.root.row_count()
    }

    #[must_use]
    pub fn flatten(&self) -> Vec<usize> {
        self.root.flatten()
    }

    /// Sizes of the terminal groups, depth-first in key order.
    #[must_use]
    pub fn terminal_sizes(&self) -> Vec<usize> {
        self.root.terminals().iter().map(|t| t.len()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[(f64, &str)]) -> Vec<Row> {
        data.iter()
            .enumerate()
            .map(|(line, (id, date))| {
                let mut row = Row::new(line);
                row.set("id", *id);
                row.set("date", *date);
                row
            })
            .collect()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_level_first_seen_order() {
        let data = rows(&[(2.0, "a"), (1.0, "a"), (2.0, "b")]);
        let tree = GroupTree::build(&data, 0..data.len(), cols(&["id"])).unwrap();

        let keys: Vec<_> = tree.root().children().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec![Value::Number(2.0), Value::Number(1.0)]);
        assert_eq!(tree.terminal_sizes(), vec![2, 1]);
        assert_eq!(tree.flatten(), vec![0, 2, 1]);
    }

    #[test]
    fn test_two_levels() {
        let data = rows(&[(1.0, "a"), (1.0, "b"), (1.0, "a"), (2.0, "a")]);
        let tree = GroupTree::build(&data, 0..data.len(), cols(&["id", "date"])).unwrap();

        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.row_count(), 4);
        let person = tree.get(&[Value::Number(1.0)]).unwrap();
        assert_eq!(person.len(), 2);
        assert_eq!(person.row_count(), 3);
        assert_eq!(
            tree.get(&[Value::Number(1.0), Value::from("a")])
                .and_then(GroupNode::rows),
            Some(&[0, 2][..])
        );
        assert_eq!(person.last_row(), Some(1));
    }

    #[test]
    fn test_no_columns_is_single_terminal() {
        let data = rows(&[(1.0, "a"), (2.0, "b")]);
        let tree = GroupTree::build(&data, 0..2, Vec::new()).unwrap();
        assert!(tree.root().is_terminal());
        assert_eq!(tree.flatten(), vec![0, 1]);
    }

    #[test]
    fn test_row_missing_column() {
        let mut data = rows(&[(1.0, "a"), (2.0, "b")]);
        data[1].remove("date");
        let err = GroupTree::build(&data, 0..2, cols(&["date"])).unwrap_err();
        assert!(matches!(err, DatasetError::ColumnMissingFromRow { row: 1, .. }));
    }

    #[test]
    fn test_index_past_end() {
        let data = rows(&[(1.0, "a"), (2.0, "b")]);
        let err = GroupTree::build(&data, [0, 5], cols(&["id"])).unwrap_err();
        assert!(matches!(err, DatasetError::RowOutOfRange { row: 5, len: 2 }));
    }
}
