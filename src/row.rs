//! Rows and the row store.
//!
//! A [`Row`] is a name-keyed bag of values. Rows are created once per CSV
//! data line and then only ever moved: the [`RowStore`] reorders and drops
//! rows by index, it never clones them.

use crate::schema::Schema;
use crate::value::Value;
use std::collections::HashMap;

/// One record of the dataset.
#[derive(Debug, Default, PartialEq)]
pub struct Row {
    line: usize,
    cells: HashMap<String, Value>,
}

impl Row {
    /// An empty row originating from data line `line` (0-based, header excluded).
    #[must_use]
    pub fn new(line: usize) -> Self {
        Self {
            line,
            cells: HashMap::new(),
        }
    }

    /// Data line this row was read from.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut Value> {
        self.cells.get_mut(column)
    }

    /// Set a cell, returning the previous value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.cells.insert(column.into(), value.into())
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.cells.remove(column)
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when the row holds no value other than [`Value::Absent`].
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(Value::is_absent)
    }

    /// Cells in schema order. Columns the row lacks are skipped.
    pub fn ordered<'a>(&'a self, schema: &'a Schema) -> impl Iterator<Item = (&'a str, &'a Value)> {
        schema
            .names()
            .filter_map(|name| self.cells.get(name).map(|v| (name, v)))
    }
}

/// The dataset's ordered collection of rows.
#[derive(Debug, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    #[must_use]
    pub const fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Row> {
        self.rows.iter_mut()
    }

    /// Replace the store with the rows at `order`, in that order.
    ///
    /// `order` holds distinct indices; rows not listed are dropped. Used both
    /// for permutations (sort) and for subsets (filter).
    pub fn select(&mut self, order: &[usize]) {
        let mut slots: Vec<Option<Row>> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(Some)
            .collect();
        self.rows = order
            .iter()
            .filter_map(|&idx| slots.get_mut(idx).and_then(Option::take))
            .collect();
        debug_assert_eq!(self.rows.len(), order.len(), "select: duplicate index");
    }

    /// Keep the rows whose `keep` flag is set, preserving order.
    pub fn retain_mask(&mut self, keep: &[bool]) {
        let mut flags = keep.iter();
        self.rows.retain(|_| flags.next().copied().unwrap_or(false));
    }

    /// Stable sort with a row comparator.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Row, &Row) -> std::cmp::Ordering,
    {
        self.rows.sort_by(compare);
    }
}

impl<'a> IntoIterator for &'a RowStore {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
