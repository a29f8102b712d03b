//! Flat and grouped row filtering.
//!
//! A flat filter is a row predicate. A grouped filter partitions the rows with
//! a [`GroupTree`] and hands every partition at a level to the predicate
//! registered for that level's column. A partition that fails is dropped with
//! everything below it; one that passes is kept and filtered further at the
//! next level.
//!
//! Survivors keep their row store order: grouping only decides *which* rows
//! stay, never where they go.
//!
//! ```no_run
//! use visitframe::{Dataset, DatasetConfig, FilterOptions, Value};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut data = Dataset::from_path("visits.csv", &DatasetConfig::default())?;
//! // Keep people with at least four visits, counting only coded visits.
//! let options = FilterOptions::new()
//!     .predicate(|row| row.get("product_atc_code").is_some_and(|v| !v.is_absent()))
//!     .group_by(["person_id"])
//!     .group_filter("person_id", |p| p.len() >= 4);
//! let dropped = data.filter_with(&options)?;
//! # Ok(())
//! # }
//! ```

use crate::error::{DatasetError, Result};
use crate::group::{GroupNode, GroupTree};
use crate::row::Row;
use crate::schema::Schema;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Predicate over a single row.
pub type RowPredicate = dyn Fn(&Row) -> bool + Send + Sync;

/// Predicate over one group partition.
pub type PartitionPredicate = dyn Fn(&Partition<'_>) -> bool + Send + Sync;

/// The view of one group handed to a grouped-filter predicate.
#[derive(Clone, Copy)]
pub struct Partition<'a> {
    column: &'a str,
    key: &'a Value,
    node: &'a GroupNode,
    rows: &'a [Row],
}

impl<'a> Partition<'a> {
    /// Grouping column of this partition's level.
    #[must_use]
    pub const fn column(&self) -> &'a str {
        self.column
    }

    /// Value of the grouping column shared by the partition's rows.
    #[must_use]
    pub const fn key(&self) -> &'a Value {
        self.key
    }

    /// Number of direct entries: sub-groups, or rows at the last level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.node.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node.is_empty()
    }

    /// True at the last grouping level, where entries are rows.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.node.is_terminal()
    }

    /// Number of rows in the partition across all sub-groups.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.node.row_count()
    }

    #[must_use]
    pub const fn node(&self) -> &'a GroupNode {
        self.node
    }

    /// Rows of the partition, depth-first in group order.
    pub fn rows(&self) -> impl Iterator<Item = &'a Row> + 'a {
        let rows = self.rows;
        self.node.flatten().into_iter().map(move |i| &rows[i])
    }
}

impl fmt::Debug for Partition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partition")
            .field("column", &self.column)
            .field("key", self.key)
            .field("len", &self.len())
            .finish()
    }
}

/// Options of [`Dataset::filter_with`](crate::Dataset::filter_with).
#[derive(Clone, Default)]
pub struct FilterOptions {
    predicate: Option<Arc<RowPredicate>>,
    group_by: Vec<String>,
    group_filters: Vec<(String, Arc<PartitionPredicate>)>,
}

impl FilterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Row predicate applied before any grouping.
    #[must_use]
    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Row) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
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

    /// Partition predicate for the level grouped by `column`.
    ///
    /// Registering a second predicate for the same column replaces the first.
    #[must_use]
    pub fn group_filter<F>(mut self, column: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Partition<'_>) -> bool + Send + Sync + 'static,
    {
        let column = column.into();
        self.group_filters.retain(|(c, _)| *c != column);
        self.group_filters.push((column, Arc::new(predicate)));
        self
    }

    /// Check the options against a schema.
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`] for grouping or filter columns missing
    /// from the schema, [`DatasetError::NotAGroupingColumn`] for a group filter
    /// whose column is not grouped on.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        schema.require_all(&self.group_by)?;
        for (column, _) in &self.group_filters {
            schema.require(column)?;
            if !self.group_by.contains(column) {
                return Err(DatasetError::NotAGroupingColumn {
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }

    /// Compute which rows survive, as a mask over `rows`.
    pub(crate) fn keep_mask(&self, rows: &[Row], schema: &Schema) -> Result<Vec<bool>> {
        self.validate(schema)?;
        let mut keep: Vec<bool> = match &self.predicate {
            Some(predicate) => rows.iter().map(|r| predicate(r)).collect(),
            None => vec![true; rows.len()],
        };
        if self.group_by.is_empty() {
            return Ok(keep);
        }

        let survivors = keep
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i));
        let mut tree = GroupTree::build(rows, survivors, self.group_by.clone())?;
        let levels: Vec<Option<Arc<PartitionPredicate>>> = self
            .group_by
            .iter()
            .map(|column| {
                self.group_filters
                    .iter()
                    .find(|(c, _)| c == column)
                    .map(|(_, p)| Arc::clone(p))
            })
            .collect();
        prune(tree.root_mut(), 0, &self.group_by, &levels, rows);

        keep.iter_mut().for_each(|k| *k = false);
        for idx in tree.flatten() {
            keep[idx] = true;
        }
        Ok(keep)
    }
}

impl fmt::Debug for FilterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterOptions")
            .field("predicate", &self.predicate.is_some())
            .field("group_by", &self.group_by)
            .field(
                "group_filters",
                &self.group_filters.iter().map(|(c, _)| c).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn prune(
    node: &mut GroupNode,
    level: usize,
    columns: &[String],
    predicates: &[Option<Arc<PartitionPredicate>>],
    rows: &[Row],
) {
    let Some(children) = node.children_mut() else {
        return;
    };
    if let Some(predicate) = &predicates[level] {
        let column = columns[level].as_str();
        children.retain(|key, child| {
            predicate(&Partition {
                column,
                key,
                node: child,
                rows,
            })
        });
    }
    for child in children.iter_mut() {
        prune(child, level + 1, columns, predicates, rows);
    }
}
