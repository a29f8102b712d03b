//! Flat and grouped sorting.
//!
//! A sort is a sequence of [`SortSpec`]s applied lexicographically: later
//! specs only break ties left by earlier ones. All sorts are stable.
//!
//! With [`SortOptions::group_by`] the rows are first grouped. At each level
//! whose column has a spec, the level's groups are reordered by comparing
//! their key values; rows inside terminal groups are ordered by the specs on
//! non-grouping columns. The tree is then laid out depth-first as the new row
//! order, so every group ends up contiguous.

use crate::error::Result;
use crate::group::{GroupNode, GroupTree};
use crate::row::Row;
use crate::schema::Schema;
use crate::value::{ABSENT, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Value comparator: negative/zero/positive as `Less`/`Equal`/`Greater`.
pub type Comparator = dyn Fn(&Value, &Value) -> Ordering + Send + Sync;

/// Direction or comparator of one sort key.
#[derive(Clone)]
pub enum SortOrder {
    /// Ascending by numeric value; non-numeric values last.
    Asc,
    /// Descending by numeric value; non-numeric values last.
    Desc,
    /// Explicit comparator, required for non-numeric columns.
    By(Arc<Comparator>),
}

impl SortOrder {
    pub fn by<F>(compare: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        Self::By(Arc::new(compare))
    }

    /// Compare two values. `Asc`/`Desc` are total orders that place values
    /// without a numeric interpretation after all numbers, as ties.
    #[must_use]
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match self {
            Self::Asc => a.numeric_cmp(b),
            Self::Desc => a.numeric_cmp_desc(b),
            Self::By(compare) => compare(a, b),
        }
    }
}

impl fmt::Debug for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("Asc"),
            Self::Desc => f.write_str("Desc"),
            Self::By(_) => f.write_str("By(..)"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// One sort key: a column and how to order it.
#[derive(Debug, Clone)]
pub struct SortSpec {
    pub column: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, SortOrder::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, SortOrder::Desc)
    }

    pub fn by<F>(column: impl Into<String>, compare: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        Self::new(column, SortOrder::by(compare))
    }

    fn compare_rows(&self, a: &Row, b: &Row) -> Ordering {
        let av = a.get(&self.column).unwrap_or(&ABSENT);
        let bv = b.get(&self.column).unwrap_or(&ABSENT);
        self.order.compare(av, bv)
    }
}

/// Options of [`Dataset::sort_with`](crate::Dataset::sort_with).
#[derive(Debug, Clone, Default)]
pub struct SortOptions {
    group_by: Vec<String>,
}

impl SortOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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

    #[must_use]
    pub fn grouping(&self) -> &[String] {
        &self.group_by
    }
}

/// Lexicographic comparison of two rows under `specs`.
#[must_use]
pub fn compare_rows(specs: &[SortSpec], a: &Row, b: &Row) -> Ordering {
    specs
        .iter()
        .map(|spec| spec.compare_rows(a, b))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Check every spec and grouping column against the schema.
pub(crate) fn validate(specs: &[SortSpec], options: &SortOptions, schema: &Schema) -> Result<()> {
    for spec in specs {
        schema.require(&spec.column)?;
    }
    schema.require_all(&options.group_by)
}

/// New row order of a grouped sort, as indices into `rows`.
pub(crate) fn grouped_order(
    rows: &[Row],
    specs: &[SortSpec],
    group_by: &[String],
) -> Result<Vec<usize>> {
    let mut tree = GroupTree::build(rows, 0..rows.len(), group_by.to_vec())?;
    let level_orders: Vec<Option<&SortOrder>> = group_by
        .iter()
        .map(|column| specs.iter().find(|s| s.column == *column).map(|s| &s.order))
        .collect();
    let row_specs: Vec<SortSpec> = specs
        .iter()
        .filter(|s| !group_by.contains(&s.column))
        .cloned()
        .collect();
    sort_node(tree.root_mut(), 0, &level_orders, &row_specs, rows);
    Ok(tree.flatten())
}

fn sort_node(
    node: &mut GroupNode,
    level: usize,
    level_orders: &[Option<&SortOrder>],
    row_specs: &[SortSpec],
    rows: &[Row],
) {
    if let Some(indices) = node.rows_mut() {
        if !row_specs.is_empty() {
            indices.sort_by(|&i, &j| compare_rows(row_specs, &rows[i], &rows[j]));
        }
        return;
    }
    if let Some(children) = node.children_mut() {
        if let Some(order) = level_orders[level] {
            children.sort_keys_by(|a, b| order.compare(a, b));
        }
        for child in children.iter_mut() {
            sort_node(child, level + 1, level_orders, row_specs, rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[(f64, f64)]) -> Vec<Row> {
        data.iter()
            .enumerate()
            .map(|(line, (id, t))| {
                let mut row = Row::new(line);
                row.set("id", *id);
                row.set("t", *t);
                row
            })
            .collect()
    }

    #[test]
    fn test_compare_rows_tiebreak() {
        let r = rows(&[(1.0, 5.0), (1.0, 3.0), (0.0, 9.0)]);
        let specs = [SortSpec::asc("id"), SortSpec::desc("t")];
        assert_eq!(compare_rows(&specs, &r[0], &r[1]), Ordering::Less);
        assert_eq!(compare_rows(&specs, &r[2], &r[0]), Ordering::Less);
    }

    #[test]
    fn test_comparator_order() {
        let by_text = SortOrder::by(|a, b| a.to_raw().cmp(&b.to_raw()));
        assert_eq!(
            by_text.compare(&Value::from("b"), &Value::from("a")),
            Ordering::Greater
        );
        assert_eq!("desc".parse::<SortOrder>().map(|o| format!("{o:?}")), Ok("Desc".into()));
        assert!("up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_grouped_order() {
        // groups first seen: id 2, id 1; sort groups ascending, rows by t desc
        let r = rows(&[(2.0, 1.0), (1.0, 1.0), (2.0, 3.0), (1.0, 2.0)]);
        let order = grouped_order(
            &r,
            &[SortSpec::asc("id"), SortSpec::desc("t")],
            &["id".to_string()],
        )
        .unwrap();
        assert_eq!(order, vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_grouped_order_without_level_spec_keeps_first_seen() {
        let r = rows(&[(2.0, 1.0), (1.0, 1.0), (2.0, 0.0)]);
        let order = grouped_order(&r, &[SortSpec::asc("t")], &["id".to_string()]).unwrap();
        assert_eq!(order, vec![2, 0, 1]);
    }
}
