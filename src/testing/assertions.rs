//! Assertions over datasets, group trees and traversals.
//!
//! Each helper panics with both the expected and the actual data so a failing
//! test shows what the dataset looked like.

use crate::dataset::Dataset;
use crate::group::GroupTree;
use crate::row::Row;
use crate::value::Value;
use std::fmt::Debug;

/// Assert that two slices are equal in order and content.
///
/// # Panics
///
/// Panics if the slices differ in length or content.
///
/// # Example
///
/// ```
/// use visitframe::testing::assert_collections_equal;
///
/// assert_collections_equal(&[1, 2, 3], &[1, 2, 3]);
/// ```
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
}

/// Values of `column` in row store order; a row lacking the column reads as
/// `None`.
#[must_use]
pub fn column_values(dataset: &Dataset, column: &str) -> Vec<Option<Value>> {
    dataset
        .rows()
        .iter()
        .map(|row| row.get(column).cloned())
        .collect()
}

/// Assert the values of one column, in row store order.
///
/// # Panics
///
/// Panics if any row lacks the column or holds a different value.
///
/// # Example
///
/// ```
/// use visitframe::testing::{assert_column_values, CsvBuilder};
/// use visitframe::{DatasetConfig, Value};
///
/// let data = CsvBuilder::new(["a"]).row(["x"]).row([""]).load(&DatasetConfig::new()).unwrap();
/// assert_column_values(&data, "a", &[Value::from("x"), Value::Absent]);
/// ```
pub fn assert_column_values(dataset: &Dataset, column: &str, expected: &[Value]) {
    let expected: Vec<Option<Value>> = expected.iter().cloned().map(Some).collect();
    assert_collections_equal(&column_values(dataset, column), &expected);
}

/// Assert the order of rows by the data line each came from.
///
/// # Panics
///
/// Panics if the row store holds other lines or holds them in another order.
pub fn assert_lines(dataset: &Dataset, expected: &[usize]) {
    let lines: Vec<usize> = dataset.rows().iter().map(Row::line).collect();
    assert_collections_equal(&lines, expected);
}

/// Assert the sizes of a tree's terminal groups, depth-first.
///
/// # Panics
///
/// Panics if the sizes differ.
pub fn assert_group_sizes(tree: &GroupTree, expected: &[usize]) {
    assert_collections_equal(&tree.terminal_sizes(), expected);
}

/// Assert that every row matches a predicate.
///
/// # Panics
///
/// Panics with the first failing row.
pub fn assert_all_rows<F>(dataset: &Dataset, predicate: F)
where
    F: Fn(&Row) -> bool,
{
    if let Some((i, row)) = dataset.rows().iter().enumerate().find(|(_, r)| !predicate(r)) {
        panic!("Row {i} does not satisfy the predicate: {row:?}");
    }
}

/// Assert that every row carries exactly the schema's columns.
///
/// # Panics
///
/// Panics with the first row whose columns differ from the schema.
pub fn assert_rows_match_schema(dataset: &Dataset) {
    for (i, row) in dataset.rows().iter().enumerate() {
        let missing: Vec<&str> = dataset.columns().filter(|c| !row.contains(c)).collect();
        assert!(
            missing.is_empty() && row.len() == dataset.schema().len(),
            "Row {i} does not match the schema:\n  Missing: {missing:?}\n  Row: {row:?}"
        );
    }
}
