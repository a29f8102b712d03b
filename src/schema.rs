//! Column definitions.
//!
//! The [`Schema`] is the ordered list of columns a dataset currently carries.
//! Its order is the canonical column order of every row.

use crate::coerce::Coercion;
use crate::error::{DatasetError, Result};
use std::collections::HashMap;

/// One column of a [`Schema`].
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Column name, unique within the schema.
    pub name: String,
    /// Index of the column in the raw CSV line. `None` for derived columns.
    pub position: Option<usize>,
    /// Coercion applied to the column's cells.
    pub coercion: Coercion,
}

impl ColumnDef {
    /// A column read from position `position` of each CSV line.
    pub fn loaded(name: impl Into<String>, position: usize, coercion: Coercion) -> Self {
        Self {
            name: name.into(),
            position: Some(position),
            coercion,
        }
    }

    /// A column added after loading.
    pub fn derived(name: impl Into<String>, coercion: Coercion) -> Self {
        Self {
            name: name.into(),
            position: None,
            coercion,
        }
    }
}

/// Ordered mapping from column name to its definition.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Build a schema from header tokens, attaching the coercion configured for
    /// each name (or [`Coercion::Classic`]).
    ///
    /// # Errors
    /// [`DatasetError::DuplicateColumn`] if a name appears twice.
    pub fn from_header<S: AsRef<str>>(
        header: &[S],
        types: &HashMap<String, Coercion>,
    ) -> Result<Self> {
        Self::from_header_retaining(header, types, |_| true)
    }

    /// Like [`Schema::from_header`], but names rejected by `keep` are skipped
    /// before duplicates are checked. Retained columns keep their header position.
    ///
    /// # Errors
    /// [`DatasetError::DuplicateColumn`] if a retained name appears twice.
    pub fn from_header_retaining<S, F>(
        header: &[S],
        types: &HashMap<String, Coercion>,
        keep: F,
    ) -> Result<Self>
    where
        S: AsRef<str>,
        F: Fn(&str) -> bool,
    {
        let mut schema = Self::new();
        for (position, name) in header.iter().enumerate() {
            let name = name.as_ref();
            if !keep(name) {
                continue;
            }
            if schema.contains(name) {
                return Err(DatasetError::DuplicateColumn {
                    column: name.to_string(),
                });
            }
            let coercion = types.get(name).cloned().unwrap_or_default();
            schema.columns.push(ColumnDef::loaded(name, position, coercion));
        }
        Ok(schema)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Index of the column in schema order.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`Schema::get`], but a missing column is an error.
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`] if `name` is not in the schema.
    pub fn require(&self, name: &str) -> Result<&ColumnDef> {
        self.get(name).ok_or_else(|| DatasetError::unknown(name))
    }

    /// Check that every name is in the schema.
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`] for the first missing name.
    pub fn require_all<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        names
            .iter()
            .try_for_each(|n| self.require(n.as_ref()).map(|_| ()))
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Append a column.
    ///
    /// # Errors
    /// [`DatasetError::ColumnExists`] if the name is taken.
    pub fn push(&mut self, column: ColumnDef) -> Result<()> {
        if self.contains(&column.name) {
            return Err(DatasetError::ColumnExists {
                column: column.name,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Remove a column, returning its definition.
    pub fn remove(&mut self, name: &str) -> Option<ColumnDef> {
        let idx = self.index_of(name)?;
        Some(self.columns.remove(idx))
    }

    /// Replace a column's coercion.
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`] if `name` is not in the schema.
    pub fn set_coercion(&mut self, name: &str, coercion: Coercion) -> Result<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| DatasetError::unknown(name))?;
        column.coercion = coercion;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header_positions_and_types() {
        let types = HashMap::from([("id".to_string(), Coercion::Number)]);
        let schema = Schema::from_header(&["id", "date", "code"], &types).unwrap();

        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["id", "date", "code"]);
        assert_eq!(schema.get("code").unwrap().position, Some(2));
        assert!(matches!(schema.get("id").unwrap().coercion, Coercion::Number));
        assert!(matches!(schema.get("date").unwrap().coercion, Coercion::Classic));
    }

    #[test]
    fn test_duplicate_header() {
        let err = Schema::from_header(&["a", "b", "a"], &HashMap::new()).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateColumn { column } if column == "a"));

        let schema =
            Schema::from_header_retaining(&["a", "b", "a"], &HashMap::new(), |n| n != "a").unwrap();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.get("b").and_then(|c| c.position), Some(1));
    }

    #[test]
    fn test_push_remove() {
        let mut schema = Schema::from_header(&["a"], &HashMap::new()).unwrap();
        schema.push(ColumnDef::derived("b", Coercion::Number)).unwrap();
        assert!(schema.push(ColumnDef::derived("a", Coercion::Number)).is_err());
        assert_eq!(schema.get("b").unwrap().position, None);

        assert!(schema.remove("a").is_some());
        assert!(schema.remove("a").is_none());
        assert_eq!(schema.len(), 1);
        assert!(schema.require("a").unwrap_err().is_schema_error());
    }
}
