//! Error types for dataset operations.
//!
//! Every fallible engine operation validates its inputs before touching the
//! row store, so an `Err` always leaves the dataset exactly as it was.

use thiserror::Error;

/// Errors raised by the dataset engine.
#[derive(Debug, Error)]
pub enum DatasetError {
    // === Schema Errors ===
    /// A column name that is not part of the schema.
    #[error("column '{column}' does not exist")]
    UnknownColumn { column: String },

    /// A row that no longer carries a column the schema still lists.
    #[error("row {row} has no '{column}' column")]
    ColumnMissingFromRow { column: String, row: usize },

    /// A group filter keyed by a column that is not one of the grouping columns.
    #[error("column '{column}' is not one of the grouping columns")]
    NotAGroupingColumn { column: String },

    /// The header names the same column twice.
    #[error("duplicate column '{column}' in header")]
    DuplicateColumn { column: String },

    /// Adding a column under a name that is already taken.
    #[error("column '{column}' already exists")]
    ColumnExists { column: String },

    /// A row index past the end of the row store.
    #[error("row {row} is out of range for {len} rows")]
    RowOutOfRange { row: usize, len: usize },

    // === Coercion Errors ===
    /// A cell that does not parse under its column type (strict mode only).
    #[error("cannot coerce '{value}' in column '{column}' (line {line}) to {kind}")]
    Coercion {
        column: String,
        line: usize,
        value: String,
        kind: &'static str,
    },

    /// A type tag that names no built-in coercion.
    #[error("unknown column type '{tag}'")]
    UnknownTypeTag { tag: String },

    // === Input Errors ===
    /// The input has no non-blank line to use as a header.
    #[error("input has no header line")]
    MissingHeader,

    /// The underlying tokenizer failed (I/O or invalid UTF-8).
    #[error("failed to read CSV input: {0}")]
    Csv(#[from] csv::Error),
}

impl DatasetError {
    pub(crate) fn unknown(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
        }
    }

    /// True for errors caused by referencing columns the schema cannot satisfy.
    #[must_use]
    pub const fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownColumn { .. }
                | Self::ColumnMissingFromRow { .. }
                | Self::NotAGroupingColumn { .. }
                | Self::DuplicateColumn { .. }
                | Self::ColumnExists { .. }
        )
    }
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatasetError::unknown("person_id");
        assert_eq!(err.to_string(), "column 'person_id' does not exist");

        let err = DatasetError::Coercion {
            column: "Pulse".into(),
            line: 3,
            value: "abc".into(),
            kind: "number",
        };
        assert_eq!(
            err.to_string(),
            "cannot coerce 'abc' in column 'Pulse' (line 3) to number"
        );
    }

    #[test]
    fn test_schema_error_classification() {
        assert!(DatasetError::unknown("x").is_schema_error());
        assert!(
            DatasetError::ColumnMissingFromRow {
                column: "x".into(),
                row: 0
            }
            .is_schema_error()
        );
        assert!(!DatasetError::MissingHeader.is_schema_error());
    }
}
