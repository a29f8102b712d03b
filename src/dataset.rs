//! The dataset facade.
//!
//! A [`Dataset`] owns the [`Schema`], the [`RowStore`] and the
//! [`EncoderRegistry`]. Every shaping operation (filter, sort, encode, retype,
//! drop) rewrites the row store in place and synchronously; queries (group,
//! traverse) borrow it.
//!
//! Fallible operations validate everything they depend on before touching the
//! rows, so an `Err` leaves the dataset exactly as it was.
//!
//! # Loading
//!
//! Input is comma-separated UTF-8 text without quoting. Each cell is trimmed,
//! lines whose cells are all empty are skipped, and the first remaining line is
//! the header. Short lines read their missing cells as empty.
//!
//! ```
//! use visitframe::{Coercion, Dataset, DatasetConfig, SortSpec, Value};
//!
//! let csv = "\
//! person_id,contact_date,Pulse,comment
//! 2,03/01/2020,88,
//! 1,01/01/2020,72,first
//! 1,02/02/2020,n/a,
//! ";
//! let config = DatasetConfig::new()
//!     .exclude("comment")
//!     .with_type("person_id", Coercion::Number)
//!     .with_type("contact_date", Coercion::date())
//!     .with_type("Pulse", Coercion::Number);
//! let mut data = Dataset::from_text(csv, &config)?;
//! assert_eq!(data.columns().collect::<Vec<_>>(), ["person_id", "contact_date", "Pulse"]);
//! assert_eq!(data.rows()[2].get("Pulse"), Some(&Value::Absent));
//!
//! data.sort(&[SortSpec::asc("person_id"), SortSpec::asc("contact_date")])?;
//! let lines: Vec<usize> = data.rows().iter().map(|r| r.line()).collect();
//! assert_eq!(lines, [1, 2, 0]);
//! # Ok::<(), visitframe::DatasetError>(())
//! ```

use crate::coerce::{Coercion, CoercionMode};
use crate::config::DatasetConfig;
use crate::encoder::{Encoder, EncoderRegistry};
use crate::error::{DatasetError, Result};
use crate::filter::FilterOptions;
use crate::group::GroupTree;
use crate::row::{Row, RowStore};
use crate::schema::{ColumnDef, Schema};
use crate::sort::{self, SortOptions, SortSpec};
use crate::traverse::{Entry, Traversal, TraverseOptions};
use crate::value::{ABSENT, Value};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Typed, mutable, row-oriented table.
#[derive(Debug, Default)]
pub struct Dataset {
    schema: Schema,
    rows: RowStore,
    encoders: EncoderRegistry,
    mode: CoercionMode,
}

impl Dataset {
    // === Construction ===

    /// Load a dataset from CSV text.
    ///
    /// # Errors
    /// [`DatasetError::MissingHeader`] for blank input,
    /// [`DatasetError::DuplicateColumn`] for a repeated retained header name, and
    /// [`DatasetError::Coercion`] for a bad cell in strict mode.
    pub fn from_text(text: &str, config: &DatasetConfig) -> Result<Self> {
        Self::from_reader(text.as_bytes(), config)
    }

    /// Load a dataset from any reader of CSV text.
    ///
    /// # Errors
    /// As [`Dataset::from_text`], plus [`DatasetError::Csv`] for I/O failures
    /// and invalid UTF-8.
    pub fn from_reader<R: Read>(reader: R, config: &DatasetConfig) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = reader
            .records()
            .filter(|rec| rec.as_ref().map_or(true, |r| r.iter().any(|c| !c.is_empty())));

        let header = records.next().ok_or(DatasetError::MissingHeader)??;
        let header: Vec<&str> = header.iter().collect();
        let schema = Schema::from_header_retaining(&header, &config.types, |name| {
            !config.is_excluded(name)
        })?;
        for column in &config.excluded {
            if !header.contains(&column.as_str()) {
                tracing::debug!(column = %column, "excluded column not in header");
            }
        }
        for column in config.types.keys() {
            if !schema.contains(column) {
                tracing::debug!(column = %column, "type configured for missing column ignored");
            }
        }

        let strict = config.coercion_mode == CoercionMode::Strict;
        let mut failures: HashMap<&str, usize> = HashMap::new();
        let mut rows = Vec::new();
        for (line, record) in records.enumerate() {
            let record = record?;
            let mut row = Row::new(line);
            for column in schema.columns() {
                let raw = column.position.and_then(|p| record.get(p)).unwrap_or("");
                let value = match column.coercion.try_coerce(raw) {
                    Some(value) => value,
                    None if strict => {
                        return Err(DatasetError::Coercion {
                            column: column.name.clone(),
                            line,
                            value: raw.to_string(),
                            kind: column.coercion.name(),
                        });
                    }
                    None => {
                        *failures.entry(column.name.as_str()).or_default() += 1;
                        Value::Absent
                    }
                };
                row.set(column.name.clone(), value);
            }
            rows.push(row);
        }
        for (column, count) in &failures {
            tracing::warn!(column = %column, failures = count, "cells failed coercion and were stored as absent");
        }
        drop(failures);

        let mut dataset = Self {
            schema,
            rows: RowStore::new(rows),
            encoders: EncoderRegistry::new(),
            mode: config.coercion_mode,
        };
        tracing::debug!(
            rows = dataset.len(),
            columns = dataset.schema.len(),
            "loaded dataset"
        );
        dataset.encode(&config.encoders);
        Ok(dataset)
    }

    /// Load a dataset from a CSV file, gzip-compressed or not.
    ///
    /// # Errors
    /// Any loading error, with the path as context.
    pub fn from_path(path: impl AsRef<Path>, config: &DatasetConfig) -> anyhow::Result<Self> {
        crate::io::csv::read_dataset(path, config)
    }

    // === Accessors ===

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Column names in schema order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.schema.names()
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        self.rows.as_slice()
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Mutable access to one row. Writing columns outside the schema through
    /// this handle is allowed but they stay invisible to schema-driven
    /// operations.
    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    /// Set one cell, returning the previous value.
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`] or [`DatasetError::RowOutOfRange`].
    pub fn set_value(
        &mut self,
        index: usize,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        self.schema.require(column)?;
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(DatasetError::RowOutOfRange { row: index, len })?;
        Ok(row.set(column, value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    // === Encoding ===

    /// Encode the named columns, creating encoders on first use.
    ///
    /// Names outside the schema are skipped. Returns the number of codes
    /// newly assigned across all columns.
    pub fn encode<S: AsRef<str>>(&mut self, columns: &[S]) -> usize {
        let mut assigned = 0;
        for column in columns.iter().map(AsRef::as_ref) {
            if !self.schema.contains(column) {
                tracing::debug!(column = %column, "skipping encode of unknown column");
                continue;
            }
            let encoder = self.encoders.entry(column);
            let added = encoder.encode_rows(&mut self.rows);
            tracing::debug!(column = %column, added, total = encoder.len(), "encoded column");
            assigned += added;
        }
        assigned
    }

    /// Restore the original values of the named columns; all encoded columns
    /// when `columns` is empty. Columns without an encoder are skipped.
    ///
    /// Decoding is exact only if no encoded cell was overwritten since
    /// encoding.
    pub fn decode<S: AsRef<str>>(&mut self, columns: &[S]) {
        let targets: Vec<String> = if columns.is_empty() {
            self.encoders.columns().map(str::to_string).collect()
        } else {
            columns.iter().map(|c| c.as_ref().to_string()).collect()
        };
        for column in &targets {
            match self.encoders.get(column) {
                Some(encoder) => encoder.decode_rows(&mut self.rows),
                None => tracing::debug!(column = %column, "no encoder to decode with"),
            }
        }
    }

    #[must_use]
    pub fn encoder(&self, column: &str) -> Option<&Encoder> {
        self.encoders.get(column)
    }

    #[must_use]
    pub const fn encoders(&self) -> &EncoderRegistry {
        &self.encoders
    }

    // === Shaping ===

    /// Group all rows by `columns`, outermost first.
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`] or
    /// [`DatasetError::ColumnMissingFromRow`].
    pub fn group_by<S: AsRef<str>>(&self, columns: &[S]) -> Result<GroupTree> {
        self.schema.require_all(columns)?;
        let columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        GroupTree::build(self.rows.as_slice(), 0..self.rows.len(), columns)
    }

    /// Keep the rows matching `predicate`, in order. Returns how many were
    /// dropped.
    pub fn filter<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Row) -> bool,
    {
        let keep: Vec<bool> = self.rows.iter().map(|r| predicate(r)).collect();
        self.retain(&keep)
    }

    /// Flat and grouped filtering. Returns how many rows were dropped.
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`], [`DatasetError::NotAGroupingColumn`]
    /// or [`DatasetError::ColumnMissingFromRow`].
    pub fn filter_with(&mut self, options: &FilterOptions) -> Result<usize> {
        let keep = options.keep_mask(self.rows.as_slice(), &self.schema)?;
        Ok(self.retain(&keep))
    }

    fn retain(&mut self, keep: &[bool]) -> usize {
        let before = self.rows.len();
        self.rows.retain_mask(keep);
        let dropped = before - self.rows.len();
        tracing::debug!(dropped, remaining = self.rows.len(), "filtered rows");
        dropped
    }

    /// Stable flat sort, lexicographic over `specs`.
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`].
    pub fn sort(&mut self, specs: &[SortSpec]) -> Result<()> {
        self.sort_with(specs, &SortOptions::default())
    }

    /// Flat or grouped sort. See [`crate::sort`].
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`] or
    /// [`DatasetError::ColumnMissingFromRow`].
    pub fn sort_with(&mut self, specs: &[SortSpec], options: &SortOptions) -> Result<()> {
        sort::validate(specs, options, &self.schema)?;
        if options.grouping().is_empty() {
            self.rows.sort_by(|a, b| sort::compare_rows(specs, a, b));
        } else {
            let order = sort::grouped_order(self.rows.as_slice(), specs, options.grouping())?;
            self.rows.select(&order);
        }
        tracing::debug!(
            keys = specs.len(),
            groups = options.grouping().len(),
            "sorted rows"
        );
        Ok(())
    }

    /// Lazily walk the rows. See [`crate::traverse`].
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`] or
    /// [`DatasetError::ColumnMissingFromRow`].
    pub fn traverse(&self, options: &TraverseOptions) -> Result<Traversal<'_>> {
        options.validate(&self.schema)?;
        Traversal::new(self.rows.as_slice(), options)
    }

    // === Columns ===

    /// Replace the coercion of existing columns and re-apply it to every row.
    ///
    /// Existing values are re-typed with [`Coercion::recoerce`]. In strict mode
    /// any failure rejects the whole call; in lenient mode failures become
    /// [`Value::Absent`].
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`], or [`DatasetError::Coercion`] in strict
    /// mode.
    pub fn add_types<I, S>(&mut self, types: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, Coercion)>,
        S: Into<String>,
    {
        let types: Vec<(String, Coercion)> = types.into_iter().map(|(c, t)| (c.into(), t)).collect();
        for (column, _) in &types {
            self.schema.require(column)?;
        }

        let mut staged = Vec::with_capacity(types.len());
        for (column, coercion) in &types {
            let mut failures = 0usize;
            let mut values = Vec::with_capacity(self.rows.len());
            for row in &self.rows {
                let current = row.get(column).unwrap_or(&ABSENT);
                match coercion.recoerce(current) {
                    Some(value) => values.push(value),
                    None if self.mode == CoercionMode::Strict => {
                        return Err(DatasetError::Coercion {
                            column: column.clone(),
                            line: row.line(),
                            value: current.to_raw(),
                            kind: coercion.name(),
                        });
                    }
                    None => {
                        failures += 1;
                        values.push(Value::Absent);
                    }
                }
            }
            if failures > 0 {
                tracing::warn!(column = %column, failures, "cells failed coercion and were stored as absent");
            }
            staged.push(values);
        }

        for ((column, coercion), values) in types.into_iter().zip(staged) {
            for (row, value) in self.rows.iter_mut().zip(values) {
                row.set(column.as_str(), value);
            }
            tracing::debug!(column = %column, kind = coercion.name(), "retyped column");
            self.schema.set_coercion(&column, coercion)?;
        }
        Ok(())
    }

    /// Remove a column from the schema, from every row, and its encoder.
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`].
    pub fn drop_column(&mut self, column: &str) -> Result<()> {
        self.drop_columns(&[column])
    }

    /// Remove several columns at once. All names are checked before any
    /// column is removed.
    ///
    /// # Errors
    /// [`DatasetError::UnknownColumn`] for the first unknown name.
    pub fn drop_columns<S: AsRef<str>>(&mut self, columns: &[S]) -> Result<()> {
        self.schema.require_all(columns)?;
        for column in columns.iter().map(AsRef::as_ref) {
            self.schema.remove(column);
            for row in self.rows.iter_mut() {
                row.remove(column);
            }
            self.encoders.remove(column);
            tracing::debug!(column = %column, "dropped column");
        }
        Ok(())
    }

    /// Append a column holding `fill` in every row.
    ///
    /// `coercion` is recorded for later [`Dataset::add_types`]-style
    /// re-typing; `fill` is stored as given.
    ///
    /// # Errors
    /// [`DatasetError::ColumnExists`].
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        coercion: Coercion,
        fill: impl Into<Value>,
    ) -> Result<()> {
        let name = name.into();
        self.schema.push(ColumnDef::derived(name.as_str(), coercion))?;
        let fill = fill.into();
        for row in self.rows.iter_mut() {
            row.set(name.as_str(), fill.clone());
        }
        Ok(())
    }

    /// Compute a column from a traversal.
    ///
    /// `f` runs once per traversal entry; rows the traversal does not visit get
    /// [`Value::Absent`]. An existing column is overwritten, a new one is
    /// appended with [`Coercion::Classic`]. Returns the number of rows visited.
    ///
    /// # Errors
    /// Whatever [`Dataset::traverse`] raises for `options`.
    pub fn derive_column<F>(&mut self, name: &str, options: &TraverseOptions, mut f: F) -> Result<usize>
    where
        F: FnMut(&Entry<'_>) -> Value,
    {
        let computed: Vec<(usize, Value)> = self
            .traverse(options)?
            .map(|entry| (entry.index(), f(&entry)))
            .collect();
        if !self.schema.contains(name) {
            self.schema.push(ColumnDef::derived(name, Coercion::Classic))?;
        }

        let mut values = vec![Value::Absent; self.rows.len()];
        let visited = computed.len();
        for (index, value) in computed {
            values[index] = value;
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.set(name, value);
        }
        tracing::debug!(column = %name, visited, "derived column");
        Ok(visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "id,atc,pulse\n1,C09,70\n\n2,A10,x\n1,C09,\n , , \n";

    fn load(config: &DatasetConfig) -> Dataset {
        Dataset::from_text(CSV, config).unwrap()
    }

    #[test]
    fn test_blank_lines_skipped_and_lines_numbered() {
        let data = load(&DatasetConfig::new());
        assert_eq!(data.len(), 3);
        let lines: Vec<_> = data.rows().iter().map(Row::line).collect();
        assert_eq!(lines, vec![0, 1, 2]);
        assert_eq!(data.rows()[2].get("pulse"), Some(&Value::Absent));
    }

    #[test]
    fn test_missing_header() {
        let err = Dataset::from_text("\n , \n", &DatasetConfig::new()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingHeader));
    }

    #[test]
    fn test_strict_mode_rejects_bad_cell() {
        let config = DatasetConfig::new().with_type("pulse", Coercion::Number).strict();
        let err = Dataset::from_text(CSV, &config).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::Coercion { ref column, line: 1, ref value, kind: "number" }
                if column == "pulse" && value == "x"
        ));
    }

    #[test]
    fn test_encoders_applied_at_load() {
        let data = load(&DatasetConfig::new().encode("atc").encode("missing"));
        let codes: Vec<_> = data.rows().iter().map(|r| r.get("atc").cloned()).collect();
        assert_eq!(
            codes,
            vec![Some(Value::code(0)), Some(Value::code(1)), Some(Value::code(0))]
        );
        assert!(data.encoder("missing").is_none());
    }

    #[test]
    fn test_set_value_checks() {
        let mut data = load(&DatasetConfig::new());
        assert_eq!(data.set_value(0, "pulse", 71.0).unwrap(), Some(Value::from("70")));
        assert!(matches!(
            data.set_value(0, "nope", 1.0),
            Err(DatasetError::UnknownColumn { .. })
        ));
        assert!(matches!(
            data.set_value(9, "pulse", 1.0),
            Err(DatasetError::RowOutOfRange { row: 9, len: 3 })
        ));
    }

    #[test]
    fn test_add_types_strict_leaves_dataset_untouched() {
        let mut data = load(&DatasetConfig::new().strict());
        let err = data.add_types([("id", Coercion::Number), ("pulse", Coercion::Number)]);
        assert!(err.is_err());
        assert_eq!(data.rows()[0].get("id"), Some(&Value::from("1")));
        assert!(matches!(data.schema().get("id").unwrap().coercion, Coercion::Classic));
    }
}
