//! CSV file input and output.
//!
//! - [`read_dataset`] opens a path, transparently decompresses it (see
//!   [`compression`](crate::io::compression)) and loads it with
//!   [`Dataset::from_reader`].
//! - [`write_dataset`] writes the schema columns back out, header first.
//!
//! Errors carry the path as `anyhow` context; the underlying
//! [`DatasetError`](crate::DatasetError) stays reachable with
//! `downcast_ref`.

use crate::config::DatasetConfig;
use crate::dataset::Dataset;
use crate::io::compression::{auto_detect_reader, auto_detect_writer};
use anyhow::{Context, Result};
use std::fs::{File, create_dir_all};
use std::path::Path;

/// Load a dataset from a CSV file.
///
/// # Errors
/// Returns an error if the file cannot be opened or decompressed, or if
/// loading fails.
pub fn read_dataset(path: impl AsRef<Path>, config: &DatasetConfig) -> Result<Dataset> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = auto_detect_reader(f, path)
        .with_context(|| format!("setup decompression for {}", path.display()))?;
    let dataset = Dataset::from_reader(rdr, config)
        .with_context(|| format!("load dataset from {}", path.display()))?;
    tracing::debug!(path = %path.display(), rows = dataset.len(), "read dataset");
    Ok(dataset)
}

/// Write a dataset as CSV, columns in schema order.
///
/// Cells are written with [`Value::to_raw`](crate::Value::to_raw): absent
/// cells are empty, encoded cells are their codes. Parent directories are
/// created as needed and a `.gz` extension compresses the output.
///
/// Returns the number of data rows written.
///
/// # Errors
/// Returns an error if the file or its directories cannot be created, or if
/// writing fails.
pub fn write_dataset(path: impl AsRef<Path>, dataset: &Dataset) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let w = auto_detect_writer(f, path)
        .with_context(|| format!("setup compression for {}", path.display()))?;
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(w);

    wtr.write_record(dataset.columns())
        .with_context(|| format!("write header to {}", path.display()))?;
    for (i, row) in dataset.rows().iter().enumerate() {
        let cells = dataset
            .columns()
            .map(|c| row.get(c).map(crate::Value::to_raw).unwrap_or_default());
        wtr.write_record(cells)
            .with_context(|| format!("write CSV row #{}", i + 1))?;
    }
    wtr.flush()?;
    Ok(dataset.len())
}
