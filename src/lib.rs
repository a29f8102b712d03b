//! # visitframe
//!
//! A **tabular dataset engine** for visit-level feature engineering. It turns
//! raw delimited text into typed, mutable rows and provides the filter,
//! group-by, sort, encode and traverse primitives feature-engineering steps are
//! built from.
//!
//! ## Key Features
//!
//! - **Per-column coercions** - number, bigint, boolean, JSON object, date, or
//!   any function, applied leniently or strictly
//! - **Categorical encoders** - dense codes in first-seen order, incremental
//!   and reversible
//! - **Recursive grouping** - nested partitions by any sequence of columns
//! - **Grouped filters and sorts** - keep or reorder whole partitions
//! - **Traversal** - lazy iteration with group paths and links to the
//!   preceding row at every level
//! - **Column surgery** - retype, drop, add and derive columns in place
//! - **Gzip input** - transparent, behind the default `compression-gzip`
//!   feature
//!
//! ## Quick Start
//!
//! ```
//! use visitframe::*;
//!
//! # fn main() -> Result<(), DatasetError> {
//! let csv = "\
//! person_id,contact_date,atc
//! 1,10/01/2020,C07
//! 2,15/01/2020,C09
//! 1,03/01/2020,A10
//! ";
//! let config = DatasetConfig::new()
//!     .with_type("person_id", Coercion::Number)
//!     .with_type("contact_date", Coercion::date())
//!     .encode("atc");
//! let mut data = Dataset::from_text(csv, &config)?;
//!
//! // Visits per person, oldest first.
//! data.sort_with(
//!     &[SortSpec::asc("person_id"), SortSpec::asc("contact_date")],
//!     &SortOptions::new().group_by(["person_id"]),
//! )?;
//!
//! // Days since the person's previous visit.
//! let day = 86_400_000.0;
//! data.derive_column(
//!     "wait_days",
//!     &TraverseOptions::new().group_by(["person_id"]),
//!     |entry| {
//!         let date = entry.get("contact_date").and_then(Value::as_f64);
//!         let prev = entry.preceding(1).and_then(|r| r.get("contact_date")).and_then(Value::as_f64);
//!         match (date, prev) {
//!             (Some(d), Some(p)) => Value::Number((d - p) / day),
//!             _ => Value::Number(0.0),
//!         }
//!     },
//! )?;
//!
//! let waits: Vec<_> = data.rows().iter().map(|r| r.get("wait_days").cloned()).collect();
//! assert_eq!(waits, [Some(Value::Number(0.0)), Some(Value::Number(7.0)), Some(Value::Number(0.0))]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Dataset
//!
//! A [`Dataset`] owns three things: the [`Schema`] (ordered column
//! definitions), the row store (one [`Row`] per retained data line) and the
//! [`EncoderRegistry`]. Rows are created once at load time and afterwards only
//! moved; sorting and filtering never copy them.
//!
//! ### Values and coercions
//!
//! Every cell is a [`Value`]. A column's [`Coercion`] decides how raw text
//! becomes a value; the empty cell is always [`Value::Absent`]. Values are
//! hashable with SameValueZero semantics so they can key groups and encoders.
//!
//! ### Group trees
//!
//! [`Dataset::group_by`] returns a [`GroupTree`]: one level per column, keys in
//! first-seen order, row indices at the leaves. Trees index into the row store
//! and are only meaningful until the next mutation.
//!
//! ### Errors
//!
//! Engine operations return [`DatasetError`] and validate before mutating, so
//! an error leaves the dataset untouched. Path-based entry points return
//! `anyhow::Result` with the path as context.
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events (`debug` per
//! operation, `warn` for cells that failed coercion) and installs no
//! subscriber.
//!
//! ## Module Overview
//!
//! - [`dataset`] - The `Dataset` facade
//! - [`value`], [`coerce`], [`schema`], [`row`] - Data model
//! - [`config`] - Loading configuration
//! - [`encoder`] - Categorical encoders
//! - [`group`], [`filter`], [`sort`], [`traverse`] - Query and shaping engines
//! - [`io`] - CSV files and compression
//! - [`testing`] - Fixtures, builders and assertions for tests

pub mod coerce;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod filter;
pub mod group;
pub mod io;
pub mod row;
pub mod schema;
pub mod sort;
pub mod testing;
pub mod traverse;
pub mod value;

pub use coerce::{Coercion, CoercionMode};
pub use config::DatasetConfig;
pub use dataset::Dataset;
pub use encoder::{Encoder, EncoderRegistry};
pub use error::DatasetError;
pub use filter::{FilterOptions, Partition};
pub use group::{Children, GroupNode, GroupTree};
pub use io::{read_dataset, write_dataset};
pub use row::{Row, RowStore};
pub use schema::{ColumnDef, Schema};
pub use sort::{SortOptions, SortOrder, SortSpec};
pub use traverse::{Condition, Entry, Traversal, TraverseOptions};
pub use value::Value;
