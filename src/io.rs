//! File input and output.
//!
//! - [`csv`]: load a [`Dataset`](crate::Dataset) from a path, write one back
//! - [`compression`]: transparent (de)compression picked by extension or
//!   magic bytes

pub mod compression;
pub mod csv;

pub use self::csv::{read_dataset, write_dataset};
