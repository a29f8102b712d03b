//! Testing utilities for dataset code.
//!
//! - **Fixtures**: a small visit-level sample ([`SAMPLE_VISITS_CSV`],
//!   [`sample_visits`]) with the configuration it is meant to be loaded with
//! - **Builders**: [`CsvBuilder`] to write CSV inputs line by line
//! - **Assertions**: compare columns, row order and group shapes with readable
//!   failure output
//! - **Mock I/O**: temporary files for path-based loading
//!
//! # Quick Start
//!
//! ```
//! use visitframe::testing::*;
//! use visitframe::{SortSpec, Value};
//!
//! let mut data = sample_visits();
//! data.filter(|row| row.get("person_id") == Some(&Value::Number(3.0)));
//! data.sort(&[SortSpec::desc("contact_date")]).unwrap();
//! assert_lines(&data, &[8, 3]);
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod mock_io;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use mock_io::*;
