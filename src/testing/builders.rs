//! Fluent construction of CSV test inputs.

use crate::config::DatasetConfig;
use crate::dataset::Dataset;
use crate::error::Result;

/// Builds CSV text line by line.
///
/// # Example
///
/// ```
/// use visitframe::testing::CsvBuilder;
/// use visitframe::DatasetConfig;
///
/// let data = CsvBuilder::new(["person_id", "day"])
///     .row(["1", "3"])
///     .blank_line()
///     .row(["2", "5"])
///     .load(&DatasetConfig::new())
///     .unwrap();
/// assert_eq!(data.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvBuilder {
    lines: Vec<String>,
}

impl CsvBuilder {
    /// Start with a header line.
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::default().row(header)
    }

    /// Append a line of cells joined by commas.
    #[must_use]
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cells: Vec<String> = cells.into_iter().map(|c| c.as_ref().to_string()).collect();
        self.lines.push(cells.join(","));
        self
    }

    /// Append `count` copies of the same line.
    #[must_use]
    pub fn repeated<S: AsRef<str>>(mut self, cells: &[S], count: usize) -> Self {
        for _ in 0..count {
            self = self.row(cells);
        }
        self
    }

    /// Append an empty line, which loading skips.
    #[must_use]
    pub fn blank_line(mut self) -> Self {
        self.lines.push(String::new());
        self
    }

    /// Append a line verbatim.
    #[must_use]
    pub fn raw(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// The CSV text, one trailing newline included.
    #[must_use]
    pub fn build(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// Load the built text.
    ///
    /// # Errors
    /// Any loading error of [`Dataset::from_text`].
    pub fn load(&self, config: &DatasetConfig) -> Result<Dataset> {
        Dataset::from_text(&self.build(), config)
    }
}
