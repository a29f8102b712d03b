//! Temporary files for loading and writing tests.

use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// A temporary file, deleted when dropped.
pub struct TempFilePath {
    #[allow(dead_code)]
    temp_file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn new() -> std::io::Result<Self> {
        Self::with_suffix("")
    }

    /// Create a temporary file whose name ends in `suffix` (e.g. `".csv.gz"`).
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn with_suffix(suffix: &str) -> std::io::Result<Self> {
        let temp_file = tempfile::Builder::new().suffix(suffix).tempfile()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A temporary directory, deleted with its contents when dropped.
pub struct TempDirPath {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A path inside this directory.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }
}

/// Write CSV text to a temporary `.csv` file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
///
/// # Example
///
/// ```
/// use visitframe::testing::{mock_csv_file, SAMPLE_VISITS_CSV};
/// use visitframe::{Dataset, DatasetConfig};
///
/// let file = mock_csv_file(SAMPLE_VISITS_CSV).unwrap();
/// let data = Dataset::from_path(file.path(), &DatasetConfig::new()).unwrap();
/// assert_eq!(data.len(), 9);
/// ```
pub fn mock_csv_file(text: &str) -> std::io::Result<TempFilePath> {
    let file = TempFilePath::with_suffix(".csv")?;
    std::fs::write(file.path(), text)?;
    Ok(file)
}

/// Write CSV text gzip-compressed to a temporary file ending in `suffix`.
///
/// Use `".csv.gz"` to exercise extension detection and `".csv"` for magic
/// byte detection.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
#[cfg(feature = "compression-gzip")]
pub fn mock_gzip_csv_file(text: &str, suffix: &str) -> std::io::Result<TempFilePath> {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let file = TempFilePath::with_suffix(suffix)?;
    let mut encoder = GzEncoder::new(std::fs::File::create(file.path())?, Compression::default());
    encoder.write_all(text.as_bytes())?;
    encoder.finish()?.flush()?;
    Ok(file)
}

/// Read a file written by a test, decompressing `.gz` output.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, decompressed or read.
pub fn read_output_text(path: impl AsRef<Path>) -> anyhow::Result<String> {
    use anyhow::Context;
    use std::io::Read;

    let path = path.as_ref();
    let f = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut text = String::new();
    crate::io::compression::auto_detect_reader(f, path)?
        .read_to_string(&mut text)
        .with_context(|| format!("read {}", path.display()))?;
    Ok(text)
}
