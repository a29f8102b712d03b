//! Loading configuration.
//!
//! [`DatasetConfig`] says which columns to drop at load time, which coercion
//! each column gets, and which columns to encode right after loading. It can be
//! built in code or deserialized from JSON:
//!
//! ```
//! use visitframe::{CoercionMode, DatasetConfig};
//!
//! let config = DatasetConfig::from_json(
//!     r#"{
//!         "excluded": "comment",
//!         "types": { "Pulse": "number", "contact_date": "date" },
//!         "encoders": ["product_atc_code"],
//!         "coercion_mode": "strict"
//!     }"#,
//! )?;
//! assert_eq!(config.excluded, vec!["comment"]);
//! assert_eq!(config.coercion_mode, CoercionMode::Strict);
//! # Ok::<(), serde_json::Error>(())
//! ```

use crate::coerce::{Coercion, CoercionMode};
use crate::value::Value;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Options applied while a dataset is loaded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    /// Columns removed before any row is built. Unknown names are ignored.
    #[serde(deserialize_with = "one_or_many")]
    pub excluded: Vec<String>,
    /// Coercion per column; unlisted columns are [`Coercion::Classic`].
    pub types: HashMap<String, Coercion>,
    /// Columns encoded once loading is done.
    #[serde(deserialize_with = "one_or_many")]
    pub encoders: Vec<String>,
    pub coercion_mode: CoercionMode,
}

impl DatasetConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration document.
    ///
    /// # Errors
    /// Malformed JSON, unknown fields, or an unknown type tag.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    #[must_use]
    pub fn exclude(mut self, column: impl Into<String>) -> Self {
        self.excluded.push(column.into());
        self
    }

    #[must_use]
    pub fn with_type(mut self, column: impl Into<String>, coercion: Coercion) -> Self {
        self.types.insert(column.into(), coercion);
        self
    }

    /// Register a function as the coercion of `column`.
    #[must_use]
    pub fn with_custom<F>(self, column: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        self.with_type(column, Coercion::custom(f))
    }

    #[must_use]
    pub fn encode(mut self, column: impl Into<String>) -> Self {
        self.encoders.push(column.into());
        self
    }

    #[must_use]
    pub const fn coercion_mode(mut self, mode: CoercionMode) -> Self {
        self.coercion_mode = mode;
        self
    }

    /// Shorthand for [`CoercionMode::Strict`].
    #[must_use]
    pub const fn strict(self) -> Self {
        self.coercion_mode(CoercionMode::Strict)
    }

    #[must_use]
    pub fn is_excluded(&self, column: &str) -> bool {
        self.excluded.iter().any(|c| c == column)
    }
}

/// Accept either `"name"` or `["a", "b"]`.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}
