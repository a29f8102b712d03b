//! Per-column type coercion.
//!
//! A [`Coercion`] turns the trimmed text of one CSV cell into a [`Value`].
//! Built-in coercions are a closed set of variants; anything else goes through
//! [`Coercion::Custom`], which wraps a plain function.
//!
//! Every built-in maps the empty cell to [`Value::Absent`]. Text that does not
//! parse under the requested type is a *coercion failure*: in
//! [`CoercionMode::Lenient`] it degrades to `Absent`, in
//! [`CoercionMode::Strict`] the loading or retyping operation is rejected.
//!
//! ```
//! use visitframe::{Coercion, Value};
//!
//! assert_eq!(Coercion::Number.coerce("42"), Value::Number(42.0));
//! assert_eq!(Coercion::Number.coerce("n/a"), Value::Absent);
//! assert_eq!(Coercion::Boolean.coerce("0"), Value::Boolean(false));
//! assert_eq!(Coercion::Classic.coerce(""), Value::Absent);
//! ```

use crate::error::DatasetError;
use crate::value::Value;
use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default format of the `date` type: day/month/year.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Signature of a user-supplied coercion.
pub type CustomFn = dyn Fn(&str) -> Value + Send + Sync;

/// How a column's raw text becomes a typed value.
#[derive(Clone, Default)]
pub enum Coercion {
    /// Non-empty text passes through as a string.
    #[default]
    Classic,
    /// Same as [`Coercion::Classic`]; named for configuration readability.
    String,
    /// IEEE-754 double. Non-numeric text is a failure.
    Number,
    /// 128-bit integer. Non-integer text is a failure.
    BigInt,
    /// Numeric text becomes the truthiness of its number, other text is `true`.
    Boolean,
    /// JSON document.
    Object,
    /// Calendar date in the given `chrono` format, stored as UTC epoch milliseconds.
    Date(String),
    /// User function. Receives the trimmed cell, including the empty cell.
    Custom(Arc<CustomFn>),
}

impl Coercion {
    /// Wrap a function as a custom coercion.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Date coercion using [`DEFAULT_DATE_FORMAT`].
    #[must_use]
    pub fn date() -> Self {
        Self::Date(DEFAULT_DATE_FORMAT.to_string())
    }

    /// Type name used in configuration and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::String => "string",
            Self::Number => "number",
            Self::BigInt => "bigint",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Date(_) => "date",
            Self::Custom(_) => "custom",
        }
    }

    /// Coerce one cell, returning `None` when the text does not parse.
    #[must_use]
    pub fn try_coerce(&self, raw: &str) -> Option<Value> {
        match self {
            Self::Custom(f) => Some(f(raw)),
            _ if raw.is_empty() => Some(Value::Absent),
            Self::Classic | Self::String => Some(Value::String(raw.to_string())),
            Self::Number => parse_number(raw).map(Value::Number),
            Self::BigInt => raw.parse::<i128>().ok().map(Value::BigInt),
            Self::Boolean => Some(Value::Boolean(
                parse_number(raw).map_or(true, |n| n != 0.0),
            )),
            Self::Object => serde_json::from_str(raw).ok().map(Value::Object),
            Self::Date(format) => parse_date(raw, format).map(Value::Number),
        }
    }

    /// Coerce one cell, degrading failures to [`Value::Absent`].
    #[must_use]
    pub fn coerce(&self, raw: &str) -> Value {
        self.try_coerce(raw).unwrap_or(Value::Absent)
    }

    /// Re-apply this coercion to an already typed value.
    ///
    /// Text values are coerced as cells. Numeric targets convert other
    /// numeric values directly, and the pass-through types keep non-text
    /// values unchanged. Everything else is coerced from [`Value::to_raw`].
    #[must_use]
    pub fn recoerce(&self, value: &Value) -> Option<Value> {
        if let Value::String(s) = value {
            return self.try_coerce(s);
        }
        if value.is_absent() && !matches!(self, Self::Custom(_)) {
            return Some(Value::Absent);
        }
        match self {
            Self::Classic | Self::String => Some(value.clone()),
            Self::Number => value
                .as_f64()
                .filter(|n| !n.is_nan())
                .map(Value::Number),
            Self::BigInt => match value {
                Value::BigInt(n) => Some(Value::BigInt(*n)),
                other => other
                    .as_f64()
                    .filter(|n| n.is_finite() && n.fract() == 0.0)
                    .map(|n| Value::BigInt(n as i128)),
            },
            Self::Boolean => Some(Value::Boolean(
                value.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
            )),
            Self::Object | Self::Date(_) | Self::Custom(_) => self.try_coerce(&value.to_raw()),
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn parse_date(raw: &str, format: &str) -> Option<f64> {
    let date = NaiveDate::parse_from_str(raw, format).ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().timestamp_millis() as f64)
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(format) => f.debug_tuple("Date").field(format).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Coercion {
    type Err = DatasetError;

    /// Parse a type tag: `classic`, `string`, `number`, `bigint`, `boolean`,
    /// `object`, `date` or `date:<chrono format>`.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "classic" => Ok(Self::Classic),
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "bigint" => Ok(Self::BigInt),
            "boolean" => Ok(Self::Boolean),
            "object" => Ok(Self::Object),
            "date" => Ok(Self::date()),
            _ => match tag.strip_prefix("date:") {
                Some(format) if !format.is_empty() => Ok(Self::Date(format.to_string())),
                _ => Err(DatasetError::UnknownTypeTag {
                    tag: tag.to_string(),
                }),
            },
        }
    }
}

impl<'de> Deserialize<'de> for Coercion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(de::Error::custom)
    }
}

/// What to do with cells that fail their column's coercion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionMode {
    /// Store the cell as [`Value::Absent`] and keep going.
    #[default]
    Lenient,
    /// Reject the whole operation with [`DatasetError::Coercion`].
    Strict,
}
