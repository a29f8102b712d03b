//! Typed cell values.
//!
//! A [`Value`] is what a coercion produces from a raw CSV cell. Values are
//! hashable so they can key group trees and encoders: numbers use
//! SameValueZero semantics (`NaN` equals `NaN`, `-0.0` equals `0.0`) through
//! [`OrderedFloat`], and values of different variants never compare equal.

use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single typed cell.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Missing/empty cell.
    #[default]
    Absent,
    /// IEEE-754 double.
    Number(f64),
    /// Arbitrary integer parsed under the `bigint` type.
    BigInt(i128),
    /// Boolean.
    Boolean(bool),
    /// UTF-8 string.
    String(String),
    /// Parsed JSON document.
    Object(serde_json::Value),
    /// Dense categorical code assigned by an encoder.
    Code(u32),
}

/// Shared empty cell, for lookups that default a missing column.
pub(crate) static ABSENT: Value = Value::Absent;

impl Value {
    /// Shorthand for [`Value::Code`].
    #[must_use]
    pub const fn code(code: u32) -> Self {
        Self::Code(code)
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Numeric interpretation used by `asc`/`desc` ordering and numeric retyping.
    ///
    /// Numbers, big integers, codes and booleans are numeric; strings are numeric
    /// when their trimmed text parses as a float. `Absent` and objects are not.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::BigInt(n) => Some(*n as f64),
            Self::Code(c) => Some(f64::from(*c)),
            Self::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::String(s) => s.trim().parse().ok(),
            Self::Absent | Self::Object(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_code(&self) -> Option<u32> {
        match self {
            Self::Code(c) => Some(*c),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The numeric interpretation, with `NaN` treated as none.
    #[must_use]
    pub fn sort_key(&self) -> Option<f64> {
        self.as_f64().filter(|n| !n.is_nan())
    }

    /// Total order by numeric value, ascending.
    ///
    /// Values without a numeric interpretation (see [`Value::sort_key`]) form
    /// one block after every numeric value and tie among themselves, so a
    /// stable sort keeps their relative order.
    #[must_use]
    pub fn numeric_cmp(&self, other: &Self) -> Ordering {
        match (self.sort_key(), other.sort_key()) {
            (Some(a), Some(b)) => OrderedFloat(a).cmp(&OrderedFloat(b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Like [`Value::numeric_cmp`] with numeric values descending. The
    /// non-numeric block still sorts last.
    #[must_use]
    pub fn numeric_cmp_desc(&self, other: &Self) -> Ordering {
        match (self.sort_key(), other.sort_key()) {
            (Some(a), Some(b)) => OrderedFloat(b).cmp(&OrderedFloat(a)),
            _ => self.numeric_cmp(other),
        }
    }

    /// The cell text this value would have been read from.
    ///
    /// `Absent` renders as the empty string so re-coercion maps it back to `Absent`.
    #[must_use]
    pub fn to_raw(&self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Absent, Self::Absent) => true,
            (Self::Number(a), Self::Number(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Code(a), Self::Code(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Absent => {}
            Self::Number(n) => OrderedFloat(*n).hash(state),
            Self::BigInt(n) => n.hash(state),
            Self::Boolean(b) => b.hash(state),
            Self::String(s) => s.hash(state),
            // serde_json maps are ordered, so equal documents print identically.
            Self::Object(o) => o.to_string().hash(state),
            Self::Code(c) => c.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => Ok(()),
            Self::Number(n) => write!(f, "{n}"),
            Self::BigInt(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => f.write_str(s),
            Self::Object(o) => write!(f, "{o}"),
            Self::Code(c) => write!(f, "{c}"),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}
