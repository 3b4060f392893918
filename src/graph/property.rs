//! Property value types for graph nodes and edges

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Scalar property value
///
/// Supports:
/// - String
/// - Integer (i64)
/// - Float (f64)
/// - Boolean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Infer a scalar from a raw column value.
    ///
    /// Integer if it parses as i64, then finite Float, then `true`/`false`,
    /// otherwise the trimmed string. Blank input yields `None`.
    pub fn parse_scalar(raw: &str) -> Option<PropertyValue> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Some(PropertyValue::Integer(i));
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Some(PropertyValue::Float(f));
            }
        }
        if raw.eq_ignore_ascii_case("true") {
            return Some(PropertyValue::Boolean(true));
        }
        if raw.eq_ignore_ascii_case("false") {
            return Some(PropertyValue::Boolean(false));
        }
        Some(PropertyValue::String(raw.to_string()))
    }

    /// Get string value if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of integers and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Integer(i) => Some(*i as f64),
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Compare two values of compatible types.
    ///
    /// Numbers compare numerically across Integer/Float, strings
    /// case-insensitively. Mismatched types are incomparable.
    pub fn compare(&self, other: &PropertyValue) -> Option<Ordering> {
        match (self, other) {
            (PropertyValue::String(a), PropertyValue::String(b)) => {
                Some(a.to_lowercase().cmp(&b.to_lowercase()))
            }
            (PropertyValue::Boolean(a), PropertyValue::Boolean(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(fl) => write!(f, "{}", fl),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

// Convenience conversions
impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Integer(i as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

/// Property map for storing node and edge properties, in insertion order
pub type PropertyMap = IndexMap<String, PropertyValue>;
