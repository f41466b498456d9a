//! Attribute values stored in the columnar attribute tables

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single attribute cell
///
/// Ingested node attributes are few and flat (`source`, `id`, `type`,
/// `party`, `name`, `uname`), so only scalar kinds are supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    #[default]
    Null,
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Integer view; floats are truncated, booleans map to 0/1
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            PropertyValue::Float(f) => Some(*f as i64),
            PropertyValue::Boolean(b) => Some(*b as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Int(_) => "Int",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Text(_) => "Text",
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::Null => "Null",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Int(i) => write!(f, "{}", i),
            PropertyValue::Float(fl) => write!(f, "{}", fl),
            PropertyValue::Text(s) => write!(f, "\"{}\"", s),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Null => write!(f, "null"),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Int(i as i64)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_value_conversions() {
        let text: PropertyValue = "hello".into();
        assert_eq!(text.as_text(), Some("hello"));
        assert_eq!(text.as_int(), None);

        let int: PropertyValue = 42i64.into();
        assert_eq!(int.as_int(), Some(42));
        assert_eq!(int.as_float(), Some(42.0));

        let float: PropertyValue = 2.5.into();
        assert_eq!(float.as_int(), Some(2));

        assert!(PropertyValue::default().is_null());
        assert_eq!(PropertyValue::Boolean(true).type_name(), "Boolean");
    }

    #[test]
    fn test_display() {
        assert_eq!(PropertyValue::Text("x".into()).to_string(), "\"x\"");
        assert_eq!(PropertyValue::Null.to_string(), "null");
    }
}
