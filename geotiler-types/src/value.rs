use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Dynamically typed property value of a feature.
///
/// Numbers are split by the parser: non-negative integers become [`PropertyValue::Uint`], negative integers become
/// [`PropertyValue::Int`] and everything else becomes [`PropertyValue::Double`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// `null` value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Non-negative integer.
    Uint(u64),
    /// Negative integer.
    Int(i64),
    /// Floating point number.
    Double(f64),
    /// Text value.
    String(String),
    /// List of values.
    Array(Vec<PropertyValue>),
    /// Nested key-value object.
    Object(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Kind tag of the value.
    pub fn kind(&self) -> ValueKind {
        match self {
            PropertyValue::Null => ValueKind::Null,
            PropertyValue::Bool(_) => ValueKind::Bool,
            PropertyValue::Uint(_) => ValueKind::Uint,
            PropertyValue::Int(_) => ValueKind::Int,
            PropertyValue::Double(_) => ValueKind::Double,
            PropertyValue::String(_) => ValueKind::String,
            PropertyValue::Array(_) => ValueKind::Array,
            PropertyValue::Object(_) => ValueKind::Object,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        if value >= 0 {
            Self::Uint(value as u64)
        } else {
            Self::Int(value)
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// Kind tag of a [`PropertyValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// [`PropertyValue::Null`].
    Null,
    /// [`PropertyValue::Bool`].
    Bool,
    /// [`PropertyValue::Uint`].
    Uint,
    /// [`PropertyValue::Int`].
    Int,
    /// [`PropertyValue::Double`].
    Double,
    /// [`PropertyValue::String`].
    String,
    /// [`PropertyValue::Array`].
    Array,
    /// [`PropertyValue::Object`].
    Object,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Uint => "unsigned integer",
            ValueKind::Int => "signed integer",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        write!(f, "{name}")
    }
}
