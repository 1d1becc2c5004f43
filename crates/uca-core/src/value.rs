//! # Primitive Values and Leaf Types
//!
//! The value model shared by the validator and the attribute engine.
//! `LeafType` names the resolved type of an attribute; `PrimitiveValue`
//! carries a leaf's runtime value.

use serde::{Deserialize, Serialize, Serializer};

/// Resolved type name of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafType {
    /// UTF-8 string.
    String,
    /// IEEE-754 double.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Composite with named child attributes.
    Object,
}

impl LeafType {
    /// Returns the type name as it appears in definitions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Object => "Object",
        }
    }

    /// Map a primitive type name to its leaf type. `Object` is not a
    /// primitive name: object types are always declared as inline schemas.
    pub fn from_primitive_name(name: &str) -> Option<Self> {
        match name {
            "String" => Some(Self::String),
            "Number" => Some(Self::Number),
            "Boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    /// True for `String`, `Number` and `Boolean`.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Object)
    }
}

impl std::fmt::Display for LeafType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime value of a leaf attribute.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PrimitiveValue {
    /// A boolean value.
    Boolean(bool),
    /// A numeric value.
    Number(f64),
    /// A string value.
    String(String),
}

impl PrimitiveValue {
    /// The leaf type this value inhabits.
    pub fn leaf_type(&self) -> LeafType {
        match self {
            Self::String(_) => LeafType::String,
            Self::Number(_) => LeafType::Number,
            Self::Boolean(_) => LeafType::Boolean,
        }
    }

    /// Convert a JSON scalar. Returns `None` for null, arrays and objects.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::String(s.clone())),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::Bool(b) => Some(Self::Boolean(*b)),
            _ => None,
        }
    }

    /// Convert to JSON. Integral numbers become JSON integers.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => match as_integer(*n) {
                Some(i) => serde_json::Value::from(i),
                None => serde_json::Number::from_f64(*n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            },
        }
    }
}

/// `Some(i)` when `n` is integral and exactly representable as `i64`.
pub fn as_integer(n: f64) -> Option<i64> {
    // 2^53: beyond this not every integer is representable in f64.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT {
        Some(n as i64)
    } else {
        None
    }
}

impl Serialize for PrimitiveValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PrimitiveValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for PrimitiveValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for PrimitiveValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for PrimitiveValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}
