//! Scalar operands carried by leaf filters

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A literal compared against column values
///
/// Serialized untagged, so `5`, `"5"` and `true` stay distinct on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean literal
    Bool(bool),
    /// Numeric literal
    Number(Number),
    /// String literal
    Text(String),
}

impl Scalar {
    /// Create a string scalar
    pub fn text(s: impl Into<String>) -> Self {
        Scalar::Text(s.into())
    }

    /// Create a float scalar; `None` for NaN and infinities
    pub fn float(f: f64) -> Option<Self> {
        Number::from_f64(f).map(Scalar::Number)
    }

    /// Integer view of the scalar, if it holds one
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// String view of the scalar, if it holds text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the scalar's kind, for messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "boolean",
            Scalar::Number(_) => "number",
            Scalar::Text(_) => "string",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Number(i.into())
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Number(i.into())
    }
}

impl From<u64> for Scalar {
    fn from(u: u64) -> Self {
        Scalar::Number(u.into())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}
