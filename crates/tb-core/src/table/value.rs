//! Dynamic cell values and type tags
//!
//! `Value` is the dynamically typed view of one cell. NA is an explicit
//! sentinel: it sorts strictly below every real value and equals only NA.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Type tag for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Int,
    Float,
    Bool,
    Str,
}

impl ValueKind {
    /// Check if the kind supports arithmetic
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Float)
    }

    /// Parse raw text into a value of this kind.
    ///
    /// Empty or unparsable text maps to NA; this is the ingestion contract
    /// for row suppliers.
    pub fn parse(&self, text: &str) -> Value {
        let text = text.trim();
        if text.is_empty() {
            return Value::Na;
        }

        match self {
            ValueKind::Int => text.parse::<i64>().map(Value::Int).unwrap_or(Value::Na),
            ValueKind::Float => text.parse::<f64>().map(Value::Float).unwrap_or(Value::Na),
            ValueKind::Bool => match text {
                "true" | "TRUE" | "True" => Value::Bool(true),
                "false" | "FALSE" | "False" => Value::Bool(false),
                _ => Value::Na,
            },
            ValueKind::Str => Value::Str(text.to_string()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Int => write!(f, "int"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Str => write!(f, "str"),
        }
    }
}

/// A dynamically typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit missing-value sentinel
    Na,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// Check for the NA sentinel
    pub fn is_na(&self) -> bool {
        matches!(self, Value::Na)
    }

    /// The kind of a real value; NA has none
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Na => None,
            Value::Int(_) => Some(ValueKind::Int),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Str(_) => Some(ValueKind::Str),
        }
    }

    /// Short name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Na => "NA",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
        }
    }

    /// Numeric reading of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Total order over values.
    ///
    /// NA is strictly least and equal only to NA. Int and Float compare
    /// numerically against each other; remaining cross-kind pairs fall back
    /// to a fixed kind rank so the order stays total.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Na, Value::Na) => Ordering::Equal,
            (Value::Na, _) => Ordering::Less,
            (_, Value::Na) => Ordering::Greater,
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (a, b) => a.kind_rank().cmp(&b.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Na => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Bool(_) => 2,
            Value::Str(_) => 3,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        Some(self.total_cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Na => write!(f, "NA"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

/// Hashable form of a value, used for index and group key tuples.
///
/// Floats hash by bit pattern with -0.0 normalized to 0.0 so that equal
/// floats produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Na,
    Int(i64),
    Float(u64),
    Bool(bool),
    Str(String),
}

impl From<&Value> for Key {
    fn from(v: &Value) -> Self {
        match v {
            Value::Na => Key::Na,
            Value::Int(i) => Key::Int(*i),
            Value::Float(f) => {
                let f = if *f == 0.0 { 0.0 } else { *f };
                Key::Float(f.to_bits())
            }
            Value::Bool(b) => Key::Bool(*b),
            Value::Str(s) => Key::Str(s.clone()),
        }
    }
}

/// Key tuple for a slice of values
pub(crate) fn key_tuple(values: &[Value]) -> Vec<Key> {
    values.iter().map(Key::from).collect()
}

/// Render a key tuple for error messages
pub(crate) fn format_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
