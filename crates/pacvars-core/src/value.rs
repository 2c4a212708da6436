//! Typed variable values and their wire representation.

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::fmt;

use crate::category::{BaseType, Category};
use crate::error::{PacError, Result};

/// A locally typed variable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i32),
    Float(f64),
    String(String),
    Table(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&[Value]> {
        match self {
            Value::Table(values) => Some(values),
            _ => None,
        }
    }

    /// Recast an integer to a boolean (non-zero is true).
    pub fn into_bool(self) -> Value {
        match self {
            Value::Integer(i) => Value::Bool(i != 0),
            Value::Float(f) => Value::Bool(f != 0.0),
            other => other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => f.write_str(s),
            Value::Table(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Table(values.into_iter().map(Into::into).collect())
    }
}

/// Encode a validated value for transport.
///
/// Booleans of the integer overlay categories become 0/1; digital point states
/// stay JSON booleans.
pub fn encode(category: Category, value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => match category {
            Category::DigitalInput | Category::DigitalOutput => json!(b),
            _ => json!(if *b { 1 } else { 0 }),
        },
        Value::Integer(i) => json!(i),
        Value::Float(f) => json!(f),
        Value::String(s) => json!(s),
        Value::Table(values) => {
            JsonValue::Array(values.iter().map(|v| encode(category, v)).collect())
        }
    }
}

/// Local form of a validated value: integer categories hold `Integer`, never
/// `Bool`, matching what a read returns.
pub fn normalize(category: Category, value: Value) -> Value {
    match (category.base_type(), value) {
        (BaseType::Integer, Value::Bool(b)) => Value::Integer(b as i32),
        (_, Value::Table(values)) => Value::Table(
            values
                .into_iter()
                .map(|v| normalize(category, v))
                .collect(),
        ),
        (_, value) => value,
    }
}

/// Decode one raw element as read from the controller.
pub fn decode(category: Category, name: &str, raw: &JsonValue) -> Result<Value> {
    let bad = || PacError::Decode(format!("Unexpected value {} for '{}' ({})", raw, name, category));
    match category.base_type() {
        BaseType::Boolean => match raw {
            JsonValue::Bool(b) => Ok(Value::Bool(*b)),
            JsonValue::Number(n) => Ok(Value::Bool(n.as_f64().ok_or_else(bad)? != 0.0)),
            _ => Err(bad()),
        },
        BaseType::Integer => {
            let n = raw.as_i64().ok_or_else(bad)?;
            i32::try_from(n).map(Value::Integer).map_err(|_| bad())
        }
        BaseType::Float => match raw {
            JsonValue::Number(n) => n.as_f64().map(Value::Float).ok_or_else(bad),
            // Non-finite readings arrive as text or null
            JsonValue::String(s) => s.trim().parse().map(Value::Float).map_err(|_| bad()),
            JsonValue::Null => Ok(Value::Float(f64::NAN)),
            _ => Err(bad()),
        },
        BaseType::String => Ok(Value::String(match raw {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => String::new(),
            other => other.to_string(),
        })),
    }
}

/// Decode a whole table body (a JSON array of raw values).
pub fn decode_table(category: Category, name: &str, raw: &JsonValue) -> Result<Vec<Value>> {
    let items = raw
        .as_array()
        .ok_or_else(|| PacError::Decode(format!("Table '{}' body is not an array", name)))?;
    items.iter().map(|item| decode(category, name, item)).collect()
}
