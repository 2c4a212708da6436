//! Validation and casting of caller-supplied values before a write.

use serde_json::Value as JsonValue;

use crate::category::{BaseType, Category};
use crate::error::{PacError, Result};
use crate::value::Value;

/// Validate a value for a whole variable of `category`.
///
/// Table categories require a JSON array; the first bad element aborts the
/// whole write and the error names its index.
pub fn validate(category: Category, name: &str, value: &JsonValue) -> Result<Value> {
    if !category.is_table() {
        return validate_element(category, name, value);
    }
    let items = value
        .as_array()
        .ok_or_else(|| PacError::invalid(name, value, "expected a sequence of values"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| validate_element(category, name, item).map_err(|e| e.at_index(i)))
        .collect::<Result<Vec<_>>>()
        .map(Value::Table)
}

/// Validate a single scalar or table element against the category's base type.
pub fn validate_element(category: Category, name: &str, value: &JsonValue) -> Result<Value> {
    match category.base_type() {
        BaseType::Boolean => match value {
            JsonValue::Bool(b) => Ok(Value::Bool(*b)),
            _ => Err(PacError::invalid(name, value, "expected a boolean")),
        },
        BaseType::Integer => cast_integer(name, value),
        BaseType::Float => cast_float(name, value),
        BaseType::String => Ok(Value::String(cast_string(value))),
    }
}

/// Check an already typed element against the category's base type.
///
/// Unlike [`validate_element`], non-finite floats pass: they are what a read
/// of an unavailable point yields. Integer-backed booleans become integers and
/// integers widen to floats.
pub fn conform(category: Category, name: &str, value: Value) -> Result<Value> {
    match (category.base_type(), value) {
        (BaseType::Boolean, value @ Value::Bool(_)) => Ok(value),
        (BaseType::Integer, Value::Bool(b)) => Ok(Value::Integer(b as i32)),
        (BaseType::Integer, value @ Value::Integer(_)) => Ok(value),
        (BaseType::Float, value @ Value::Float(_)) => Ok(value),
        (BaseType::Float, Value::Integer(i)) => Ok(Value::Float(i as f64)),
        (BaseType::String, value @ Value::String(_)) => Ok(value),
        (base, other) => Err(PacError::invalid(
            name,
            &other,
            format!("expected a value of base type {:?}", base),
        )),
    }
}

fn cast_integer(name: &str, value: &JsonValue) -> Result<Value> {
    let not_integer = || PacError::invalid(name, value, "expected an integer");
    let wide = match value {
        // Integers-as-booleans are already valid
        JsonValue::Bool(b) => return Ok(Value::Bool(*b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64().ok_or_else(not_integer)?;
                if !f.is_finite() || f.fract() != 0.0 {
                    return Err(not_integer());
                }
                f as i64
            }
        },
        JsonValue::String(s) => s.trim().parse::<i64>().map_err(|_| not_integer())?,
        _ => return Err(not_integer()),
    };
    i32::try_from(wide)
        .map(Value::Integer)
        .map_err(|_| PacError::invalid(name, value, "out of 32-bit integer range"))
}

fn cast_float(name: &str, value: &JsonValue) -> Result<Value> {
    let f = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match f {
        Some(f) if f.is_finite() => Ok(Value::Float(f)),
        _ => Err(PacError::invalid(name, value, "expected a finite number")),
    }
}

fn cast_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_boolean_requires_bool() {
        assert_eq!(
            validate(Category::BooleanScalar, "bReady", &json!(true)).unwrap(),
            Value::Bool(true)
        );
        let err = validate(Category::BooleanScalar, "bReady", &json!(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert!(validate(Category::DigitalOutput, "doPump", &json!("on")).is_err());
    }

    #[test]
    fn test_integer_cast() {
        assert_eq!(
            validate(Category::Integer, "iCount", &json!(42)).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            validate(Category::Integer, "iCount", &json!(7.0)).unwrap(),
            Value::Integer(7)
        );
        assert_eq!(
            validate(Category::Integer, "iCount", &json!(" -3 ")).unwrap(),
            Value::Integer(-3)
        );
        assert_eq!(
            validate(Category::Integer, "iCount", &json!(true)).unwrap(),
            Value::Bool(true)
        );
        assert!(validate(Category::Integer, "iCount", &json!(1.5)).is_err());
        assert!(validate(Category::Integer, "iCount", &json!("abc")).is_err());
        assert!(validate(Category::Integer, "iCount", &json!(null)).is_err());
        assert!(validate(Category::Integer, "iCount", &json!(3_000_000_000_i64)).is_err());
    }

    #[test]
    fn test_float_cast() {
        assert_eq!(
            validate(Category::Float, "fLevel", &json!(3)).unwrap(),
            Value::Float(3.0)
        );
        assert_eq!(
            validate(Category::AnalogOutput, "aoValve", &json!("12.5")).unwrap(),
            Value::Float(12.5)
        );
        assert!(validate(Category::Float, "fLevel", &json!(false)).is_err());
        assert!(validate(Category::Float, "fLevel", &json!("NaN")).is_err());
    }

    #[test]
    fn test_string_cast_never_fails() {
        assert_eq!(
            validate(Category::String, "sName", &json!(12)).unwrap(),
            Value::String("12".to_string())
        );
        assert_eq!(
            validate(Category::String, "sName", &json!(null)).unwrap(),
            Value::String(String::new())
        );
        assert_eq!(
            validate(Category::StringTable, "stNames", &json!(["a", 1, true])).unwrap(),
            Value::from(vec!["a", "1", "true"])
        );
    }

    #[test]
    fn test_table_reports_first_bad_index() {
        let err = validate(Category::IntegerTable, "itCounts", &json!([1, 2, 2.5, "x"])).unwrap_err();
        match err {
            PacError::InvalidValue { name, index, .. } => {
                assert_eq!(name, "itCounts");
                assert_eq!(index, Some(2));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_conform_typed_values() {
        let nan = conform(Category::FloatTable, "ftLevels", Value::Float(f64::NAN)).unwrap();
        assert!(nan.as_f64().is_some_and(f64::is_nan));
        assert_eq!(
            conform(Category::IntegerTable, "itCounts", Value::Bool(true)).unwrap(),
            Value::Integer(1)
        );
        assert_eq!(
            conform(Category::FloatTable, "ftLevels", Value::Integer(2)).unwrap(),
            Value::Float(2.0)
        );
        let err = conform(Category::IntegerTable, "itCounts", Value::from("x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert!(conform(Category::BooleanTable, "btFlags", Value::Integer(1)).is_err());
    }

    #[test]
    fn test_table_requires_sequence() {
        let err = validate(Category::FloatTable, "ftLevels", &json!(1.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }
}
