//! Type and bound validation of field values
//!
//! Validation is a pure recursive walk over the declared [`TypeDesc`]. It
//! returns a normalized copy of the value: integral floats become integers
//! for `int` fields and integers become floats for `float` fields. Containers
//! must be non-empty and a field's bound applies to every numeric leaf.

use serde_json::{Map, Number, Value};

use crate::bound::Bound;
use crate::error::{ConfigError, Result};
use crate::schema::FieldDescriptor;
use crate::types::{ScalarKind, TypeDesc};

/// Validate `value` against a field's declared type and bound.
pub fn validate(value: &Value, field: &FieldDescriptor) -> Result<Value> {
    validate_value(field.name(), field.ty(), field.bound(), value)
}

/// Validate `value` as the field `name` of type `ty`.
pub fn validate_value(name: &str, ty: &TypeDesc, bound: Option<&Bound>, value: &Value) -> Result<Value> {
    match ty {
        TypeDesc::Scalar(kind) => validate_scalar(name, *kind, bound, value),
        TypeDesc::SequenceOf(inner) => validate_sequence(name, ty, inner, bound, value),
        TypeDesc::MappingOf(inner) => validate_mapping(name, ty, inner, bound, value),
    }
}

fn validate_scalar(name: &str, kind: ScalarKind, bound: Option<&Bound>, value: &Value) -> Result<Value> {
    match kind {
        ScalarKind::Bool => match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => Err(mismatch(name, "a boolean", value)),
        },
        ScalarKind::Int => {
            let n = match value {
                Value::Number(n) => integral(n).ok_or_else(|| mismatch(name, "an integer", value))?,
                _ => return Err(mismatch(name, "an integer", value)),
            };
            check_bound(name, bound, &n)?;
            Ok(Value::Number(n))
        }
        ScalarKind::Float => {
            let n = match value {
                Value::Number(n) => as_float(n).ok_or_else(|| mismatch(name, "a float", value))?,
                _ => return Err(mismatch(name, "a float", value)),
            };
            check_bound(name, bound, &n)?;
            Ok(Value::Number(n))
        }
        ScalarKind::Str => match value {
            Value::String(s) if s.trim().is_empty() => Err(empty(name, "string", value)),
            Value::String(_) => Ok(value.clone()),
            _ => Err(mismatch(name, "a string", value)),
        },
    }
}

fn validate_sequence(
    name: &str,
    ty: &TypeDesc,
    inner: &TypeDesc,
    bound: Option<&Bound>,
    value: &Value,
) -> Result<Value> {
    let items = value
        .as_array()
        .ok_or_else(|| mismatch(name, &format!("a list ({})", ty), value))?;
    if items.is_empty() {
        return Err(empty(name, &format!("list of {}", inner), value));
    }

    let el_name = format!("element of {} list", name);
    items
        .iter()
        .map(|item| validate_value(&el_name, inner, bound, item))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

fn validate_mapping(
    name: &str,
    ty: &TypeDesc,
    inner: &TypeDesc,
    bound: Option<&Bound>,
    value: &Value,
) -> Result<Value> {
    let entries = value
        .as_object()
        .ok_or_else(|| mismatch(name, &format!("a dict ({})", ty), value))?;
    if entries.is_empty() {
        return Err(empty(name, &format!("dict of {}", inner), value));
    }

    let key_name = format!("key of {} dictionary", name);
    let mut out = Map::new();
    for (key, item) in entries {
        validate_scalar(&key_name, ScalarKind::Str, None, &Value::String(key.clone()))?;
        let el_name = format!("element of {} dictionary with key {}", name, key);
        out.insert(key.clone(), validate_value(&el_name, inner, bound, item)?);
    }
    Ok(Value::Object(out))
}

fn check_bound(name: &str, bound: Option<&Bound>, n: &Number) -> Result<()> {
    match bound {
        Some(bound) => bound.validate_named(name, n),
        None => Ok(()),
    }
}

/// Integer view of `n`; `10.0` coerces, `10.5` does not.
fn integral(n: &Number) -> Option<Number> {
    if n.is_i64() || n.is_u64() {
        return Some(n.clone());
    }
    let f = n.as_f64()?;
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper check
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Number::from(f as i64))
    } else {
        None
    }
}

fn as_float(n: &Number) -> Option<Number> {
    if n.is_f64() {
        return Some(n.clone());
    }
    Number::from_f64(n.as_f64()?)
}

fn mismatch(name: &str, expected: &str, value: &Value) -> ConfigError {
    ConfigError::TypeMismatch {
        field: name.to_string(),
        expected: expected.to_string(),
        value: value.to_string(),
    }
}

fn empty(name: &str, expected: &str, value: &Value) -> ConfigError {
    ConfigError::EmptyValue {
        field: name.to_string(),
        expected: expected.to_string(),
        value: value.to_string(),
    }
}
