//! Ready-made field validators.
//!
//! Every constructor returns a [`Validator`] to register on a field descriptor or an
//! alias. Except for [`required`], [`type_of`] and [`one_of`], a null value passes.

use crate::validation::{ValidationResult, Validator};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// The kind of a JSON value, as checked by [`type_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strings render bare, everything else as JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn order(value: &Value, bound: &Value) -> Option<Ordering> {
    match (value, bound) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[must_use]
pub fn required() -> Validator {
    Validator::predicate("required", "Field can't be null", |value| !value.is_null())
}

#[must_use]
pub fn type_of(expected: JsonType) -> Validator {
    Validator::predicate(
        format!("type_of({expected})"),
        format!("Field must be of type \"{expected}\""),
        move |value| JsonType::of(value) == expected,
    )
}

#[must_use]
pub fn eq(expected: Value) -> Validator {
    let message = format!("Field must equal to {}", render(&expected));
    Validator::predicate("eq", message, move |value| value.is_null() || loosely_equal(value, &expected))
}

#[must_use]
pub fn ne(unexpected: Value) -> Validator {
    let message = format!("Field must not be equal to {}", render(&unexpected));
    Validator::predicate("ne", message, move |value| {
        value.is_null() || !loosely_equal(value, &unexpected)
    })
}

fn compare_with(
    label: &'static str,
    relation: &'static str,
    bound: Value,
    accept: fn(Ordering) -> bool,
) -> Validator {
    let message = format!("Field must be {relation} {}", render(&bound));
    Validator::predicate(label, message, move |value| {
        value.is_null() || order(value, &bound).is_some_and(accept)
    })
}

#[must_use]
pub fn lt(bound: Value) -> Validator {
    compare_with("lt", "less than", bound, Ordering::is_lt)
}

#[must_use]
pub fn le(bound: Value) -> Validator {
    compare_with("le", "less than or equal to", bound, Ordering::is_le)
}

#[must_use]
pub fn gt(bound: Value) -> Validator {
    compare_with("gt", "greater than", bound, Ordering::is_gt)
}

#[must_use]
pub fn ge(bound: Value) -> Validator {
    compare_with("ge", "greater than or equal to", bound, Ordering::is_ge)
}

/// Membership in a fixed list of values. Null is rejected unless listed.
#[must_use]
pub fn one_of(values: impl IntoIterator<Item = Value>) -> Validator {
    let values: Vec<Value> = values.into_iter().collect();
    let listed = values.iter().map(render).collect::<Vec<_>>().join(", ");
    Validator::predicate("one_of", format!("Field must be one of: {listed}"), move |value| {
        values.iter().any(|candidate| loosely_equal(candidate, value))
    })
}

fn length_check(
    label: &'static str,
    message: String,
    accept: impl Fn(usize) -> bool + Send + Sync + 'static,
) -> Validator {
    Validator::new(label, move |_, field, value| {
        if value.is_null() {
            return ValidationResult::new();
        }
        match length_of(value) {
            Some(len) if accept(len) => ValidationResult::new(),
            Some(_) => ValidationResult::with_error(field, message.clone()),
            None => ValidationResult::with_error(field, "Field has no length"),
        }
    })
}

/// Exact string length (in characters) or array length.
#[must_use]
pub fn length(expected: usize) -> Validator {
    length_check("length", format!("Field must be of length {expected}"), move |len| len == expected)
}

#[must_use]
pub fn min_length(min: usize) -> Validator {
    length_check("min_length", format!("Field must be of length {min} or greater"), move |len| len >= min)
}

#[must_use]
pub fn max_length(max: usize) -> Validator {
    length_check("max_length", format!("Field must be of length {max} or less"), move |len| len <= max)
}
