//! Structural filter evaluation.
//!
//! A filter is a record. Plain entries require equality on a top-level property
//! (`{ "age": 3 }`); an operator object applies comparison operators
//! (`{ "age": { "$gte": 3, "$lt": 9 } }`); `$and`, `$or` and `$nor` combine
//! sub-filters and `$not` negates one. An empty filter matches every record.

use crate::error::StoreError;
use crate::store::Record;
use crate::value::{compare, equal, rank};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Returns whether `record` satisfies `filter`.
///
/// # Errors
/// Returns [`StoreError::InvalidFilter`] for malformed operator arguments and
/// [`StoreError::UnsupportedOperator`] for unknown `$` operators.
pub fn matches(filter: &Record, record: &Record) -> Result<bool, StoreError> {
    for (key, condition) in filter {
        let satisfied = match key.as_str() {
            "$and" => sub_filters(key, condition)?
                .into_iter()
                .try_fold(true, |acc, f| Ok::<_, StoreError>(acc && matches(f, record)?))?,
            "$or" => sub_filters(key, condition)?
                .into_iter()
                .try_fold(false, |acc, f| Ok::<_, StoreError>(acc || matches(f, record)?))?,
            "$nor" => !sub_filters(key, condition)?
                .into_iter()
                .try_fold(false, |acc, f| Ok::<_, StoreError>(acc || matches(f, record)?))?,
            "$not" => match condition {
                Value::Object(inner) => !matches(inner, record)?,
                _ => return Err(StoreError::invalid_filter("$not expects a filter object")),
            },
            op if op.starts_with('$') => return Err(StoreError::unsupported(op)),
            property => property_matches(record.get(property), condition)?,
        };

        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

fn sub_filters<'a>(operator: &str, condition: &'a Value) -> Result<Vec<&'a Record>, StoreError> {
    let Value::Array(items) = condition else {
        return Err(StoreError::invalid_filter(format!("{operator} expects an array of filters")));
    };
    if items.is_empty() {
        return Err(StoreError::invalid_filter(format!("{operator} expects at least one filter")));
    }
    items
        .iter()
        .map(|item| {
            item.as_object().ok_or_else(|| {
                StoreError::invalid_filter(format!("{operator} expects an array of filters"))
            })
        })
        .collect()
}

fn property_matches(value: Option<&Value>, condition: &Value) -> Result<bool, StoreError> {
    match operator_object(condition)? {
        Some(operators) => operators
            .iter()
            .try_fold(true, |acc, (op, arg)| {
                Ok::<_, StoreError>(acc && apply_operator(value, op, arg)?)
            }),
        None => Ok(equals(value, condition)),
    }
}

/// An object whose keys all start with `$`. Mixing operators and plain keys is rejected.
fn operator_object(condition: &Value) -> Result<Option<&Map<String, Value>>, StoreError> {
    let Value::Object(map) = condition else {
        return Ok(None);
    };
    let operators = map.keys().filter(|key| key.starts_with('$')).count();
    match operators {
        0 => Ok(None),
        n if n == map.len() => Ok(Some(map)),
        _ => Err(StoreError::invalid_filter("Cannot mix operators and plain keys in a condition")),
    }
}

fn apply_operator(value: Option<&Value>, operator: &str, arg: &Value) -> Result<bool, StoreError> {
    let result = match operator {
        "$eq" => equals(value, arg),
        "$ne" => !equals(value, arg),
        "$gt" => ordered(value, arg, Ordering::is_gt),
        "$gte" => ordered(value, arg, Ordering::is_ge),
        "$lt" => ordered(value, arg, Ordering::is_lt),
        "$lte" => ordered(value, arg, Ordering::is_le),
        "$in" => candidates(operator, arg)?.iter().any(|candidate| equals(value, candidate)),
        "$nin" => !candidates(operator, arg)?.iter().any(|candidate| equals(value, candidate)),
        "$exists" => match arg {
            Value::Bool(expected) => value.is_some() == *expected,
            _ => return Err(StoreError::invalid_filter("$exists expects a boolean")),
        },
        "$not" => !property_matches(value, arg)?,
        op => return Err(StoreError::unsupported(op)),
    };
    Ok(result)
}

fn candidates<'a>(operator: &str, arg: &'a Value) -> Result<&'a Vec<Value>, StoreError> {
    arg.as_array()
        .ok_or_else(|| StoreError::invalid_filter(format!("{operator} expects an array of values")))
}

/// Equality with document-store conventions: a missing property equals `null`, and an
/// array property matches a scalar it contains.
fn equals(value: Option<&Value>, expected: &Value) -> bool {
    match value {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| equal(item, expected))
        },
        Some(actual) => equal(actual, expected),
    }
}

/// Range comparison only between values of the same kind; a missing property never matches.
fn ordered(value: Option<&Value>, arg: &Value, accept: fn(Ordering) -> bool) -> bool {
    match value {
        Some(actual) if rank(Some(actual)) == rank(Some(arg)) => {
            accept(compare(Some(actual), Some(arg)))
        },
        _ => false,
    }
}
