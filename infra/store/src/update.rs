//! Update expressions.
//!
//! An update is either an operator document (`$set`, `$unset`, `$inc`) or a plain
//! replacement document. Replacement keeps the record's identity property.

use crate::error::StoreError;
use crate::store::Record;
use serde_json::{Number, Value};

/// Computes the updated copy of `target`. `target` itself is never touched, so a
/// failing expression leaves the store unchanged.
pub(crate) fn apply(target: &Record, update: &Record, identity: &str) -> Result<Record, StoreError> {
    let operators = update.keys().filter(|key| key.starts_with('$')).count();
    if operators == 0 {
        return Ok(replace(target, update, identity));
    }
    if operators != update.len() {
        return Err(StoreError::invalid_update("Cannot mix operators and replacement fields"));
    }

    let mut next = target.clone();
    for (operator, argument) in update {
        let Value::Object(entries) = argument else {
            return Err(StoreError::invalid_update(format!("{operator} expects an object")));
        };
        match operator.as_str() {
            "$set" => {
                for (property, value) in entries {
                    guard_identity(target, identity, property, Some(value))?;
                    next.insert(property.clone(), value.clone());
                }
            },
            "$unset" => {
                for property in entries.keys() {
                    guard_identity(target, identity, property, None)?;
                    next.shift_remove(property);
                }
            },
            "$inc" => {
                for (property, amount) in entries {
                    guard_identity(target, identity, property, None)?;
                    let sum = increment(next.get(property), amount, property)?;
                    next.insert(property.clone(), sum);
                }
            },
            op => return Err(StoreError::unsupported(op)),
        }
    }
    Ok(next)
}

fn replace(target: &Record, replacement: &Record, identity: &str) -> Record {
    let mut next = Record::new();
    if let Some(id) = target.get(identity) {
        next.insert(identity.to_owned(), id.clone());
    }
    for (property, value) in replacement.iter().filter(|(property, _)| *property != identity) {
        next.insert(property.clone(), value.clone());
    }
    next
}

/// The identity property may only be "set" to the value it already has.
fn guard_identity(
    target: &Record,
    identity: &str,
    property: &str,
    value: Option<&Value>,
) -> Result<(), StoreError> {
    if property != identity || (value.is_some() && target.get(identity) == value) {
        return Ok(());
    }
    Err(StoreError::InvalidUpdate {
        message: format!("Property '{identity}' cannot be modified").into(),
        context: None,
    })
}

fn increment(current: Option<&Value>, amount: &Value, property: &str) -> Result<Value, StoreError> {
    let Value::Number(amount) = amount else {
        return Err(StoreError::invalid_update(format!("$inc amount for '{property}' is not a number")));
    };
    let current = match current {
        None | Some(Value::Null) => return Ok(Value::Number(amount.clone())),
        Some(Value::Number(n)) => n,
        Some(_) => {
            return Err(StoreError::invalid_update(format!("'{property}' is not a number")));
        },
    };

    if let (Some(a), Some(b)) = (current.as_i64(), amount.as_i64())
        && let Some(sum) = a.checked_add(b)
    {
        return Ok(Value::from(sum));
    }

    let sum = current.as_f64().unwrap_or_default() + amount.as_f64().unwrap_or_default();
    Number::from_f64(sum)
        .map(Value::Number)
        .ok_or_else(|| StoreError::invalid_update(format!("$inc on '{property}' is not finite")))
}
