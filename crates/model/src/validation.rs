//! Aggregated validation outcome and the validator handle.

use crate::instance::Instance;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Error messages keyed by field name. Each field keeps its messages in the order
/// they were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A result holding a single error.
    #[must_use]
    pub fn with_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut result = Self::new();
        result.add_error(field, message);
        result
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn has_errors_for(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Every `(field, message)` pair.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| (field.as_str(), m.as_str())))
    }

    pub fn errors_for(&self, field: &str) -> impl Iterator<Item = &str> {
        self.errors.get(field).into_iter().flatten().map(String::as_str)
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    /// Appends every message of `other` after the messages already held per field.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    /// Number of messages across all fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, message)) in self.errors().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

type Check = dyn Fn(&Instance, &str, &Value) -> ValidationResult + Send + Sync;

/// A field validator. It receives the owning instance, the field name and the
/// candidate value, and reports its findings as a [`ValidationResult`].
#[derive(Clone)]
pub struct Validator {
    label: Cow<'static, str>,
    check: Arc<Check>,
}

impl Validator {
    /// Wraps a check function under a label shown in debug output.
    pub fn new<F>(label: impl Into<Cow<'static, str>>, check: F) -> Self
    where
        F: Fn(&Instance, &str, &Value) -> ValidationResult + Send + Sync + 'static,
    {
        Self { label: label.into(), check: Arc::new(check) }
    }

    /// A validator that reports `message` whenever `predicate` rejects the value.
    pub fn predicate<P>(
        label: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        predicate: P,
    ) -> Self
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        Self::new(label, move |_, field, value| {
            if predicate(value) {
                ValidationResult::new()
            } else {
                ValidationResult::with_error(field, message.clone())
            }
        })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn validate(&self, instance: &Instance, field: &str, value: &Value) -> ValidationResult {
        (self.check)(instance, field, value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.label).finish()
    }
}
