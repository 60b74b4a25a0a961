//! The record store contract every model persists through.

use crate::error::StoreError;
use keel_mask::PropertyMask;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// A stored record: property name to JSON value, in insertion order.
pub type Record = Map<String, Value>;

/// Sort direction of one ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    /// Reads a direction written as `1`/`-1` (any positive or negative number)
    /// or as `"asc"`/`"desc"`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(x) if x > 0.0 => Some(Self::Ascending),
                Some(x) if x < 0.0 => Some(Self::Descending),
                _ => None,
            },
            Value::String(s) if s.eq_ignore_ascii_case("asc") => Some(Self::Ascending),
            Value::String(s) if s.eq_ignore_ascii_case("desc") => Some(Self::Descending),
            _ => None,
        }
    }
}

/// Options of [`Store::find`]. Ordering is applied first, then `offset`, then `limit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub ordering: Vec<(String, Order)>,
    /// Projection of every returned record. `None` returns whole records.
    pub select: Option<PropertyMask>,
}

impl FindOptions {
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn order_by(mut self, property: impl Into<String>, order: Order) -> Self {
        self.ordering.push((property.into(), order));
        self
    }

    #[must_use]
    pub fn select(mut self, mask: impl Into<PropertyMask>) -> Self {
        self.select = Some(mask.into());
        self
    }

    /// Appends ordering keys from a `{ property: 1 | -1 }` record, in its key order.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidFilter`] when a direction is neither a signed
    /// number nor `"asc"`/`"desc"`.
    pub fn order_by_record(mut self, ordering: &Record) -> Result<Self, StoreError> {
        for (property, direction) in ordering {
            let order = Order::from_value(direction).ok_or_else(|| StoreError::InvalidFilter {
                message: format!("Invalid direction {direction} for '{property}'").into(),
                context: Some("ordering".into()),
            })?;
            self.ordering.push((property.clone(), order));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOptions {
    /// Stop at the first record whose identity already exists.
    pub ordered: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Update every match instead of the first one only.
    pub multi: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Remove every match (the default) or the first one only.
    pub multi: bool,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self { multi: true }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InsertResult {
    pub inserted_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub matched_count: u64,
    /// Only records whose content actually changed.
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Persistence operations a model delegates to.
///
/// Filters are structural match expressions over records (see the crate docs for the
/// supported operators). Implementations must be shareable across threads; models
/// hold them as `Arc<dyn Store>`.
pub trait Store: Send + Sync + fmt::Debug {
    /// Returns copies of the matching records.
    ///
    /// # Errors
    /// Returns [`StoreError`] for a malformed filter.
    fn find(&self, filter: &Record, options: &FindOptions) -> Result<Vec<Record>, StoreError>;

    /// Inserts records, assigning a generated identity to records without one.
    /// Generated identities are written back into `records`. Records whose identity
    /// already exists are skipped, never overwritten.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend cannot accept the records.
    fn insert(&self, records: &mut [Record], options: InsertOptions)
    -> Result<InsertResult, StoreError>;

    /// Applies an update expression to the first match, or to all matches with `multi`.
    ///
    /// # Errors
    /// Returns [`StoreError`] for a malformed filter or update expression. Nothing is
    /// modified in that case.
    fn update(
        &self,
        filter: &Record,
        update: &Record,
        options: UpdateOptions,
    ) -> Result<UpdateResult, StoreError>;

    /// Removes all matches, or the first one when `multi` is false.
    ///
    /// # Errors
    /// Returns [`StoreError`] for a malformed filter.
    fn delete(&self, filter: &Record, options: DeleteOptions) -> Result<DeleteResult, StoreError>;

    /// Single-record shorthand for [`Store::insert`].
    ///
    /// # Errors
    /// Same as [`Store::insert`].
    fn insert_one(&self, record: &mut Record) -> Result<InsertResult, StoreError> {
        self.insert(std::slice::from_mut(record), InsertOptions::default())
    }
}
