//! The capability set shared by models and masked views.

use crate::error::ModelError;
use crate::field::FieldInfo;
use crate::instance::Instance;
use crate::validation::ValidationResult;
use keel_mask::{FieldMask, PropertyMask};
use keel_store::{Record, Store};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Options of a model-level find. `ordering` and `select` are keyed by field
/// names and translated into storage properties before the store is queried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Field name to direction (`1`/`-1` or `"asc"`/`"desc"`).
    pub ordering: Record,
    pub select: Option<FieldMask>,
}

impl FindQuery {
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
    pub fn order_by(mut self, field: impl Into<String>, direction: impl Into<Value>) -> Self {
        self.ordering.insert(field.into(), direction.into());
        self
    }

    #[must_use]
    pub fn select(mut self, selection: impl Into<FieldMask>) -> Self {
        self.select = Some(selection.into());
        self
    }
}

/// Field access, validation and dependency resolution over record data.
///
/// Implemented by [`Model`](crate::Model), which owns field descriptors, and by
/// [`MaskedView`](crate::MaskedView), which filters another view through a
/// selection. `None` from a query means the operation does not apply here, which is
/// distinct from an empty result.
///
/// Views are shared as `Arc<dyn ModelView>`; operations that produce instances or
/// narrower views take the `Arc` by value.
pub trait ModelView: fmt::Debug + Send + Sync {
    fn identity_field(&self) -> &str;

    fn type_field(&self) -> &str;

    /// The type discriminator, when it is knowable without reading any record.
    fn type_value(&self) -> Option<String>;

    fn store(&self) -> Arc<dyn Store>;

    fn has(&self, name: &str) -> bool;

    /// Field names covered by `selection`: inherited fields first, then local ones.
    fn fields(&self, selection: &FieldMask) -> Vec<String>;

    fn query_field(&self, name: &str) -> Option<FieldInfo>;

    fn get_field_value(&self, data: &Record, name: &str) -> Option<Value>;

    /// Returns `None` when the field is unknown, unselected or not writable.
    fn set_field_value(&self, data: &mut Record, name: &str, value: Value) -> Option<()>;

    fn validate_field(&self, instance: &Instance, name: &str, value: &Value)
    -> Option<ValidationResult>;

    /// Union of the storage properties needed by every selected field, or `None` as
    /// soon as one of them is dependency-opaque.
    fn dependency_mask(&self, selection: &FieldMask) -> Option<PropertyMask>;

    /// Translates field-keyed entries into property-keyed data. Unknown fields are
    /// skipped; a selected field without a translate handler yields `None`.
    fn translate_data(&self, entries: &Record) -> Option<Record>;

    /// A view restricted to `selection`. Nested selections only narrow.
    fn select(self: Arc<Self>, selection: FieldMask) -> Arc<dyn ModelView>;

    /// Binds `data` to this view as a floating instance.
    fn wrap(self: Arc<Self>, data: Record) -> Instance;

    /// Queries the store with field-keyed `filter` entries and returns persisted
    /// instances.
    ///
    /// # Errors
    /// [`ModelError::Untranslatable`] when the filter or ordering names a field
    /// without a translate handler, or [`ModelError::Store`] when the store fails.
    fn find(self: Arc<Self>, filter: &Record, query: FindQuery) -> Result<Vec<Instance>, ModelError>;

    fn create_instance(self: Arc<Self>) -> Instance {
        self.wrap(Record::new())
    }

    /// The first instance whose identity field equals `id`.
    ///
    /// # Errors
    /// Same as [`ModelView::find`].
    fn find_by_id(self: Arc<Self>, id: Value, query: FindQuery) -> Result<Option<Instance>, ModelError> {
        let mut filter = Record::new();
        filter.insert(self.identity_field().to_owned(), id);
        Ok(self.find(&filter, query.limit(1))?.into_iter().next())
    }
}
