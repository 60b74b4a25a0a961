//! Record data bound to a view, with draft/original tracking and persistence.

use crate::error::ModelError;
use crate::validation::ValidationResult;
use crate::view::ModelView;
use keel_mask::FieldMask;
use keel_store::{DeleteOptions, Record, Store, UpdateOptions};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A draft record read and written through a view.
///
/// An instance keeps the draft next to an `original` snapshot of the last
/// persistence point. It starts *floating* (not backed by a stored record);
/// a successful [`save`](Self::save) sinks it, a successful
/// [`delete`](Self::delete) makes it floating again. A store result that does not
/// affect exactly one record leaves the state unchanged.
///
/// Instances produced by [`rebind`](Self::rebind) or [`select`](Self::select) share
/// the draft with the instance they came from.
#[derive(Debug)]
pub struct Instance {
    view: Arc<dyn ModelView>,
    store: Arc<dyn Store>,
    data: Arc<RwLock<Record>>,
    original: Record,
    floating: bool,
    validation_disabled: bool,
}

impl Instance {
    pub(crate) fn new(view: Arc<dyn ModelView>, store: Arc<dyn Store>, data: Record) -> Self {
        Self {
            view,
            store,
            original: data.clone(),
            data: Arc::new(RwLock::new(data)),
            floating: true,
            validation_disabled: false,
        }
    }

    #[must_use]
    pub const fn view(&self) -> &Arc<dyn ModelView> {
        &self.view
    }

    #[must_use]
    pub const fn is_floating(&self) -> bool {
        self.floating
    }

    /// A copy of the draft record.
    #[must_use]
    pub fn data(&self) -> Record {
        self.data.read().clone()
    }

    /// The current value of a field, or `None` when it is unknown, unselected or
    /// unreadable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.view.get_field_value(&self.data.read(), name)
    }

    /// Values of the fields covered by `selection`, in field order. Fields without a
    /// value are omitted.
    #[must_use]
    pub fn get_many(&self, selection: &FieldMask) -> Record {
        let data = self.data.read();
        self.collect(&data, selection)
    }

    #[must_use]
    pub fn get_original(&self, name: &str) -> Option<Value> {
        self.view.get_field_value(&self.original, name)
    }

    #[must_use]
    pub fn get_original_many(&self, selection: &FieldMask) -> Record {
        self.collect(&self.original, selection)
    }

    /// A floating instance over the original snapshot, bound to the same view.
    #[must_use]
    pub fn original(&self) -> Self {
        Arc::clone(&self.view).wrap(self.original.clone())
    }

    fn collect(&self, data: &Record, selection: &FieldMask) -> Record {
        self.view
            .fields(selection)
            .into_iter()
            .filter_map(|name| self.view.get_field_value(data, &name).map(|value| (name, value)))
            .collect()
    }

    /// Whether any field value differs from its original.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.is_modified_in(&FieldMask::all())
    }

    #[must_use]
    pub fn is_field_modified(&self, name: &str) -> bool {
        self.get(name) != self.get_original(name)
    }

    #[must_use]
    pub fn is_modified_in(&self, selection: &FieldMask) -> bool {
        self.view.fields(selection).iter().any(|name| self.is_field_modified(name))
    }

    /// Validates `value` for `name`, then writes it through the field's setter.
    ///
    /// Writing an unknown, unselected or read-only field is a no-op.
    ///
    /// # Errors
    /// Returns [`ModelError::Validation`] when the value is rejected; the draft is
    /// left unchanged in that case.
    pub fn set(&self, name: &str, value: Value) -> Result<(), ModelError> {
        if let Some(result) = self.validate_field(name, &value)
            && result.has_errors()
        {
            return Err(ModelError::Validation { result, context: None });
        }
        if self.view.set_field_value(&mut self.data.write(), name, value).is_none() {
            debug!(field = name, "Field is not writable here, value ignored");
        }
        Ok(())
    }

    /// Sets every entry in order. Entries before a rejected one stay written.
    ///
    /// # Errors
    /// Returns the first [`ModelError::Validation`] encountered.
    pub fn set_many(&self, entries: &Record) -> Result<(), ModelError> {
        entries.iter().try_for_each(|(name, value)| self.set(name, value.clone()))
    }

    /// Validates the current value of every field. Fields without a value are
    /// skipped.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if self.validation_disabled {
            return result;
        }
        for name in self.view.fields(&FieldMask::all()) {
            if let Some(value) = self.get(&name)
                && let Some(found) = self.view.validate_field(self, &name, &value)
            {
                result.merge(found);
            }
        }
        result
    }

    /// Validates candidate values without writing them. Unknown fields are skipped.
    #[must_use]
    pub fn validate_entries(&self, entries: &Record) -> ValidationResult {
        entries.iter().filter_map(|(name, value)| self.validate_field(name, value)).fold(
            ValidationResult::new(),
            |mut result, found| {
                result.merge(found);
                result
            },
        )
    }

    /// Validates one candidate value; `None` when the field is unknown or unselected.
    #[must_use]
    pub fn validate_field(&self, name: &str, value: &Value) -> Option<ValidationResult> {
        if self.validation_disabled {
            return self.view.has(name).then(ValidationResult::new);
        }
        self.view.validate_field(self, name, value)
    }

    /// Makes every validation report no errors until
    /// [`restore_validation`](Self::restore_validation).
    pub const fn disable_validation(&mut self) {
        self.validation_disabled = true;
    }

    pub const fn restore_validation(&mut self) {
        self.validation_disabled = false;
    }

    /// Marks the draft as persisted: the snapshot becomes the draft.
    pub fn sink(&mut self) {
        self.sink_as(false);
    }

    /// Collapses the draft into the snapshot and sets the floating state.
    pub fn sink_as(&mut self, floating: bool) {
        self.original = self.data.read().clone();
        self.floating = floating;
    }

    /// The same draft seen through another view.
    #[must_use]
    pub fn rebind(&self, view: Arc<dyn ModelView>) -> Self {
        Self {
            view,
            store: Arc::clone(&self.store),
            data: Arc::clone(&self.data),
            original: self.original.clone(),
            floating: self.floating,
            validation_disabled: self.validation_disabled,
        }
    }

    #[must_use]
    pub fn select(&self, selection: impl Into<FieldMask>) -> Self {
        self.rebind(Arc::clone(&self.view).select(selection.into()))
    }

    /// Inserts a floating instance or updates a persisted one. Returns the number of
    /// records the store reports as inserted or modified.
    ///
    /// # Errors
    /// - [`ModelError::Validation`] when the instance does not validate.
    /// - [`ModelError::UnresolvableIdentity`] when a persisted instance has no
    ///   resolvable identity filter.
    /// - [`ModelError::Store`] when the store fails.
    #[instrument(skip(self), fields(floating = self.floating))]
    pub fn save(&mut self) -> Result<u64, ModelError> {
        let filter = if self.floating { None } else { Some(self.identity_filter()?) };

        let result = self.validate();
        if result.has_errors() {
            debug!(errors = result.len(), "Save rejected by validation");
            return Err(ModelError::Validation { result, context: None });
        }

        let mut draft = self.data();
        let affected = match filter {
            None => {
                let inserted = self.store.insert_one(&mut draft)?.inserted_count;
                if inserted == 1 {
                    *self.data.write() = draft;
                }
                inserted
            },
            Some(filter) => {
                let update = self.changes(&draft, &filter);
                self.store.update(&filter, &update, UpdateOptions::default())?.modified_count
            },
        };

        debug!(affected, "Instance saved");
        if affected == 1 {
            self.sink();
        }
        Ok(affected)
    }

    /// Removes the persisted record. A floating instance is left alone and the store
    /// is not called.
    ///
    /// # Errors
    /// [`ModelError::UnresolvableIdentity`] or [`ModelError::Store`].
    #[instrument(skip(self), fields(floating = self.floating))]
    pub fn delete(&mut self) -> Result<u64, ModelError> {
        if self.floating {
            return Ok(0);
        }
        let filter = self.identity_filter()?;
        let deleted = self.store.delete(&filter, DeleteOptions { multi: false })?.deleted_count;

        debug!(deleted, "Instance deleted");
        if deleted == 1 {
            self.sink_as(true);
        }
        Ok(deleted)
    }

    /// An operator update that writes the draft's properties and unsets those dropped
    /// since the original. Properties the draft never loaded stay as stored.
    fn changes(&self, draft: &Record, identity: &Record) -> Record {
        let set = draft
            .iter()
            .filter(|(property, _)| !identity.contains_key(*property))
            .map(|(property, value)| (property.clone(), value.clone()))
            .collect::<Record>();
        let unset = self
            .original
            .keys()
            .filter(|property| !draft.contains_key(*property) && !identity.contains_key(*property))
            .map(|property| (property.clone(), Value::Bool(true)))
            .collect::<Record>();

        let mut update = Record::new();
        update.insert("$set".to_owned(), Value::Object(set));
        if !unset.is_empty() {
            update.insert("$unset".to_owned(), Value::Object(unset));
        }
        update
    }

    /// The draft restricted to the storage properties of the identity field. Every
    /// property must be present and non-null.
    fn identity_filter(&self) -> Result<Record, ModelError> {
        let field = self.view.identity_field();
        let unresolvable = || ModelError::UnresolvableIdentity { field: field.to_owned(), context: None };

        let requires = self.view.dependency_mask(&FieldMask::from(field)).ok_or_else(unresolvable)?;
        let properties = requires.names().ok_or_else(unresolvable)?.collect::<Vec<_>>();
        let data = self.data.read();
        if properties.is_empty() || properties.iter().any(|p| data.get(*p).is_none_or(Value::is_null)) {
            return Err(unresolvable());
        }
        Ok(requires.project(&data))
    }
}
