//! Models own field descriptors and may delegate unknown names to a parent.

use crate::error::ModelError;
use crate::field::{FieldDescriptor, FieldInfo, FieldSpec};
use crate::instance::Instance;
use crate::masked::MaskedView;
use crate::validation::ValidationResult;
use crate::view::{FindQuery, ModelView};
use fxhash::FxHashMap;
use keel_mask::{FieldMask, PropertyMask};
use keel_store::{FindOptions, NullStore, Record, Store};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, trace};

/// A set of named fields over the records of one store.
///
/// Fields are declared with [`add_field`](Self::add_field) and resolved in
/// declaration order. Names a model does not define are looked up in its parent,
/// if any. Once declared, share the model as `Arc<Model>` to wrap data or query
/// the store.
///
/// # Example
///
/// ```rust
/// use keel_model::{AliasField, Model, ModelError, ModelView};
/// use keel_store::MemoryStore;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), ModelError> {
/// let mut model = Model::new(Arc::new(MemoryStore::new()));
/// model.add_field("id", AliasField::new().property("_id"));
/// model.add_field("name", AliasField::new());
/// let model = Arc::new(model);
///
/// let mut user = model.clone().create_instance();
/// user.set("name", json!("Ada"))?;
/// assert_eq!(user.save()?, 1);
/// assert!(!user.is_floating());
///
/// let id = user.get("id").unwrap_or_default();
/// let found = model.find_by_id(id, Default::default())?;
/// assert_eq!(found.and_then(|u| u.get("name")), Some(json!("Ada")));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Model {
    store: Arc<dyn Store>,
    parent: Option<Arc<dyn ModelView>>,
    identity_field: String,
    type_field: String,
    type_value: Option<String>,
    fields: Vec<(String, FieldDescriptor)>,
    index: FxHashMap<String, usize>,
}

impl Default for Model {
    /// A model without a backing store.
    fn default() -> Self {
        Self::new(Arc::new(NullStore))
    }
}

impl Model {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            parent: None,
            identity_field: "id".to_owned(),
            type_field: "type".to_owned(),
            type_value: None,
            fields: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Delegates names this model does not define to `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: Arc<dyn ModelView>) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = field.into();
        self
    }

    #[must_use]
    pub fn with_type_field(mut self, field: impl Into<String>) -> Self {
        self.type_field = field.into();
        self
    }

    #[must_use]
    pub fn with_type_value(mut self, value: impl Into<String>) -> Self {
        self.type_value = Some(value.into());
        self
    }

    pub fn set_type_value(&mut self, value: Option<String>) {
        self.type_value = value;
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Arc<dyn ModelView>> {
        self.parent.as_ref()
    }

    /// Registers a field. Returns `false` and leaves the model untouched when the
    /// name is already defined here or in any ancestor.
    pub fn add_field(&mut self, name: impl Into<String>, spec: impl Into<FieldSpec>) -> bool {
        let name = name.into();
        if self.has(&name) {
            debug!(field = %name, "Field already defined");
            return false;
        }
        let descriptor = spec.into().resolve(&name);
        trace!(field = %name, requires = ?descriptor.requirements(), "Field registered");
        self.index.insert(name.clone(), self.fields.len());
        self.fields.push((name, descriptor));
        true
    }

    fn local(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&position| &self.fields[position].1)
    }

    fn untranslatable(entries: &'static str) -> ModelError {
        ModelError::Untranslatable {
            message: Cow::Borrowed("a selected field has no translate handler"),
            context: Some(Cow::Borrowed(entries)),
        }
    }
}

impl ModelView for Model {
    fn identity_field(&self) -> &str {
        &self.identity_field
    }

    fn type_field(&self) -> &str {
        &self.type_field
    }

    fn type_value(&self) -> Option<String> {
        if let Some(value) = &self.type_value {
            return Some(value.clone());
        }
        let requires = self.dependency_mask(&FieldMask::from(self.type_field.as_str()))?;
        if !requires.is_empty() {
            return None;
        }
        match self.get_field_value(&Record::new(), &self.type_field)? {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    fn store(&self) -> Arc<dyn Store> {
        Arc::clone(&self.store)
    }

    fn has(&self, name: &str) -> bool {
        self.index.contains_key(name) || self.parent.as_ref().is_some_and(|parent| parent.has(name))
    }

    fn fields(&self, selection: &FieldMask) -> Vec<String> {
        let mut names = self.parent.as_ref().map(|parent| parent.fields(selection)).unwrap_or_default();
        names.extend(
            self.fields.iter().map(|(name, _)| name).filter(|name| selection.includes(name)).cloned(),
        );
        names
    }

    fn query_field(&self, name: &str) -> Option<FieldInfo> {
        self.local(name).map(FieldDescriptor::info)
    }

    fn get_field_value(&self, data: &Record, name: &str) -> Option<Value> {
        let Some(descriptor) = self.local(name) else {
            return self.parent.as_ref()?.get_field_value(data, name);
        };
        let getter = descriptor.getter.as_ref()?;
        match &descriptor.requires {
            Some(requires) => getter(&requires.project(data)),
            None => getter(data),
        }
    }

    fn set_field_value(&self, data: &mut Record, name: &str, value: Value) -> Option<()> {
        let Some(descriptor) = self.local(name) else {
            return self.parent.as_ref()?.set_field_value(data, name, value);
        };
        let setter = descriptor.setter.as_ref()?;
        setter(data, value);
        Some(())
    }

    fn validate_field(
        &self,
        instance: &Instance,
        name: &str,
        value: &Value,
    ) -> Option<ValidationResult> {
        let Some(descriptor) = self.local(name) else {
            return self.parent.as_ref()?.validate_field(instance, name, value);
        };
        Some(descriptor.validators.iter().fold(ValidationResult::new(), |mut result, validator| {
            result.merge(validator.validate(instance, name, value));
            result
        }))
    }

    fn dependency_mask(&self, selection: &FieldMask) -> Option<PropertyMask> {
        let mut mask = PropertyMask::empty();
        for (name, descriptor) in &self.fields {
            if selection.includes(name) {
                mask = mask.join(descriptor.requires.as_ref()?);
            }
        }
        match &self.parent {
            Some(parent) => Some(mask.join(&parent.dependency_mask(selection)?)),
            None => Some(mask),
        }
    }

    fn translate_data(&self, entries: &Record) -> Option<Record> {
        let mut data = Record::new();
        for (name, value) in entries {
            if let Some(descriptor) = self.local(name) {
                let translate = descriptor.translate.as_ref()?;
                translate(&mut data, value.clone());
            } else if let Some(parent) = self.parent.as_ref().filter(|parent| parent.has(name)) {
                let mut entry = Record::new();
                entry.insert(name.clone(), value.clone());
                data.extend(parent.translate_data(&entry)?);
            }
        }
        Some(data)
    }

    fn select(self: Arc<Self>, selection: FieldMask) -> Arc<dyn ModelView> {
        Arc::new(MaskedView::new(self, selection))
    }

    fn wrap(self: Arc<Self>, data: Record) -> Instance {
        let store = Arc::clone(&self.store);
        Instance::new(self, store, data)
    }

    fn find(self: Arc<Self>, filter: &Record, query: FindQuery) -> Result<Vec<Instance>, ModelError> {
        let translated = self.translate_data(filter).ok_or_else(|| Self::untranslatable("filter"))?;
        let ordering =
            self.translate_data(&query.ordering).ok_or_else(|| Self::untranslatable("ordering"))?;

        let mut options = FindOptions::default().order_by_record(&ordering)?;
        options.limit = query.limit;
        options.offset = query.offset;
        options.select = query.select.as_ref().and_then(|selection| self.dependency_mask(selection));

        let records = self.store.find(&translated, &options)?;
        debug!(count = records.len(), "Model find");

        let view: Arc<dyn ModelView> = match query.select {
            Some(selection) => self.select(selection),
            None => self,
        };
        Ok(records
            .into_iter()
            .map(|record| {
                let mut instance = Arc::clone(&view).wrap(record);
                instance.sink();
                instance
            })
            .collect())
    }
}
