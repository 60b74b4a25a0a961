//! Selection-restricted projections of a model.

use crate::error::ModelError;
use crate::field::FieldInfo;
use crate::instance::Instance;
use crate::validation::ValidationResult;
use crate::view::{FindQuery, ModelView};
use keel_mask::{FieldMask, PropertyMask};
use keel_store::{Record, Store};
use serde_json::Value;
use std::sync::Arc;

/// A view exposing only the selected fields of its base.
///
/// Reads of a selected field return `None` unless every storage property the field
/// depends on is present, so a partially loaded record never yields a value
/// computed from missing data.
#[derive(Debug, Clone)]
pub struct MaskedView {
    base: Arc<dyn ModelView>,
    selection: FieldMask,
}

impl MaskedView {
    #[must_use]
    pub fn new(base: Arc<dyn ModelView>, selection: FieldMask) -> Self {
        Self { base, selection }
    }

    #[must_use]
    pub const fn selection(&self) -> &FieldMask {
        &self.selection
    }

    #[must_use]
    pub fn base(&self) -> &Arc<dyn ModelView> {
        &self.base
    }
}

impl ModelView for MaskedView {
    fn identity_field(&self) -> &str {
        self.base.identity_field()
    }

    fn type_field(&self) -> &str {
        self.base.type_field()
    }

    fn type_value(&self) -> Option<String> {
        self.base.type_value()
    }

    fn store(&self) -> Arc<dyn Store> {
        self.base.store()
    }

    fn has(&self, name: &str) -> bool {
        self.selection.includes(name) && self.base.has(name)
    }

    fn fields(&self, selection: &FieldMask) -> Vec<String> {
        self.base.fields(&self.selection.intersect(selection))
    }

    fn query_field(&self, name: &str) -> Option<FieldInfo> {
        if !self.selection.includes(name) {
            return None;
        }
        self.base.query_field(name)
    }

    fn get_field_value(&self, data: &Record, name: &str) -> Option<Value> {
        if !self.selection.includes(name) {
            return None;
        }
        if let Some(requires) = self.dependency_mask(&FieldMask::from(name))
            && !requires.is_satisfied_by(data)
        {
            return None;
        }
        self.base.get_field_value(data, name)
    }

    fn set_field_value(&self, data: &mut Record, name: &str, value: Value) -> Option<()> {
        if !self.selection.includes(name) {
            return None;
        }
        self.base.set_field_value(data, name, value)
    }

    fn validate_field(
        &self,
        instance: &Instance,
        name: &str,
        value: &Value,
    ) -> Option<ValidationResult> {
        if !self.selection.includes(name) {
            return None;
        }
        self.base.validate_field(instance, name, value)
    }

    fn dependency_mask(&self, selection: &FieldMask) -> Option<PropertyMask> {
        self.base.dependency_mask(&self.selection.intersect(selection))
    }

    fn translate_data(&self, entries: &Record) -> Option<Record> {
        self.base.translate_data(&self.selection.project(entries))
    }

    fn select(self: Arc<Self>, selection: FieldMask) -> Arc<dyn ModelView> {
        Arc::new(Self::new(Arc::clone(&self.base), self.selection.intersect(&selection)))
    }

    fn wrap(self: Arc<Self>, data: Record) -> Instance {
        Arc::clone(&self.base).wrap(data).rebind(self)
    }

    fn find(self: Arc<Self>, filter: &Record, query: FindQuery) -> Result<Vec<Instance>, ModelError> {
        let view: Arc<dyn ModelView> = match &query.select {
            Some(selection) => Arc::clone(&self).select(selection.clone()),
            None => Arc::clone(&self) as Arc<dyn ModelView>,
        };
        let selection = query.select.as_ref().map_or_else(
            || self.selection.clone(),
            |selection| self.selection.intersect(selection),
        );
        let query = FindQuery { select: Some(selection), ..query };

        Ok(Arc::clone(&self.base)
            .find(&self.selection.project(filter), query)?
            .into_iter()
            .map(|instance| instance.rebind(Arc::clone(&view)))
            .collect())
    }
}
