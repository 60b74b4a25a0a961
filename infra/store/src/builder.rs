use crate::error::StoreError;
use crate::memory::{MemoryStore, MemoryStoreInner};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

const DEFAULT_IDENTITY_PROPERTY: &str = "_id";
const DEFAULT_ID_LENGTH: usize = 12;
const MIN_ID_LENGTH: usize = 6;

/// Fluent configuration of a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryStoreBuilder {
    identity_property: String,
    id_length: usize,
}

impl Default for MemoryStoreBuilder {
    fn default() -> Self {
        Self { identity_property: DEFAULT_IDENTITY_PROPERTY.to_owned(), id_length: DEFAULT_ID_LENGTH }
    }
}

impl MemoryStoreBuilder {
    #[must_use = "Creates a new memory store builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the property that holds each record's key"]
    pub fn identity_property(mut self, property: impl Into<String>) -> Self {
        self.identity_property = property.into();
        self
    }

    #[must_use = "Sets the length of generated record keys"]
    pub const fn id_length(mut self, length: usize) -> Self {
        self.id_length = length;
        self
    }

    /// Validates the configuration and creates an empty store.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidConfiguration`] if the identity property is blank,
    /// starts with `$`, or the key length is below six characters.
    pub fn build(mut self) -> Result<MemoryStore, StoreError> {
        let property = self.identity_property.trim().to_owned();
        if property.is_empty() || property.starts_with('$') {
            return Err(StoreError::InvalidConfiguration {
                message: format!("Invalid identity property '{}'", self.identity_property).into(),
                context: None,
            });
        }
        if self.id_length < MIN_ID_LENGTH {
            return Err(StoreError::InvalidConfiguration {
                message: format!("id_length must be at least {MIN_ID_LENGTH}").into(),
                context: None,
            });
        }

        self.identity_property = property;
        info!(identity = %self.identity_property, id_length = self.id_length, "Created memory store");
        Ok(self.into_store())
    }

    pub(crate) fn into_store(self) -> MemoryStore {
        MemoryStore {
            inner: Arc::new(MemoryStoreInner {
                records: RwLock::new(Vec::new()),
                identity_property: self.identity_property,
                id_length: self.id_length,
            }),
        }
    }
}
