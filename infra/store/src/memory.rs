//! In-memory reference engine.

use crate::builder::MemoryStoreBuilder;
use crate::error::StoreError;
use crate::filter::matches;
use crate::store::{
    DeleteOptions, DeleteResult, FindOptions, InsertOptions, InsertResult, Order, Record, Store,
    UpdateOptions, UpdateResult,
};
use crate::update;
use crate::value::{compare, equal};
use keel_kernel::safe_nanoid;
use parking_lot::RwLock;
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, trace};

/// The internal shared state of a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryStoreInner {
    pub(crate) records: RwLock<Vec<Record>>,
    /// Property holding each record's key.
    pub(crate) identity_property: String,
    /// Length of generated keys.
    pub(crate) id_length: usize,
}

/// A thread-safe, process-local record store.
///
/// Records live in insertion order behind a read-write lock. Every record carries a
/// unique key under the identity property (`_id` by default); records inserted
/// without one get a generated key.
///
/// This handle is internally reference-counted and can be cheaply cloned across
/// threads; clones share the same records.
///
/// # Example
///
/// ```rust
/// use keel_store::{FindOptions, MemoryStore, Order, Store, StoreError};
/// use serde_json::json;
///
/// # fn main() -> Result<(), StoreError> {
/// let store = MemoryStore::new();
/// let mut records = vec![
///     json!({ "name": "b", "rank": 2 }).as_object().cloned().unwrap_or_default(),
///     json!({ "name": "a", "rank": 1 }).as_object().cloned().unwrap_or_default(),
/// ];
/// store.insert(&mut records, Default::default())?;
/// assert!(records[0].contains_key("_id"));
///
/// let sorted = store.find(&Default::default(), &FindOptions::default().order_by("rank", Order::Ascending))?;
/// assert_eq!(sorted[0]["name"], "a");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    pub(crate) inner: Arc<MemoryStoreInner>,
}

impl Deref for MemoryStore {
    type Target = MemoryStoreInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty store with the default identity property and key length.
    #[must_use]
    pub fn new() -> Self {
        MemoryStoreBuilder::new().into_store()
    }

    #[must_use = "The store is not created until you call .build()"]
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::new()
    }

    #[must_use]
    pub fn identity_property(&self) -> &str {
        &self.identity_property
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn contains_id(records: &[Record], identity: &str, id: &Value) -> bool {
        records.iter().any(|record| record.get(identity).is_some_and(|existing| equal(existing, id)))
    }

    /// Evaluates the filter against every record before anything is modified.
    fn matching(records: &[Record], filter: &Record) -> Result<Vec<usize>, StoreError> {
        let mut indices = Vec::new();
        for (index, record) in records.iter().enumerate() {
            if matches(filter, record)? {
                indices.push(index);
            }
        }
        Ok(indices)
    }
}

impl Store for MemoryStore {
    fn find(&self, filter: &Record, options: &FindOptions) -> Result<Vec<Record>, StoreError> {
        let mut found = {
            let records = self.records.read();
            Self::matching(&records, filter)?
                .into_iter()
                .map(|index| records[index].clone())
                .collect::<Vec<_>>()
        };

        if !options.ordering.is_empty() {
            found.sort_by(|a, b| {
                options
                    .ordering
                    .iter()
                    .map(|(property, order)| {
                        let ord = compare(a.get(property), b.get(property));
                        if *order == Order::Descending { ord.reverse() } else { ord }
                    })
                    .find(|ord| ord.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let found = found
            .into_iter()
            .skip(options.offset.unwrap_or(0))
            .take(options.limit.unwrap_or(usize::MAX))
            .map(|record| match &options.select {
                Some(mask) => mask.project(&record),
                None => record,
            })
            .collect::<Vec<_>>();

        trace!(count = found.len(), "Memory store find");
        Ok(found)
    }

    fn insert(
        &self,
        records: &mut [Record],
        options: InsertOptions,
    ) -> Result<InsertResult, StoreError> {
        let identity = self.identity_property.as_str();
        let mut stored = self.records.write();
        let mut inserted_count = 0;

        for record in records.iter_mut() {
            match record.get(identity).filter(|id| !id.is_null()) {
                Some(id) if Self::contains_id(&stored, identity, id) => {
                    debug!(id = %id, "Skipping record with existing identity");
                    if options.ordered {
                        break;
                    }
                    continue;
                },
                Some(_) => {},
                None => {
                    let mut keyed = Record::with_capacity(record.len() + 1);
                    keyed.insert(identity.to_owned(), Value::String(safe_nanoid!(self.id_length)));
                    keyed.extend(std::mem::take(record).into_iter().filter(|(k, _)| k != identity));
                    *record = keyed;
                },
            }
            stored.push(record.clone());
            inserted_count += 1;
        }

        trace!(inserted_count, total = stored.len(), "Memory store insert");
        Ok(InsertResult { inserted_count })
    }

    fn update(
        &self,
        filter: &Record,
        update: &Record,
        options: UpdateOptions,
    ) -> Result<UpdateResult, StoreError> {
        let identity = self.identity_property.as_str();
        let mut stored = self.records.write();

        let mut targets = Self::matching(&stored, filter)?;
        if !options.multi {
            targets.truncate(1);
        }

        let changes = targets
            .iter()
            .map(|&index| update::apply(&stored[index], update, identity).map(|next| (index, next)))
            .collect::<Result<Vec<_>, _>>()?;

        let matched_count = changes.len() as u64;
        let mut modified_count = 0;
        for (index, next) in changes {
            if stored[index] != next {
                stored[index] = next;
                modified_count += 1;
            }
        }

        trace!(matched_count, modified_count, "Memory store update");
        Ok(UpdateResult { matched_count, modified_count })
    }

    fn delete(&self, filter: &Record, options: DeleteOptions) -> Result<DeleteResult, StoreError> {
        let mut stored = self.records.write();
        let targets = Self::matching(&stored, filter)?;

        let deleted_count = if options.multi {
            let mut position = 0;
            let mut cursor = targets.iter().peekable();
            stored.retain(|_| {
                let keep = cursor.next_if_eq(&&position).is_none();
                position += 1;
                keep
            });
            targets.len() as u64
        } else if let Some(&first) = targets.first() {
            stored.remove(first);
            1
        } else {
            0
        };

        trace!(deleted_count, remaining = stored.len(), "Memory store delete");
        Ok(DeleteResult { deleted_count })
    }
}
