//! Record persistence for keel models.
//!
//! Models never talk to a database directly: they delegate `find`, `insert`,
//! `update` and `delete` to an implementation of [`Store`], held as
//! `Arc<dyn Store>`. Two implementations ship with the crate:
//!
//! - **[`MemoryStore`]**: a thread-safe in-memory engine with structural filters,
//!   update operators, ordering and projection.
//! - **[`NullStore`]**: keeps nothing and reports zero effect for every operation.
//!
//! # Filters
//!
//! | Form | Meaning |
//! |---|---|
//! | `{ "a": 1 }` | property equals the value (missing equals `null`) |
//! | `{ "a": { "$gt": 1 } }` | `$eq $ne $gt $gte $lt $lte $in $nin $exists $not` |
//! | `{ "$or": [ {..}, {..} ] }` | `$and $or $nor` over sub-filters, `$not` over one |
//!
//! # Updates
//!
//! `{ "$set": {..}, "$unset": {..}, "$inc": {..} }`, or a plain replacement document.
//! The identity property is never changed by an update.
//!
//! # Example
//!
//! ```rust
//! use keel_store::{DeleteOptions, MemoryStore, Record, Store, StoreError, UpdateOptions};
//! use serde_json::json;
//!
//! fn record(value: serde_json::Value) -> Record {
//!     value.as_object().cloned().unwrap_or_default()
//! }
//!
//! # fn main() -> Result<(), StoreError> {
//! let store = MemoryStore::new();
//! store.insert_one(&mut record(json!({ "_id": "k1", "hits": 1 })))?;
//!
//! let result = store.update(
//!     &record(json!({ "_id": "k1" })),
//!     &record(json!({ "$inc": { "hits": 1 } })),
//!     UpdateOptions::default(),
//! )?;
//! assert_eq!(result.modified_count, 1);
//!
//! let removed = store.delete(&record(json!({ "hits": { "$gte": 2 } })), DeleteOptions::default())?;
//! assert_eq!(removed.deleted_count, 1);
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod filter;
mod memory;
mod null;
mod store;
mod update;
mod value;

pub use builder::MemoryStoreBuilder;
pub use error::{StoreError, StoreErrorExt};
pub use filter::matches;
pub use memory::{MemoryStore, MemoryStoreInner};
pub use null::NullStore;
pub use store::{
    DeleteOptions, DeleteResult, FindOptions, InsertOptions, InsertResult, Order, Record, Store,
    UpdateOptions, UpdateResult,
};
