use crate::error::StoreError;
use crate::store::{
    DeleteOptions, DeleteResult, FindOptions, InsertOptions, InsertResult, Record, Store,
    UpdateOptions, UpdateResult,
};
use tracing::trace;

/// A store that keeps nothing: every operation reports zero effect and `find`
/// returns no records. Used when no backing store is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl Store for NullStore {
    fn find(&self, _filter: &Record, _options: &FindOptions) -> Result<Vec<Record>, StoreError> {
        trace!("Null store find");
        Ok(Vec::new())
    }

    fn insert(
        &self,
        records: &mut [Record],
        _options: InsertOptions,
    ) -> Result<InsertResult, StoreError> {
        trace!(skipped = records.len(), "Null store insert");
        Ok(InsertResult::default())
    }

    fn update(
        &self,
        _filter: &Record,
        _update: &Record,
        _options: UpdateOptions,
    ) -> Result<UpdateResult, StoreError> {
        trace!("Null store update");
        Ok(UpdateResult::default())
    }

    fn delete(&self, _filter: &Record, _options: DeleteOptions) -> Result<DeleteResult, StoreError> {
        trace!("Null store delete");
        Ok(DeleteResult::default())
    }
}
