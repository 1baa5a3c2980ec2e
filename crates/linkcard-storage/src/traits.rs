//! The [`SnapshotStore`] trait defining the storage contract for the
//! singleton profile record.
//!
//! Stores only ever see whole rows: there is one read of the full record
//! and one upsert that overwrites it. All backends (InMemoryStore,
//! SqliteStore, RestStore) implement this trait and are interchangeable
//! behind `Arc<dyn SnapshotStore>`.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::ProfileRecord;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Reads the singleton record.
    ///
    /// Returns [`StorageError::NotFound`] when it has never been written.
    async fn fetch(&self) -> Result<ProfileRecord, StorageError>;

    /// Inserts the record if absent, otherwise overwrites every column.
    async fn upsert(&self, record: &ProfileRecord) -> Result<(), StorageError>;

    /// Backend name for log lines.
    fn backend(&self) -> &'static str;
}
