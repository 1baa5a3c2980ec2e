//! In-memory implementation of [`SnapshotStore`].
//!
//! [`InMemoryStore`] backs tests and throwaway servers. It can be switched
//! offline to simulate a store outage, and counts accepted writes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::ProfileRecord;
use crate::traits::SnapshotStore;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    record: Mutex<Option<ProfileRecord>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `record`.
    pub fn with_record(record: ProfileRecord) -> Self {
        InMemoryStore {
            record: Mutex::new(Some(record)),
            ..Default::default()
        }
    }

    /// While offline every operation fails with [`StorageError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of upserts accepted so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The currently stored row, bypassing the offline switch.
    pub fn stored(&self) -> Option<ProfileRecord> {
        self.record.lock().ok().and_then(|guard| guard.clone())
    }

    fn ensure_online(&self) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("in-memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn fetch(&self) -> Result<ProfileRecord, StorageError> {
        self.ensure_online()?;
        let guard = self
            .record
            .lock()
            .map_err(|_| StorageError::Unavailable("record lock poisoned".into()))?;
        guard.clone().ok_or(StorageError::NotFound)
    }

    async fn upsert(&self, record: &ProfileRecord) -> Result<(), StorageError> {
        self.ensure_online()?;
        let mut guard = self
            .record
            .lock()
            .map_err(|_| StorageError::Unavailable("record lock poisoned".into()))?;
        *guard = Some(record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
