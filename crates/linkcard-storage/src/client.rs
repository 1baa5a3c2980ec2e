//! [`SnapshotClient`]: load and save the whole snapshot against a store.
//!
//! Load failures are logged and returned; "never saved" stays distinct
//! from "could not reach the store". Saves are a single upsert with no
//! retry.

use std::sync::Arc;

use linkcard_core::Snapshot;

use crate::error::StorageError;
use crate::record::{LinkEncoding, ProfileRecord};
use crate::traits::SnapshotStore;

#[derive(Clone)]
pub struct SnapshotClient {
    store: Arc<dyn SnapshotStore>,
    encoding: LinkEncoding,
}

impl SnapshotClient {
    pub fn new(store: Arc<dyn SnapshotStore>, encoding: LinkEncoding) -> Self {
        SnapshotClient { store, encoding }
    }

    pub fn encoding(&self) -> LinkEncoding {
        self.encoding
    }

    /// Reads the singleton record and applies the field defaults.
    pub async fn load(&self) -> Result<Snapshot, StorageError> {
        let backend = self.store.backend();
        let record = match self.store.fetch().await {
            Ok(record) => record,
            Err(StorageError::NotFound) => {
                tracing::warn!(backend, "profile record not found");
                return Err(StorageError::NotFound);
            }
            Err(err) => {
                tracing::error!(backend, error = %err, "failed to load profile record");
                return Err(err);
            }
        };
        record.into_snapshot().inspect_err(|err| {
            tracing::error!(backend, error = %err, "stored profile record is unreadable");
        })
    }

    /// [`load`](Self::load), falling back to [`Snapshot::default`] on any error.
    pub async fn load_or_default(&self) -> Snapshot {
        self.load().await.unwrap_or_default()
    }

    /// Writes the whole snapshot as one upsert.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let backend = self.store.backend();
        let record = ProfileRecord::from_snapshot(snapshot, self.encoding)?;
        match self.store.upsert(&record).await {
            Ok(()) => {
                tracing::info!(backend, links = snapshot.links.len(), "profile saved");
                Ok(())
            }
            Err(err) => {
                tracing::error!(backend, error = %err, "failed to save profile");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for SnapshotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotClient")
            .field("backend", &self.store.backend())
            .field("encoding", &self.encoding)
            .finish()
    }
}
