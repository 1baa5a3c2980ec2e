//! Application state with the shared [`ProfileService`].
//!
//! [`AppState`] wraps the service in an `Arc` for use with axum handlers.
//! The service guards its own interior state (published snapshot behind a
//! `tokio::sync::RwLock`, sessions in a `DashMap`), so handlers share it
//! without an outer lock.

use std::sync::Arc;

use linkcard_core::AuthGate;
use linkcard_storage::{
    InMemoryStore, LinkEncoding, RestStore, SnapshotClient, SnapshotStore, SqliteStore,
    StorageError,
};

use crate::config::{SavePolicy, ServerConfig, StoreBackend};
use crate::service::ProfileService;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProfileService>,
}

impl AppState {
    /// Builds the store named by `config` and loads the published snapshot.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, StorageError> {
        let store: Arc<dyn SnapshotStore> = match &config.backend {
            StoreBackend::Memory => Arc::new(InMemoryStore::new()),
            StoreBackend::Sqlite { path } => Arc::new(SqliteStore::new(path)?),
            StoreBackend::Remote {
                url,
                api_key,
                table,
            } => Arc::new(RestStore::new(url, api_key, table)),
        };
        tracing::info!(backend = store.backend(), "snapshot store ready");

        let state = Self::with_store(
            store,
            config.link_encoding,
            &config.admin_password,
            config.save_policy,
        );
        state.service.refresh_published().await;
        Ok(state)
    }

    /// Wraps an existing store. The published snapshot starts as the
    /// default until `refresh_published` runs.
    pub fn with_store(
        store: Arc<dyn SnapshotStore>,
        encoding: LinkEncoding,
        admin_password: &str,
        policy: SavePolicy,
    ) -> Self {
        let client = SnapshotClient::new(store, encoding);
        let service = ProfileService::new(client, AuthGate::new(admin_password), policy);
        AppState {
            service: Arc::new(service),
        }
    }

    /// State over a fresh in-memory store (for testing).
    pub fn in_memory(admin_password: &str, policy: SavePolicy) -> Self {
        Self::with_store(
            Arc::new(InMemoryStore::new()),
            LinkEncoding::Json,
            admin_password,
            policy,
        )
    }
}
