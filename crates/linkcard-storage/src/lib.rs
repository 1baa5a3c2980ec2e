//! Storage for the linkcard singleton record.
//!
//! Provides the [`SnapshotStore`] trait that every backend implements, the
//! [`ProfileRecord`] row schema with its defaulting rules, and
//! [`SnapshotClient`], which converts between records and snapshots.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`record`]: ProfileRecord row shape and snapshot conversion
//! - [`traits`]: SnapshotStore trait definition
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL migrations for the SQLite backend
//! - [`sqlite`]: SqliteStore implementation
//! - [`rest`]: RestStore client for a hosted PostgREST table
//! - [`client`]: SnapshotClient load/save operations

pub mod client;
pub mod error;
pub mod memory;
pub mod record;
pub mod rest;
pub mod schema;
pub mod sqlite;
pub mod traits;

// Re-export key types for ergonomic use.
pub use client::SnapshotClient;
pub use error::StorageError;
pub use memory::InMemoryStore;
pub use record::{LinkEncoding, ProfileRecord, SINGLETON_ID};
pub use rest::RestStore;
pub use sqlite::SqliteStore;
pub use traits::SnapshotStore;
