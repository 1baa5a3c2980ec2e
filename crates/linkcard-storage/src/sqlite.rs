//! SQLite implementation of [`SnapshotStore`].
//!
//! [`SqliteStore`] keeps the singleton row in the `profile_data` table.
//! The links collection is stored as JSON TEXT via serde_json.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::error::StorageError;
use crate::record::{ProfileRecord, SINGLETON_ID};
use crate::traits::SnapshotStore;

/// SQLite-backed implementation of [`SnapshotStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("sqlite connection lock poisoned".into()))
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn fetch(&self) -> Result<ProfileRecord, StorageError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT id, title, user_icon, user_name, user_comment, links
                 FROM profile_data WHERE id = ?1",
                params![SINGLETON_ID],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, title, user_icon, user_name, user_comment, links)) = row else {
            return Err(StorageError::NotFound);
        };
        let links = links
            .map(|text| serde_json::from_str::<Value>(&text))
            .transpose()?;

        Ok(ProfileRecord {
            id,
            title,
            user_icon,
            user_name,
            user_comment,
            links,
        })
    }

    async fn upsert(&self, record: &ProfileRecord) -> Result<(), StorageError> {
        let links = record
            .links
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO profile_data (id, title, user_icon, user_name, user_comment, links, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
             ON CONFLICT(id) DO UPDATE SET
                 title = excluded.title,
                 user_icon = excluded.user_icon,
                 user_name = excluded.user_name,
                 user_comment = excluded.user_comment,
                 links = excluded.links,
                 updated_at = excluded.updated_at",
            params![
                record.id,
                record.title,
                record.user_icon,
                record.user_name,
                record.user_comment,
                links,
            ],
        )?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
