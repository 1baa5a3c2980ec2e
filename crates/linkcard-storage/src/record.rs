//! The stored row shape and its conversion to and from [`Snapshot`].
//!
//! Columns may be missing or null in the store, so every field is optional
//! here and the defaults are applied in [`ProfileRecord::into_snapshot`].

use linkcard_core::codec;
use linkcard_core::{Link, ProfileIdentity, Snapshot, DEFAULT_TITLE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageError;

/// Primary key of the one and only profile row.
pub const SINGLETON_ID: i64 = 1;

/// How the links collection is written into the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkEncoding {
    /// A JSON array.
    #[default]
    Json,
    /// A codec-encoded string holding the JSON array.
    Compressed,
}

/// One row of the `profile_data` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub user_icon: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_comment: Option<String>,
    #[serde(default)]
    pub links: Option<Value>,
}

impl ProfileRecord {
    /// A row with the singleton key and every other column absent.
    pub fn empty() -> Self {
        ProfileRecord {
            id: SINGLETON_ID,
            title: None,
            user_icon: None,
            user_name: None,
            user_comment: None,
            links: None,
        }
    }

    /// Builds the full row written on every save.
    pub fn from_snapshot(
        snapshot: &Snapshot,
        encoding: LinkEncoding,
    ) -> Result<Self, StorageError> {
        let links = match encoding {
            LinkEncoding::Json => serde_json::to_value(&snapshot.links)?,
            LinkEncoding::Compressed => {
                let json = serde_json::to_string(&snapshot.links)?;
                Value::String(codec::encode(&json))
            }
        };
        Ok(ProfileRecord {
            id: SINGLETON_ID,
            title: Some(snapshot.title.clone()),
            user_icon: Some(snapshot.profile.user_icon.clone()),
            user_name: Some(snapshot.profile.user_name.clone()),
            user_comment: Some(snapshot.profile.user_comment.clone()),
            links: Some(links),
        })
    }

    /// Converts the row into a snapshot, filling absent fields with defaults.
    ///
    /// Links may be a JSON array or an encoded string; either form is read
    /// regardless of the encoding currently configured for writes.
    pub fn into_snapshot(self) -> Result<Snapshot, StorageError> {
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let profile = ProfileIdentity {
            user_icon: self.user_icon.unwrap_or_default(),
            user_name: self.user_name.unwrap_or_default(),
            user_comment: self.user_comment.unwrap_or_default(),
        };
        let links = parse_links(self.links)?;
        Ok(Snapshot {
            title,
            profile,
            links,
        })
    }
}

fn parse_links(value: Option<Value>) -> Result<Vec<Link>, StorageError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(array @ Value::Array(_)) => {
            serde_json::from_value(array).map_err(|e| corrupt(format!("links: {}", e)))
        }
        Some(Value::String(text)) => {
            if text.is_empty() {
                return Ok(Vec::new());
            }
            // Fail-open decode hands plain JSON text back unchanged.
            let json = codec::decode(&text);
            serde_json::from_str(&json).map_err(|e| corrupt(format!("encoded links: {}", e)))
        }
        Some(other) => Err(corrupt(format!(
            "links must be an array or string, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn corrupt(reason: String) -> StorageError {
    StorageError::Corrupt { reason }
}
