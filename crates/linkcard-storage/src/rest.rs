//! Client for a hosted PostgREST-style table (the managed store the page
//! is deployed against).
//!
//! Reads select the singleton row by primary key; writes POST the full row
//! with `Prefer: resolution=merge-duplicates`, which the server treats as an
//! upsert on the primary key.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use crate::error::StorageError;
use crate::record::{ProfileRecord, SINGLETON_ID};
use crate::traits::SnapshotStore;

/// Default table name for the profile row.
pub const DEFAULT_TABLE: &str = "profile_data";

#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    table: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Self {
        RestStore {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn select_url(&self) -> String {
        format!("{}?select=*&id=eq.{}", self.table_url(), SINGLETON_ID)
    }

    fn auth_headers(&self) -> Result<HeaderMap, StorageError> {
        let invalid = |_| StorageError::Unavailable("store credential is not a valid header".into());
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&self.api_key).map_err(invalid)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(invalid)?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Remote {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl SnapshotStore for RestStore {
    async fn fetch(&self) -> Result<ProfileRecord, StorageError> {
        let response = self
            .client
            .get(self.select_url())
            .headers(self.auth_headers()?)
            .send()
            .await?;
        let rows: Vec<ProfileRecord> = check_status(response).await?.json().await?;
        rows.into_iter().next().ok_or(StorageError::NotFound)
    }

    async fn upsert(&self, record: &ProfileRecord) -> Result<(), StorageError> {
        let response = self
            .client
            .post(self.table_url())
            .headers(self.auth_headers()?)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(record)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "rest"
    }
}
