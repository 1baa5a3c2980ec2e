//! Response types for the fetch-all and upsert-all endpoints.
//!
//! Both endpoints exchange a bare [`linkcard_core::Snapshot`] as
//! `{title, profileData, links}`; only the success acknowledgement needs
//! its own type.

use serde::Serialize;

/// Body returned after a successful upsert.
#[derive(Debug, Clone, Serialize)]
pub struct SaveDataResponse {
    pub message: &'static str,
}

impl SaveDataResponse {
    pub fn saved() -> Self {
        SaveDataResponse {
            message: "Data saved successfully",
        }
    }
}
