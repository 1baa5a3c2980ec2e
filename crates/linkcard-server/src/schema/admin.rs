//! Editor API request/response types.

use linkcard_core::{LinkDraft, ProfilePatch, Snapshot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to open an editor session.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Response carrying the session token for later requests.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTitleRequest {
    pub title: String,
}

/// Body of `POST /admin/links` and `PUT /admin/links/{index}`.
pub type LinkRequest = LinkDraft;

/// Body of `PATCH /admin/profile`.
pub type ProfileRequest = ProfilePatch;

/// Whether the working copy reached the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Persistence {
    /// Saved as part of this request.
    Saved,
    /// Not saved yet; waiting for an explicit save.
    Pending,
    /// The save was attempted and failed; the edit is kept in the session.
    Failed { message: String },
}

/// The session's working copy after a request.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub snapshot: Snapshot,
    /// True while the working copy is ahead of the store.
    pub dirty: bool,
}

/// Response to an edit or save request.
#[derive(Debug, Clone, Serialize)]
pub struct EditResponse {
    pub snapshot: Snapshot,
    pub dirty: bool,
    pub persistence: Persistence,
}
