//! Core data model for the linkcard profile page.
//!
//! A single [`Snapshot`] holds the whole persisted state: the page title,
//! the profile identity and the ordered link list. Edits are pure functions
//! in [`edit`] that derive a new snapshot from an old one; [`session`]
//! carries the editor's working copy and [`codec`] compacts serialized
//! payloads.

pub mod auth;
pub mod codec;
pub mod edit;
pub mod error;
pub mod session;
pub mod snapshot;

// Re-export commonly used types
pub use auth::AuthGate;
pub use edit::Edit;
pub use error::{CodecError, CoreError};
pub use session::EditorSession;
pub use snapshot::{Link, LinkDraft, ProfileIdentity, ProfilePatch, Snapshot, DEFAULT_TITLE};
