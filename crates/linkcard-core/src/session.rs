//! Editor session context.
//!
//! [`EditorSession`] carries what the admin view holds for one operator:
//! whether the gate was passed and the working copy of the snapshot. The
//! working copy runs ahead of the durable one until a save succeeds.

use crate::auth::AuthGate;
use crate::edit::Edit;
use crate::error::CoreError;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone)]
pub struct EditorSession {
    authenticated: bool,
    snapshot: Snapshot,
    dirty: bool,
}

impl EditorSession {
    /// Opens an unauthenticated session over `snapshot`.
    pub fn new(snapshot: Snapshot) -> Self {
        EditorSession {
            authenticated: false,
            snapshot,
            dirty: false,
        }
    }

    pub fn authenticate(&mut self, gate: &AuthGate, input: &str) -> Result<(), CoreError> {
        gate.check(input)?;
        self.authenticated = true;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// True when the working copy has edits that have not been saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Applies `edit` to the working copy.
    ///
    /// On error the working copy is left untouched.
    pub fn apply(&mut self, edit: &Edit) -> Result<&Snapshot, CoreError> {
        if !self.authenticated {
            return Err(CoreError::NotAuthenticated);
        }
        self.snapshot = edit.apply(&self.snapshot)?;
        self.dirty = true;
        Ok(&self.snapshot)
    }

    /// Records that the current working copy reached the store.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Records that the store no longer matches the working copy.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
