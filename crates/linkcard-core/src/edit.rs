//! Pure edit operations over a [`Snapshot`].
//!
//! Each function borrows the current snapshot and returns a new one; the
//! argument is never mutated. Links are addressed by position, so deleting
//! a link shifts every later link down by one.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::snapshot::{Link, LinkDraft, ProfilePatch, Snapshot};

/// Appends `link` to the end of the link list.
pub fn add_link(snapshot: &Snapshot, link: Link) -> Snapshot {
    let mut next = snapshot.clone();
    next.links.push(link);
    next
}

/// Replaces the link at `index`.
pub fn update_link(snapshot: &Snapshot, index: usize, link: Link) -> Result<Snapshot, CoreError> {
    check_index(snapshot, index)?;
    let mut next = snapshot.clone();
    next.links[index] = link;
    Ok(next)
}

/// Removes the link at `index`.
pub fn delete_link(snapshot: &Snapshot, index: usize) -> Result<Snapshot, CoreError> {
    check_index(snapshot, index)?;
    let mut next = snapshot.clone();
    next.links.remove(index);
    Ok(next)
}

/// Shallow-merges `patch` over the profile identity.
pub fn update_profile(snapshot: &Snapshot, patch: &ProfilePatch) -> Snapshot {
    Snapshot {
        title: snapshot.title.clone(),
        profile: patch.merge_into(&snapshot.profile),
        links: snapshot.links.clone(),
    }
}

/// Replaces the page title.
pub fn update_title(snapshot: &Snapshot, title: impl Into<String>) -> Snapshot {
    Snapshot {
        title: title.into(),
        profile: snapshot.profile.clone(),
        links: snapshot.links.clone(),
    }
}

fn check_index(snapshot: &Snapshot, index: usize) -> Result<(), CoreError> {
    let len = snapshot.links.len();
    if index >= len {
        return Err(CoreError::LinkIndexOutOfRange { index, len });
    }
    Ok(())
}

/// A single editor action, as submitted by the admin view.
///
/// Link payloads arrive as drafts and are validated when applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Edit {
    AddLink {
        link: LinkDraft,
    },
    UpdateLink {
        index: usize,
        link: LinkDraft,
    },
    DeleteLink {
        index: usize,
    },
    UpdateProfile {
        profile: ProfilePatch,
    },
    UpdateTitle {
        title: String,
    },
}

impl Edit {
    /// Derives the snapshot that results from applying this edit.
    pub fn apply(&self, snapshot: &Snapshot) -> Result<Snapshot, CoreError> {
        match self {
            Edit::AddLink { link } => Ok(add_link(snapshot, link.clone().into_link()?)),
            Edit::UpdateLink { index, link } => {
                update_link(snapshot, *index, link.clone().into_link()?)
            }
            Edit::DeleteLink { index } => delete_link(snapshot, *index),
            Edit::UpdateProfile { profile } => Ok(update_profile(snapshot, profile)),
            Edit::UpdateTitle { title } => Ok(update_title(snapshot, title.clone())),
        }
    }

    /// Short operation name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Edit::AddLink { .. } => "add_link",
            Edit::UpdateLink { .. } => "update_link",
            Edit::DeleteLink { .. } => "delete_link",
            Edit::UpdateProfile { .. } => "update_profile",
            Edit::UpdateTitle { .. } => "update_title",
        }
    }
}
