//! The persisted profile state: [`Snapshot`], [`ProfileIdentity`] and [`Link`].
//!
//! Field names on the wire follow the page's JSON shape (`profileData`,
//! `userIcon`, ...). Every optional field has an explicit default so a
//! partially populated payload still yields a complete snapshot.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Title used when the stored record has none.
pub const DEFAULT_TITLE: &str = "SNSプロフィールリンクカード";

/// One social link. Its position in [`Snapshot::links`] is its only address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: String,
    /// Image URL or an embedded `data:` URL.
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Link {
    pub fn new(name: impl Into<String>, url: impl Into<String>, icon: impl Into<String>) -> Self {
        Link {
            name: name.into(),
            url: url.into(),
            icon: icon.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Profile identity shown above the links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileIdentity {
    pub user_icon: String,
    pub user_name: String,
    pub user_comment: String,
}

/// Partial identity update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_comment: Option<String>,
}

impl ProfilePatch {
    pub fn user_icon(value: impl Into<String>) -> Self {
        ProfilePatch {
            user_icon: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn user_name(value: impl Into<String>) -> Self {
        ProfilePatch {
            user_name: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn user_comment(value: impl Into<String>) -> Self {
        ProfilePatch {
            user_comment: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_icon.is_none() && self.user_name.is_none() && self.user_comment.is_none()
    }

    /// Shallow-merges the provided fields over `identity`.
    pub fn merge_into(&self, identity: &ProfileIdentity) -> ProfileIdentity {
        ProfileIdentity {
            user_icon: self
                .user_icon
                .clone()
                .unwrap_or_else(|| identity.user_icon.clone()),
            user_name: self
                .user_name
                .clone()
                .unwrap_or_else(|| identity.user_name.clone()),
            user_comment: self
                .user_comment
                .clone()
                .unwrap_or_else(|| identity.user_comment.clone()),
        }
    }
}

/// The complete persisted state of the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub title: String,
    #[serde(rename = "profileData")]
    pub profile: ProfileIdentity,
    pub links: Vec<Link>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            title: DEFAULT_TITLE.to_string(),
            profile: ProfileIdentity::default(),
            links: Vec::new(),
        }
    }
}

/// Link as submitted by the edit form, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkDraft {
    pub name: String,
    pub url: String,
    pub icon: String,
    pub comment: Option<String>,
}

impl LinkDraft {
    /// Validates the draft: name, url and icon must be non-blank. Values
    /// are kept as entered.
    ///
    /// A blank comment becomes `None`.
    pub fn into_link(self) -> Result<Link, CoreError> {
        let name = required("name", self.name)?;
        let url = required("url", self.url)?;
        let icon = required("icon", self.icon)?;
        let comment = self.comment.filter(|c| !c.trim().is_empty());
        Ok(Link {
            name,
            url,
            icon,
            comment,
        })
    }
}

/// Rejects blank values; accepted values are kept as entered.
fn required(field: &'static str, value: String) -> Result<String, CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::MissingLinkField { field });
    }
    Ok(value)
}
