//! Shared-secret gate in front of the editor.
//!
//! Plain equality against one configured secret. This keeps casual visitors
//! out of the editor; it is not an access-control boundary.

use crate::error::CoreError;

#[derive(Clone)]
pub struct AuthGate {
    secret: String,
}

impl AuthGate {
    pub fn new(secret: impl Into<String>) -> Self {
        AuthGate {
            secret: secret.into(),
        }
    }

    /// Checks operator input against the secret. An empty secret never matches.
    pub fn check(&self, input: &str) -> Result<(), CoreError> {
        if self.secret.is_empty() || input != self.secret {
            return Err(CoreError::AuthenticationFailed);
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("secret", &"<redacted>")
            .finish()
    }
}
