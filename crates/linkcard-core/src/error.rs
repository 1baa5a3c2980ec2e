//! Core error types for linkcard-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! edit operations, the authentication gate and the codec.

use thiserror::Error;

/// Errors produced by edit operations and the editor session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A link index outside `[0, len)` was addressed.
    #[error("link index {index} out of range (len {len})")]
    LinkIndexOutOfRange { index: usize, len: usize },

    /// A required link field was empty when building a link from a draft.
    #[error("link field '{field}' must not be empty")]
    MissingLinkField { field: &'static str },

    /// The supplied secret did not match the configured one.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// An edit was attempted on a session that has not authenticated.
    #[error("session is not authenticated")]
    NotAuthenticated,
}

/// Errors produced by the strict codec functions.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input was not valid standard base64.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Compressing the input failed.
    #[error("deflate failed: {0}")]
    Deflate(std::io::Error),

    /// The decoded bytes were not a valid zlib stream.
    #[error("inflate failed: {0}")]
    Inflate(std::io::Error),

    /// The inflated bytes were not valid UTF-8.
    #[error("decoded payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
