//! Access error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors produced while authenticating or authorizing an actor.
///
/// Neither variant carries detail: callers must not learn whether a
/// session was missing or expired, nor which role a rule required.
#[derive(Debug, Error)]
pub enum AccessError {
    /// No session, or the session is invalid, expired or belongs to an
    /// unknown or deactivated actor.
    #[error("Authentication required")]
    Unauthenticated,

    /// The actor lacks the role or location scope for the operation.
    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// The directory could not be consulted.
    #[error("Directory lookup failed: {0}")]
    Directory(#[from] StoreError),
}

impl AccessError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::Directory(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::Directory(_) => "INTERNAL_ERROR",
        }
    }
}
