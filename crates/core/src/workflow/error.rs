//! Workflow error types.
//!
//! [`WorkflowError`] is what every orchestrator operation returns. It wraps
//! the domain errors and maps them onto the caller-facing taxonomy.

use thiserror::Error;

use crate::access::AccessError;
use crate::budget::BudgetError;
use crate::expense::ExpenseError;
use crate::store::StoreError;

/// Caller-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No valid session.
    Unauthenticated,
    /// Role or location mismatch.
    Forbidden,
    /// Transition not legal from the current status.
    InvalidState,
    /// Missing or malformed input, or a budget rule.
    Validation,
    /// Target does not exist.
    NotFound,
    /// Lost an optimistic concurrency race.
    ConcurrentModification,
    /// Infrastructure failure.
    Internal,
}

/// Errors returned by orchestrator operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Authentication or authorization failure.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Claim validation or transition failure.
    #[error(transparent)]
    Expense(#[from] ExpenseError),

    /// Budget ledger failure.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// Target record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Requested ID.
        id: String,
    },

    /// Another writer changed the record first.
    #[error("The record was modified concurrently, please retry")]
    ConcurrentModification,

    /// Malformed request input.
    #[error("{0}")]
    Validation(String),

    /// Store failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict | StoreError::Duplicate(_) => Self::ConcurrentModification,
            StoreError::Backend(msg) => Self::Store(msg),
        }
    }
}

impl WorkflowError {
    /// Shorthand for a missing record.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the caller-facing category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Access(AccessError::Unauthenticated) => ErrorKind::Unauthenticated,
            Self::Access(AccessError::Forbidden) => ErrorKind::Forbidden,
            Self::Access(AccessError::Directory(_)) | Self::Store(_) => ErrorKind::Internal,
            Self::Expense(e) if e.is_state_error() => ErrorKind::InvalidState,
            Self::Budget(e) if e.is_state_error() => ErrorKind::InvalidState,
            Self::Expense(_) | Self::Budget(_) | Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ConcurrentModification => ErrorKind::ConcurrentModification,
        }
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Unauthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::InvalidState | ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::ConcurrentModification => 409,
            ErrorKind::Internal => 500,
        }
    }

    /// Get the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Access(e) => e.error_code(),
            Self::Expense(e) => e.error_code(),
            Self::Budget(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the caller may retry the same request unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::ConcurrentModification)
    }

    /// Returns the message that may be shown to the caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Unauthenticated => "Authentication required".to_string(),
            ErrorKind::Forbidden => "You do not have permission to perform this action".to_string(),
            ErrorKind::NotFound => "Resource not found".to_string(),
            ErrorKind::Internal => "Internal server error".to_string(),
            ErrorKind::InvalidState | ErrorKind::Validation | ErrorKind::ConcurrentModification => {
                self.to_string()
            }
        }
    }
}
