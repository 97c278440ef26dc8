//! Budget ledger error types.

use thiserror::Error;

use crate::budget::types::BudgetStatus;

/// Errors raised by budget submission and decisions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// Cleaned category total is zero or negative, or overflows.
    #[error("Budget amount must be greater than zero")]
    InvalidAmount,

    /// A figure has more than four decimal places or is too large to store.
    #[error(
        "Budget amount for {field} must have at most 4 decimal places and be below 1000000000000000"
    )]
    AmountOutOfRange {
        /// Category name, or `total` for the summed amount.
        field: String,
    },

    /// Approved budget cannot be changed by a non-admin.
    #[error("Budget for this period is approved and locked")]
    BudgetLocked,

    /// Unknown budget decision.
    #[error("Invalid action '{0}': expected approve or reject")]
    InvalidAction(String),

    /// Decision on a budget that is not pending.
    #[error("Only pending budgets can be actioned (current status: {current})")]
    InvalidState {
        /// The budget's current status.
        current: BudgetStatus,
    },

    /// Month outside 1..=12.
    #[error("Invalid budget period: month {month} of {year}")]
    InvalidPeriod {
        /// Requested month.
        month: u32,
        /// Requested year.
        year: i32,
    },
}

impl BudgetError {
    /// Returns true for decision-guard failures.
    #[must_use]
    pub const fn is_state_error(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        400
    }

    /// Get the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::BudgetLocked => "BUDGET_LOCKED",
            Self::InvalidAction(_) => "INVALID_ACTION",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
        }
    }
}
