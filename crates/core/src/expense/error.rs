//! Expense claim error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::expense::types::{DisburseType, ExpenseStatus, ExpenseType};

/// Errors raised while validating or transitioning an expense claim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseError {
    /// Amount is zero or negative.
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    /// Amount has more than four decimal places or is too large to store.
    #[error("Amount must have at most 4 decimal places and be below 1000000000000000")]
    AmountOutOfRange,

    /// Details text is empty.
    #[error("Expense details are required")]
    MissingDetails,

    /// No attachment was supplied.
    #[error("At least one attachment is required")]
    MissingAttachment,

    /// Vehicle-related claim without route or vehicle.
    #[error("Route and vehicle are required for {expense_type} expenses")]
    MissingRouteOrVehicle {
        /// The expense type that needs them.
        expense_type: ExpenseType,
    },

    /// The location has no approved budget for the period.
    #[error("No approved budget for this location and period")]
    NoApprovedBudget,

    /// The claim would overrun the remaining budget.
    #[error("Amount {amount} exceeds remaining budget {remaining}")]
    BudgetExceeded {
        /// Claimed amount.
        amount: Decimal,
        /// Remaining budget at the time of the check.
        remaining: Decimal,
    },

    /// Transition not legal from the current status.
    #[error("Only {required} expenses can be {action} (current status: {current})")]
    InvalidState {
        /// Status the transition requires.
        required: ExpenseStatus,
        /// Past-tense verb for the attempted transition.
        action: &'static str,
        /// The claim's current status.
        current: ExpenseStatus,
    },

    /// Disbursement was already recorded.
    #[error("Expense has already been disbursed")]
    AlreadyDisbursed,

    /// Cheque/transfer payout without the full payment details.
    #[error("Missing payment details: {0}")]
    MissingPaymentDetails(String),

    /// Disbursed amount is zero or negative.
    #[error("Disbursed amount must be greater than zero")]
    InvalidPaymentAmount,

    /// Reassignment to the rail the claim already uses.
    #[error("Expense is already set to {0}")]
    DisburseTypeUnchanged(DisburseType),
}

impl ExpenseError {
    /// Returns true for transition-guard failures.
    #[must_use]
    pub const fn is_state_error(&self) -> bool {
        matches!(self, Self::InvalidState { .. } | Self::AlreadyDisbursed)
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
            Self::AmountOutOfRange => "AMOUNT_OUT_OF_RANGE",
            Self::MissingDetails => "MISSING_DETAILS",
            Self::MissingAttachment => "MISSING_ATTACHMENT",
            Self::MissingRouteOrVehicle { .. } => "MISSING_ROUTE_OR_VEHICLE",
            Self::NoApprovedBudget => "NO_APPROVED_BUDGET",
            Self::BudgetExceeded { .. } => "BUDGET_EXCEEDED",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::AlreadyDisbursed => "ALREADY_DISBURSED",
            Self::MissingPaymentDetails(_) => "MISSING_PAYMENT_DETAILS",
            Self::InvalidPaymentAmount => "INVALID_PAYMENT_AMOUNT",
            Self::DisburseTypeUnchanged(_) => "DISBURSE_TYPE_UNCHANGED",
        }
    }
}
