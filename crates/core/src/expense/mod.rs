//! Expense claim lifecycle.
//!
//! This module implements the claim state machine:
//!
//! ```text
//! PENDING ──approve──▶ APPROVED ──disburse──▶ DISBURSED
//!    │                    │
//!    └──reject──▶ REJECTED  └─ reassign disburse type (same state)
//! ```
//!
//! # Modules
//!
//! - `types` - Claim domain types (ExpenseClaim, ExpenseStatus, DisburseType)
//! - `error` - Claim-specific error types
//! - `machine` - Transition validation and application

pub mod error;
pub mod machine;
pub mod types;

#[cfg(test)]
mod machine_props;

pub use error::ExpenseError;
pub use machine::ExpenseStateMachine;
pub use types::{
    ClaimFilter, DisburseType, ExpenseClaim, ExpenseStatus, ExpenseType, NewClaimInput,
    PaymentDetails,
};
