//! Monthly budget ledger.
//!
//! One budget exists per (location, month, year). Business Managers submit
//! category figures that an admin approves; admin submissions approve
//! themselves. Spend is derived from non-rejected claims in the period.

pub mod error;
pub mod ledger;
pub mod types;


pub use error::BudgetError;
pub use ledger::{BudgetLedger, BudgetPlan};
pub use types::{
    Budget, BudgetAction, BudgetFilter, BudgetPeriod, BudgetStatus, BudgetSummary, Categories,
};
