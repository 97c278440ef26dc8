//! Budget data types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use claimflow_shared::types::{BudgetId, LocationId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::budget::error::BudgetError;

/// Category code to budgeted amount.
pub type Categories = BTreeMap<String, Decimal>;

/// Budget approval status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetStatus {
    /// Submitted, awaiting an admin decision.
    Pending,
    /// Approved; gates claim creation.
    Approved,
    /// Rejected by an admin.
    Rejected,
}

impl BudgetStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar month a budget covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BudgetPeriod {
    /// Month, 1..=12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
}

impl BudgetPeriod {
    /// Creates a period, rejecting months outside 1..=12.
    pub fn new(month: u32, year: i32) -> Result<Self, BudgetError> {
        if (1..=12).contains(&month) {
            Ok(Self { month, year })
        } else {
            Err(BudgetError::InvalidPeriod { month, year })
        }
    }

    /// The period containing `at`, as seen from timezone `tz`.
    #[must_use]
    pub fn containing(at: DateTime<Utc>, tz: Tz) -> Self {
        let local = at.with_timezone(&tz);
        Self {
            month: local.month(),
            year: local.year(),
        }
    }

    /// The current period in timezone `tz`.
    #[must_use]
    pub fn current(tz: Tz) -> Self {
        Self::containing(Utc::now(), tz)
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A location's budget for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Budget ID.
    pub id: BudgetId,
    /// Location the budget belongs to.
    pub location_id: LocationId,
    /// Covered month.
    pub period: BudgetPeriod,
    /// Sum of all category amounts.
    pub amount: Decimal,
    /// Per-category amounts.
    pub categories: Categories,
    /// Approval status.
    pub status: BudgetStatus,
    /// Submitter of the current figures.
    pub created_by: UserId,
    /// Approver, set only while approved.
    pub approved_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency version.
    pub version: i64,
}

impl Budget {
    /// Returns true if the budget gates claim creation.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == BudgetStatus::Approved
    }
}

/// Admin decision on a pending budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetAction {
    /// Approve the budget.
    Approve,
    /// Reject the budget.
    Reject,
}

impl BudgetAction {
    /// Parses an action, failing with `InvalidAction` for anything else.
    pub fn parse(s: &str) -> Result<Self, BudgetError> {
        match s.trim().to_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            _ => Err(BudgetError::InvalidAction(s.to_string())),
        }
    }
}

/// Remaining-budget report for one location and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSummary {
    /// Location reported on.
    pub location_id: LocationId,
    /// Month reported on.
    pub month: u32,
    /// Year reported on.
    pub year: i32,
    /// Approved budget amount, zero without an approved budget.
    pub total_budget: Decimal,
    /// Sum of non-rejected claims in the period.
    pub spent_this_month: Decimal,
    /// `total_budget - spent_this_month`.
    pub remaining: Decimal,
    /// Whether the period's budget is approved.
    pub has_approved_budget: bool,
    /// Approved category figures.
    pub categories: Categories,
    /// Non-rejected spend per expense type code.
    pub spent_by_category: Categories,
}

/// Filter for listing budgets.
#[derive(Debug, Clone, Default)]
pub struct BudgetFilter {
    /// Restrict to one location (`None` = all locations).
    pub location_id: Option<LocationId>,
    /// Restrict to one status.
    pub status: Option<BudgetStatus>,
    /// Restrict to one year.
    pub year: Option<i32>,
}
