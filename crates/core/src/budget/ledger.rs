//! Budget ledger rules.
//!
//! Stateless functions for cleaning submitted figures, deciding between
//! creating and overwriting a period's budget, applying admin decisions and
//! computing the remaining budget from recorded spend.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use claimflow_shared::types::{BudgetId, LocationId, fits_money_column};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::access::ActorContext;
use crate::budget::error::BudgetError;
use crate::budget::types::{
    Budget, BudgetAction, BudgetPeriod, BudgetStatus, BudgetSummary, Categories,
};

/// Outcome of a budget submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetPlan {
    /// No budget existed for the period; insert this one.
    Create(Budget),
    /// Overwrite the existing budget with these figures.
    Update(Budget),
}

impl BudgetPlan {
    /// The budget to persist.
    #[must_use]
    pub fn budget(&self) -> &Budget {
        match self {
            Self::Create(b) | Self::Update(b) => b,
        }
    }
}

/// Stateless budget ledger.
pub struct BudgetLedger;

impl BudgetLedger {
    /// Cleans raw category input.
    ///
    /// Keeps entries whose value is a number or numeric string strictly
    /// greater than zero. Keys are trimmed; blank keys are dropped.
    /// Figures too precise or too large to store are kept here and
    /// rejected by [`Self::plan_submission`].
    #[must_use]
    pub fn clean_categories(raw: &Map<String, Value>) -> Categories {
        raw.iter()
            .filter_map(|(key, value)| {
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                let amount = Self::parse_amount(value)?;
                (amount > Decimal::ZERO).then(|| (key.to_string(), amount))
            })
            .collect()
    }

    fn parse_amount(value: &Value) -> Option<Decimal> {
        let text = match value {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.trim().to_string(),
            _ => return None,
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .ok()
    }

    /// Sum of all category amounts.
    ///
    /// Returns [`BudgetError::InvalidAmount`] if the sum overflows.
    pub fn total(categories: &Categories) -> Result<Decimal, BudgetError> {
        categories
            .values()
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
            .ok_or(BudgetError::InvalidAmount)
    }

    /// Decides how a submission lands for the actor's location and period.
    ///
    /// Admin-tier submissions are approved with the actor as approver.
    /// Anyone else gets a pending budget and cannot touch an approved one.
    /// Every figure, and their total, must fit a money column.
    pub fn plan_submission(
        existing: Option<&Budget>,
        ctx: &ActorContext,
        categories: Categories,
        period: BudgetPeriod,
        at: DateTime<Utc>,
    ) -> Result<BudgetPlan, BudgetError> {
        if let Some((field, _)) = categories.iter().find(|(_, v)| !fits_money_column(**v)) {
            return Err(BudgetError::AmountOutOfRange {
                field: field.clone(),
            });
        }
        let amount = Self::total(&categories)?;
        if amount <= Decimal::ZERO {
            return Err(BudgetError::InvalidAmount);
        }
        if !fits_money_column(amount) {
            return Err(BudgetError::AmountOutOfRange {
                field: "total".to_string(),
            });
        }

        let admin = ctx.is_admin_tier();
        let (status, approved_by) = if admin {
            (BudgetStatus::Approved, Some(ctx.actor_id()))
        } else {
            (BudgetStatus::Pending, None)
        };

        match existing {
            None => Ok(BudgetPlan::Create(Budget {
                id: BudgetId::new(),
                location_id: ctx.location_id(),
                period,
                amount,
                categories,
                status,
                created_by: ctx.actor_id(),
                approved_by,
                created_at: at,
                updated_at: at,
                version: 0,
            })),
            Some(current) if current.is_approved() && !admin => Err(BudgetError::BudgetLocked),
            Some(current) => Ok(BudgetPlan::Update(Budget {
                amount,
                categories,
                status,
                approved_by,
                created_by: ctx.actor_id(),
                updated_at: at,
                ..current.clone()
            })),
        }
    }

    /// Applies an admin decision to a pending budget.
    pub fn apply_action(
        budget: &Budget,
        action: BudgetAction,
        ctx: &ActorContext,
        at: DateTime<Utc>,
    ) -> Result<Budget, BudgetError> {
        if budget.status != BudgetStatus::Pending {
            return Err(BudgetError::InvalidState {
                current: budget.status,
            });
        }

        let mut updated = budget.clone();
        match action {
            BudgetAction::Approve => {
                updated.status = BudgetStatus::Approved;
                updated.approved_by = Some(ctx.actor_id());
            }
            BudgetAction::Reject => {
                updated.status = BudgetStatus::Rejected;
                updated.approved_by = None;
            }
        }
        updated.updated_at = at;
        Ok(updated)
    }

    /// Builds the remaining-budget report.
    ///
    /// `spend` maps expense type codes to the sum of non-rejected claims
    /// in the period. Only an approved budget contributes a total.
    #[must_use]
    pub fn summarize(
        location_id: LocationId,
        period: BudgetPeriod,
        budget: Option<&Budget>,
        spend: Categories,
    ) -> BudgetSummary {
        let approved = budget.filter(|b| b.is_approved());
        let total_budget = approved.map_or(Decimal::ZERO, |b| b.amount);
        let categories = approved.map(|b| b.categories.clone()).unwrap_or_default();
        let spent_this_month = spend
            .values()
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v));

        BudgetSummary {
            location_id,
            month: period.month,
            year: period.year,
            total_budget,
            spent_this_month,
            remaining: total_budget.saturating_sub(spent_this_month),
            has_approved_budget: approved.is_some(),
            categories,
            spent_by_category: spend,
        }
    }
}
