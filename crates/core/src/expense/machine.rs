//! Expense claim state machine.
//!
//! Stateless transition functions. Each takes the stored claim and returns
//! the updated copy, leaving the input untouched on failure. Authorization
//! happens before these are called; see [`crate::access::policy`].

use chrono::{DateTime, Utc};
use claimflow_shared::types::{ClaimId, LocationId, UserId, fits_money_column};
use rust_decimal::Decimal;

use crate::budget::{BudgetPeriod, BudgetSummary};
use crate::expense::error::ExpenseError;
use crate::expense::types::{
    DisburseType, ExpenseClaim, ExpenseStatus, NewClaimInput, PaymentDetails,
};

/// Stateless service for expense claim transitions.
pub struct ExpenseStateMachine;

impl ExpenseStateMachine {
    /// Returns true if `from -> to` is an edge of the lifecycle.
    #[must_use]
    pub const fn is_valid_transition(from: ExpenseStatus, to: ExpenseStatus) -> bool {
        matches!(
            (from, to),
            (ExpenseStatus::Pending, ExpenseStatus::Approved | ExpenseStatus::Rejected)
                | (ExpenseStatus::Approved, ExpenseStatus::Disbursed)
        )
    }

    /// Validates claim input.
    pub fn validate(input: &NewClaimInput) -> Result<(), ExpenseError> {
        if input.amount <= Decimal::ZERO {
            return Err(ExpenseError::InvalidAmount);
        }
        if !fits_money_column(input.amount) {
            return Err(ExpenseError::AmountOutOfRange);
        }
        if input.details.trim().is_empty() {
            return Err(ExpenseError::MissingDetails);
        }
        if !input.attachments.iter().any(|a| !a.trim().is_empty()) {
            return Err(ExpenseError::MissingAttachment);
        }
        if input.expense_type.requires_route_and_vehicle() {
            let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
            if !present(&input.route_id) || !present(&input.vehicle_id) {
                return Err(ExpenseError::MissingRouteOrVehicle {
                    expense_type: input.expense_type,
                });
            }
        }
        Ok(())
    }

    /// Gates a new claim on the aggregate remaining budget.
    pub fn check_budget(amount: Decimal, summary: &BudgetSummary) -> Result<(), ExpenseError> {
        if !summary.has_approved_budget {
            return Err(ExpenseError::NoApprovedBudget);
        }
        if amount > summary.remaining {
            return Err(ExpenseError::BudgetExceeded {
                amount,
                remaining: summary.remaining,
            });
        }
        Ok(())
    }

    /// Builds a pending claim from validated input.
    pub fn open(
        input: NewClaimInput,
        created_by: UserId,
        location_id: LocationId,
        period: BudgetPeriod,
        at: DateTime<Utc>,
    ) -> Result<ExpenseClaim, ExpenseError> {
        Self::validate(&input)?;

        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        Ok(ExpenseClaim {
            id: ClaimId::new(),
            expense_type: input.expense_type,
            amount: input.amount,
            details: input.details.trim().to_string(),
            disburse_type: input.disburse_type,
            status: ExpenseStatus::Pending,
            location_id,
            period,
            route_id: clean(input.route_id),
            vehicle_id: clean(input.vehicle_id),
            attachments: input
                .attachments
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
            created_by,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            disbursed_by: None,
            disbursed_at: None,
            payment: PaymentDetails::default(),
            created_at: at,
            updated_at: at,
            version: 0,
        })
    }

    /// Approves a pending claim.
    pub fn approve(
        claim: &ExpenseClaim,
        approver: UserId,
        at: DateTime<Utc>,
    ) -> Result<ExpenseClaim, ExpenseError> {
        Self::require(claim, ExpenseStatus::Pending, "approved")?;

        let mut updated = claim.clone();
        updated.status = ExpenseStatus::Approved;
        updated.approved_by = Some(approver);
        updated.approved_at = Some(at);
        updated.rejected_by = None;
        updated.rejected_at = None;
        updated.updated_at = at;
        Ok(updated)
    }

    /// Rejects a pending claim.
    pub fn reject(
        claim: &ExpenseClaim,
        rejecter: UserId,
        at: DateTime<Utc>,
    ) -> Result<ExpenseClaim, ExpenseError> {
        Self::require(claim, ExpenseStatus::Pending, "rejected")?;

        let mut updated = claim.clone();
        updated.status = ExpenseStatus::Rejected;
        updated.rejected_by = Some(rejecter);
        updated.rejected_at = Some(at);
        updated.updated_at = at;
        Ok(updated)
    }

    /// Pays out an approved claim.
    ///
    /// The cheque/transfer rail needs every payment field; cash accepts
    /// whatever was supplied.
    pub fn disburse(
        claim: &ExpenseClaim,
        disburser: UserId,
        payment: Option<PaymentDetails>,
        at: DateTime<Utc>,
    ) -> Result<ExpenseClaim, ExpenseError> {
        Self::require(claim, ExpenseStatus::Approved, "disbursed")?;
        if claim.disbursed_at.is_some() {
            return Err(ExpenseError::AlreadyDisbursed);
        }

        let payment = payment.unwrap_or_default();
        if claim.disburse_type == DisburseType::ChequeOrTransfer {
            let missing = payment.missing_fields();
            if !missing.is_empty() {
                return Err(ExpenseError::MissingPaymentDetails(missing.join(", ")));
            }
        }
        if payment.disbursed_amount.is_some_and(|a| a <= Decimal::ZERO) {
            return Err(ExpenseError::InvalidPaymentAmount);
        }
        if payment.disbursed_amount.is_some_and(|a| !fits_money_column(a)) {
            return Err(ExpenseError::AmountOutOfRange);
        }

        let mut updated = claim.clone();
        updated.status = ExpenseStatus::Disbursed;
        updated.disbursed_by = Some(disburser);
        updated.disbursed_at = Some(at);
        if !payment.is_empty() {
            updated.payment = PaymentDetails {
                account_title: payment.account_title.map(|s| s.trim().to_string()),
                account_no: payment.account_no.map(|s| s.trim().to_string()),
                bank_name: payment.bank_name.map(|s| s.trim().to_string()),
                ..payment
            };
        }
        updated.updated_at = at;
        Ok(updated)
    }

    /// Moves an approved claim to another payout rail.
    pub fn reassign(
        claim: &ExpenseClaim,
        new_type: DisburseType,
        at: DateTime<Utc>,
    ) -> Result<ExpenseClaim, ExpenseError> {
        Self::require(claim, ExpenseStatus::Approved, "reassigned")?;
        if claim.disburse_type == new_type {
            return Err(ExpenseError::DisburseTypeUnchanged(new_type));
        }

        let mut updated = claim.clone();
        updated.disburse_type = new_type;
        updated.updated_at = at;
        Ok(updated)
    }

    fn require(
        claim: &ExpenseClaim,
        required: ExpenseStatus,
        action: &'static str,
    ) -> Result<(), ExpenseError> {
        if claim.status == required {
            Ok(())
        } else {
            Err(ExpenseError::InvalidState {
                required,
                action,
                current: claim.status,
            })
        }
    }
}
