//! Orchestrator for claim and budget operations.

use chrono::Utc;
use chrono_tz::Tz;
use claimflow_shared::types::{BudgetId, ClaimId, LocationId, NotificationId, fits_money_column};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::info;

use crate::access::{ActorContext, policy};
use crate::budget::{
    Budget, BudgetAction, BudgetError, BudgetFilter, BudgetLedger, BudgetPeriod, BudgetPlan,
    BudgetStatus, BudgetSummary,
};
use crate::expense::{
    ClaimFilter, DisburseType, ExpenseClaim, ExpenseError, ExpenseStateMachine, ExpenseStatus,
    NewClaimInput, PaymentDetails,
};
use crate::location::Location;
use crate::notify::{Notification, NotificationDispatcher, NotificationEvent};
use crate::store::{BudgetGuard, Stores};
use crate::workflow::error::WorkflowError;

/// Result type alias using `WorkflowError`.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Claim listing parameters.
#[derive(Debug, Clone, Default)]
pub struct ClaimQuery {
    /// Restrict to one status.
    pub status: Option<ExpenseStatus>,
    /// Restrict to one period month (1..=12).
    pub month: Option<u32>,
    /// Restrict to one period year.
    pub year: Option<i32>,
    /// Location to list; Super Admins may omit it for all locations.
    pub location_id: Option<LocationId>,
}

/// The expense claim lifecycle engine.
#[derive(Clone)]
pub struct Workflow {
    stores: Stores,
    dispatcher: NotificationDispatcher,
    timezone: Tz,
}

impl Workflow {
    /// Creates the engine.
    ///
    /// `timezone` decides which month "now" falls in for budget periods.
    pub fn new(stores: Stores, dispatcher: NotificationDispatcher, timezone: Tz) -> Self {
        Self {
            stores,
            dispatcher,
            timezone,
        }
    }

    /// The notification dispatcher, for draining on shutdown.
    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// The current budget period.
    pub fn current_period(&self) -> BudgetPeriod {
        BudgetPeriod::current(self.timezone)
    }

    async fn load_claim(&self, id: ClaimId) -> WorkflowResult<ExpenseClaim> {
        self.stores
            .claims
            .find_claim(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Expense", id))
    }

    async fn load_budget(&self, id: BudgetId) -> WorkflowResult<Budget> {
        self.stores
            .budgets
            .find_budget(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Budget", id))
    }

    async fn summarize(
        &self,
        location_id: LocationId,
        period: BudgetPeriod,
    ) -> WorkflowResult<(Option<Budget>, BudgetSummary)> {
        let budget = self
            .stores
            .budgets
            .find_budget_for_period(location_id, period)
            .await?;
        let spend = self.stores.claims.period_spend(location_id, period).await?;
        let summary = BudgetLedger::summarize(location_id, period, budget.as_ref(), spend);
        Ok((budget, summary))
    }

    // ------------------------------------------------------------------
    // Claims
    // ------------------------------------------------------------------

    /// Raises a claim at the actor's location for the current period.
    ///
    /// Fails with `NoApprovedBudget` or `BudgetExceeded` without writing
    /// anything. The insert is conditional on the period budget's version,
    /// so a concurrent creation against the same spend figure loses with
    /// `ConcurrentModification`.
    pub async fn create_claim(
        &self,
        ctx: &ActorContext,
        input: NewClaimInput,
    ) -> WorkflowResult<ExpenseClaim> {
        policy::authorize_claim_creation(ctx)?;
        ExpenseStateMachine::validate(&input)?;

        let location_id = ctx.location_id();
        let period = self.current_period();
        let (budget, summary) = self.summarize(location_id, period).await?;
        ExpenseStateMachine::check_budget(input.amount, &summary)?;
        let guard = budget
            .filter(Budget::is_approved)
            .map(|b| BudgetGuard {
                budget_id: b.id,
                version: b.version,
            })
            .ok_or(ExpenseError::NoApprovedBudget)?;

        let claim =
            ExpenseStateMachine::open(input, ctx.actor_id(), location_id, period, Utc::now())?;
        let stored = self.stores.claims.insert_claim(&claim, guard).await?;

        info!(
            claim_id = %stored.id,
            location_id = %stored.location_id,
            actor_id = %ctx.actor_id(),
            amount = %stored.amount,
            "Expense claim created"
        );
        self.dispatcher.dispatch(NotificationEvent::submitted(&stored));
        Ok(stored)
    }

    /// Approves a pending claim.
    pub async fn approve_claim(
        &self,
        ctx: &ActorContext,
        id: ClaimId,
    ) -> WorkflowResult<ExpenseClaim> {
        policy::authorize_claim_decision(ctx)?;
        let claim = self.load_claim(id).await?;
        policy::authorize_location_scope(ctx, claim.location_id)?;

        let updated = ExpenseStateMachine::approve(&claim, ctx.actor_id(), Utc::now())?;
        let stored = self.stores.claims.update_claim(&updated).await?;

        info!(
            claim_id = %stored.id,
            location_id = %stored.location_id,
            actor_id = %ctx.actor_id(),
            "Expense claim approved"
        );
        self.dispatcher.dispatch(NotificationEvent::approved(&stored));
        Ok(stored)
    }

    /// Rejects a pending claim, releasing its amount from the budget.
    pub async fn reject_claim(
        &self,
        ctx: &ActorContext,
        id: ClaimId,
    ) -> WorkflowResult<ExpenseClaim> {
        policy::authorize_claim_decision(ctx)?;
        let claim = self.load_claim(id).await?;
        policy::authorize_location_scope(ctx, claim.location_id)?;

        let updated = ExpenseStateMachine::reject(&claim, ctx.actor_id(), Utc::now())?;
        let stored = self.stores.claims.update_claim(&updated).await?;

        info!(
            claim_id = %stored.id,
            location_id = %stored.location_id,
            actor_id = %ctx.actor_id(),
            "Expense claim rejected"
        );
        Ok(stored)
    }

    /// Pays out an approved claim on its current rail.
    pub async fn disburse_claim(
        &self,
        ctx: &ActorContext,
        id: ClaimId,
        payment: Option<PaymentDetails>,
    ) -> WorkflowResult<ExpenseClaim> {
        policy::authorize_payout_staff(ctx)?;
        let claim = self.load_claim(id).await?;
        policy::authorize_disbursement(ctx, claim.disburse_type, claim.location_id)?;

        let updated = ExpenseStateMachine::disburse(&claim, ctx.actor_id(), payment, Utc::now())?;
        let stored = self.stores.claims.update_claim(&updated).await?;

        info!(
            claim_id = %stored.id,
            location_id = %stored.location_id,
            actor_id = %ctx.actor_id(),
            disburse_type = %stored.disburse_type,
            "Expense claim disbursed"
        );
        Ok(stored)
    }

    /// Moves an approved claim to the other payout rail.
    pub async fn reassign_disburse_type(
        &self,
        ctx: &ActorContext,
        id: ClaimId,
        new_type: DisburseType,
    ) -> WorkflowResult<ExpenseClaim> {
        policy::authorize_payout_staff(ctx)?;
        let claim = self.load_claim(id).await?;
        policy::authorize_disburse_type_change(ctx, new_type, claim.location_id)?;

        let updated = ExpenseStateMachine::reassign(&claim, new_type, Utc::now())?;
        let stored = self.stores.claims.update_claim(&updated).await?;

        info!(
            claim_id = %stored.id,
            location_id = %stored.location_id,
            actor_id = %ctx.actor_id(),
            from = %claim.disburse_type,
            to = %new_type,
            "Expense claim disburse type changed"
        );
        Ok(stored)
    }

    /// Fetches a claim within the actor's scope.
    pub async fn get_claim(&self, ctx: &ActorContext, id: ClaimId) -> WorkflowResult<ExpenseClaim> {
        let claim = self.load_claim(id).await?;
        policy::authorize_location_scope(ctx, claim.location_id)?;
        Ok(claim)
    }

    /// Lists claims within the actor's scope, newest first.
    pub async fn list_claims(
        &self,
        ctx: &ActorContext,
        query: ClaimQuery,
    ) -> WorkflowResult<Vec<ExpenseClaim>> {
        let location_id = policy::resolve_list_scope(ctx, query.location_id)?;
        if let Some(month) = query.month.filter(|m| !(1..=12).contains(m)) {
            return Err(BudgetError::InvalidPeriod {
                month,
                year: query.year.unwrap_or_else(|| self.current_period().year),
            }
            .into());
        }

        let filter = ClaimFilter {
            location_id,
            status: query.status,
            month: query.month,
            year: query.year,
        };
        Ok(self.stores.claims.list_claims(&filter).await?)
    }

    // ------------------------------------------------------------------
    // Budgets
    // ------------------------------------------------------------------

    /// Submits or overwrites the actor location's budget for the current
    /// period.
    pub async fn submit_budget(
        &self,
        ctx: &ActorContext,
        categories: &Map<String, Value>,
    ) -> WorkflowResult<Budget> {
        policy::authorize_budget_submission(ctx)?;
        let cleaned = BudgetLedger::clean_categories(categories);
        let period = self.current_period();
        let existing = self
            .stores
            .budgets
            .find_budget_for_period(ctx.location_id(), period)
            .await?;

        let plan =
            BudgetLedger::plan_submission(existing.as_ref(), ctx, cleaned, period, Utc::now())?;
        let stored = match plan {
            BudgetPlan::Create(budget) => self.stores.budgets.insert_budget(&budget).await?,
            BudgetPlan::Update(budget) => self.stores.budgets.update_budget(&budget).await?,
        };

        info!(
            budget_id = %stored.id,
            location_id = %stored.location_id,
            actor_id = %ctx.actor_id(),
            period = %stored.period,
            status = %stored.status,
            amount = %stored.amount,
            "Budget submitted"
        );
        Ok(stored)
    }

    /// Approves or rejects a pending budget.
    pub async fn action_budget(
        &self,
        ctx: &ActorContext,
        id: BudgetId,
        action: &str,
    ) -> WorkflowResult<Budget> {
        policy::authorize_budget_decision(ctx)?;
        let budget = self.load_budget(id).await?;
        policy::authorize_location_scope(ctx, budget.location_id)?;
        let action = BudgetAction::parse(action)?;

        let updated = BudgetLedger::apply_action(&budget, action, ctx, Utc::now())?;
        let stored = self.stores.budgets.update_budget(&updated).await?;

        info!(
            budget_id = %stored.id,
            location_id = %stored.location_id,
            actor_id = %ctx.actor_id(),
            status = %stored.status,
            "Budget actioned"
        );
        Ok(stored)
    }

    /// Reports the remaining budget of a location and period.
    ///
    /// Location defaults to the actor's own; month and year default to the
    /// current period.
    pub async fn remaining_budget(
        &self,
        ctx: &ActorContext,
        location_id: Option<LocationId>,
        month: Option<u32>,
        year: Option<i32>,
    ) -> WorkflowResult<BudgetSummary> {
        let location_id = location_id.unwrap_or_else(|| ctx.location_id());
        policy::authorize_budget_query(ctx, location_id)?;

        let current = self.current_period();
        let period = BudgetPeriod::new(
            month.unwrap_or(current.month),
            year.unwrap_or(current.year),
        )?;
        let (_, summary) = self.summarize(location_id, period).await?;
        Ok(summary)
    }

    /// Lists budgets within the actor's scope, newest period first.
    pub async fn list_budgets(
        &self,
        ctx: &ActorContext,
        status: Option<BudgetStatus>,
        year: Option<i32>,
        location_id: Option<LocationId>,
    ) -> WorkflowResult<Vec<Budget>> {
        let filter = BudgetFilter {
            location_id: policy::resolve_list_scope(ctx, location_id)?,
            status,
            year,
        };
        Ok(self.stores.budgets.list_budgets(&filter).await?)
    }

    // ------------------------------------------------------------------
    // Notifications and locations
    // ------------------------------------------------------------------

    /// Lists the actor's own notifications.
    pub async fn list_notifications(
        &self,
        ctx: &ActorContext,
        unread_only: bool,
    ) -> WorkflowResult<Vec<Notification>> {
        Ok(self
            .stores
            .notifications
            .list_notifications(ctx.actor_id(), unread_only)
            .await?)
    }

    /// Marks one of the actor's notifications as read.
    pub async fn mark_notification_read(
        &self,
        ctx: &ActorContext,
        id: NotificationId,
    ) -> WorkflowResult<Notification> {
        self.stores
            .notifications
            .mark_notification_read(ctx.actor_id(), id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Notification", id))
    }

    /// Fetches a location within the actor's scope.
    pub async fn get_location(
        &self,
        ctx: &ActorContext,
        id: LocationId,
    ) -> WorkflowResult<Location> {
        policy::authorize_location_scope(ctx, id)?;
        self.stores
            .locations
            .find_location(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Location", id))
    }

    /// Sets or clears a location's monthly petty cash limit.
    ///
    /// The limit is informational and does not gate claim creation.
    pub async fn update_petty_cash_limit(
        &self,
        ctx: &ActorContext,
        id: LocationId,
        limit: Option<Decimal>,
    ) -> WorkflowResult<Location> {
        policy::authorize_location_admin(ctx, id)?;
        if limit.is_some_and(|l| l <= Decimal::ZERO) {
            return Err(WorkflowError::Validation(
                "Petty cash limit must be greater than zero".to_string(),
            ));
        }
        if limit.is_some_and(|l| !fits_money_column(l)) {
            return Err(WorkflowError::Validation(
                "Petty cash limit must have at most 4 decimal places and be below 1000000000000000"
                    .to_string(),
            ));
        }

        let location = self
            .stores
            .locations
            .set_petty_cash_limit(id, limit)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Location", id))?;

        info!(
            location_id = %id,
            actor_id = %ctx.actor_id(),
            "Petty cash limit updated"
        );
        Ok(location)
    }
}
