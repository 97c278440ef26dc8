//! Monthly budget routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use claimflow_core::budget::BudgetStatus;
use claimflow_shared::types::{BudgetId, LocationId};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{error_response, invalid_input};
use crate::{AppState, middleware::Actor};

/// Creates the budget routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", post(submit_budget).get(list_budgets))
        .route("/budgets/remaining", get(remaining_budget))
        .route("/budgets/{id}/action", post(action_budget))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for submitting or updating the current month's budget.
#[derive(Debug, Deserialize)]
pub struct SubmitBudgetRequest {
    /// Expense type code to amount. Non-numeric and non-positive entries
    /// are dropped.
    pub categories: Map<String, Value>,
}

/// Query parameters for listing budgets.
#[derive(Debug, Deserialize)]
pub struct ListBudgetsQuery {
    /// Status filter (`pending`, `approved`, `rejected`).
    pub status: Option<String>,
    /// Period year.
    pub year: Option<i32>,
    /// Location filter.
    pub location_id: Option<LocationId>,
}

/// Query parameters for the remaining-budget report.
#[derive(Debug, Deserialize)]
pub struct RemainingQuery {
    /// Period month; defaults to the current month.
    pub month: Option<u32>,
    /// Period year; defaults to the current year.
    pub year: Option<i32>,
    /// Location; defaults to the actor's home location.
    pub location_id: Option<LocationId>,
}

/// Request body for an admin decision.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    /// `approve` or `reject`.
    pub action: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn submit_budget(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(request): Json<SubmitBudgetRequest>,
) -> Response {
    match state.workflow.submit_budget(&ctx, &request.categories).await {
        Ok(budget) => Json(budget).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn list_budgets(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Query(query): Query<ListBudgetsQuery>,
) -> Response {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match BudgetStatus::parse(raw) {
            Some(status) => Some(status),
            None => return invalid_input(format!("Unknown budget status: {raw}")),
        },
    };

    match state
        .workflow
        .list_budgets(&ctx, status, query.year, query.location_id)
        .await
    {
        Ok(budgets) => Json(budgets).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn remaining_budget(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Query(query): Query<RemainingQuery>,
) -> Response {
    match state
        .workflow
        .remaining_budget(&ctx, query.location_id, query.month, query.year)
        .await
    {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn action_budget(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<BudgetId>,
    Json(request): Json<ActionRequest>,
) -> Response {
    match state.workflow.action_budget(&ctx, id, &request.action).await {
        Ok(budget) => Json(budget).into_response(),
        Err(e) => error_response(&e),
    }
}
