//! Expense claim routes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use claimflow_core::expense::{DisburseType, ExpenseStatus, NewClaimInput, PaymentDetails};
use claimflow_core::workflow::ClaimQuery;
use claimflow_shared::types::{ClaimId, LocationId};
use serde::Deserialize;

use super::{error_response, invalid_input};
use crate::{AppState, middleware::Actor};

/// Creates the claim routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/claims", post(create_claim).get(list_claims))
        .route("/claims/{id}", get(get_claim))
        .route("/claims/{id}/approve", post(approve_claim))
        .route("/claims/{id}/reject", post(reject_claim))
        .route("/claims/{id}/disburse", post(disburse_claim))
        .route("/claims/{id}/disburse-type", put(reassign_disburse_type))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing claims.
#[derive(Debug, Deserialize)]
pub struct ListClaimsQuery {
    /// Status filter (`pending`, `approved`, `rejected`, `disbursed`).
    pub status: Option<String>,
    /// Period month.
    pub month: Option<u32>,
    /// Period year.
    pub year: Option<i32>,
    /// Location filter.
    pub location_id: Option<LocationId>,
}

/// Request body for changing a claim's payout rail.
#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    /// New rail (`Cash` or `ChequeOrTransfer`).
    pub disburse_type: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn create_claim(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(input): Json<NewClaimInput>,
) -> Response {
    match state.workflow.create_claim(&ctx, input).await {
        Ok(claim) => (StatusCode::CREATED, Json(claim)).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn list_claims(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Query(query): Query<ListClaimsQuery>,
) -> Response {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match ExpenseStatus::parse(raw) {
            Some(status) => Some(status),
            None => return invalid_input(format!("Unknown expense status: {raw}")),
        },
    };

    let claim_query = ClaimQuery {
        status,
        month: query.month,
        year: query.year,
        location_id: query.location_id,
    };

    match state.workflow.list_claims(&ctx, claim_query).await {
        Ok(claims) => Json(claims).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn get_claim(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<ClaimId>,
) -> Response {
    match state.workflow.get_claim(&ctx, id).await {
        Ok(claim) => Json(claim).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn approve_claim(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<ClaimId>,
) -> Response {
    match state.workflow.approve_claim(&ctx, id).await {
        Ok(claim) => Json(claim).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn reject_claim(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<ClaimId>,
) -> Response {
    match state.workflow.reject_claim(&ctx, id).await {
        Ok(claim) => Json(claim).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn disburse_claim(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<ClaimId>,
    body: Bytes,
) -> Response {
    // Cash payouts are usually posted without a body.
    let payment = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice::<PaymentDetails>(&body) {
            Ok(payment) => Some(payment).filter(|p| !p.is_empty()),
            Err(e) => return invalid_input(format!("Invalid payment details: {e}")),
        }
    };

    match state.workflow.disburse_claim(&ctx, id, payment).await {
        Ok(claim) => Json(claim).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn reassign_disburse_type(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<ClaimId>,
    Json(request): Json<ReassignRequest>,
) -> Response {
    let Some(new_type) = DisburseType::parse(&request.disburse_type) else {
        return invalid_input(format!(
            "Unknown disburse type: {}",
            request.disburse_type
        ));
    };

    match state
        .workflow
        .reassign_disburse_type(&ctx, id, new_type)
        .await
    {
        Ok(claim) => Json(claim).into_response(),
        Err(e) => error_response(&e),
    }
}
