//! Location routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use claimflow_shared::types::LocationId;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::error_response;
use crate::{AppState, middleware::Actor};

/// Creates the location routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/locations/{id}", get(get_location))
        .route("/locations/{id}/petty-cash-limit", put(update_petty_cash_limit))
}

/// Request body for the petty cash limit. `null` clears the limit.
#[derive(Debug, Deserialize)]
pub struct PettyCashLimitRequest {
    /// Monthly limit.
    pub limit: Option<Decimal>,
}

async fn get_location(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<LocationId>,
) -> Response {
    match state.workflow.get_location(&ctx, id).await {
        Ok(location) => Json(location).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn update_petty_cash_limit(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<LocationId>,
    Json(request): Json<PettyCashLimitRequest>,
) -> Response {
    match state
        .workflow
        .update_petty_cash_limit(&ctx, id, request.limit)
        .await
    {
        Ok(location) => Json(location).into_response(),
        Err(e) => error_response(&e),
    }
}
