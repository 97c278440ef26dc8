//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use claimflow_core::workflow::{ErrorKind, WorkflowError};
use serde_json::json;
use tracing::error;

use crate::{AppState, middleware::auth_middleware};

pub mod budgets;
pub mod claims;
pub mod health;
pub mod locations;
pub mod notifications;


/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(claims::routes())
        .merge(budgets::routes())
        .merge(notifications::routes())
        .merge(locations::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// Maps an engine error onto its HTTP response.
///
/// Internal failures are logged here and answered with a generic message.
pub fn error_response(err: &WorkflowError) -> Response {
    if err.kind() == ErrorKind::Internal {
        error!(error = %err, "Request failed");
    }

    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = if err.is_retryable() {
        json!({
            "error": err.error_code(),
            "message": err.public_message(),
            "retryable": true
        })
    } else {
        json!({
            "error": err.error_code(),
            "message": err.public_message()
        })
    };

    (status, Json(body)).into_response()
}

/// Shorthand for a validation failure on request input.
pub(crate) fn invalid_input(message: impl Into<String>) -> Response {
    error_response(&WorkflowError::Validation(message.into()))
}
