//! In-app notification routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use claimflow_shared::types::NotificationId;
use serde::Deserialize;

use super::error_response;
use crate::{AppState, middleware::Actor};

/// Creates the notification routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/{id}/read", post(mark_read))
}

/// Query parameters for listing notifications.
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    /// Only return unread notifications.
    #[serde(default)]
    pub unread_only: bool,
}

async fn list_notifications(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Query(query): Query<ListNotificationsQuery>,
) -> Response {
    match state
        .workflow
        .list_notifications(&ctx, query.unread_only)
        .await
    {
        Ok(notifications) => Json(notifications).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn mark_read(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<NotificationId>,
) -> Response {
    match state.workflow.mark_notification_read(&ctx, id).await {
        Ok(notification) => Json(notification).into_response(),
        Err(e) => error_response(&e),
    }
}
