//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes over the claim workflow
//! - Session middleware resolving the actor context
//! - Error-to-HTTP mapping

pub mod middleware;
pub mod routes;

use axum::Router;
use claimflow_core::access::ContextResolver;
use claimflow_core::workflow::Workflow;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The claim and budget engine.
    pub workflow: Workflow,
    /// Session token resolver.
    pub resolver: ContextResolver,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
