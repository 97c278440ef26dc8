//! Claimflow API Server
//!
//! Main entry point for the expense claim service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claimflow_api::{AppState, create_router};
use claimflow_core::access::ContextResolver;
use claimflow_core::notify::NotificationDispatcher;
use claimflow_core::workflow::Workflow;
use claimflow_db::{connect_with, stores};
use claimflow_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claimflow=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let timezone = config.ledger.tz()?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let jwt_service = Arc::new(JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60)?,
    }));

    let stores = stores(db);
    let dispatcher = NotificationDispatcher::new(
        stores.notifications.clone(),
        stores.directory.clone(),
        config.notifications.dispatch_timeout(),
    );
    let resolver = ContextResolver::new(jwt_service, stores.directory.clone());
    let workflow = Workflow::new(stores, dispatcher, timezone);
    info!(timezone = %timezone, "Claim workflow ready");

    let app = create_router(AppState {
        workflow: workflow.clone(),
        resolver,
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Waiting for in-flight notifications");
    workflow.dispatcher().drain().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
