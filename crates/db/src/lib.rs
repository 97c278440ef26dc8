//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - `PostgreSQL` implementations of the engine's store traits
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    BudgetRepository, ClaimRepository, LocationRepository, NotificationRepository, UserRepository,
};

use std::sync::Arc;

use claimflow_core::store::Stores;
use claimflow_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection sized from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Wires every store onto one connection pool.
#[must_use]
pub fn stores(db: DatabaseConnection) -> Stores {
    Stores {
        claims: Arc::new(ClaimRepository::new(db.clone())),
        budgets: Arc::new(BudgetRepository::new(db.clone())),
        locations: Arc::new(LocationRepository::new(db.clone())),
        notifications: Arc::new(NotificationRepository::new(db.clone())),
        directory: Arc::new(UserRepository::new(db)),
    }
}
