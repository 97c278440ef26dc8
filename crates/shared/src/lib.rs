//! Shared types and configuration for Claimflow.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Money column bounds
//! - Configuration management
//! - Session token issuing and validation

pub mod auth;
pub mod config;
pub mod jwt;
pub mod types;


pub use auth::Claims;
pub use config::AppConfig;
pub use jwt::{JwtConfig, JwtError, JwtService};
