//! Core business logic for Claimflow.
//!
//! This crate contains the expense claim lifecycle engine with ZERO web or
//! database dependencies. Persistence is reached through the traits in
//! [`store`]; the database crate implements them.
//!
//! # Modules
//!
//! - `access` - Actor context, role predicates and the authorization matrix
//! - `expense` - Expense claim state machine
//! - `budget` - Per-location monthly budget ledger
//! - `notify` - Best-effort notification dispatch
//! - `store` - Persistence traits consumed by the engine
//! - `workflow` - Orchestrator exposing the externally callable operations

pub mod access;
pub mod budget;
pub mod expense;
pub mod location;
pub mod notify;
pub mod store;
pub mod workflow;

#[cfg(any(test, feature = "testing"))]
pub mod memory;
