//! Engine orchestration.
//!
//! [`Workflow`] exposes the externally callable operations. Each one runs
//! authorization, loads what it needs, applies the pure transition from
//! [`crate::expense`] or [`crate::budget`] and ends in a single versioned
//! write. Notifications are handed off only after that write commits.

pub mod error;
pub mod service;

#[cfg(test)]
mod tests;

pub use error::{ErrorKind, WorkflowError};
pub use service::{ClaimQuery, Workflow, WorkflowResult};
