//! Role and tenant scoped access control.
//!
//! An authenticated request is turned into an immutable [`ActorContext`]
//! once; every authorization rule downstream is a predicate over that
//! snapshot.
//!
//! # Modules
//!
//! - `role` - The five roles an actor can hold
//! - `context` - The per-request actor snapshot and its predicates
//! - `policy` - The authorization matrix for every engine operation
//! - `resolver` - Session token to context resolution
//! - `error` - Access error types

pub mod context;
pub mod error;
pub mod policy;
pub mod resolver;
pub mod role;

pub use context::ActorContext;
pub use error::AccessError;
pub use resolver::ContextResolver;
pub use role::Role;
