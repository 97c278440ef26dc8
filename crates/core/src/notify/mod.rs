//! Best-effort notifications.
//!
//! Transitions hand events to the [`NotificationDispatcher`] after they
//! commit. Delivery runs in the background and never affects the outcome of
//! the transition that triggered it.

pub mod dispatcher;
pub mod types;

pub use dispatcher::NotificationDispatcher;
pub use types::{Notification, NotificationEvent};
