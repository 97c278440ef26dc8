//! Persistence traits consumed by the engine.
//!
//! The engine never holds in-process locks: every read-validate-write cycle
//! ends in a conditional write that the store must apply atomically or
//! refuse with [`StoreError::VersionConflict`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use claimflow_shared::types::{BudgetId, ClaimId, LocationId, NotificationId, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::access::Role;
use crate::budget::{Budget, BudgetFilter, BudgetPeriod};
use crate::expense::{ClaimFilter, ExpenseClaim};
use crate::location::Location;
use crate::notify::Notification;

/// Errors reported by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row changed since it was read.
    #[error("Record version changed since it was read")]
    VersionConflict,

    /// A uniqueness constraint rejected the write.
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// The backend failed.
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type alias using `StoreError`.
pub type StoreResult<T> = Result<T, StoreError>;

/// The budget version a claim insert was validated against.
///
/// Inserting a claim bumps this version in the same atomic unit, so two
/// creations validated against the same spend figure cannot both commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetGuard {
    /// Budget of the claim's period.
    pub budget_id: BudgetId,
    /// Version observed when the remaining budget was computed.
    pub version: i64,
}

/// Directory entry for an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorRecord {
    /// User ID.
    pub id: UserId,
    /// Home location.
    pub location_id: LocationId,
    /// Roles held.
    pub roles: Vec<Role>,
    /// Deactivated actors cannot authenticate.
    pub is_active: bool,
}

/// Expense claim persistence.
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Fetches a claim by ID.
    async fn find_claim(&self, id: ClaimId) -> StoreResult<Option<ExpenseClaim>>;

    /// Lists claims matching the filter, newest first.
    async fn list_claims(&self, filter: &ClaimFilter) -> StoreResult<Vec<ExpenseClaim>>;

    /// Sums the amounts of non-rejected claims of a location and period,
    /// keyed by expense type code.
    async fn period_spend(
        &self,
        location_id: LocationId,
        period: BudgetPeriod,
    ) -> StoreResult<BTreeMap<String, Decimal>>;

    /// Inserts a new claim, atomically bumping the guarding budget's
    /// version. Fails with `VersionConflict` if the budget moved.
    async fn insert_claim(&self, claim: &ExpenseClaim, guard: BudgetGuard)
    -> StoreResult<ExpenseClaim>;

    /// Writes `claim` if the stored version still equals `claim.version`,
    /// returning the stored row with its version incremented.
    async fn update_claim(&self, claim: &ExpenseClaim) -> StoreResult<ExpenseClaim>;
}

/// Budget persistence.
#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Fetches a budget by ID.
    async fn find_budget(&self, id: BudgetId) -> StoreResult<Option<Budget>>;

    /// Fetches the budget of a location and period, if any.
    async fn find_budget_for_period(
        &self,
        location_id: LocationId,
        period: BudgetPeriod,
    ) -> StoreResult<Option<Budget>>;

    /// Lists budgets matching the filter, newest period first.
    async fn list_budgets(&self, filter: &BudgetFilter) -> StoreResult<Vec<Budget>>;

    /// Inserts a budget. Fails with `Duplicate` if the period already has one.
    async fn insert_budget(&self, budget: &Budget) -> StoreResult<Budget>;

    /// Writes `budget` if the stored version still equals `budget.version`.
    async fn update_budget(&self, budget: &Budget) -> StoreResult<Budget>;
}

/// Location persistence.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Fetches a location by ID.
    async fn find_location(&self, id: LocationId) -> StoreResult<Option<Location>>;

    /// Overwrites the location's petty cash limit.
    async fn set_petty_cash_limit(
        &self,
        id: LocationId,
        limit: Option<Decimal>,
    ) -> StoreResult<Option<Location>>;
}

/// Notification persistence.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Inserts notifications.
    async fn insert_notifications(&self, notifications: &[Notification]) -> StoreResult<()>;

    /// Lists a user's notifications, newest first.
    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> StoreResult<Vec<Notification>>;

    /// Marks a user's notification as read. Returns `None` if the user has
    /// no such notification.
    async fn mark_notification_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> StoreResult<Option<Notification>>;
}

/// Identity directory.
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    /// Loads an actor's directory entry.
    async fn find_actor(&self, id: UserId) -> StoreResult<Option<ActorRecord>>;

    /// Active actors holding any of `roles`, limited to `location_id` when
    /// given.
    async fn find_recipients(
        &self,
        location_id: Option<LocationId>,
        roles: &[Role],
    ) -> StoreResult<Vec<UserId>>;
}

/// Every store the engine needs, as shared trait objects.
#[derive(Clone)]
pub struct Stores {
    /// Claims.
    pub claims: Arc<dyn ClaimStore>,
    /// Budgets.
    pub budgets: Arc<dyn BudgetStore>,
    /// Locations.
    pub locations: Arc<dyn LocationStore>,
    /// Notifications.
    pub notifications: Arc<dyn NotificationStore>,
    /// Identity directory.
    pub directory: Arc<dyn ActorDirectory>,
}

impl Stores {
    /// Uses one backend for every store.
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: ClaimStore + BudgetStore + LocationStore + NotificationStore + ActorDirectory + 'static,
    {
        Self {
            claims: backend.clone(),
            budgets: backend.clone(),
            locations: backend.clone(),
            notifications: backend.clone(),
            directory: backend,
        }
    }
}
