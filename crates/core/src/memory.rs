//! In-memory store for tests.
//!
//! Implements every store trait over a single mutex-guarded state with the
//! same version and uniqueness rules as the database repositories.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use claimflow_shared::types::{BudgetId, ClaimId, LocationId, NotificationId, UserId};
use rust_decimal::Decimal;

use crate::access::Role;
use crate::budget::{Budget, BudgetFilter, BudgetPeriod};
use crate::expense::{ClaimFilter, ExpenseClaim};
use crate::location::Location;
use crate::notify::Notification;
use crate::store::{
    ActorDirectory, ActorRecord, BudgetGuard, BudgetStore, ClaimStore, LocationStore,
    NotificationStore, StoreError, StoreResult,
};

#[derive(Default)]
struct State {
    claims: BTreeMap<ClaimId, ExpenseClaim>,
    budgets: BTreeMap<BudgetId, Budget>,
    locations: BTreeMap<LocationId, Location>,
    notifications: Vec<Notification>,
    actors: BTreeMap<UserId, ActorRecord>,
}

/// Mutex-backed implementation of the store traits.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_notifications: AtomicBool,
    conflict_next_write: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("memory store poisoned".to_string()))
    }

    fn take_conflict(&self) -> StoreResult<()> {
        if self.conflict_next_write.swap(false, Ordering::SeqCst) {
            Err(StoreError::VersionConflict)
        } else {
            Ok(())
        }
    }

    /// Registers a directory entry.
    pub fn add_actor(&self, actor: ActorRecord) {
        if let Ok(mut state) = self.state() {
            state.actors.insert(actor.id, actor);
        }
    }

    /// Registers a location.
    pub fn add_location(&self, location: Location) {
        if let Ok(mut state) = self.state() {
            state.locations.insert(location.id, location);
        }
    }

    /// Makes notification writes fail until switched off.
    pub fn fail_notifications(&self, fail: bool) {
        self.fail_notifications.store(fail, Ordering::SeqCst);
    }

    /// Makes the next versioned write fail as if another writer won.
    pub fn conflict_next_write(&self) {
        self.conflict_next_write.store(true, Ordering::SeqCst);
    }

    /// Number of stored claims.
    pub fn claim_count(&self) -> usize {
        self.state().map_or(0, |s| s.claims.len())
    }

    /// Number of stored budgets.
    pub fn budget_count(&self) -> usize {
        self.state().map_or(0, |s| s.budgets.len())
    }
}

#[async_trait]
impl ClaimStore for MemoryStore {
    async fn find_claim(&self, id: ClaimId) -> StoreResult<Option<ExpenseClaim>> {
        Ok(self.state()?.claims.get(&id).cloned())
    }

    async fn list_claims(&self, filter: &ClaimFilter) -> StoreResult<Vec<ExpenseClaim>> {
        let state = self.state()?;
        let mut claims: Vec<ExpenseClaim> = state
            .claims
            .values()
            .filter(|c| filter.location_id.is_none_or(|l| c.location_id == l))
            .filter(|c| filter.status.is_none_or(|s| c.status == s))
            .filter(|c| filter.month.is_none_or(|m| c.period.month == m))
            .filter(|c| filter.year.is_none_or(|y| c.period.year == y))
            .cloned()
            .collect();
        claims.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(claims)
    }

    async fn period_spend(
        &self,
        location_id: LocationId,
        period: BudgetPeriod,
    ) -> StoreResult<BTreeMap<String, Decimal>> {
        let state = self.state()?;
        let mut spend = BTreeMap::new();
        for claim in state.claims.values().filter(|c| {
            c.location_id == location_id && c.period == period && c.status.counts_against_budget()
        }) {
            *spend
                .entry(claim.expense_type.code().to_string())
                .or_insert(Decimal::ZERO) += claim.amount;
        }
        Ok(spend)
    }

    async fn insert_claim(
        &self,
        claim: &ExpenseClaim,
        guard: BudgetGuard,
    ) -> StoreResult<ExpenseClaim> {
        self.take_conflict()?;
        let mut state = self.state()?;
        if state.claims.contains_key(&claim.id) {
            return Err(StoreError::Duplicate(format!("claim {}", claim.id)));
        }
        let budget = state
            .budgets
            .get_mut(&guard.budget_id)
            .filter(|b| b.version == guard.version)
            .ok_or(StoreError::VersionConflict)?;
        budget.version += 1;
        state.claims.insert(claim.id, claim.clone());
        Ok(claim.clone())
    }

    async fn update_claim(&self, claim: &ExpenseClaim) -> StoreResult<ExpenseClaim> {
        self.take_conflict()?;
        let mut state = self.state()?;
        let stored = state
            .claims
            .get_mut(&claim.id)
            .filter(|c| c.version == claim.version)
            .ok_or(StoreError::VersionConflict)?;
        *stored = ExpenseClaim {
            version: claim.version + 1,
            ..claim.clone()
        };
        Ok(stored.clone())
    }
}

#[async_trait]
impl BudgetStore for MemoryStore {
    async fn find_budget(&self, id: BudgetId) -> StoreResult<Option<Budget>> {
        Ok(self.state()?.budgets.get(&id).cloned())
    }

    async fn find_budget_for_period(
        &self,
        location_id: LocationId,
        period: BudgetPeriod,
    ) -> StoreResult<Option<Budget>> {
        Ok(self
            .state()?
            .budgets
            .values()
            .find(|b| b.location_id == location_id && b.period == period)
            .cloned())
    }

    async fn list_budgets(&self, filter: &BudgetFilter) -> StoreResult<Vec<Budget>> {
        let state = self.state()?;
        let mut budgets: Vec<Budget> = state
            .budgets
            .values()
            .filter(|b| filter.location_id.is_none_or(|l| b.location_id == l))
            .filter(|b| filter.status.is_none_or(|s| b.status == s))
            .filter(|b| filter.year.is_none_or(|y| b.period.year == y))
            .cloned()
            .collect();
        budgets.sort_by(|a, b| b.period.cmp(&a.period));
        Ok(budgets)
    }

    async fn insert_budget(&self, budget: &Budget) -> StoreResult<Budget> {
        self.take_conflict()?;
        let mut state = self.state()?;
        if state
            .budgets
            .values()
            .any(|b| b.location_id == budget.location_id && b.period == budget.period)
        {
            return Err(StoreError::Duplicate(format!(
                "budget for location {} period {}",
                budget.location_id, budget.period
            )));
        }
        state.budgets.insert(budget.id, budget.clone());
        Ok(budget.clone())
    }

    async fn update_budget(&self, budget: &Budget) -> StoreResult<Budget> {
        self.take_conflict()?;
        let mut state = self.state()?;
        let stored = state
            .budgets
            .get_mut(&budget.id)
            .filter(|b| b.version == budget.version)
            .ok_or(StoreError::VersionConflict)?;
        *stored = Budget {
            version: budget.version + 1,
            ..budget.clone()
        };
        Ok(stored.clone())
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn find_location(&self, id: LocationId) -> StoreResult<Option<Location>> {
        Ok(self.state()?.locations.get(&id).cloned())
    }

    async fn set_petty_cash_limit(
        &self,
        id: LocationId,
        limit: Option<Decimal>,
    ) -> StoreResult<Option<Location>> {
        let mut state = self.state()?;
        Ok(state.locations.get_mut(&id).map(|location| {
            location.monthly_petty_cash_limit = limit;
            location.updated_at = Utc::now();
            location.clone()
        }))
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notifications(&self, notifications: &[Notification]) -> StoreResult<()> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("notification sink unavailable".to_string()));
        }
        self.state()?
            .notifications
            .extend(notifications.iter().cloned());
        Ok(())
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> StoreResult<Vec<Notification>> {
        let state = self.state()?;
        let mut inbox: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !(unread_only && n.is_read))
            .cloned()
            .collect();
        inbox.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(inbox)
    }

    async fn mark_notification_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> StoreResult<Option<Notification>> {
        let mut state = self.state()?;
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.is_read = true;
                n.clone()
            }))
    }
}

#[async_trait]
impl ActorDirectory for MemoryStore {
    async fn find_actor(&self, id: UserId) -> StoreResult<Option<ActorRecord>> {
        Ok(self.state()?.actors.get(&id).cloned())
    }

    async fn find_recipients(
        &self,
        location_id: Option<LocationId>,
        roles: &[Role],
    ) -> StoreResult<Vec<UserId>> {
        let state = self.state()?;
        let recipients: BTreeSet<UserId> = state
            .actors
            .values()
            .filter(|a| a.is_active)
            .filter(|a| location_id.is_none_or(|l| a.location_id == l))
            .filter(|a| a.roles.iter().any(|r| roles.contains(r)))
            .map(|a| a.id)
            .collect();
        Ok(recipients.into_iter().collect())
    }
}
