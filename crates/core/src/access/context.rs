//! Per-request actor context.

use std::collections::BTreeSet;

use claimflow_shared::types::{LocationId, UserId};
use serde::Serialize;

use super::role::Role;

/// Immutable snapshot of who is acting, where, and with which roles.
///
/// Built once per request by the [`ContextResolver`](super::ContextResolver)
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorContext {
    actor_id: UserId,
    location_id: LocationId,
    roles: BTreeSet<Role>,
}

impl ActorContext {
    /// Creates a new context.
    #[must_use]
    pub fn new(
        actor_id: UserId,
        location_id: LocationId,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            actor_id,
            location_id,
            roles: roles.into_iter().collect(),
        }
    }

    /// The acting user.
    #[must_use]
    pub const fn actor_id(&self) -> UserId {
        self.actor_id
    }

    /// The actor's home location.
    #[must_use]
    pub const fn location_id(&self) -> LocationId {
        self.location_id
    }

    /// Every role the actor holds.
    #[must_use]
    pub const fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Returns true if the actor holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns true if the actor holds Admin or Super Admin.
    #[must_use]
    pub fn is_admin_tier(&self) -> bool {
        self.roles.iter().any(Role::is_admin_tier)
    }

    /// Returns true if the actor holds Super Admin.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.has_role(Role::SuperAdmin)
    }

    /// Returns true if `location_id` is the actor's home location.
    #[must_use]
    pub fn is_home_location(&self, location_id: LocationId) -> bool {
        self.location_id == location_id
    }

    /// Returns true if the actor may act on data of `location_id`.
    ///
    /// Super admins reach every location; everyone else only their own.
    #[must_use]
    pub fn can_reach_location(&self, location_id: LocationId) -> bool {
        self.is_super_admin() || self.is_home_location(location_id)
    }
}
