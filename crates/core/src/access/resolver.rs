//! Session token to actor context resolution.

use std::sync::Arc;

use claimflow_shared::{JwtError, JwtService};
use tracing::debug;

use super::context::ActorContext;
use super::error::AccessError;
use crate::store::ActorDirectory;

/// Resolves a bearer token into an [`ActorContext`].
///
/// The directory is consulted exactly once per call; the resulting context
/// is the only source of role and location facts for the rest of the
/// request.
#[derive(Clone)]
pub struct ContextResolver {
    jwt: Arc<JwtService>,
    directory: Arc<dyn ActorDirectory>,
}

impl ContextResolver {
    /// Creates a new resolver.
    #[must_use]
    pub fn new(jwt: Arc<JwtService>, directory: Arc<dyn ActorDirectory>) -> Self {
        Self { jwt, directory }
    }

    /// Resolves a session token.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::Unauthenticated` for a missing, malformed or
    /// expired token and for unknown or deactivated actors.
    /// Returns `AccessError::Directory` if the directory lookup fails.
    pub async fn resolve(&self, token: Option<&str>) -> Result<ActorContext, AccessError> {
        let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
            return Err(AccessError::Unauthenticated);
        };

        let claims = self.jwt.validate_token(token).map_err(|e| {
            match e {
                JwtError::Expired => debug!("Session token expired"),
                other => debug!(error = %other, "Session token rejected"),
            }
            AccessError::Unauthenticated
        })?;

        let Some(record) = self.directory.find_actor(claims.user_id()).await? else {
            debug!(user_id = %claims.user_id(), "Session for unknown actor");
            return Err(AccessError::Unauthenticated);
        };

        if !record.is_active {
            debug!(user_id = %record.id, "Session for deactivated actor");
            return Err(AccessError::Unauthenticated);
        }

        Ok(ActorContext::new(record.id, record.location_id, record.roles))
    }
}
