//! User repository: the identity directory behind session resolution.

use async_trait::async_trait;
use claimflow_core::access::Role;
use claimflow_core::store::{ActorDirectory, ActorRecord, StoreResult};
use claimflow_shared::types::{LocationId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::backend;
use crate::entities::{sea_orm_active_enums::UserRole, user_roles, users};

/// User repository for directory lookups and provisioning.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates an active user with the given roles.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_with_roles(
        &self,
        email: &str,
        full_name: &str,
        location_id: LocationId,
        roles: &[Role],
    ) -> Result<users::Model, DbErr> {
        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();

        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            location_id: Set(location_id.into_inner()),
            email: Set(email.to_string()),
            full_name: Set(full_name.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for role in roles {
            user_roles::ActiveModel {
                user_id: Set(user.id),
                role: Set(role_to_db(*role)),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(user)
    }

    /// Activates or deactivates a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<u64, DbErr> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::IsActive,
                sea_orm::sea_query::Expr::value(is_active),
            )
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

pub(crate) const fn role_to_db(role: Role) -> UserRole {
    match role {
        Role::SuperAdmin => UserRole::SuperAdmin,
        Role::Admin => UserRole::Admin,
        Role::BusinessManager => UserRole::BusinessManager,
        Role::Accountant => UserRole::Accountant,
        Role::Cashier => UserRole::Cashier,
    }
}

pub(crate) const fn role_from_db(role: UserRole) -> Role {
    match role {
        UserRole::SuperAdmin => Role::SuperAdmin,
        UserRole::Admin => Role::Admin,
        UserRole::BusinessManager => Role::BusinessManager,
        UserRole::Accountant => Role::Accountant,
        UserRole::Cashier => Role::Cashier,
    }
}

#[async_trait]
impl ActorDirectory for UserRepository {
    async fn find_actor(&self, id: UserId) -> StoreResult<Option<ActorRecord>> {
        let Some(user) = users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(backend)?
        else {
            return Ok(None);
        };

        let roles = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(user.id))
            .all(&self.db)
            .await
            .map_err(backend)?
            .into_iter()
            .map(|r| role_from_db(r.role))
            .collect();

        Ok(Some(ActorRecord {
            id,
            location_id: LocationId::from_uuid(user.location_id),
            roles,
            is_active: user.is_active,
        }))
    }

    async fn find_recipients(
        &self,
        location_id: Option<LocationId>,
        roles: &[Role],
    ) -> StoreResult<Vec<UserId>> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = user_roles::Entity::find()
            .inner_join(users::Entity)
            .select_only()
            .column(user_roles::Column::UserId)
            .distinct()
            .filter(user_roles::Column::Role.is_in(roles.iter().copied().map(role_to_db)))
            .filter(users::Column::IsActive.eq(true));
        if let Some(location_id) = location_id {
            query = query.filter(users::Column::LocationId.eq(location_id.into_inner()));
        }

        let ids: Vec<Uuid> = query
            .order_by_asc(user_roles::Column::UserId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(backend)?;

        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }
}
