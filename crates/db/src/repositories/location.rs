//! Location repository.

use async_trait::async_trait;
use claimflow_core::location::Location;
use claimflow_core::store::{LocationStore, StoreResult};
use claimflow_shared::types::LocationId;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};

use super::{backend, to_utc};
use crate::entities::locations;

/// Location repository.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    db: DatabaseConnection,
}

impl LocationRepository {
    /// Creates a new location repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a location.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, name: &str, city: &str) -> Result<locations::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let location = locations::ActiveModel {
            id: Set(LocationId::new().into_inner()),
            name: Set(name.to_string()),
            city: Set(city.to_string()),
            monthly_petty_cash_limit: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        location.insert(&self.db).await
    }

    /// Finds a location by its name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<locations::Model>, DbErr> {
        locations::Entity::find()
            .filter(locations::Column::Name.eq(name))
            .one(&self.db)
            .await
    }
}

pub(crate) fn location_from_model(model: locations::Model) -> Location {
    Location {
        id: LocationId::from_uuid(model.id),
        name: model.name,
        city: model.city,
        monthly_petty_cash_limit: model.monthly_petty_cash_limit,
        created_at: to_utc(model.created_at),
        updated_at: to_utc(model.updated_at),
    }
}

#[async_trait]
impl LocationStore for LocationRepository {
    async fn find_location(&self, id: LocationId) -> StoreResult<Option<Location>> {
        Ok(locations::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(location_from_model))
    }

    async fn set_petty_cash_limit(
        &self,
        id: LocationId,
        limit: Option<Decimal>,
    ) -> StoreResult<Option<Location>> {
        let Some(model) = locations::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(backend)?
        else {
            return Ok(None);
        };

        let mut active = model.into_active_model();
        active.monthly_petty_cash_limit = Set(limit);
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&self.db).await.map_err(backend)?;
        Ok(Some(location_from_model(updated)))
    }
}
