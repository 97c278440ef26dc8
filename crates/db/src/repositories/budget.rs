//! Monthly budget repository.

use async_trait::async_trait;
use claimflow_core::budget::{Budget, BudgetFilter, BudgetPeriod, BudgetStatus, Categories};
use claimflow_core::store::{BudgetStore, StoreError, StoreResult};
use claimflow_shared::types::{BudgetId, LocationId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use tracing::debug;

use super::{backend, from_db_int, to_db_int, to_db_time, to_utc};
use crate::entities::{budgets, sea_orm_active_enums as db};

/// Budget repository keyed by location and period.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) const fn budget_status_to_db(status: BudgetStatus) -> db::BudgetStatus {
    match status {
        BudgetStatus::Pending => db::BudgetStatus::Pending,
        BudgetStatus::Approved => db::BudgetStatus::Approved,
        BudgetStatus::Rejected => db::BudgetStatus::Rejected,
    }
}

pub(crate) const fn budget_status_from_db(status: db::BudgetStatus) -> BudgetStatus {
    match status {
        db::BudgetStatus::Pending => BudgetStatus::Pending,
        db::BudgetStatus::Approved => BudgetStatus::Approved,
        db::BudgetStatus::Rejected => BudgetStatus::Rejected,
    }
}

pub(crate) fn budget_from_model(model: budgets::Model) -> StoreResult<Budget> {
    let categories: Categories = serde_json::from_value(model.categories)
        .map_err(|e| StoreError::Backend(format!("malformed budget categories: {e}")))?;

    Ok(Budget {
        id: BudgetId::from_uuid(model.id),
        location_id: LocationId::from_uuid(model.location_id),
        period: BudgetPeriod {
            month: from_db_int(model.month)?,
            year: model.year,
        },
        amount: model.amount,
        categories,
        status: budget_status_from_db(model.status),
        created_by: UserId::from_uuid(model.created_by),
        approved_by: model.approved_by.map(UserId::from_uuid),
        created_at: to_utc(model.created_at),
        updated_at: to_utc(model.updated_at),
        version: model.version,
    })
}

pub(crate) fn budget_to_active(budget: &Budget, version: i64) -> StoreResult<budgets::ActiveModel> {
    let categories =
        serde_json::to_value(&budget.categories).map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(budgets::ActiveModel {
        id: Set(budget.id.into_inner()),
        location_id: Set(budget.location_id.into_inner()),
        month: Set(to_db_int(budget.period.month)?),
        year: Set(budget.period.year),
        amount: Set(budget.amount),
        categories: Set(categories),
        status: Set(budget_status_to_db(budget.status)),
        created_by: Set(budget.created_by.into_inner()),
        approved_by: Set(budget.approved_by.map(UserId::into_inner)),
        created_at: Set(to_db_time(budget.created_at)),
        updated_at: Set(to_db_time(budget.updated_at)),
        version: Set(version),
    })
}

#[async_trait]
impl BudgetStore for BudgetRepository {
    async fn find_budget(&self, id: BudgetId) -> StoreResult<Option<Budget>> {
        budgets::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(budget_from_model)
            .transpose()
    }

    async fn find_budget_for_period(
        &self,
        location_id: LocationId,
        period: BudgetPeriod,
    ) -> StoreResult<Option<Budget>> {
        budgets::Entity::find()
            .filter(budgets::Column::LocationId.eq(location_id.into_inner()))
            .filter(budgets::Column::Month.eq(to_db_int(period.month)?))
            .filter(budgets::Column::Year.eq(period.year))
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(budget_from_model)
            .transpose()
    }

    async fn list_budgets(&self, filter: &BudgetFilter) -> StoreResult<Vec<Budget>> {
        let mut query = budgets::Entity::find();
        if let Some(location_id) = filter.location_id {
            query = query.filter(budgets::Column::LocationId.eq(location_id.into_inner()));
        }
        if let Some(status) = filter.status {
            query = query.filter(budgets::Column::Status.eq(budget_status_to_db(status)));
        }
        if let Some(year) = filter.year {
            query = query.filter(budgets::Column::Year.eq(year));
        }

        query
            .order_by_desc(budgets::Column::Year)
            .order_by_desc(budgets::Column::Month)
            .order_by_desc(budgets::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(backend)?
            .into_iter()
            .map(budget_from_model)
            .collect()
    }

    async fn insert_budget(&self, budget: &Budget) -> StoreResult<Budget> {
        let active = budget_to_active(budget, budget.version)?;
        match active.insert(&self.db).await {
            Ok(model) => budget_from_model(model),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail)) => {
                    Err(StoreError::Duplicate(detail))
                }
                _ => Err(backend(e)),
            },
        }
    }

    async fn update_budget(&self, budget: &Budget) -> StoreResult<Budget> {
        let active = budget_to_active(budget, budget.version + 1)?;
        let result = budgets::Entity::update(active)
            .filter(budgets::Column::Version.eq(budget.version))
            .exec(&self.db)
            .await;

        match result {
            Ok(model) => budget_from_model(model),
            Err(DbErr::RecordNotUpdated) => {
                debug!(budget_id = %budget.id, version = budget.version, "Stale budget write");
                Err(StoreError::VersionConflict)
            }
            Err(e) => Err(backend(e)),
        }
    }
}
