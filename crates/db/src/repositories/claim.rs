//! Expense claim repository.
//!
//! Every write is conditional on the row version. Claim inserts also bump
//! the guarding budget's version inside the same transaction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use claimflow_core::budget::BudgetPeriod;
use claimflow_core::expense::{
    ClaimFilter, DisburseType, ExpenseClaim, ExpenseStatus, ExpenseType, PaymentDetails,
};
use claimflow_core::store::{BudgetGuard, ClaimStore, StoreError, StoreResult};
use claimflow_shared::types::{ClaimId, LocationId, UserId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use super::{backend, from_db_int, to_db_int, to_db_time, to_utc};
use crate::entities::{budgets, expense_claims, sea_orm_active_enums as db};

/// Claim repository for versioned reads and writes.
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    db: DatabaseConnection,
}

impl ClaimRepository {
    /// Creates a new claim repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) const fn status_to_db(status: ExpenseStatus) -> db::ExpenseStatus {
    match status {
        ExpenseStatus::Pending => db::ExpenseStatus::Pending,
        ExpenseStatus::Approved => db::ExpenseStatus::Approved,
        ExpenseStatus::Rejected => db::ExpenseStatus::Rejected,
        ExpenseStatus::Disbursed => db::ExpenseStatus::Disbursed,
    }
}

pub(crate) const fn status_from_db(status: db::ExpenseStatus) -> ExpenseStatus {
    match status {
        db::ExpenseStatus::Pending => ExpenseStatus::Pending,
        db::ExpenseStatus::Approved => ExpenseStatus::Approved,
        db::ExpenseStatus::Rejected => ExpenseStatus::Rejected,
        db::ExpenseStatus::Disbursed => ExpenseStatus::Disbursed,
    }
}

pub(crate) const fn disburse_type_to_db(value: DisburseType) -> db::DisburseType {
    match value {
        DisburseType::Cash => db::DisburseType::Cash,
        DisburseType::ChequeOrTransfer => db::DisburseType::ChequeOrTransfer,
    }
}

pub(crate) const fn disburse_type_from_db(value: db::DisburseType) -> DisburseType {
    match value {
        db::DisburseType::Cash => DisburseType::Cash,
        db::DisburseType::ChequeOrTransfer => DisburseType::ChequeOrTransfer,
    }
}

/// Converts a row into the engine's claim.
pub(crate) fn claim_from_model(model: expense_claims::Model) -> StoreResult<ExpenseClaim> {
    let expense_type = ExpenseType::parse(&model.expense_type).ok_or_else(|| {
        StoreError::Backend(format!("unknown expense type {}", model.expense_type))
    })?;
    let attachments: Vec<String> = serde_json::from_value(model.attachments)
        .map_err(|e| StoreError::Backend(format!("malformed attachments: {e}")))?;

    Ok(ExpenseClaim {
        id: ClaimId::from_uuid(model.id),
        expense_type,
        amount: model.amount,
        details: model.details,
        disburse_type: disburse_type_from_db(model.disburse_type),
        status: status_from_db(model.status),
        location_id: LocationId::from_uuid(model.location_id),
        period: BudgetPeriod {
            month: from_db_int(model.period_month)?,
            year: model.period_year,
        },
        route_id: model.route_id,
        vehicle_id: model.vehicle_id,
        attachments,
        created_by: UserId::from_uuid(model.created_by),
        approved_by: model.approved_by.map(UserId::from_uuid),
        approved_at: model.approved_at.map(to_utc),
        rejected_by: model.rejected_by.map(UserId::from_uuid),
        rejected_at: model.rejected_at.map(to_utc),
        disbursed_by: model.disbursed_by.map(UserId::from_uuid),
        disbursed_at: model.disbursed_at.map(to_utc),
        payment: PaymentDetails {
            account_title: model.account_title,
            account_no: model.account_no,
            bank_name: model.bank_name,
            cheque_date: model.cheque_date,
            disbursed_amount: model.disbursed_amount,
        },
        created_at: to_utc(model.created_at),
        updated_at: to_utc(model.updated_at),
        version: model.version,
    })
}

/// Builds a fully set active model carrying `version`.
pub(crate) fn claim_to_active(
    claim: &ExpenseClaim,
    version: i64,
) -> StoreResult<expense_claims::ActiveModel> {
    let attachments = serde_json::to_value(&claim.attachments)
        .map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(expense_claims::ActiveModel {
        id: Set(claim.id.into_inner()),
        expense_type: Set(claim.expense_type.code().to_string()),
        amount: Set(claim.amount),
        details: Set(claim.details.clone()),
        disburse_type: Set(disburse_type_to_db(claim.disburse_type)),
        status: Set(status_to_db(claim.status)),
        location_id: Set(claim.location_id.into_inner()),
        period_month: Set(to_db_int(claim.period.month)?),
        period_year: Set(claim.period.year),
        route_id: Set(claim.route_id.clone()),
        vehicle_id: Set(claim.vehicle_id.clone()),
        attachments: Set(attachments),
        created_by: Set(claim.created_by.into_inner()),
        approved_by: Set(claim.approved_by.map(UserId::into_inner)),
        approved_at: Set(claim.approved_at.map(to_db_time)),
        rejected_by: Set(claim.rejected_by.map(UserId::into_inner)),
        rejected_at: Set(claim.rejected_at.map(to_db_time)),
        disbursed_by: Set(claim.disbursed_by.map(UserId::into_inner)),
        disbursed_at: Set(claim.disbursed_at.map(to_db_time)),
        account_title: Set(claim.payment.account_title.clone()),
        account_no: Set(claim.payment.account_no.clone()),
        bank_name: Set(claim.payment.bank_name.clone()),
        cheque_date: Set(claim.payment.cheque_date),
        disbursed_amount: Set(claim.payment.disbursed_amount),
        created_at: Set(to_db_time(claim.created_at)),
        updated_at: Set(to_db_time(claim.updated_at)),
        version: Set(version),
    })
}

#[async_trait]
impl ClaimStore for ClaimRepository {
    async fn find_claim(&self, id: ClaimId) -> StoreResult<Option<ExpenseClaim>> {
        expense_claims::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(claim_from_model)
            .transpose()
    }

    async fn list_claims(&self, filter: &ClaimFilter) -> StoreResult<Vec<ExpenseClaim>> {
        let mut query = expense_claims::Entity::find();
        if let Some(location_id) = filter.location_id {
            query = query.filter(expense_claims::Column::LocationId.eq(location_id.into_inner()));
        }
        if let Some(status) = filter.status {
            query = query.filter(expense_claims::Column::Status.eq(status_to_db(status)));
        }
        if let Some(month) = filter.month {
            query = query.filter(expense_claims::Column::PeriodMonth.eq(to_db_int(month)?));
        }
        if let Some(year) = filter.year {
            query = query.filter(expense_claims::Column::PeriodYear.eq(year));
        }

        query
            .order_by_desc(expense_claims::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(backend)?
            .into_iter()
            .map(claim_from_model)
            .collect()
    }

    async fn period_spend(
        &self,
        location_id: LocationId,
        period: BudgetPeriod,
    ) -> StoreResult<BTreeMap<String, Decimal>> {
        let rows: Vec<(String, Option<Decimal>)> = expense_claims::Entity::find()
            .select_only()
            .column(expense_claims::Column::ExpenseType)
            .column_as(expense_claims::Column::Amount.sum(), "total")
            .filter(expense_claims::Column::LocationId.eq(location_id.into_inner()))
            .filter(expense_claims::Column::PeriodMonth.eq(to_db_int(period.month)?))
            .filter(expense_claims::Column::PeriodYear.eq(period.year))
            .filter(expense_claims::Column::Status.ne(db::ExpenseStatus::Rejected))
            .group_by(expense_claims::Column::ExpenseType)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(backend)?;

        Ok(rows
            .into_iter()
            .map(|(expense_type, total)| (expense_type, total.unwrap_or(Decimal::ZERO)))
            .collect())
    }

    async fn insert_claim(
        &self,
        claim: &ExpenseClaim,
        guard: BudgetGuard,
    ) -> StoreResult<ExpenseClaim> {
        let active = claim_to_active(claim, claim.version)?;
        let txn = self.db.begin().await.map_err(backend)?;

        let bumped = budgets::Entity::update_many()
            .col_expr(
                budgets::Column::Version,
                Expr::col(budgets::Column::Version).add(1),
            )
            .filter(budgets::Column::Id.eq(guard.budget_id.into_inner()))
            .filter(budgets::Column::Version.eq(guard.version))
            .exec(&txn)
            .await
            .map_err(backend)?;
        if bumped.rows_affected == 0 {
            debug!(budget_id = %guard.budget_id, version = guard.version, "Budget moved before claim insert");
            // Dropping the transaction rolls it back.
            return Err(StoreError::VersionConflict);
        }

        let model = active.insert(&txn).await.map_err(backend)?;
        txn.commit().await.map_err(backend)?;
        claim_from_model(model)
    }

    async fn update_claim(&self, claim: &ExpenseClaim) -> StoreResult<ExpenseClaim> {
        let active = claim_to_active(claim, claim.version + 1)?;
        let result = expense_claims::Entity::update(active)
            .filter(expense_claims::Column::Version.eq(claim.version))
            .exec(&self.db)
            .await;

        match result {
            Ok(model) => claim_from_model(model),
            Err(DbErr::RecordNotUpdated) => {
                debug!(claim_id = %claim.id, version = claim.version, "Stale claim write");
                Err(StoreError::VersionConflict)
            }
            Err(e) => Err(backend(e)),
        }
    }
}
