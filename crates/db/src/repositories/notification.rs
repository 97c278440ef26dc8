//! In-app notification repository.

use async_trait::async_trait;
use claimflow_core::notify::Notification;
use claimflow_core::store::{NotificationStore, StoreResult};
use claimflow_shared::types::{NotificationId, UserId};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use super::{backend, to_db_time, to_utc};
use crate::entities::notifications;

/// Notification repository.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    /// Creates a new notification repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn notification_from_model(model: notifications::Model) -> Notification {
    Notification {
        id: NotificationId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        title: model.title,
        message: model.message,
        link: model.link,
        is_read: model.is_read,
        created_at: to_utc(model.created_at),
    }
}

pub(crate) fn notification_to_active(notification: &Notification) -> notifications::ActiveModel {
    notifications::ActiveModel {
        id: Set(notification.id.into_inner()),
        user_id: Set(notification.user_id.into_inner()),
        title: Set(notification.title.clone()),
        message: Set(notification.message.clone()),
        link: Set(notification.link.clone()),
        is_read: Set(notification.is_read),
        created_at: Set(to_db_time(notification.created_at)),
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn insert_notifications(&self, notifications: &[Notification]) -> StoreResult<()> {
        if notifications.is_empty() {
            return Ok(());
        }

        notifications::Entity::insert_many(notifications.iter().map(notification_to_active))
            .exec(&self.db)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> StoreResult<Vec<Notification>> {
        let mut query =
            notifications::Entity::find().filter(notifications::Column::UserId.eq(user_id.into_inner()));
        if unread_only {
            query = query.filter(notifications::Column::IsRead.eq(false));
        }

        Ok(query
            .order_by_desc(notifications::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(backend)?
            .into_iter()
            .map(notification_from_model)
            .collect())
    }

    async fn mark_notification_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> StoreResult<Option<Notification>> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .filter(notifications::Column::Id.eq(id.into_inner()))
            .filter(notifications::Column::UserId.eq(user_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Ok(notifications::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(notification_from_model))
    }
}
