//! Background notification dispatch.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use claimflow_shared::types::UserId;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

use crate::notify::types::{Notification, NotificationEvent};
use crate::store::{ActorDirectory, NotificationStore, StoreResult};

/// Fire-and-forget notification sink.
///
/// Every delivery runs on a tracked task bounded by `timeout`. Failures
/// and timeouts are logged and dropped; nothing is retried.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifications: Arc<dyn NotificationStore>,
    directory: Arc<dyn ActorDirectory>,
    timeout: Duration,
    tracker: TaskTracker,
}

impl NotificationDispatcher {
    /// Creates a dispatcher.
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        directory: Arc<dyn ActorDirectory>,
        timeout: Duration,
    ) -> Self {
        Self {
            notifications,
            directory,
            timeout,
            tracker: TaskTracker::new(),
        }
    }

    /// Resolves the event's audience and notifies it in the background.
    pub fn dispatch(&self, event: NotificationEvent) {
        let this = self.clone();
        self.tracker.spawn(async move {
            let kind = event.kind();
            let claim_id = event.claim_id();
            match tokio::time::timeout(this.timeout, this.deliver_event(&event)).await {
                Ok(Ok(sent)) => debug!(kind, %claim_id, sent, "Notifications delivered"),
                Ok(Err(e)) => error!(kind, %claim_id, error = %e, "Notification dispatch failed"),
                Err(_) => warn!(kind, %claim_id, "Notification dispatch timed out"),
            }
        });
    }

    /// Notifies `user_ids` in the background.
    ///
    /// Low-level entry for an explicit audience. Workflow transitions go
    /// through [`Self::dispatch`], which resolves the audience itself.
    pub fn notify(
        &self,
        user_ids: BTreeSet<UserId>,
        title: String,
        message: String,
        link: Option<String>,
    ) {
        let this = self.clone();
        self.tracker.spawn(async move {
            let delivery = this.deliver(&user_ids, &title, &message, link.as_deref());
            match tokio::time::timeout(this.timeout, delivery).await {
                Ok(Ok(sent)) => debug!(sent, "Notifications delivered"),
                Ok(Err(e)) => error!(error = %e, "Notification delivery failed"),
                Err(_) => warn!("Notification delivery timed out"),
            }
        });
    }

    /// Waits for every in-flight delivery to finish.
    ///
    /// Used on shutdown and in tests. The dispatcher keeps accepting work
    /// afterwards.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    async fn deliver_event(&self, event: &NotificationEvent) -> StoreResult<usize> {
        let mut recipients = BTreeSet::new();
        for (location_id, roles) in event.audience().queries {
            recipients.extend(self.directory.find_recipients(location_id, &roles).await?);
        }

        let (title, message, link) = event.render();
        self.deliver(&recipients, &title, &message, Some(&link)).await
    }

    async fn deliver(
        &self,
        recipients: &BTreeSet<UserId>,
        title: &str,
        message: &str,
        link: Option<&str>,
    ) -> StoreResult<usize> {
        if recipients.is_empty() {
            return Ok(0);
        }
        let batch = Notification::for_recipients(recipients, title, message, link, Utc::now());
        self.notifications.insert_notifications(&batch).await?;
        Ok(batch.len())
    }
}
