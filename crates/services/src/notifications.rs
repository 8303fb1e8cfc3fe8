use std::sync::Arc;

use domains::{Actor, NotificationDetails, NotificationRepo, Result};
use tracing::instrument;
use uuid::Uuid;

use crate::outcome::{failure, ActionOutcome, NotificationsMarked};

pub struct NotificationService {
    notifications: Arc<dyn NotificationRepo>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationRepo>) -> Self {
        Self { notifications }
    }

    /// The actor's notifications, newest first.
    pub async fn get_notifications(&self, actor: &Actor) -> Result<Vec<NotificationDetails>> {
        self.notifications.list_notifications(actor.user_id).await
    }

    /// Ids that belong to other users are ignored.
    #[instrument(skip(self, ids), fields(actor = %actor.user_id, requested = ids.len()))]
    pub async fn mark_notifications_as_read(&self, actor: &Actor, ids: &[Uuid]) -> ActionOutcome<NotificationsMarked> {
        if ids.is_empty() {
            return ActionOutcome::ok(NotificationsMarked { updated: 0 });
        }
        let result = self
            .notifications
            .mark_read(actor.user_id, ids)
            .await
            .map(|updated| NotificationsMarked { updated });
        ActionOutcome::settle("mark_notifications_as_read", failure::MARK_READ, result)
    }
}
