pub mod events;

pub use events::{EventBus, StatusChangedEvent};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Success,
    Error,
    Info,
}

/// Message addressed to a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    #[error("Notifications are disabled")]
    Disabled,
}

/// Outbound notification channel. Delivery is fire-and-forget from the point
/// of view of the lifecycle: errors are reported but never undo a transition.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log. Default dispatcher of the server.
#[derive(Debug, Default)]
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn dispatch(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::info!(
            user_id = %notification.user_id,
            kind = ?notification.notification_type,
            "notification: {} - {}",
            notification.title,
            notification.message
        );
        Ok(())
    }
}

/// Keeps every dispatched notification in memory
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn sent_to(&self, user_id: Uuid) -> Vec<Notification> {
        self.sent().into_iter().filter(|n| n.user_id == user_id).collect()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .map_err(|_| NotifyError::Delivery("recording dispatcher poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}

/// Drops everything; used when notifications are switched off in config
#[derive(Debug, Default)]
pub struct DisabledDispatcher;

#[async_trait]
impl NotificationDispatcher for DisabledDispatcher {
    async fn dispatch(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(user_id: Uuid) -> Notification {
        Notification {
            user_id,
            title: "Work report approved".to_string(),
            message: "ok".to_string(),
            notification_type: NotificationType::Success,
        }
    }

    #[tokio::test]
    async fn recording_dispatcher_keeps_messages_per_user() {
        let dispatcher = RecordingDispatcher::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        dispatcher.dispatch(sample(a)).await.unwrap();
        dispatcher.dispatch(sample(b)).await.unwrap();
        dispatcher.dispatch(sample(a)).await.unwrap();

        assert_eq!(dispatcher.sent().len(), 3);
        assert_eq!(dispatcher.sent_to(a).len(), 2);
    }

    #[test]
    fn notification_type_serializes_under_type_key() {
        let json = serde_json::to_value(sample(Uuid::nil())).unwrap();
        assert_eq!(json["type"], "success");
    }
}
