use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::audit::AuditAction;
use crate::lifecycle::{FinalStatus, LifecycleState, WorkItemKind};

/// Published after a transition has been committed. Consumers only observe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChangedEvent {
    pub entity_type: WorkItemKind,
    pub entity_id: Uuid,
    pub owner_id: Uuid,
    pub action: AuditAction,
    pub from: LifecycleState,
    pub to: LifecycleState,
    pub final_status: FinalStatus,
    pub performed_by: Uuid,
    pub occurred_at: DateTime<Utc>,
}

/// In-process publish/subscribe feed of status changes
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StatusChangedEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of subscribers that received the event
    pub fn publish(&self, event: StatusChangedEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::trace!("status event dropped, no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChangedEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
