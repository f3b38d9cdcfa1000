use crate::audit::AuditLogEntry;
use crate::lifecycle::{FinalStatus, LifecycleState, Transition, WorkItem};
use crate::notify::{Notification, StatusChangedEvent};

/// Committed transition as seen by observers
#[derive(Debug, Clone)]
pub struct TransitionEvent {
    pub item: WorkItem,
    pub audit: AuditLogEntry,
    pub from: LifecycleState,
    pub to: LifecycleState,
    pub previous_final: FinalStatus,
    /// Owner notification decided when the transition was planned
    pub notification: Option<Notification>,
}

impl TransitionEvent {
    pub fn committed(transition: Transition) -> Self {
        let to = transition.to();
        Self {
            item: transition.item,
            audit: transition.audit,
            from: transition.from,
            to,
            previous_final: transition.previous_final,
            notification: transition.notification,
        }
    }

    pub fn status_changed(&self) -> StatusChangedEvent {
        StatusChangedEvent {
            entity_type: self.item.kind,
            entity_id: self.item.id,
            owner_id: self.item.owner_id,
            action: self.audit.action,
            from: self.from,
            to: self.to,
            final_status: self.item.final_status,
            performed_by: self.audit.performed_by,
            occurred_at: self.audit.performed_at,
        }
    }
}
