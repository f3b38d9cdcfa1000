use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::lifecycle::WorkItemKind;
use crate::observer::context::TransitionEvent;
use crate::observer::error::ObserverError;

/// Post-commit rings, executed in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum ObserverRing {
    Integration = 8,  // Event feeds, webhooks
    Notification = 9, // User notifications
}

impl ObserverRing {
    pub const ORDER: [ObserverRing; 2] = [ObserverRing::Integration, ObserverRing::Notification];

    pub fn number(&self) -> u8 {
        *self as u8
    }
}

/// Side effect of a committed transition
#[async_trait]
pub trait TransitionObserver: Send + Sync {
    /// Observer name for logging and debugging
    fn name(&self) -> &'static str;

    /// Which ring this observer belongs to
    fn ring(&self) -> ObserverRing;

    /// Check if observer applies to this kind of work item
    fn applies_to(&self, _kind: WorkItemKind) -> bool {
        true
    }

    /// Execution timeout (default 5 seconds)
    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn execute(&self, event: &TransitionEvent) -> Result<(), ObserverError>;
}
