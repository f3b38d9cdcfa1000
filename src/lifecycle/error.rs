use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::status::LifecycleState;
use crate::access::Capability;
use crate::database::DatabaseError;

/// Why a permission check refused an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Owner attempted to decide on their own work item
    SelfDecision,
    MissingCapability(Capability),
    /// Only the owner may resubmit
    NotOwner,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::SelfDecision => write!(f, "actors may not decide on their own work items"),
            Denial::MissingCapability(cap) => write!(f, "missing capability {}", cap),
            Denial::NotOwner => write!(f, "only the owner may resubmit a work item"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Permission denied: {reason}")]
    PermissionDenied { actor_id: Uuid, reason: Denial },

    #[error("Invalid transition: cannot {action} a work item in state {from}")]
    InvalidTransition { from: LifecycleState, action: &'static str },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

impl LifecycleError {
    pub fn denied(actor_id: Uuid, reason: Denial) -> Self {
        LifecycleError::PermissionDenied { actor_id, reason }
    }

    pub fn missing(actor_id: Uuid, capability: Capability) -> Self {
        LifecycleError::PermissionDenied {
            actor_id,
            reason: Denial::MissingCapability(capability),
        }
    }

    pub fn work_item_not_found(id: Uuid) -> Self {
        LifecycleError::NotFound { entity: "work item", id }
    }

    pub fn is_self_decision(&self) -> bool {
        matches!(
            self,
            LifecycleError::PermissionDenied {
                reason: Denial::SelfDecision,
                ..
            }
        )
    }
}
