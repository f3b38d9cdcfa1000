// Append-only audit trail of work item transitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::lifecycle::status::UnknownStatus;
use crate::lifecycle::WorkItemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    TeamLeadApproved,
    TeamLeadRejected,
    AdminApproved,
    AdminRejected,
    Resubmitted,
}

impl AuditAction {
    pub const ALL: [AuditAction; 5] = [
        AuditAction::TeamLeadApproved,
        AuditAction::TeamLeadRejected,
        AuditAction::AdminApproved,
        AuditAction::AdminRejected,
        AuditAction::Resubmitted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::TeamLeadApproved => "team_lead_approved",
            AuditAction::TeamLeadRejected => "team_lead_rejected",
            AuditAction::AdminApproved => "admin_approved",
            AuditAction::AdminRejected => "admin_rejected",
            AuditAction::Resubmitted => "resubmitted",
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, AuditAction::AdminApproved | AuditAction::AdminRejected)
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownStatus {
                kind: "audit action",
                value: s.to_string(),
            })
    }
}

/// Immutable record of one state transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub entity_type: WorkItemKind,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub performed_by: Uuid,
    pub performed_at: DateTime<Utc>,
    pub previous_values: Value,
    pub new_values: Value,
    pub notes: Option<String>,
}

/// Audit viewer query. Empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    pub entity_type: Option<WorkItemKind>,
    pub entity_id: Option<Uuid>,
    pub performed_by: Option<Uuid>,
    pub limit: Option<usize>,
}

impl AuditFilter {
    pub fn for_entity(entity_type: WorkItemKind, entity_id: Uuid) -> Self {
        Self {
            entity_type: Some(entity_type),
            entity_id: Some(entity_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.entity_type.map_or(true, |t| t == entry.entity_type)
            && self.entity_id.map_or(true, |id| id == entry.entity_id)
            && self.performed_by.map_or(true, |by| by == entry.performed_by)
    }
}
