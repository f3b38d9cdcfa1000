// Advisory signals raised for governance review. Signals never block a
// transition by themselves.

pub mod sla;

pub use sla::{scan, SlaPolicy};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::lifecycle::status::UnknownStatus;
use crate::lifecycle::{Action, WorkItem, WorkItemKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionKind {
    SelfApprovalAttempt,
    SlaBreach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionLevel {
    Info,
    ReviewRequired,
    Critical,
}

impl AttentionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttentionKind::SelfApprovalAttempt => "self_approval_attempt",
            AttentionKind::SlaBreach => "sla_breach",
        }
    }
}

impl AttentionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttentionLevel::Info => "info",
            AttentionLevel::ReviewRequired => "review_required",
            AttentionLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for AttentionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AttentionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttentionKind {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self_approval_attempt" => Ok(AttentionKind::SelfApprovalAttempt),
            "sla_breach" => Ok(AttentionKind::SlaBreach),
            _ => Err(UnknownStatus {
                kind: "attention kind",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for AttentionLevel {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(AttentionLevel::Info),
            "review_required" => Ok(AttentionLevel::ReviewRequired),
            "critical" => Ok(AttentionLevel::Critical),
            _ => Err(UnknownStatus {
                kind: "attention level",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionSignal {
    pub id: Uuid,
    pub kind: AttentionKind,
    pub level: AttentionLevel,
    /// Actor whose behaviour raised the signal, if any
    pub actor_id: Option<Uuid>,
    pub entity_type: WorkItemKind,
    pub entity_id: Uuid,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl AttentionSignal {
    pub fn self_approval_attempt(item: &WorkItem, actor_id: Uuid, action: &Action, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: AttentionKind::SelfApprovalAttempt,
            level: AttentionLevel::ReviewRequired,
            actor_id: Some(actor_id),
            entity_type: item.kind,
            entity_id: item.id,
            message: format!(
                "Actor {} attempted to {} their own {} \"{}\"",
                actor_id,
                action.verb(),
                item.kind.label().to_lowercase(),
                item.title
            ),
            raised_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttentionFilter {
    pub kind: Option<AttentionKind>,
    pub min_level: Option<AttentionLevel>,
    pub entity_id: Option<Uuid>,
    pub limit: Option<usize>,
}

impl AttentionFilter {
    pub fn matches(&self, signal: &AttentionSignal) -> bool {
        self.kind.map_or(true, |k| k == signal.kind)
            && self.min_level.map_or(true, |l| signal.level >= l)
            && self.entity_id.map_or(true, |id| id == signal.entity_id)
    }
}
