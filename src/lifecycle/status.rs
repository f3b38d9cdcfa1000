use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parse failure for any of the status enums stored as text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

/// Team-lead review status as stored on the work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

/// A reviewer's verdict, used for both team-lead decisions and admin overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    #[serde(alias = "approve")]
    Approved,
    #[serde(alias = "reject")]
    Rejected,
}

/// Authoritative outcome of a work item, always derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Position of a work item in the approval lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Pending,
    TeamLeadApproved,
    TeamLeadRejected,
    AdminApproved,
    AdminRejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl From<Decision> for ReviewStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => ReviewStatus::Approved,
            Decision::Rejected => ReviewStatus::Rejected,
        }
    }
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Decision::Rejected)
    }
}

impl FinalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalStatus::Pending => "pending",
            FinalStatus::Approved => "approved",
            FinalStatus::Rejected => "rejected",
        }
    }
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Pending => "pending",
            LifecycleState::TeamLeadApproved => "team_lead_approved",
            LifecycleState::TeamLeadRejected => "team_lead_rejected",
            LifecycleState::AdminApproved => "admin_approved",
            LifecycleState::AdminRejected => "admin_rejected",
        }
    }

    /// Lifecycle position implied by the stored decision fields
    pub fn from_decisions(team_lead: Option<ReviewStatus>, admin: Option<Decision>) -> Self {
        match (admin, team_lead) {
            (Some(Decision::Approved), _) => LifecycleState::AdminApproved,
            (Some(Decision::Rejected), _) => LifecycleState::AdminRejected,
            (None, Some(ReviewStatus::Approved)) => LifecycleState::TeamLeadApproved,
            (None, Some(ReviewStatus::Rejected)) => LifecycleState::TeamLeadRejected,
            (None, Some(ReviewStatus::Pending)) | (None, None) => LifecycleState::Pending,
        }
    }

    /// Admin decisions close the item for good
    pub fn is_admin_terminal(&self) -> bool {
        matches!(self, LifecycleState::AdminApproved | LifecycleState::AdminRejected)
    }

    pub fn awaits_team_lead(&self) -> bool {
        matches!(self, LifecycleState::Pending)
    }

    pub fn has_team_lead_decision(&self) -> bool {
        matches!(self, LifecycleState::TeamLeadApproved | LifecycleState::TeamLeadRejected)
    }
}

/// Single source of truth for the final status of a work item.
///
/// An admin decision, when present, is the most authoritative and decides the
/// outcome. Otherwise the team-lead decision stands. With neither, the item is
/// pending.
pub fn derive_final_status(team_lead: Option<ReviewStatus>, admin: Option<Decision>) -> FinalStatus {
    match (admin, team_lead) {
        (Some(Decision::Approved), _) => FinalStatus::Approved,
        (Some(Decision::Rejected), _) => FinalStatus::Rejected,
        (None, Some(ReviewStatus::Approved)) => FinalStatus::Approved,
        (None, Some(ReviewStatus::Rejected)) => FinalStatus::Rejected,
        (None, Some(ReviewStatus::Pending)) | (None, None) => FinalStatus::Pending,
    }
}

macro_rules! text_enum {
    ($ty:ty, $kind:literal, [$($variant:expr),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                [$($variant),+]
                    .into_iter()
                    .find(|v: &$ty| v.as_str() == s)
                    .ok_or_else(|| UnknownStatus { kind: $kind, value: s.to_string() })
            }
        }
    };
}

text_enum!(ReviewStatus, "review status", [ReviewStatus::Pending, ReviewStatus::Approved, ReviewStatus::Rejected]);
text_enum!(Decision, "decision", [Decision::Approved, Decision::Rejected]);
text_enum!(FinalStatus, "final status", [FinalStatus::Pending, FinalStatus::Approved, FinalStatus::Rejected]);
text_enum!(
    LifecycleState,
    "lifecycle state",
    [
        LifecycleState::Pending,
        LifecycleState::TeamLeadApproved,
        LifecycleState::TeamLeadRejected,
        LifecycleState::AdminApproved,
        LifecycleState::AdminRejected,
    ]
);
