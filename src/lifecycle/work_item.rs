use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::status::{derive_final_status, Decision, FinalStatus, LifecycleState, ReviewStatus, UnknownStatus};

/// Tasks and work reports share one lifecycle; only the entity kind differs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    Task,
    WorkReport,
}

impl WorkItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkItemKind::Task => "task",
            WorkItemKind::WorkReport => "work_report",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkItemKind::Task => "Task",
            WorkItemKind::WorkReport => "Work report",
        }
    }
}

impl fmt::Display for WorkItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkItemKind {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(WorkItemKind::Task),
            "work_report" | "report" => Ok(WorkItemKind::WorkReport),
            _ => Err(UnknownStatus {
                kind: "work item kind",
                value: s.to_string(),
            }),
        }
    }
}

/// Payload for a new submission; the owner is always the submitting actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkItem {
    pub kind: WorkItemKind,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    pub hours: Decimal,
    pub work_date: NaiveDate,
}

impl NewWorkItem {
    pub const MAX_HOURS: i64 = 24;

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.hours <= Decimal::ZERO || self.hours > Decimal::from(Self::MAX_HOURS) {
            return Err(format!(
                "hours must be greater than 0 and at most {}, got {}",
                Self::MAX_HOURS,
                self.hours
            ));
        }
        if self.hours.scale() > crate::payroll::MONEY_SCALE {
            return Err(format!(
                "hours allow at most {} decimal places, got {}",
                crate::payroll::MONEY_SCALE,
                self.hours
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: Uuid,
    pub kind: WorkItemKind,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub platform: Option<String>,
    pub hours: Decimal,
    pub work_date: NaiveDate,

    pub team_lead_status: Option<ReviewStatus>,
    pub team_lead_reviewed_by: Option<Uuid>,
    pub team_lead_reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,

    pub admin_status: Option<Decision>,
    pub admin_override_by: Option<Uuid>,
    pub admin_override_at: Option<DateTime<Utc>>,
    pub admin_override_reason: Option<String>,

    /// Written only from `derive_final_status`
    pub final_status: FinalStatus,
    pub cycle: i32,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkItem {
    /// New submission in `pending`, owned by `owner_id`
    pub fn submit(owner_id: Uuid, new: NewWorkItem, now: DateTime<Utc>) -> Self {
        let mut item = Self {
            id: Uuid::new_v4(),
            kind: new.kind,
            owner_id,
            title: new.title.trim().to_string(),
            description: new.description,
            platform: new.platform,
            hours: new.hours,
            work_date: new.work_date,
            team_lead_status: Some(ReviewStatus::Pending),
            team_lead_reviewed_by: None,
            team_lead_reviewed_at: None,
            rejection_reason: None,
            admin_status: None,
            admin_override_by: None,
            admin_override_at: None,
            admin_override_reason: None,
            final_status: FinalStatus::Pending,
            cycle: 1,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        item.refresh_final_status();
        item
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_decisions(self.team_lead_status, self.admin_status)
    }

    pub fn derived_final_status(&self) -> FinalStatus {
        derive_final_status(self.team_lead_status, self.admin_status)
    }

    pub(crate) fn refresh_final_status(&mut self) {
        self.final_status = self.derived_final_status();
    }

    pub fn is_owned_by(&self, actor_id: Uuid) -> bool {
        self.owner_id == actor_id
    }

    /// Decision-related fields, recorded as previous/new values in the audit log
    pub fn status_snapshot(&self) -> Value {
        json!({
            "state": self.state(),
            "team_lead_status": self.team_lead_status,
            "team_lead_reviewed_by": self.team_lead_reviewed_by,
            "rejection_reason": self.rejection_reason,
            "admin_status": self.admin_status,
            "admin_override_by": self.admin_override_by,
            "admin_override_reason": self.admin_override_reason,
            "final_status": self.final_status,
            "cycle": self.cycle,
        })
    }
}

/// Work item listing query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkItemFilter {
    pub owner_id: Option<Uuid>,
    pub kind: Option<WorkItemKind>,
    pub final_status: Option<FinalStatus>,
    pub state: Option<LifecycleState>,
    pub work_date_from: Option<NaiveDate>,
    pub work_date_to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl WorkItemFilter {
    pub fn matches(&self, item: &WorkItem) -> bool {
        self.owner_id.map_or(true, |id| id == item.owner_id)
            && self.kind.map_or(true, |k| k == item.kind)
            && self.final_status.map_or(true, |s| s == item.final_status)
            && self.state.map_or(true, |s| s == item.state())
            && self.work_date_from.map_or(true, |d| item.work_date >= d)
            && self.work_date_to.map_or(true, |d| item.work_date <= d)
    }
}
