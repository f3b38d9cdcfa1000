use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{Denial, LifecycleError};
use super::status::{Decision, FinalStatus, LifecycleState, ReviewStatus};
use super::work_item::WorkItem;
use crate::access::{can, Actor, Capability};
use crate::audit::{AuditAction, AuditLogEntry};
use crate::notify::{Notification, NotificationType};

/// A requested move through the lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    TeamLeadDecision {
        decision: Decision,
        #[serde(default)]
        reason: Option<String>,
    },
    AdminOverride {
        decision: Decision,
        #[serde(default)]
        reason: Option<String>,
    },
    Resubmit {
        #[serde(default)]
        notes: Option<String>,
    },
}

impl Action {
    pub fn verb(&self) -> &'static str {
        match self {
            Action::TeamLeadDecision { .. } => "review",
            Action::AdminOverride { .. } => "override",
            Action::Resubmit { .. } => "resubmit",
        }
    }

    /// Approve/reject actions, as opposed to resubmission
    pub fn is_decision(&self) -> bool {
        !matches!(self, Action::Resubmit { .. })
    }

    pub fn decision(&self) -> Option<Decision> {
        match self {
            Action::TeamLeadDecision { decision, .. } | Action::AdminOverride { decision, .. } => Some(*decision),
            Action::Resubmit { .. } => None,
        }
    }

    fn required_capability(&self) -> Option<Capability> {
        match self {
            Action::TeamLeadDecision { .. } => Some(Capability::ApproveReports),
            Action::AdminOverride { .. } => Some(Capability::OverrideReports),
            Action::Resubmit { .. } => None,
        }
    }
}

/// Fully planned transition: the next item state plus everything that must be
/// written or emitted with it. Nothing has been applied yet.
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: LifecycleState,
    pub expected_version: i64,
    pub item: WorkItem,
    pub audit: AuditLogEntry,
    pub previous_final: FinalStatus,
    /// Present when the owner must be told about the outcome
    pub notification: Option<Notification>,
}

impl Transition {
    pub fn to(&self) -> LifecycleState {
        self.item.state()
    }

    pub fn final_status_changed(&self) -> bool {
        self.previous_final != self.item.final_status
    }
}

fn normalize(text: &Option<String>) -> Option<String> {
    text.as_ref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Check guards and compute the outcome of `action` on `item` by `actor`.
///
/// Guards run in a fixed order: deciding on one's own item, then the
/// capability the action needs, then the lifecycle state. A failed guard
/// leaves no trace: the caller gets the error and nothing else.
pub fn plan(
    item: &WorkItem,
    actor: &Actor,
    action: &Action,
    now: DateTime<Utc>,
) -> Result<Transition, LifecycleError> {
    let from = item.state();

    if action.is_decision() && item.is_owned_by(actor.id) {
        return Err(LifecycleError::denied(actor.id, Denial::SelfDecision));
    }
    if let Some(cap) = action.required_capability() {
        if !can(actor, cap) {
            return Err(LifecycleError::missing(actor.id, cap));
        }
    }
    if matches!(action, Action::Resubmit { .. }) && !item.is_owned_by(actor.id) {
        return Err(LifecycleError::denied(actor.id, Denial::NotOwner));
    }

    let invalid = || LifecycleError::InvalidTransition {
        from,
        action: action.verb(),
    };

    let mut next = item.clone();
    let audit_action;
    let notes;

    match action {
        Action::TeamLeadDecision { decision, reason } => {
            if !from.awaits_team_lead() {
                return Err(invalid());
            }
            next.team_lead_status = Some(ReviewStatus::from(*decision));
            next.team_lead_reviewed_by = Some(actor.id);
            next.team_lead_reviewed_at = Some(now);
            next.rejection_reason = if decision.is_rejection() { normalize(reason) } else { None };
            audit_action = match decision {
                Decision::Approved => AuditAction::TeamLeadApproved,
                Decision::Rejected => AuditAction::TeamLeadRejected,
            };
            notes = normalize(reason);
        }
        Action::AdminOverride { decision, reason } => {
            if !from.has_team_lead_decision() {
                return Err(invalid());
            }
            next.admin_status = Some(*decision);
            next.admin_override_by = Some(actor.id);
            next.admin_override_at = Some(now);
            next.admin_override_reason = normalize(reason);
            audit_action = match decision {
                Decision::Approved => AuditAction::AdminApproved,
                Decision::Rejected => AuditAction::AdminRejected,
            };
            notes = normalize(reason);
        }
        Action::Resubmit { notes: resubmit_notes } => {
            if from != LifecycleState::TeamLeadRejected {
                return Err(invalid());
            }
            next.team_lead_status = Some(ReviewStatus::Pending);
            next.team_lead_reviewed_by = None;
            next.team_lead_reviewed_at = None;
            next.rejection_reason = None;
            next.cycle += 1;
            audit_action = AuditAction::Resubmitted;
            notes = normalize(resubmit_notes);
        }
    }

    next.refresh_final_status();
    next.version = item.version + 1;
    next.updated_at = now;

    let audit = AuditLogEntry {
        id: Uuid::new_v4(),
        entity_type: item.kind,
        entity_id: item.id,
        action: audit_action,
        performed_by: actor.id,
        performed_at: now,
        previous_values: item.status_snapshot(),
        new_values: next.status_snapshot(),
        notes,
    };

    let previous_final = item.final_status;
    let notification = if previous_final != next.final_status && next.final_status != FinalStatus::Pending {
        Some(owner_notification(&next, audit_action))
    } else {
        None
    };

    Ok(Transition {
        from,
        expected_version: item.version,
        item: next,
        audit,
        previous_final,
        notification,
    })
}

fn owner_notification(item: &WorkItem, action: AuditAction) -> Notification {
    let (verdict, notification_type) = match item.final_status {
        FinalStatus::Approved => ("approved", NotificationType::Success),
        FinalStatus::Rejected => ("rejected", NotificationType::Error),
        FinalStatus::Pending => ("updated", NotificationType::Info),
    };
    let by = if action.is_override() { "an administrator" } else { "your team lead" };

    let reason = if action.is_override() {
        item.admin_override_reason.as_deref()
    } else {
        item.rejection_reason.as_deref()
    };

    let mut message = format!("{} \"{}\" was {} by {}.", item.kind.label(), item.title, verdict, by);
    if let Some(reason) = reason {
        message.push_str(&format!(" Reason: {}", reason));
    }

    Notification {
        user_id: item.owner_id,
        title: format!("{} {}", item.kind.label(), verdict),
        message,
        notification_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use crate::lifecycle::work_item::fixtures::new_report;

    fn actor(role: Role) -> Actor {
        Actor::new(Uuid::new_v4(), role)
    }

    fn review(decision: Decision) -> Action {
        Action::TeamLeadDecision { decision, reason: None }
    }

    fn override_to(decision: Decision, reason: &str) -> Action {
        Action::AdminOverride {
            decision,
            reason: Some(reason.to_string()),
        }
    }

    fn pending_item(owner: &Actor) -> WorkItem {
        WorkItem::submit(owner.id, new_report(6), Utc::now())
    }

    fn apply(item: &WorkItem, actor: &Actor, action: Action) -> WorkItem {
        plan(item, actor, &action, Utc::now()).unwrap().item
    }

    #[test]
    fn team_lead_approval_moves_to_team_lead_approved() {
        let worker = actor(Role::Worker);
        let lead = actor(Role::TeamLead);
        let item = pending_item(&worker);

        let t = plan(&item, &lead, &review(Decision::Approved), Utc::now()).unwrap();
        assert_eq!(t.from, LifecycleState::Pending);
        assert_eq!(t.to(), LifecycleState::TeamLeadApproved);
        assert_eq!(t.item.final_status, FinalStatus::Approved);
        assert_eq!(t.item.team_lead_reviewed_by, Some(lead.id));
        assert_eq!(t.item.version, item.version + 1);
        assert_eq!(t.expected_version, item.version);
        assert_eq!(t.audit.action, AuditAction::TeamLeadApproved);
        assert_eq!(t.audit.performed_by, lead.id);

        let n = t.notification.expect("owner notified");
        assert_eq!(n.user_id, worker.id);
        assert_eq!(n.notification_type, NotificationType::Success);
    }

    #[test]
    fn admin_override_reject_records_reason() {
        let worker = actor(Role::Worker);
        let approved = apply(&pending_item(&worker), &actor(Role::TeamLead), review(Decision::Approved));
        let admin = actor(Role::ReportAdmin);

        let t = plan(&approved, &admin, &override_to(Decision::Rejected, "insufficient evidence"), Utc::now()).unwrap();
        assert_eq!(t.to(), LifecycleState::AdminRejected);
        assert_eq!(t.item.final_status, FinalStatus::Rejected);
        assert_eq!(t.item.admin_override_reason.as_deref(), Some("insufficient evidence"));
        assert_eq!(t.audit.notes.as_deref(), Some("insufficient evidence"));
        assert_eq!(t.audit.previous_values["final_status"], "approved");
        assert_eq!(t.audit.new_values["final_status"], "rejected");
        assert!(t.notification.unwrap().message.contains("insufficient evidence"));
    }

    #[test]
    fn self_decision_is_denied_whatever_the_role() {
        for role in [Role::TeamLead, Role::ReportAdmin, Role::GeneralOverseer, Role::Worker] {
            let owner = actor(role);
            let item = pending_item(&owner);
            let err = plan(&item, &owner, &review(Decision::Approved), Utc::now()).unwrap_err();
            assert!(err.is_self_decision(), "{} self approval not flagged: {}", role, err);

            let decided = apply(&item, &actor(Role::TeamLead), review(Decision::Approved));
            let err = plan(&decided, &owner, &override_to(Decision::Approved, "mine"), Utc::now()).unwrap_err();
            assert!(err.is_self_decision());
        }
    }

    #[test]
    fn missing_capability_is_denied() {
        let item = pending_item(&actor(Role::Worker));
        let err = plan(&item, &actor(Role::Worker), &review(Decision::Approved), Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::PermissionDenied {
                reason: Denial::MissingCapability(Capability::ApproveReports),
                ..
            }
        ));

        let decided = apply(&item, &actor(Role::TeamLead), review(Decision::Approved));
        let err = plan(&decided, &actor(Role::TeamLead), &override_to(Decision::Rejected, "x"), Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::PermissionDenied {
                reason: Denial::MissingCapability(Capability::OverrideReports),
                ..
            }
        ));
    }

    #[test]
    fn admin_terminal_states_reject_everything() {
        let worker = actor(Role::Worker);
        let lead = actor(Role::TeamLead);
        let admin = actor(Role::ReportAdmin);
        let rejected = apply(&pending_item(&worker), &lead, review(Decision::Rejected));

        for verdict in [Decision::Approved, Decision::Rejected] {
            let terminal = apply(&rejected, &admin, override_to(verdict, "final"));
            assert!(terminal.state().is_admin_terminal());

            let attempts = [
                (lead.clone(), review(Decision::Approved)),
                (admin.clone(), override_to(Decision::Approved, "again")),
                (actor(Role::GeneralOverseer), override_to(Decision::Rejected, "again")),
                (worker.clone(), Action::Resubmit { notes: None }),
            ];
            for (who, action) in attempts {
                let err = plan(&terminal, &who, &action, Utc::now()).unwrap_err();
                assert!(
                    matches!(err, LifecycleError::InvalidTransition { .. }),
                    "{} by {} on {} gave {}",
                    action.verb(),
                    who.role,
                    terminal.state(),
                    err
                );
            }
        }
    }

    #[test]
    fn override_requires_a_team_lead_decision() {
        let item = pending_item(&actor(Role::Worker));
        let err = plan(&item, &actor(Role::ReportAdmin), &override_to(Decision::Approved, "skip"), Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                from: LifecycleState::Pending,
                action: "override"
            }
        ));
    }

    #[test]
    fn team_lead_cannot_decide_twice() {
        let worker = actor(Role::Worker);
        let decided = apply(&pending_item(&worker), &actor(Role::TeamLead), review(Decision::Approved));
        let err = plan(&decided, &actor(Role::TeamLead), &review(Decision::Rejected), Utc::now()).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[test]
    fn resubmission_starts_a_new_cycle() {
        let worker = actor(Role::Worker);
        let lead = actor(Role::TeamLead);
        let rejected = plan(
            &pending_item(&worker),
            &lead,
            &Action::TeamLeadDecision {
                decision: Decision::Rejected,
                reason: Some("  missing screenshots ".to_string()),
            },
            Utc::now(),
        )
        .unwrap()
        .item;
        assert_eq!(rejected.rejection_reason.as_deref(), Some("missing screenshots"));

        let t = plan(&rejected, &worker, &Action::Resubmit { notes: Some("added".to_string()) }, Utc::now()).unwrap();
        assert_eq!(t.to(), LifecycleState::Pending);
        assert_eq!(t.item.final_status, FinalStatus::Pending);
        assert_eq!(t.item.cycle, 2);
        assert_eq!(t.item.rejection_reason, None);
        assert_eq!(t.item.team_lead_reviewed_by, None);
        assert_eq!(t.audit.action, AuditAction::Resubmitted);
        assert!(t.notification.is_none());

        // back in the queue
        let again = plan(&t.item, &lead, &review(Decision::Approved), Utc::now()).unwrap();
        assert_eq!(again.item.final_status, FinalStatus::Approved);
    }

    #[test]
    fn only_owner_resubmits_and_only_after_rejection() {
        let worker = actor(Role::Worker);
        let lead = actor(Role::TeamLead);
        let item = pending_item(&worker);

        let err = plan(&item, &worker, &Action::Resubmit { notes: None }, Utc::now()).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));

        let rejected = apply(&item, &lead, review(Decision::Rejected));
        let err = plan(&rejected, &lead, &Action::Resubmit { notes: None }, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::PermissionDenied {
                reason: Denial::NotOwner,
                ..
            }
        ));

        let approved = apply(&item, &lead, review(Decision::Approved));
        let err = plan(&approved, &worker, &Action::Resubmit { notes: None }, Utc::now()).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[test]
    fn confirming_override_does_not_notify() {
        let worker = actor(Role::Worker);
        let approved = apply(&pending_item(&worker), &actor(Role::TeamLead), review(Decision::Approved));
        let t = plan(&approved, &actor(Role::ReportAdmin), &override_to(Decision::Approved, "ok"), Utc::now()).unwrap();
        assert_eq!(t.to(), LifecycleState::AdminApproved);
        assert!(!t.final_status_changed());
        assert!(t.notification.is_none());
    }

    #[test]
    fn action_deserializes_from_tagged_json() {
        let action: Action = serde_json::from_value(serde_json::json!({
            "action": "admin_override",
            "decision": "reject",
            "reason": "duplicate"
        }))
        .unwrap();
        assert_eq!(action.decision(), Some(Decision::Rejected));
        assert_eq!(action.verb(), "override");
    }
}
