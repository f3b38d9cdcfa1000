mod common;

use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use common::{actor, date, report, TestApp};
use workforce_api::access::{Actor, Role};
use workforce_api::attention::{AttentionFilter, AttentionKind, AttentionLevel, AttentionSignal};
use workforce_api::audit::{AuditAction, AuditFilter, AuditLogEntry};
use workforce_api::database::{DatabaseError, MemoryStore, WorkItemStore};
use workforce_api::lifecycle::{
    plan, Action, Decision, FinalStatus, LifecycleError, LifecycleState, WorkItem, WorkItemFilter,
};
use workforce_api::notify::{Notification, NotificationDispatcher, NotifyError};
use workforce_api::observer::ObserverPipeline;
use workforce_api::services::{ReviewService, ReviewSettings};

#[tokio::test]
async fn team_lead_approval_notifies_the_owner() -> Result<()> {
    let app = TestApp::new();
    let worker = actor(Role::Worker);
    let lead = actor(Role::TeamLead);

    let item = app.service().submit(&worker, report(6, date(2026, 3, 2))).await?;
    assert_eq!(item.state(), LifecycleState::Pending);
    assert_eq!(app.store.audit_len().await, 0);

    let outcome = app.service().review(&lead, item.id, Decision::Approved, None).await?;
    assert_eq!(outcome.item.state(), LifecycleState::TeamLeadApproved);
    assert_eq!(outcome.item.final_status, FinalStatus::Approved);
    assert_eq!(outcome.audit.action, AuditAction::TeamLeadApproved);
    assert_eq!(outcome.audit.performed_by, lead.id);
    assert!(outcome.warnings.is_empty());

    assert_eq!(app.store.audit_len().await, 1);
    let sent = app.dispatcher.sent_to(worker.id);
    assert_eq!(sent.len(), 1);
    assert_eq!(app.dispatcher.sent().len(), 1);
    Ok(())
}

#[tokio::test]
async fn admin_override_records_the_reason() -> Result<()> {
    let app = TestApp::new();
    let worker = actor(Role::Worker);
    let lead = actor(Role::TeamLead);
    let admin = actor(Role::ReportAdmin);

    let item = app.service().submit(&worker, report(6, date(2026, 3, 2))).await?;
    app.service().review(&lead, item.id, Decision::Approved, None).await?;

    let outcome = app
        .service()
        .override_decision(&admin, item.id, Decision::Rejected, Some("insufficient evidence".to_string()))
        .await?;
    assert_eq!(outcome.item.state(), LifecycleState::AdminRejected);
    assert_eq!(outcome.item.final_status, FinalStatus::Rejected);
    assert_eq!(outcome.item.admin_override_reason.as_deref(), Some("insufficient evidence"));

    let trail = app
        .service()
        .audit_trail(&admin, AuditFilter::for_entity(item.kind, item.id))
        .await?;
    assert_eq!(trail.len(), 2);
    let override_entry = trail
        .iter()
        .find(|e| e.action == AuditAction::AdminRejected)
        .expect("override entry");
    assert_eq!(override_entry.notes.as_deref(), Some("insufficient evidence"));
    assert_eq!(override_entry.performed_by, admin.id);

    // approved -> rejected is a final status change, so the owner hears twice
    assert_eq!(app.dispatcher.sent_to(worker.id).len(), 2);
    Ok(())
}

#[tokio::test]
async fn self_approval_is_refused_and_flagged() -> Result<()> {
    let app = TestApp::new();
    let overseer = actor(Role::GeneralOverseer);
    let item = app.service().submit(&overseer, report(3, date(2026, 3, 2))).await?;

    let err = app
        .service()
        .review(&overseer, item.id, Decision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::PermissionDenied { .. }));
    assert!(err.is_self_decision());

    let unchanged = app.service().get(&overseer, item.id).await?;
    assert_eq!(unchanged, item);
    assert_eq!(app.store.audit_len().await, 0);
    assert!(app.dispatcher.sent().is_empty());

    let signals = app
        .service()
        .attention_signals(&overseer, AttentionFilter::default())
        .await?;
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].kind, AttentionKind::SelfApprovalAttempt);
    assert_eq!(signals[0].level, AttentionLevel::ReviewRequired);
    assert_eq!(signals[0].entity_id, item.id);
    assert_eq!(signals[0].actor_id, Some(overseer.id));
    Ok(())
}

#[tokio::test]
async fn workers_cannot_approve_their_own_work_either() -> Result<()> {
    let app = TestApp::new();
    let worker = actor(Role::Worker);
    let item = app.service().submit(&worker, report(3, date(2026, 3, 2))).await?;

    let err = app
        .service()
        .review(&worker, item.id, Decision::Approved, None)
        .await
        .unwrap_err();
    assert!(err.is_self_decision());
    Ok(())
}

#[tokio::test]
async fn required_reasons_never_mask_guard_failures() -> Result<()> {
    let app = TestApp::with_settings(ReviewSettings {
        require_rejection_reason: true,
        ..Default::default()
    });
    let lead = actor(Role::TeamLead);
    let item = app.service().submit(&lead, report(4, date(2026, 3, 2))).await?;

    let err = app
        .service()
        .review(&lead, item.id, Decision::Rejected, None)
        .await
        .unwrap_err();
    assert!(err.is_self_decision(), "{:?}", err);

    let err = app
        .service()
        .review(&actor(Role::Worker), item.id, Decision::Rejected, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::PermissionDenied { .. }), "{:?}", err);

    let err = app
        .service()
        .review(&actor(Role::TeamLead), Uuid::new_v4(), Decision::Rejected, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound { .. }), "{:?}", err);

    let signals = app
        .service()
        .attention_signals(&actor(Role::GeneralOverseer), AttentionFilter::default())
        .await?;
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].kind, AttentionKind::SelfApprovalAttempt);

    // a legitimate reviewer still needs the reason
    let err = app
        .service()
        .review(&actor(Role::TeamLead), item.id, Decision::Rejected, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(_)), "{:?}", err);
    assert_eq!(app.store.audit_len().await, 0);
    Ok(())
}

#[tokio::test]
async fn admin_decisions_are_terminal() -> Result<()> {
    let app = TestApp::new();
    let worker = actor(Role::Worker);
    let lead = actor(Role::TeamLead);
    let admin = actor(Role::ReportAdmin);

    let item = app.service().submit(&worker, report(5, date(2026, 3, 2))).await?;
    app.service().review(&lead, item.id, Decision::Rejected, Some("blurry".into())).await?;
    app.service()
        .override_decision(&admin, item.id, Decision::Approved, None)
        .await?;

    let attempts = [
        app.service().review(&lead, item.id, Decision::Rejected, None).await,
        app.service().override_decision(&admin, item.id, Decision::Rejected, None).await,
        app.service().resubmit(&worker, item.id, None).await,
    ];
    for attempt in attempts {
        assert!(matches!(
            attempt,
            Err(LifecycleError::InvalidTransition {
                from: LifecycleState::AdminApproved,
                ..
            })
        ));
    }
    assert_eq!(app.store.audit_len().await, 2);
    Ok(())
}

#[tokio::test]
async fn override_needs_a_team_lead_decision_first() -> Result<()> {
    let app = TestApp::new();
    let worker = actor(Role::Worker);
    let admin = actor(Role::ReportAdmin);
    let item = app.service().submit(&worker, report(5, date(2026, 3, 2))).await?;

    let err = app
        .service()
        .override_decision(&admin, item.id, Decision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    Ok(())
}

#[tokio::test]
async fn resubmission_starts_a_new_cycle() -> Result<()> {
    let app = TestApp::new();
    let worker = actor(Role::Worker);
    let lead = actor(Role::TeamLead);

    let item = app.service().submit(&worker, report(5, date(2026, 3, 2))).await?;
    app.service()
        .review(&lead, item.id, Decision::Rejected, Some("no screenshots".into()))
        .await?;

    let err = app.service().resubmit(&lead, item.id, None).await.unwrap_err();
    assert!(matches!(err, LifecycleError::PermissionDenied { .. }));

    let outcome = app
        .service()
        .resubmit(&worker, item.id, Some("screenshots attached".into()))
        .await?;
    assert_eq!(outcome.item.state(), LifecycleState::Pending);
    assert_eq!(outcome.item.final_status, FinalStatus::Pending);
    assert_eq!(outcome.item.cycle, item.cycle + 1);
    assert!(outcome.item.rejection_reason.is_none());
    assert_eq!(outcome.audit.action, AuditAction::Resubmitted);

    let again = app.service().review(&lead, item.id, Decision::Approved, None).await?;
    assert_eq!(again.item.final_status, FinalStatus::Approved);
    assert_eq!(app.store.audit_len().await, 3);
    Ok(())
}

/// Store that lets a second reviewer win the race on the first write
struct RacingStore {
    inner: MemoryStore,
    rival: Mutex<Option<Actor>>,
    always_stale: bool,
}

impl RacingStore {
    fn new(rival: Option<Actor>, always_stale: bool) -> Self {
        Self {
            inner: MemoryStore::new(),
            rival: Mutex::new(rival),
            always_stale,
        }
    }
}

#[async_trait]
impl WorkItemStore for RacingStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.inner.ping().await
    }

    async fn insert_item(&self, item: &WorkItem) -> Result<(), DatabaseError> {
        self.inner.insert_item(item).await
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<WorkItem>, DatabaseError> {
        self.inner.get_item(id).await
    }

    async fn list_items(&self, filter: &WorkItemFilter) -> Result<Vec<WorkItem>, DatabaseError> {
        self.inner.list_items(filter).await
    }

    async fn apply_transition(
        &self,
        expected_version: i64,
        item: &WorkItem,
        audit: &AuditLogEntry,
    ) -> Result<bool, DatabaseError> {
        if self.always_stale {
            return Ok(false);
        }
        let rival = self.rival.lock().unwrap().take();
        if let Some(rival) = rival {
            let current = self.inner.get_item(item.id).await?.expect("item exists");
            let action = Action::TeamLeadDecision {
                decision: Decision::Rejected,
                reason: Some("duplicate".to_string()),
            };
            let won = plan(&current, &rival, &action, Utc::now()).expect("rival plan");
            assert!(
                self.inner
                    .apply_transition(won.expected_version, &won.item, &won.audit)
                    .await?
            );
        }
        self.inner.apply_transition(expected_version, item, audit).await
    }

    async fn list_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>, DatabaseError> {
        self.inner.list_audit(filter).await
    }

    async fn upsert_actor(&self, actor: &Actor) -> Result<(), DatabaseError> {
        self.inner.upsert_actor(actor).await
    }

    async fn get_actor(&self, id: Uuid) -> Result<Option<Actor>, DatabaseError> {
        self.inner.get_actor(id).await
    }

    async fn hourly_rates(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Decimal>, DatabaseError> {
        self.inner.hourly_rates(ids).await
    }

    async fn record_signals(&self, signals: &[AttentionSignal]) -> Result<(), DatabaseError> {
        self.inner.record_signals(signals).await
    }

    async fn list_signals(&self, filter: &AttentionFilter) -> Result<Vec<AttentionSignal>, DatabaseError> {
        self.inner.list_signals(filter).await
    }
}

#[tokio::test]
async fn losing_a_decision_race_is_an_invalid_transition() -> Result<()> {
    let rival = actor(Role::TeamLead);
    let store = Arc::new(RacingStore::new(Some(rival.clone()), false));
    let service = ReviewService::new(store.clone(), Arc::new(ObserverPipeline::new()), ReviewSettings::default());

    let worker = actor(Role::Worker);
    let lead = actor(Role::TeamLead);
    let item = service.submit(&worker, report(4, date(2026, 3, 2))).await?;

    let err = service
        .review(&lead, item.id, Decision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::InvalidTransition {
            from: LifecycleState::TeamLeadRejected,
            ..
        }
    ));

    let current = service.get(&worker, item.id).await?;
    assert_eq!(current.team_lead_reviewed_by, Some(rival.id));
    assert_eq!(store.inner.audit_len().await, 1);
    Ok(())
}

#[tokio::test]
async fn repeated_version_conflicts_give_up_after_one_retry() -> Result<()> {
    let store = Arc::new(RacingStore::new(None, true));
    let service = ReviewService::new(store.clone(), Arc::new(ObserverPipeline::new()), ReviewSettings::default());

    let worker = actor(Role::Worker);
    let item = service.submit(&worker, report(4, date(2026, 3, 2))).await?;

    let err = service
        .review(&actor(Role::TeamLead), item.id, Decision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::InvalidTransition {
            from: LifecycleState::Pending,
            ..
        }
    ));
    assert_eq!(store.inner.audit_len().await, 0);
    Ok(())
}

struct BrokenDispatcher;

#[async_trait]
impl NotificationDispatcher for BrokenDispatcher {
    async fn dispatch(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("smtp relay refused".to_string()))
    }
}

struct StalledDispatcher;

#[async_trait]
impl NotificationDispatcher for StalledDispatcher {
    async fn dispatch(&self, _notification: Notification) -> Result<(), NotifyError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

async fn approve_with(dispatcher: Arc<dyn NotificationDispatcher>) -> Result<Vec<String>> {
    let store = Arc::new(MemoryStore::new());
    let state = workforce_api::server::AppState::assemble(
        store.clone(),
        dispatcher,
        ReviewSettings::default(),
        Duration::from_millis(200),
    );
    let worker = actor(Role::Worker);
    let item = state.service.submit(&worker, report(4, date(2026, 3, 2))).await?;

    let outcome = state
        .service
        .review(&actor(Role::TeamLead), item.id, Decision::Approved, None)
        .await?;
    assert_eq!(outcome.item.final_status, FinalStatus::Approved);

    let stored = store.get_item(item.id).await?.expect("stored");
    assert_eq!(stored.state(), LifecycleState::TeamLeadApproved);
    assert_eq!(store.audit_len().await, 1);

    Ok(outcome.warnings.into_iter().map(|w| w.observer).collect())
}

#[tokio::test]
async fn failing_notifications_do_not_undo_the_transition() -> Result<()> {
    let warned = approve_with(Arc::new(BrokenDispatcher)).await?;
    assert_eq!(warned, vec!["NotifyOwner".to_string()]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn slow_notifications_time_out_into_warnings() -> Result<()> {
    let warned = approve_with(Arc::new(StalledDispatcher)).await?;
    assert_eq!(warned, vec!["NotifyOwner".to_string()]);
    Ok(())
}

#[tokio::test]
async fn sla_scan_escalates_once_per_level() -> Result<()> {
    let app = TestApp::new();
    let worker = actor(Role::Worker);
    let head = actor(Role::DepartmentHead);
    let item = app.service().submit(&worker, report(4, date(2026, 3, 2))).await?;
    let policy = workforce_api::attention::SlaPolicy::new(48);

    assert!(app.service().sla_scan(item.updated_at, policy).await?.is_empty());

    let late = item.updated_at + chrono::Duration::hours(50);
    let raised = app.service().sla_scan(late, policy).await?;
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].level, AttentionLevel::ReviewRequired);
    assert!(app.service().sla_scan(late, policy).await?.is_empty());

    let very_late = item.updated_at + chrono::Duration::hours(97);
    let raised = app.service().sla_scan(very_late, policy).await?;
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].level, AttentionLevel::Critical);

    let all = app
        .service()
        .attention_signals(&head, AttentionFilter::default())
        .await?;
    assert_eq!(all.len(), 2);
    Ok(())
}

#[tokio::test]
async fn payroll_counts_approved_hours_inside_the_period() -> Result<()> {
    let app = TestApp::new();
    let lead = actor(Role::TeamLead);
    let finance = actor(Role::FinanceAdmin);
    let mut alice = actor(Role::Worker);
    alice.profile.hourly_rate = Some(Decimal::from(12));
    let bob = actor(Role::Worker);

    let approved = app.service().submit(&alice, report(6, date(2026, 3, 2))).await?;
    let outside = app.service().submit(&alice, report(8, date(2026, 4, 2))).await?;
    let rejected = app.service().submit(&bob, report(5, date(2026, 3, 3))).await?;
    let _pending = app.service().submit(&bob, report(7, date(2026, 3, 4))).await?;
    let bob_approved = app.service().submit(&bob, report(3, date(2026, 3, 5))).await?;

    for id in [approved.id, outside.id, bob_approved.id] {
        app.service().review(&lead, id, Decision::Approved, None).await?;
    }
    app.service().review(&lead, rejected.id, Decision::Rejected, None).await?;

    let period = workforce_api::payroll::SalaryPeriod::new(date(2026, 3, 1), date(2026, 3, 31)).unwrap();

    let denied = app.service().payroll(&lead, period).await.unwrap_err();
    assert!(matches!(denied, LifecycleError::PermissionDenied { .. }));

    let summary = app.service().payroll(&finance, period).await?;
    assert_eq!(summary.lines.len(), 2);
    assert_eq!(summary.total_hours, Decimal::from(9));
    // alice at her own rate, bob at the default of 10
    assert_eq!(summary.total_gross, Decimal::from(6 * 12 + 3 * 10));

    let alice_line = summary.lines.iter().find(|l| l.user_id == alice.id).expect("alice");
    assert_eq!(alice_line.hourly_rate, Decimal::from(12));
    assert_eq!(alice_line.approved_items, 1);
    Ok(())
}
