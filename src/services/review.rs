use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::access::{can, Actor, Capability};
use crate::attention::{self, AttentionFilter, AttentionKind, AttentionSignal, SlaPolicy};
use crate::audit::{AuditFilter, AuditLogEntry};
use crate::config::AppConfig;
use crate::database::WorkItemStore;
use crate::lifecycle::{
    plan, Action, Decision, FinalStatus, LifecycleError, LifecycleState, NewWorkItem, WorkItem, WorkItemFilter,
};
use crate::observer::{ObserverPipeline, ObserverWarning, TransitionEvent};
use crate::payroll::{self, PayrollSummary, SalaryPeriod};

/// Workflow switches read from `AppConfig`
#[derive(Debug, Clone)]
pub struct ReviewSettings {
    pub require_rejection_reason: bool,
    pub default_hourly_rate: Decimal,
}

impl ReviewSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            require_rejection_reason: config.workflow.require_rejection_reason,
            default_hourly_rate: config.payroll.default_hourly_rate,
        }
    }
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            require_rejection_reason: false,
            default_hourly_rate: Decimal::from(10),
        }
    }
}

/// Committed transition as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub item: WorkItem,
    pub audit: AuditLogEntry,
    /// Post-commit observer problems; the transition stands regardless
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ObserverWarning>,
}

/// Entry point for every read and write of work items.
///
/// Writes follow one path: load, plan, conditional write of item and audit
/// entry, then the observer pipeline. A lost version race is re-planned once
/// against the fresh state.
pub struct ReviewService {
    store: Arc<dyn WorkItemStore>,
    pipeline: Arc<ObserverPipeline>,
    settings: ReviewSettings,
}

impl ReviewService {
    pub fn new(store: Arc<dyn WorkItemStore>, pipeline: Arc<ObserverPipeline>, settings: ReviewSettings) -> Self {
        Self {
            store,
            pipeline,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn WorkItemStore> {
        &self.store
    }

    pub fn settings(&self) -> &ReviewSettings {
        &self.settings
    }

    fn require(actor: &Actor, capability: Capability) -> Result<(), LifecycleError> {
        if can(actor, capability) {
            Ok(())
        } else {
            Err(LifecycleError::missing(actor.id, capability))
        }
    }

    fn sees_others_work(actor: &Actor) -> bool {
        can(actor, Capability::ViewTeamWork) || can(actor, Capability::ViewAllWork)
    }

    async fn load(&self, id: Uuid) -> Result<WorkItem, LifecycleError> {
        self.store
            .get_item(id)
            .await?
            .ok_or_else(|| LifecycleError::work_item_not_found(id))
    }

    /// Record the caller's role and profile so payroll and lookups can find it
    pub async fn sync_actor(&self, actor: &Actor) -> Result<(), LifecycleError> {
        let mut actor = actor.clone();
        actor.profile.hourly_rate = actor.profile.hourly_rate.map(|rate| rate.round_dp(payroll::MONEY_SCALE));
        self.store.upsert_actor(&actor).await?;
        Ok(())
    }

    pub async fn submit(&self, actor: &Actor, new: NewWorkItem) -> Result<WorkItem, LifecycleError> {
        Self::require(actor, Capability::SubmitWork)?;
        new.validate().map_err(LifecycleError::Validation)?;

        let item = WorkItem::submit(actor.id, new, Utc::now());
        self.sync_actor(actor).await?;
        self.store.insert_item(&item).await?;

        info!(
            work_item = %item.id,
            owner = %actor.id,
            "{} submitted ({}h on {})",
            item.kind.label(),
            item.hours,
            item.work_date
        );
        Ok(item)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<WorkItem, LifecycleError> {
        let item = self.load(id).await?;
        if item.is_owned_by(actor.id) || Self::sees_others_work(actor) {
            Ok(item)
        } else {
            Err(LifecycleError::missing(actor.id, Capability::ViewTeamWork))
        }
    }

    /// Actors without team or global visibility only ever see their own items
    pub async fn list(&self, actor: &Actor, mut filter: WorkItemFilter) -> Result<Vec<WorkItem>, LifecycleError> {
        if !Self::sees_others_work(actor) {
            Self::require(actor, Capability::ViewOwnWork)?;
            filter.owner_id = Some(actor.id);
        }
        Ok(self.store.list_items(&filter).await?)
    }

    pub async fn review(
        &self,
        actor: &Actor,
        id: Uuid,
        decision: Decision,
        reason: Option<String>,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.transition(actor, id, Action::TeamLeadDecision { decision, reason }).await
    }

    pub async fn override_decision(
        &self,
        actor: &Actor,
        id: Uuid,
        decision: Decision,
        reason: Option<String>,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.transition(actor, id, Action::AdminOverride { decision, reason }).await
    }

    pub async fn resubmit(
        &self,
        actor: &Actor,
        id: Uuid,
        notes: Option<String>,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.transition(actor, id, Action::Resubmit { notes }).await
    }

    fn check_reason(&self, action: &Action) -> Result<(), LifecycleError> {
        if !self.settings.require_rejection_reason {
            return Ok(());
        }
        let reason = match action {
            Action::TeamLeadDecision { decision, reason } | Action::AdminOverride { decision, reason }
                if decision.is_rejection() =>
            {
                reason
            }
            _ => return Ok(()),
        };
        if reason.as_deref().map_or(true, |r| r.trim().is_empty()) {
            return Err(LifecycleError::Validation("a reason is required when rejecting".to_string()));
        }
        Ok(())
    }

    pub async fn transition(
        &self,
        actor: &Actor,
        id: Uuid,
        action: Action,
    ) -> Result<TransitionOutcome, LifecycleError> {
        for attempt in 0..2 {
            let item = self.load(id).await?;
            let now = Utc::now();

            let transition = match plan(&item, actor, &action, now) {
                Ok(transition) => transition,
                Err(err) => {
                    if err.is_self_decision() {
                        self.flag_self_decision(&item, actor, &action, now).await;
                    }
                    warn!(
                        work_item = %id,
                        actor = %actor.id,
                        role = %actor.role,
                        "{} refused: {}",
                        action.verb(),
                        err
                    );
                    return Err(err);
                }
            };
            // Guards first: a missing reason never masks a denial or a bad state
            self.check_reason(&action)?;

            let applied = self
                .store
                .apply_transition(transition.expected_version, &transition.item, &transition.audit)
                .await?;

            if !applied {
                debug!(
                    work_item = %id,
                    "Version {} is stale (attempt {}), re-reading",
                    transition.expected_version,
                    attempt + 1
                );
                continue;
            }

            info!(
                work_item = %id,
                actor = %actor.id,
                "{} {} -> {} (final_status {})",
                transition.audit.action,
                transition.from,
                transition.to(),
                transition.item.final_status
            );

            let event = TransitionEvent::committed(transition);
            let report = self.pipeline.run(&event).await;

            return Ok(TransitionOutcome {
                item: event.item,
                audit: event.audit,
                warnings: report.warnings,
            });
        }

        let current = self.load(id).await?;
        Err(LifecycleError::InvalidTransition {
            from: current.state(),
            action: action.verb(),
        })
    }

    async fn flag_self_decision(&self, item: &WorkItem, actor: &Actor, action: &Action, now: DateTime<Utc>) {
        let signal = AttentionSignal::self_approval_attempt(item, actor.id, action, now);
        if let Err(e) = self.store.record_signals(std::slice::from_ref(&signal)).await {
            error!("Failed to record attention signal for {}: {}", item.id, e);
        }
    }

    /// Audit entries, for audit viewers or for the owner of the referenced entity
    pub async fn audit_trail(&self, actor: &Actor, filter: AuditFilter) -> Result<Vec<AuditLogEntry>, LifecycleError> {
        if !can(actor, Capability::ViewAuditLogs) {
            let owns_entity = match filter.entity_id {
                Some(entity_id) => self.load(entity_id).await?.is_owned_by(actor.id),
                None => false,
            };
            if !owns_entity {
                return Err(LifecycleError::missing(actor.id, Capability::ViewAuditLogs));
            }
        }
        Ok(self.store.list_audit(&filter).await?)
    }

    pub async fn attention_signals(
        &self,
        actor: &Actor,
        filter: AttentionFilter,
    ) -> Result<Vec<AttentionSignal>, LifecycleError> {
        Self::require(actor, Capability::ViewAttentionSignals)?;
        Ok(self.store.list_signals(&filter).await?)
    }

    pub async fn payroll(&self, actor: &Actor, period: SalaryPeriod) -> Result<PayrollSummary, LifecycleError> {
        Self::require(actor, Capability::ViewPayroll)?;

        let items = self
            .store
            .list_items(&WorkItemFilter {
                final_status: Some(FinalStatus::Approved),
                work_date_from: Some(period.start),
                work_date_to: Some(period.end),
                ..Default::default()
            })
            .await?;

        let owners: Vec<Uuid> = items
            .iter()
            .map(|item| item.owner_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let rates = self.store.hourly_rates(&owners).await?;

        Ok(payroll::aggregate(&items, period, &rates, self.settings.default_hourly_rate))
    }

    /// Raise and store SLA signals for pending items that waited too long
    pub async fn sla_scan(&self, now: DateTime<Utc>, policy: SlaPolicy) -> Result<Vec<AttentionSignal>, LifecycleError> {
        let pending = self
            .store
            .list_items(&WorkItemFilter {
                state: Some(LifecycleState::Pending),
                ..Default::default()
            })
            .await?;
        let existing = self
            .store
            .list_signals(&AttentionFilter {
                kind: Some(AttentionKind::SlaBreach),
                ..Default::default()
            })
            .await?;

        let signals = attention::scan(&pending, &existing, now, policy);
        self.store.record_signals(&signals).await?;
        Ok(signals)
    }
}
