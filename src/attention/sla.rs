use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::{AttentionKind, AttentionLevel, AttentionSignal};
use crate::lifecycle::WorkItem;

/// How long a work item may wait for a team-lead decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaPolicy {
    pub review_hours: i64,
}

impl SlaPolicy {
    pub fn new(review_hours: i64) -> Self {
        Self {
            review_hours: review_hours.max(1),
        }
    }

    /// Breach level for an item that has been waiting `waited`
    pub fn level_for(&self, waited: Duration) -> Option<AttentionLevel> {
        let limit = Duration::hours(self.review_hours);
        if waited >= limit * 2 {
            Some(AttentionLevel::Critical)
        } else if waited >= limit {
            Some(AttentionLevel::ReviewRequired)
        } else {
            None
        }
    }
}

/// Pending items past their review window, minus those already signalled at
/// the same or a higher level during the current pending cycle.
pub fn scan(
    items: &[WorkItem],
    existing: &[AttentionSignal],
    now: DateTime<Utc>,
    policy: SlaPolicy,
) -> Vec<AttentionSignal> {
    items
        .iter()
        .filter(|item| item.state().awaits_team_lead())
        .filter_map(|item| {
            // updated_at marks the start of the current pending cycle
            let waiting_since = item.updated_at;
            let level = policy.level_for(now - waiting_since)?;

            let already = existing.iter().any(|s| {
                s.kind == AttentionKind::SlaBreach
                    && s.entity_id == item.id
                    && s.raised_at >= waiting_since
                    && s.level >= level
            });
            if already {
                return None;
            }

            Some(AttentionSignal {
                id: Uuid::new_v4(),
                kind: AttentionKind::SlaBreach,
                level,
                actor_id: None,
                entity_type: item.kind,
                entity_id: item.id,
                message: format!(
                    "{} \"{}\" has waited {}h for a team-lead decision (limit {}h)",
                    item.kind.label(),
                    item.title,
                    (now - waiting_since).num_hours(),
                    policy.review_hours
                ),
                raised_at: now,
            })
        })
        .collect()
}
