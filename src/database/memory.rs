use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::store::WorkItemStore;
use crate::access::Actor;
use crate::attention::{AttentionFilter, AttentionSignal};
use crate::audit::{AuditFilter, AuditLogEntry};
use crate::lifecycle::{WorkItem, WorkItemFilter};

#[derive(Default)]
struct MemoryState {
    items: HashMap<Uuid, WorkItem>,
    audit: Vec<AuditLogEntry>,
    actors: HashMap<Uuid, Actor>,
    signals: Vec<AttentionSignal>,
}

/// Process-local store for tests and development without PostgreSQL
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn audit_len(&self) -> usize {
        self.state.read().await.audit.len()
    }
}

fn take<T>(iter: impl Iterator<Item = T>, limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}

#[async_trait]
impl WorkItemStore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_item(&self, item: &WorkItem) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if state.items.contains_key(&item.id) {
            return Err(DatabaseError::QueryError(format!("work item {} already exists", item.id)));
        }
        state.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<WorkItem>, DatabaseError> {
        Ok(self.state.read().await.items.get(&id).cloned())
    }

    async fn list_items(&self, filter: &WorkItemFilter) -> Result<Vec<WorkItem>, DatabaseError> {
        let state = self.state.read().await;
        let mut items: Vec<WorkItem> = state.items.values().filter(|i| filter.matches(i)).cloned().collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(take(items.into_iter(), filter.limit))
    }

    async fn apply_transition(
        &self,
        expected_version: i64,
        item: &WorkItem,
        audit: &AuditLogEntry,
    ) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        let current = state
            .items
            .get_mut(&item.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("work item {}", item.id)))?;

        if current.version != expected_version {
            return Ok(false);
        }
        *current = item.clone();
        state.audit.push(audit.clone());
        Ok(true)
    }

    async fn list_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>, DatabaseError> {
        let state = self.state.read().await;
        Ok(take(
            state.audit.iter().filter(|e| filter.matches(e)).cloned(),
            filter.limit,
        ))
    }

    async fn upsert_actor(&self, actor: &Actor) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        let mut next = actor.clone();
        // Tokens carry no rate; keep what was stored before
        if let Some(existing) = state.actors.get(&actor.id) {
            next.profile.hourly_rate = next.profile.hourly_rate.or(existing.profile.hourly_rate);
            next.profile.display_name = next.profile.display_name.or_else(|| existing.profile.display_name.clone());
        }
        state.actors.insert(actor.id, next);
        Ok(())
    }

    async fn get_actor(&self, id: Uuid) -> Result<Option<Actor>, DatabaseError> {
        Ok(self.state.read().await.actors.get(&id).cloned())
    }

    async fn hourly_rates(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Decimal>, DatabaseError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                let rate = state.actors.get(id)?.profile.hourly_rate?;
                Some((*id, rate))
            })
            .collect())
    }

    async fn record_signals(&self, signals: &[AttentionSignal]) -> Result<(), DatabaseError> {
        self.state.write().await.signals.extend_from_slice(signals);
        Ok(())
    }

    async fn list_signals(&self, filter: &AttentionFilter) -> Result<Vec<AttentionSignal>, DatabaseError> {
        let state = self.state.read().await;
        // newest first
        Ok(take(
            state.signals.iter().rev().filter(|s| filter.matches(s)).cloned(),
            filter.limit,
        ))
    }
}
