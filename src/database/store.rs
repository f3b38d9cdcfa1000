use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use super::manager::DatabaseError;
use crate::access::Actor;
use crate::attention::{AttentionFilter, AttentionSignal};
use crate::audit::{AuditFilter, AuditLogEntry};
use crate::lifecycle::{WorkItem, WorkItemFilter};

/// Persistence contract of the review core.
///
/// `apply_transition` is the only way a work item changes after creation: it
/// writes the new item state and appends the audit entry together, and only
/// if the stored version still equals `expected_version`.
#[async_trait]
pub trait WorkItemStore: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn insert_item(&self, item: &WorkItem) -> Result<(), DatabaseError>;

    async fn get_item(&self, id: Uuid) -> Result<Option<WorkItem>, DatabaseError>;

    async fn list_items(&self, filter: &WorkItemFilter) -> Result<Vec<WorkItem>, DatabaseError>;

    /// Returns `false` without writing anything when the version moved on
    async fn apply_transition(
        &self,
        expected_version: i64,
        item: &WorkItem,
        audit: &AuditLogEntry,
    ) -> Result<bool, DatabaseError>;

    async fn list_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>, DatabaseError>;

    async fn upsert_actor(&self, actor: &Actor) -> Result<(), DatabaseError>;

    async fn get_actor(&self, id: Uuid) -> Result<Option<Actor>, DatabaseError>;

    /// Hourly rates for the given actors; actors without a rate are omitted
    async fn hourly_rates(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Decimal>, DatabaseError>;

    async fn record_signals(&self, signals: &[AttentionSignal]) -> Result<(), DatabaseError>;

    async fn list_signals(&self, filter: &AttentionFilter) -> Result<Vec<AttentionSignal>, DatabaseError>;
}
