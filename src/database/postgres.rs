use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, warn};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::store::WorkItemStore;
use crate::access::{Actor, Profile, Role};
use crate::attention::{AttentionFilter, AttentionLevel, AttentionSignal};
use crate::audit::{AuditFilter, AuditLogEntry};
use crate::lifecycle::{LifecycleState, WorkItem, WorkItemFilter};

/// PostgreSQL-backed store. Status enums are stored as their text forms.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse<T>(column: &str, value: &str) -> Result<T, DatabaseError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e: T::Err| DatabaseError::Decode(format!("{}: {}", column, e)))
}

fn parse_opt<T>(column: &str, value: Option<String>) -> Result<Option<T>, DatabaseError>
where
    T: FromStr,
    T::Err: Display,
{
    value.map(|v| parse(column, &v)).transpose()
}

#[derive(FromRow)]
struct WorkItemRow {
    id: Uuid,
    kind: String,
    owner_id: Uuid,
    title: String,
    description: Option<String>,
    platform: Option<String>,
    hours: Decimal,
    work_date: NaiveDate,
    team_lead_status: Option<String>,
    team_lead_reviewed_by: Option<Uuid>,
    team_lead_reviewed_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    admin_status: Option<String>,
    admin_override_by: Option<Uuid>,
    admin_override_at: Option<DateTime<Utc>>,
    admin_override_reason: Option<String>,
    final_status: String,
    cycle: i32,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WorkItemRow> for WorkItem {
    type Error = DatabaseError;

    fn try_from(row: WorkItemRow) -> Result<Self, Self::Error> {
        let mut item = WorkItem {
            id: row.id,
            kind: parse("kind", &row.kind)?,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            platform: row.platform,
            hours: row.hours,
            work_date: row.work_date,
            team_lead_status: parse_opt("team_lead_status", row.team_lead_status)?,
            team_lead_reviewed_by: row.team_lead_reviewed_by,
            team_lead_reviewed_at: row.team_lead_reviewed_at,
            rejection_reason: row.rejection_reason,
            admin_status: parse_opt("admin_status", row.admin_status)?,
            admin_override_by: row.admin_override_by,
            admin_override_at: row.admin_override_at,
            admin_override_reason: row.admin_override_reason,
            final_status: parse("final_status", &row.final_status)?,
            cycle: row.cycle,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        let derived = item.derived_final_status();
        if derived != item.final_status {
            warn!(
                "Work item {} stored final_status={} but decisions derive {}",
                item.id, item.final_status, derived
            );
            item.final_status = derived;
        }
        Ok(item)
    }
}

#[derive(FromRow)]
struct AuditRow {
    id: Uuid,
    entity_type: String,
    entity_id: Uuid,
    action: String,
    performed_by: Uuid,
    performed_at: DateTime<Utc>,
    previous_values: Value,
    new_values: Value,
    notes: Option<String>,
}

impl TryFrom<AuditRow> for AuditLogEntry {
    type Error = DatabaseError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(AuditLogEntry {
            id: row.id,
            entity_type: parse("entity_type", &row.entity_type)?,
            entity_id: row.entity_id,
            action: parse("action", &row.action)?,
            performed_by: row.performed_by,
            performed_at: row.performed_at,
            previous_values: row.previous_values,
            new_values: row.new_values,
            notes: row.notes,
        })
    }
}

#[derive(FromRow)]
struct ActorRow {
    id: Uuid,
    role: String,
    display_name: Option<String>,
    is_investor: bool,
    hourly_rate: Option<Decimal>,
}

impl TryFrom<ActorRow> for Actor {
    type Error = DatabaseError;

    fn try_from(row: ActorRow) -> Result<Self, Self::Error> {
        let role: Role = parse("role", &row.role)?;
        Ok(Actor::new(row.id, role).with_profile(Profile {
            is_investor: row.is_investor,
            display_name: row.display_name,
            hourly_rate: row.hourly_rate,
        }))
    }
}

#[derive(FromRow)]
struct SignalRow {
    id: Uuid,
    kind: String,
    level: String,
    actor_id: Option<Uuid>,
    entity_type: String,
    entity_id: Uuid,
    message: String,
    raised_at: DateTime<Utc>,
}

impl TryFrom<SignalRow> for AttentionSignal {
    type Error = DatabaseError;

    fn try_from(row: SignalRow) -> Result<Self, Self::Error> {
        Ok(AttentionSignal {
            id: row.id,
            kind: parse("kind", &row.kind)?,
            level: parse("level", &row.level)?,
            actor_id: row.actor_id,
            entity_type: parse("entity_type", &row.entity_type)?,
            entity_id: row.entity_id,
            message: row.message,
            raised_at: row.raised_at,
        })
    }
}

/// Lifecycle state is derived, so filter on the decision columns that imply it
fn push_state_condition(qb: &mut QueryBuilder<'_, Postgres>, state: LifecycleState) {
    let condition = match state {
        LifecycleState::Pending => {
            " AND admin_status IS NULL AND (team_lead_status IS NULL OR team_lead_status = 'pending')"
        }
        LifecycleState::TeamLeadApproved => " AND admin_status IS NULL AND team_lead_status = 'approved'",
        LifecycleState::TeamLeadRejected => " AND admin_status IS NULL AND team_lead_status = 'rejected'",
        LifecycleState::AdminApproved => " AND admin_status = 'approved'",
        LifecycleState::AdminRejected => " AND admin_status = 'rejected'",
    };
    qb.push(condition);
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn push_limit(qb: &mut QueryBuilder<'_, Postgres>, limit: Option<usize>) {
    if let Some(limit) = limit {
        qb.push(" LIMIT ").push_bind(sql_limit(limit));
    }
}

#[async_trait]
impl WorkItemStore for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_item(&self, item: &WorkItem) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO work_items (
                id, kind, owner_id, title, description, platform, hours, work_date,
                team_lead_status, team_lead_reviewed_by, team_lead_reviewed_at, rejection_reason,
                admin_status, admin_override_by, admin_override_at, admin_override_reason,
                final_status, cycle, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
            "#,
        )
        .bind(item.id)
        .bind(item.kind.as_str())
        .bind(item.owner_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.platform)
        .bind(item.hours)
        .bind(item.work_date)
        .bind(item.team_lead_status.map(|s| s.as_str()))
        .bind(item.team_lead_reviewed_by)
        .bind(item.team_lead_reviewed_at)
        .bind(&item.rejection_reason)
        .bind(item.admin_status.map(|s| s.as_str()))
        .bind(item.admin_override_by)
        .bind(item.admin_override_at)
        .bind(&item.admin_override_reason)
        .bind(item.final_status.as_str())
        .bind(item.cycle)
        .bind(item.version)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        debug!("Inserted work item {} ({})", item.id, item.kind);
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<WorkItem>, DatabaseError> {
        let row: Option<WorkItemRow> = sqlx::query_as("SELECT * FROM work_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(WorkItem::try_from).transpose()
    }

    async fn list_items(&self, filter: &WorkItemFilter) -> Result<Vec<WorkItem>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM work_items WHERE TRUE");
        if let Some(owner_id) = filter.owner_id {
            qb.push(" AND owner_id = ").push_bind(owner_id);
        }
        if let Some(kind) = filter.kind {
            qb.push(" AND kind = ").push_bind(kind.as_str());
        }
        if let Some(final_status) = filter.final_status {
            qb.push(" AND final_status = ").push_bind(final_status.as_str());
        }
        if let Some(state) = filter.state {
            push_state_condition(&mut qb, state);
        }
        if let Some(from) = filter.work_date_from {
            qb.push(" AND work_date >= ").push_bind(from);
        }
        if let Some(to) = filter.work_date_to {
            qb.push(" AND work_date <= ").push_bind(to);
        }
        qb.push(" ORDER BY created_at, id");
        push_limit(&mut qb, filter.limit);

        let rows: Vec<WorkItemRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(WorkItem::try_from).collect()
    }

    async fn apply_transition(
        &self,
        expected_version: i64,
        item: &WorkItem,
        audit: &AuditLogEntry,
    ) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE work_items SET
                team_lead_status = $1,
                team_lead_reviewed_by = $2,
                team_lead_reviewed_at = $3,
                rejection_reason = $4,
                admin_status = $5,
                admin_override_by = $6,
                admin_override_at = $7,
                admin_override_reason = $8,
                final_status = $9,
                cycle = $10,
                version = $11,
                updated_at = $12
            WHERE id = $13 AND version = $14
            "#,
        )
        .bind(item.team_lead_status.map(|s| s.as_str()))
        .bind(item.team_lead_reviewed_by)
        .bind(item.team_lead_reviewed_at)
        .bind(&item.rejection_reason)
        .bind(item.admin_status.map(|s| s.as_str()))
        .bind(item.admin_override_by)
        .bind(item.admin_override_at)
        .bind(&item.admin_override_reason)
        .bind(item.final_status.as_str())
        .bind(item.cycle)
        .bind(item.version)
        .bind(item.updated_at)
        .bind(item.id)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            debug!("Work item {} moved past version {}", item.id, expected_version);
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO audit_log (
                id, entity_type, entity_id, action, performed_by, performed_at,
                previous_values, new_values, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(audit.id)
        .bind(audit.entity_type.as_str())
        .bind(audit.entity_id)
        .bind(audit.action.as_str())
        .bind(audit.performed_by)
        .bind(audit.performed_at)
        .bind(&audit.previous_values)
        .bind(&audit.new_values)
        .bind(&audit.notes)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn list_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM audit_log WHERE TRUE");
        if let Some(entity_type) = filter.entity_type {
            qb.push(" AND entity_type = ").push_bind(entity_type.as_str());
        }
        if let Some(entity_id) = filter.entity_id {
            qb.push(" AND entity_id = ").push_bind(entity_id);
        }
        if let Some(performed_by) = filter.performed_by {
            qb.push(" AND performed_by = ").push_bind(performed_by);
        }
        qb.push(" ORDER BY performed_at, id");
        push_limit(&mut qb, filter.limit);

        let rows: Vec<AuditRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }

    async fn upsert_actor(&self, actor: &Actor) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO actors (id, role, display_name, is_investor, hourly_rate)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                role = EXCLUDED.role,
                display_name = COALESCE(EXCLUDED.display_name, actors.display_name),
                is_investor = EXCLUDED.is_investor,
                hourly_rate = COALESCE(EXCLUDED.hourly_rate, actors.hourly_rate),
                updated_at = now()
            "#,
        )
        .bind(actor.id)
        .bind(actor.role.as_str())
        .bind(&actor.profile.display_name)
        .bind(actor.profile.is_investor)
        .bind(actor.profile.hourly_rate)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_actor(&self, id: Uuid) -> Result<Option<Actor>, DatabaseError> {
        let row: Option<ActorRow> = sqlx::query_as(
            "SELECT id, role, display_name, is_investor, hourly_rate FROM actors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Actor::try_from).transpose()
    }

    async fn hourly_rates(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Decimal>, DatabaseError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, Decimal)> = sqlx::query_as(
            "SELECT id, hourly_rate FROM actors WHERE id = ANY($1) AND hourly_rate IS NOT NULL",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn record_signals(&self, signals: &[AttentionSignal]) -> Result<(), DatabaseError> {
        if signals.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for signal in signals {
            sqlx::query(
                r#"
                INSERT INTO attention_signals (
                    id, kind, level, actor_id, entity_type, entity_id, message, raised_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(signal.id)
            .bind(signal.kind.as_str())
            .bind(signal.level.as_str())
            .bind(signal.actor_id)
            .bind(signal.entity_type.as_str())
            .bind(signal.entity_id)
            .bind(&signal.message)
            .bind(signal.raised_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_signals(&self, filter: &AttentionFilter) -> Result<Vec<AttentionSignal>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM attention_signals WHERE TRUE");
        if let Some(kind) = filter.kind {
            qb.push(" AND kind = ").push_bind(kind.as_str());
        }
        if let Some(min_level) = filter.min_level {
            let levels: Vec<String> = [AttentionLevel::Info, AttentionLevel::ReviewRequired, AttentionLevel::Critical]
                .into_iter()
                .filter(|level| *level >= min_level)
                .map(|level| level.as_str().to_string())
                .collect();
            qb.push(" AND level = ANY(").push_bind(levels).push(")");
        }
        if let Some(entity_id) = filter.entity_id {
            qb.push(" AND entity_id = ").push_bind(entity_id);
        }
        qb.push(" ORDER BY raised_at DESC, id");
        push_limit(&mut qb, filter.limit);

        let rows: Vec<SignalRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(AttentionSignal::try_from).collect()
    }
}
