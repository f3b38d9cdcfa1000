// PostgreSQL schema for the review core. Applied by `workforce db init`.
//
// The CHECK constraints on work_items repeat the self-decision guard at the
// storage layer, and the audit_log trigger keeps the log append-only.

use sqlx::PgPool;

use super::manager::DatabaseError;

pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS actors (
        id UUID PRIMARY KEY,
        role TEXT NOT NULL,
        display_name TEXT,
        is_investor BOOLEAN NOT NULL DEFAULT FALSE,
        hourly_rate NUMERIC(12, 2),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS work_items (
        id UUID PRIMARY KEY,
        kind TEXT NOT NULL CHECK (kind IN ('task', 'work_report')),
        owner_id UUID NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        platform TEXT,
        hours NUMERIC(5, 2) NOT NULL CHECK (hours > 0 AND hours <= 24),
        work_date DATE NOT NULL,
        team_lead_status TEXT CHECK (team_lead_status IN ('pending', 'approved', 'rejected')),
        team_lead_reviewed_by UUID,
        team_lead_reviewed_at TIMESTAMPTZ,
        rejection_reason TEXT,
        admin_status TEXT CHECK (admin_status IN ('approved', 'rejected')),
        admin_override_by UUID,
        admin_override_at TIMESTAMPTZ,
        admin_override_reason TEXT,
        final_status TEXT NOT NULL CHECK (final_status IN ('pending', 'approved', 'rejected')),
        cycle INTEGER NOT NULL DEFAULT 1,
        version BIGINT NOT NULL DEFAULT 1,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL,
        CHECK (team_lead_reviewed_by IS NULL OR team_lead_reviewed_by <> owner_id),
        CHECK (admin_override_by IS NULL OR admin_override_by <> owner_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS work_items_owner_idx ON work_items (owner_id)",
    "CREATE INDEX IF NOT EXISTS work_items_final_status_date_idx ON work_items (final_status, work_date)",
    r#"
    CREATE TABLE IF NOT EXISTS audit_log (
        id UUID PRIMARY KEY,
        entity_type TEXT NOT NULL,
        entity_id UUID NOT NULL,
        action TEXT NOT NULL,
        performed_by UUID NOT NULL,
        performed_at TIMESTAMPTZ NOT NULL,
        previous_values JSONB NOT NULL,
        new_values JSONB NOT NULL,
        notes TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS audit_log_entity_idx ON audit_log (entity_type, entity_id)",
    r#"
    CREATE OR REPLACE FUNCTION audit_log_append_only() RETURNS trigger AS $$
    BEGIN
        RAISE EXCEPTION 'audit_log is append-only';
    END;
    $$ LANGUAGE plpgsql
    "#,
    "DROP TRIGGER IF EXISTS audit_log_append_only ON audit_log",
    r#"
    CREATE TRIGGER audit_log_append_only
        BEFORE UPDATE OR DELETE ON audit_log
        FOR EACH ROW EXECUTE FUNCTION audit_log_append_only()
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attention_signals (
        id UUID PRIMARY KEY,
        kind TEXT NOT NULL,
        level TEXT NOT NULL,
        actor_id UUID,
        entity_type TEXT NOT NULL,
        entity_id UUID NOT NULL,
        message TEXT NOT NULL,
        raised_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS attention_signals_entity_idx ON attention_signals (entity_id)",
];

/// Create tables, indexes and triggers if they do not exist
pub async fn apply(pool: &PgPool) -> Result<usize, DatabaseError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("Applied {} schema statements", SCHEMA.len());
    Ok(SCHEMA.len())
}
