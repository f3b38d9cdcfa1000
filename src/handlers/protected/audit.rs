// GET /api/audit?entity_type=&entity_id=&performed_by=&limit=

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};

use crate::audit::{AuditFilter, AuditLogEntry};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

pub async fn audit_list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    query: Result<Query<AuditFilter>, QueryRejection>,
) -> ApiResult<Vec<AuditLogEntry>> {
    let Query(filter) = query?;
    Ok(ApiResponse::success(state.service.audit_trail(&actor, filter).await?))
}
