// GET /api/attention?kind=&min_level=&entity_id=&limit=

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};

use crate::attention::{AttentionFilter, AttentionSignal};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

pub async fn attention_list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    query: Result<Query<AttentionFilter>, QueryRejection>,
) -> ApiResult<Vec<AttentionSignal>> {
    let Query(filter) = query?;
    Ok(ApiResponse::success(state.service.attention_signals(&actor, filter).await?))
}
