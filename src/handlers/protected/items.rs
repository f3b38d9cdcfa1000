// /api/items - submission, listing and lifecycle transitions

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::lifecycle::{Decision, FinalStatus, LifecycleState, NewWorkItem, WorkItem, WorkItemFilter, WorkItemKind};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::services::TransitionOutcome;

#[derive(Debug, Default, Deserialize)]
pub struct ItemQuery {
    pub owner_id: Option<Uuid>,
    pub kind: Option<WorkItemKind>,
    pub final_status: Option<FinalStatus>,
    pub state: Option<LifecycleState>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl From<ItemQuery> for WorkItemFilter {
    fn from(q: ItemQuery) -> Self {
        WorkItemFilter {
            owner_id: q.owner_id,
            kind: q.kind,
            final_status: q.final_status,
            state: q.state,
            work_date_from: q.from,
            work_date_to: q.to,
            limit: q.limit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DecisionBody {
    pub decision: Decision,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResubmitBody {
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn items_list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    query: Result<Query<ItemQuery>, QueryRejection>,
) -> ApiResult<Vec<WorkItem>> {
    let Query(query) = query?;
    let items = state.service.list(&actor, query.into()).await?;
    Ok(ApiResponse::success(items))
}

pub async fn items_create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    body: Result<Json<NewWorkItem>, JsonRejection>,
) -> ApiResult<WorkItem> {
    let Json(new) = body?;
    let item = state.service.submit(&actor, new).await?;
    Ok(ApiResponse::created(item))
}

pub async fn items_show(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<WorkItem> {
    let Path(id) = id?;
    Ok(ApiResponse::success(state.service.get(&actor, id).await?))
}

pub async fn items_review(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<DecisionBody>, JsonRejection>,
) -> ApiResult<TransitionOutcome> {
    let Path(id) = id?;
    let Json(body) = body?;
    let outcome = state.service.review(&actor, id, body.decision, body.reason).await?;
    Ok(ApiResponse::success(outcome))
}

pub async fn items_override(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<DecisionBody>, JsonRejection>,
) -> ApiResult<TransitionOutcome> {
    let Path(id) = id?;
    let Json(body) = body?;
    let outcome = state
        .service
        .override_decision(&actor, id, body.decision, body.reason)
        .await?;
    Ok(ApiResponse::success(outcome))
}

pub async fn items_resubmit(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<ResubmitBody>, JsonRejection>,
) -> ApiResult<TransitionOutcome> {
    let Path(id) = id?;
    let Json(body) = body?;
    let outcome = state.service.resubmit(&actor, id, body.notes).await?;
    Ok(ApiResponse::success(outcome))
}
