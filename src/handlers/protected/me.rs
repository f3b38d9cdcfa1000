// GET /api/me - the caller as the capability resolver sees it

use axum::extract::State;
use serde::Serialize;

use crate::access::{effective_capabilities, viewable_routes, Actor, CapabilitySet, Route};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct Me {
    pub actor: Actor,
    pub capabilities: CapabilitySet,
    pub routes: Vec<Route>,
}

pub async fn me(State(state): State<AppState>, AuthUser(actor): AuthUser) -> ApiResult<Me> {
    state.service.sync_actor(&actor).await?;

    Ok(ApiResponse::success(Me {
        capabilities: effective_capabilities(&actor),
        routes: viewable_routes(&actor),
        actor,
    }))
}
