// handlers/public/mod.rs - endpoints without authentication

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::server::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Workforce API",
            "version": version,
            "description": "Role-gated review lifecycle for tasks and work reports",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "me": "/api/me (protected)",
                "items": "/api/items[/:id[/review|/override|/resubmit]] (protected)",
                "audit": "/api/audit (protected)",
                "attention": "/api/attention (protected)",
                "payroll": "/api/payroll?start=&end= (protected)",
                "events": "/api/events (protected, server-sent events)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.service.store().ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
