#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use workforce_api::access::{Actor, Role};
use workforce_api::auth::{generate_jwt, Claims};
use workforce_api::database::{MemoryStore, WorkItemStore};
use workforce_api::lifecycle::{NewWorkItem, WorkItemKind};
use workforce_api::notify::{NotificationDispatcher, RecordingDispatcher};
use workforce_api::server::{app, AppState};
use workforce_api::services::{ReviewService, ReviewSettings};

/// In-process application over a `MemoryStore`, with every notification recorded
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub dispatcher: Arc<RecordingDispatcher>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(ReviewSettings::default())
    }

    pub fn with_settings(settings: ReviewSettings) -> Self {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let state = AppState::assemble(
            store.clone() as Arc<dyn WorkItemStore>,
            dispatcher.clone() as Arc<dyn NotificationDispatcher>,
            settings,
            Duration::from_millis(500),
        );
        Self {
            router: app(state.clone()),
            state,
            store,
            dispatcher,
        }
    }

    pub fn service(&self) -> &ReviewService {
        &self.state.service
    }

    /// Send one request through the router; returns status and parsed JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await.context("router failed")?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }
}

pub fn actor(role: Role) -> Actor {
    Actor::new(Uuid::new_v4(), role)
}

/// Bearer token for `actor`, signed with the configured secret
pub fn token_for(actor: &Actor) -> String {
    let claims = Claims::with_expiry(
        actor.id,
        actor.role,
        actor.profile.is_investor,
        actor.profile.display_name.clone(),
        1,
    );
    generate_jwt(&claims).expect("test token")
}

pub fn report(hours: i64, work_date: NaiveDate) -> NewWorkItem {
    NewWorkItem {
        kind: WorkItemKind::WorkReport,
        title: "Data labelling".to_string(),
        description: Some("Batch 14".to_string()),
        platform: Some("Upwork".to_string()),
        hours: Decimal::from(hours),
        work_date,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
