// Router assembly and shared application state

use axum::http::HeaderValue;
use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseManager, MemoryStore, PgStore, WorkItemStore};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::notify::{DisabledDispatcher, EventBus, LogDispatcher, NotificationDispatcher};
use crate::observer::ObserverPipeline;
use crate::services::{ReviewService, ReviewSettings};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewService>,
    pub bus: EventBus,
}

impl AppState {
    pub fn new(service: Arc<ReviewService>, bus: EventBus) -> Self {
        Self { service, bus }
    }

    /// Wire store, observers and service together
    pub fn assemble(
        store: Arc<dyn WorkItemStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        settings: ReviewSettings,
        observer_timeout: Duration,
    ) -> Self {
        let bus = EventBus::default();
        let pipeline = ObserverPipeline::standard(bus.clone(), dispatcher).with_max_timeout(observer_timeout);
        let service = ReviewService::new(store, Arc::new(pipeline), settings);
        Self::new(Arc::new(service), bus)
    }

    /// Build the state described by `config`, connecting to PostgreSQL if selected
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn WorkItemStore> = match config.database.backend {
            StoreBackend::Postgres => {
                let pool = DatabaseManager::pool().await?;
                Arc::new(PgStore::new(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let dispatcher: Arc<dyn NotificationDispatcher> = if config.notifications.enabled {
            Arc::new(LogDispatcher)
        } else {
            Arc::new(DisabledDispatcher)
        };

        Ok(Self::assemble(
            store,
            dispatcher,
            ReviewSettings::from_config(config),
            Duration::from_millis(config.notifications.observer_timeout_ms),
        ))
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(protected_routes())
        .with_state(state)
        // Global middleware
        .layer(cors_layer(crate::config::config()))
        .layer(TraceLayer::new_for_http())
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(protected::me))
        .route("/api/items", get(protected::items_list).post(protected::items_create))
        .route("/api/items/:id", get(protected::items_show))
        .route("/api/items/:id/review", post(protected::items_review))
        .route("/api/items/:id/override", post(protected::items_override))
        .route("/api/items/:id/resubmit", post(protected::items_resubmit))
        .route("/api/audit", get(protected::audit_list))
        .route("/api/attention", get(protected::attention_list))
        .route("/api/payroll", get(protected::payroll_summary))
        .route("/api/events", get(protected::events_stream))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let security = &config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        if !crate::is_production!() {
            return CorsLayer::permissive();
        }
        tracing::warn!("Wildcard CORS origin ignored in production");
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter(|o| *o != "*")
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
