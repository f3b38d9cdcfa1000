use std::time::Duration;
use tracing_subscriber::EnvFilter;

use workforce_api::attention::SlaPolicy;
use workforce_api::config;
use workforce_api::database::DatabaseManager;
use workforce_api::server::{app, AppState};
use workforce_api::services::sla_monitor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("workforce_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Workforce API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("SECURITY_JWT_SECRET must be set outside development");
    }
    if workforce_api::is_development!() {
        tracing::warn!("Development defaults in use, including the JWT secret");
    }

    let state = AppState::from_config(config).await?;

    let _sla = sla_monitor::spawn(
        state.service.clone(),
        SlaPolicy::new(config.workflow.sla_review_hours),
        Duration::from_secs(config.workflow.sla_scan_interval_secs),
    );

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Workforce API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    DatabaseManager::close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
