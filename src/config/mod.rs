use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub workflow: WorkflowConfig,
    pub payroll: PayrollConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Which `WorkItemStore` the server runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub backend: StoreBackend,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Team-lead rejections and admin overrides to rejected need a reason
    pub require_rejection_reason: bool,
    /// Pending items older than this raise an SLA signal
    pub sla_review_hours: i64,
    /// 0 disables the background SLA scan
    pub sla_scan_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollConfig {
    pub default_hourly_rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub observer_timeout_ms: u64,
}

fn override_from_env<T: FromStr>(key: &str, slot: &mut T) {
    if let Ok(v) = env::var(key) {
        match v.parse() {
            Ok(parsed) => *slot = parsed,
            Err(_) => tracing::warn!("Ignoring unparseable {}={}", key, v),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        override_from_env("STORE_BACKEND", &mut self.database.backend);
        override_from_env("DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections);
        override_from_env("DATABASE_CONNECTION_TIMEOUT", &mut self.database.connection_timeout);

        // API overrides
        override_from_env("PORT", &mut self.api.port);
        override_from_env("WORKFORCE_API_PORT", &mut self.api.port);

        // Security overrides
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        override_from_env("SECURITY_JWT_EXPIRY_HOURS", &mut self.security.jwt_expiry_hours);
        override_from_env("SECURITY_ENABLE_CORS", &mut self.security.enable_cors);
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Workflow overrides
        override_from_env("WORKFLOW_REQUIRE_REJECTION_REASON", &mut self.workflow.require_rejection_reason);
        override_from_env("WORKFLOW_SLA_REVIEW_HOURS", &mut self.workflow.sla_review_hours);
        override_from_env("WORKFLOW_SLA_SCAN_INTERVAL_SECS", &mut self.workflow.sla_scan_interval_secs);

        override_from_env("PAYROLL_DEFAULT_HOURLY_RATE", &mut self.payroll.default_hourly_rate);

        override_from_env("NOTIFICATIONS_ENABLED", &mut self.notifications.enabled);
        override_from_env("NOTIFICATIONS_OBSERVER_TIMEOUT_MS", &mut self.notifications.observer_timeout_ms);

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                backend: StoreBackend::Memory,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig { port: 9001 },
            security: SecurityConfig {
                jwt_secret: "workforce-development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            workflow: WorkflowConfig {
                require_rejection_reason: false,
                sla_review_hours: 48,
                sla_scan_interval_secs: 300,
            },
            payroll: PayrollConfig {
                default_hourly_rate: Decimal::from(10),
            },
            notifications: NotificationConfig {
                enabled: true,
                observer_timeout_ms: 2000,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                backend: StoreBackend::Postgres,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig { port: 9001 },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            workflow: WorkflowConfig {
                require_rejection_reason: true,
                sla_review_hours: 48,
                sla_scan_interval_secs: 300,
            },
            payroll: PayrollConfig {
                default_hourly_rate: Decimal::from(10),
            },
            notifications: NotificationConfig {
                enabled: true,
                observer_timeout_ms: 1000,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                backend: StoreBackend::Postgres,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig { port: 9001 },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            workflow: WorkflowConfig {
                require_rejection_reason: true,
                sla_review_hours: 24,
                sla_scan_interval_secs: 300,
            },
            payroll: PayrollConfig {
                default_hourly_rate: Decimal::from(10),
            },
            notifications: NotificationConfig {
                enabled: true,
                observer_timeout_ms: 500,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

// Helper macros for common checks
#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
