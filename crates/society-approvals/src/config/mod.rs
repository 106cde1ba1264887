use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::approvals::EventPermissionFlow;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub workflow: WorkflowConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let event_permission_flow = match env::var("APP_EVENT_PERMISSION_FLOW") {
            Ok(raw) => EventPermissionFlow::parse(&raw)
                .ok_or(ConfigError::InvalidEventPermissionFlow { value: raw })?,
            Err(_) => EventPermissionFlow::default(),
        };
        let student_service_email = env::var("APP_STUDENT_SERVICE_EMAIL")
            .unwrap_or_else(|_| WorkflowConfig::DEFAULT_STUDENT_SERVICE_EMAIL.to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            workflow: WorkflowConfig {
                event_permission_flow,
                student_service_email,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for the approval workflow itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Stage plan used for event-permission requests.
    pub event_permission_flow: EventPermissionFlow,
    /// Mailbox that receives a copy of every new submission.
    pub student_service_email: String,
}

impl WorkflowConfig {
    pub const DEFAULT_STUDENT_SERVICE_EMAIL: &'static str = "studentservice@university.local";
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            event_permission_flow: EventPermissionFlow::default(),
            student_service_email: Self::DEFAULT_STUDENT_SERVICE_EMAIL.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidEventPermissionFlow { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidEventPermissionFlow { value } => write!(
                f,
                "APP_EVENT_PERMISSION_FLOW must be 'ar_only' or 'ar_then_vc' (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidEventPermissionFlow { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
