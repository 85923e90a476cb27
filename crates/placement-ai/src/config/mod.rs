use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::matching::MatchPolicy;

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
    pub matching: MatchingConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            matching: MatchingConfig::load()?,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Deployment-tunable matching cutoffs. The defaults mirror the observed
/// production values; individual installs override them via environment.
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    pub coverage_floor: f32,
    pub suggestion_cutoff: u8,
    pub notification_cutoff: u8,
}

impl MatchingConfig {
    fn load() -> Result<Self, ConfigError> {
        let defaults = MatchPolicy::default();

        let coverage_floor = match env::var("APP_COVERAGE_FLOOR") {
            Ok(raw) => raw
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|value| (0.0..=1.0).contains(value))
                .ok_or(ConfigError::InvalidCutoff {
                    name: "APP_COVERAGE_FLOOR",
                })?,
            Err(_) => defaults.coverage_floor,
        };

        let suggestion_cutoff = parse_cutoff("APP_SUGGESTION_CUTOFF", defaults.suggestion_cutoff)?;
        let notification_cutoff =
            parse_cutoff("APP_NOTIFICATION_CUTOFF", defaults.notification_cutoff)?;

        Ok(Self {
            coverage_floor,
            suggestion_cutoff,
            notification_cutoff,
        })
    }

    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy {
            coverage_floor: self.coverage_floor,
            suggestion_cutoff: self.suggestion_cutoff,
            notification_cutoff: self.notification_cutoff,
            ..MatchPolicy::default()
        }
    }
}

fn parse_cutoff(name: &'static str, default: u8) -> Result<u8, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|value| *value <= 100)
            .ok_or(ConfigError::InvalidCutoff { name }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCutoff { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCutoff { name } => {
                write!(f, "{name} must be a score bound within its valid range")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidCutoff { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
