use std::env;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, PoisonError, RwLock};

use crate::semester::{Semester, SemesterParseError};

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
    pub chapter: Properties,
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

        let semester = env::var("APP_SEMESTER")
            .unwrap_or_else(|_| "20253".to_string())
            .parse::<Semester>()
            .map_err(|source| ConfigError::InvalidSemester { source })?;
        let coursesurveys_active = env::var("APP_SURVEYS_ACTIVE")
            .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            chapter: Properties {
                semester,
                coursesurveys_active,
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

/// Chapter-wide runtime properties: the current semester and whether survey
/// collection is active. Initialized once from the environment; the lazily
/// created singleton row this replaces is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Properties {
    pub semester: Semester,
    pub coursesurveys_active: bool,
}

/// Shared handle to the chapter properties, passed to the components that
/// need the current semester or the surveys flag.
#[derive(Debug, Clone)]
pub struct PropertiesHandle {
    inner: Arc<RwLock<Properties>>,
}

impl PropertiesHandle {
    pub fn new(properties: Properties) -> Self {
        Self {
            inner: Arc::new(RwLock::new(properties)),
        }
    }

    pub fn get(&self) -> Properties {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn semester(&self) -> Semester {
        self.get().semester
    }

    pub fn set_coursesurveys_active(&self, active: bool) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .coursesurveys_active = active;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("APP_SEMESTER must be a 5-digit semester code")]
    InvalidSemester {
        #[source]
        source: SemesterParseError,
    },
}
