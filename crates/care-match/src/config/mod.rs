use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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

        let matching = MatchingConfig {
            provider_page_size: page_size_var(
                "APP_PROVIDER_PAGE_SIZE",
                MatchingConfig::DEFAULT_PROVIDER_PAGE_SIZE,
            )?,
            request_page_size: page_size_var(
                "APP_REQUEST_PAGE_SIZE",
                MatchingConfig::DEFAULT_REQUEST_PAGE_SIZE,
            )?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            matching,
        })
    }
}

fn page_size_var(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => {
            let parsed = raw
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidPageSize { name })?;
            if parsed == 0 {
                return Err(ConfigError::InvalidPageSize { name });
            }
            Ok(parsed)
        }
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

/// Page-size policy for the matching workflow. Provider search pages hold 9
/// listings; request lists hold 5 entries. Both are fixed contracts unless
/// the caller overrides the size explicitly.
#[derive(Debug, Clone, Copy)]
pub struct MatchingConfig {
    pub provider_page_size: usize,
    pub request_page_size: usize,
}

impl MatchingConfig {
    pub const DEFAULT_PROVIDER_PAGE_SIZE: usize = 9;
    pub const DEFAULT_REQUEST_PAGE_SIZE: usize = 5;
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            provider_page_size: Self::DEFAULT_PROVIDER_PAGE_SIZE,
            request_page_size: Self::DEFAULT_REQUEST_PAGE_SIZE,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPageSize { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPageSize { name } => {
                write!(f, "{name} must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidPageSize { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
