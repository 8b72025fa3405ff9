use crate::application::{UnknownApplicationType, WebApplicationType};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_SUFFIXES: &[&str] = &[".bpmn20.xml", ".bpmn"];

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
    /// Explicit override of the detected web application type.
    pub web_application_type: Option<WebApplicationType>,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub deployment: DeploymentConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        // blank means unset so the host keeps its detected type
        let web_application_type = match env::var("APP_WEB_APPLICATION_TYPE") {
            Ok(raw) if !raw.trim().is_empty() => Some(raw.parse::<WebApplicationType>()?),
            _ => None,
        };

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            web_application_type,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            deployment: DeploymentConfig::from_env()?,
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

/// Where process models live on disk and how they are deployed at startup.
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    pub process_definition_location: PathBuf,
    pub process_definition_suffixes: Vec<String>,
    pub check_process_definitions: bool,
    pub deployment_name: String,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            process_definition_location: PathBuf::from("processes"),
            process_definition_suffixes: DEFAULT_SUFFIXES
                .iter()
                .map(|suffix| suffix.to_string())
                .collect(),
            check_process_definitions: true,
            deployment_name: "SpringAutoDeployment".to_string(),
        }
    }
}

impl DeploymentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(location) = env::var("APP_PROCESS_DEFINITION_LOCATION") {
            config.process_definition_location = PathBuf::from(location);
        }

        if let Ok(raw) = env::var("APP_PROCESS_DEFINITION_SUFFIXES") {
            let suffixes: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|suffix| !suffix.is_empty())
                .map(str::to_string)
                .collect();
            if !suffixes.is_empty() {
                config.process_definition_suffixes = suffixes;
            }
        }

        if let Ok(raw) = env::var("APP_CHECK_PROCESS_DEFINITIONS") {
            config.check_process_definitions = parse_flag(&raw)
                .ok_or(ConfigError::InvalidFlag("APP_CHECK_PROCESS_DEFINITIONS"))?;
        }

        if let Ok(name) = env::var("APP_DEPLOYMENT_NAME") {
            if !name.trim().is_empty() {
                config.deployment_name = name.trim().to_string();
            }
        }

        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidApplicationType(UnknownApplicationType),
    InvalidFlag(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidApplicationType(err) => {
                write!(f, "APP_WEB_APPLICATION_TYPE is invalid: {err}")
            }
            ConfigError::InvalidFlag(name) => write!(f, "{name} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidApplicationType(err) => Some(err),
            ConfigError::InvalidPort | ConfigError::InvalidFlag(_) => None,
        }
    }
}

impl From<UnknownApplicationType> for ConfigError {
    fn from(value: UnknownApplicationType) -> Self {
        Self::InvalidApplicationType(value)
    }
}
