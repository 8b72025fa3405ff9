use crate::config::ConfigError;
use crate::deployment::DeploymentError;
use crate::events::DeploymentEventError;
use crate::model::ConversionError;
use crate::repository::RepositoryError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Repository(RepositoryError),
    Conversion(ConversionError),
    Deployment(DeploymentError),
    DeployedEvents(DeploymentEventError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Repository(err) => write!(f, "repository error: {}", err),
            AppError::Conversion(err) => write!(f, "conversion error: {}", err),
            AppError::Deployment(err) => write!(f, "deployment error: {}", err),
            AppError::DeployedEvents(err) => write!(f, "deployed event delivery failed: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Conversion(err) => Some(err),
            AppError::Deployment(err) => Some(err),
            AppError::DeployedEvents(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Repository(_)
            | AppError::Conversion(_)
            | AppError::Deployment(_)
            | AppError::DeployedEvents(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<ConversionError> for AppError {
    fn from(value: ConversionError) -> Self {
        Self::Conversion(value)
    }
}

impl From<DeploymentError> for AppError {
    fn from(value: DeploymentError) -> Self {
        Self::Deployment(value)
    }
}

impl From<DeploymentEventError> for AppError {
    fn from(value: DeploymentEventError) -> Self {
        Self::DeployedEvents(value)
    }
}
