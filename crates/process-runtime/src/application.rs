//! Host application lifecycle signals consumed by the runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the hosting application serves traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebApplicationType {
    /// Blocking request/response web server.
    Servlet,
    /// Non-blocking web server.
    Reactive,
    /// No embedded web server; batch jobs and CLI commands.
    None,
}

impl WebApplicationType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Servlet => "servlet",
            Self::Reactive => "reactive",
            Self::None => "none",
        }
    }

    pub fn is_servlet(self) -> bool {
        matches!(self, Self::Servlet)
    }
}

impl fmt::Display for WebApplicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown web application type '{0}' (expected servlet, reactive or none)")]
pub struct UnknownApplicationType(pub String);

impl FromStr for WebApplicationType {
    type Err = UnknownApplicationType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "servlet" | "web" => Ok(Self::Servlet),
            "reactive" => Ok(Self::Reactive),
            "none" => Ok(Self::None),
            other => Err(UnknownApplicationType(other.to_string())),
        }
    }
}

/// Raised once the host finished starting and is ready to accept work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationReadyEvent {
    web_application_type: WebApplicationType,
    ready_at: DateTime<Utc>,
}

impl ApplicationReadyEvent {
    pub fn new(web_application_type: WebApplicationType) -> Self {
        Self {
            web_application_type,
            ready_at: Utc::now(),
        }
    }

    pub fn web_application_type(&self) -> WebApplicationType {
        self.web_application_type
    }

    pub fn ready_at(&self) -> DateTime<Utc> {
        self.ready_at
    }
}
