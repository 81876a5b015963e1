use crate::directory::{InMemoryDirectory, UserDirectory};
use std::{fmt, str::FromStr, sync::Arc, time::Duration};

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(300);

/// Controls how much error detail leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentMode {
    /// Error details (cause chain) are logged, and added to 500 response bodies.
    Development,
    #[default]
    Production,
}

impl DeploymentMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("invalid deployment mode: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    mode: DeploymentMode,
    latency: Duration,
    server_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: DeploymentMode::Production,
            latency: DEFAULT_LATENCY,
            server_url: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: DeploymentMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub fn with_server_url(mut self, server_url: Option<String>) -> Self {
        self.server_url = server_url;
        self
    }

    #[must_use]
    pub const fn mode(&self) -> DeploymentMode {
        self.mode
    }

    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }

    #[must_use]
    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }
}

/// Everything the routes need, created once at startup and handed to
/// [`crate::api::router`].
#[derive(Debug, Clone)]
pub struct AppContext {
    config: ApiConfig,
    directory: Arc<dyn UserDirectory>,
}

impl AppContext {
    #[must_use]
    pub fn new(config: ApiConfig, directory: Arc<dyn UserDirectory>) -> Self {
        Self { config, directory }
    }

    /// Context backed by the seeded in-memory directory.
    #[must_use]
    pub fn in_memory(config: ApiConfig) -> Self {
        Self::new(config, Arc::new(InMemoryDirectory::seeded()))
    }

    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }
}
