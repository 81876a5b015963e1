use crate::{
    api::{self, ApiConfig, AppContext, DeploymentMode},
    cli::telemetry,
};
use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub mode: DeploymentMode,
    pub latency: Duration,
    pub server_url: Option<String>,
}

impl Args {
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new()
            .with_mode(self.mode)
            .with_latency(self.latency)
            .with_server_url(self.server_url.clone())
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    info!(
        port = args.port,
        mode = %args.mode,
        latency_ms = u64::try_from(args.latency.as_millis()).unwrap_or(u64::MAX),
        server_url = args.server_url.as_deref().unwrap_or("-"),
        "Starting diary-auth"
    );

    if args.mode.is_development() {
        warn!("Development mode: error details are included in logs and 500 responses");
    }

    // The seeded in-memory directory lives as long as the server.
    let ctx = AppContext::in_memory(args.api_config());

    let result = api::new(args.port, ctx).await;

    telemetry::shutdown_tracer();

    result
}
