//! Maps validated command-line arguments to the action the binary executes.

use crate::{
    api::context::DeploymentMode,
    cli::{
        actions::{server::Args, Action},
        commands::{ARG_LATENCY_MS, ARG_MODE, ARG_PORT, ARG_SERVER_URL},
    },
};
use anyhow::Result;
use std::time::Duration;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8099);
    let mode = matches
        .get_one::<DeploymentMode>(ARG_MODE)
        .copied()
        .unwrap_or_default();
    let latency = Duration::from_millis(
        matches
            .get_one::<u64>(ARG_LATENCY_MS)
            .copied()
            .unwrap_or(300),
    );
    let server_url = matches.get_one::<String>(ARG_SERVER_URL).cloned();

    Ok(Action::Server(Args {
        port,
        mode,
        latency,
        server_url,
    }))
}
