pub mod server;

mod run;

/// What the binary does after argument parsing.
#[derive(Debug)]
pub enum Action {
    /// Serve the auth API on the configured port until shutdown.
    Server(server::Args),
}

impl Action {
    /// Run the action to completion.
    /// # Errors
    /// Returns an error if the server cannot bind or stops with an error.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
