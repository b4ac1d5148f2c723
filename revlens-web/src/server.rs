//! Main web server implementation using Axum

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main Revlens web server
pub struct RevlensServer {
    config: WebConfig,
    state: AppState,
}

impl RevlensServer {
    /// Create a new server
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!(address = %address, "Starting Revlens web server");

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).await {
            error!(error = %e, "Server error");
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for RevlensServer
pub struct RevlensServerBuilder {
    config: WebConfig,
}

impl RevlensServerBuilder {
    /// Create a new server builder from environment defaults
    pub fn new() -> Self {
        Self {
            config: WebConfig::from_env(),
        }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database_url = database_url.into();
        self
    }

    /// Set the engine workspace root
    pub fn workspace_root<P: Into<std::path::PathBuf>>(mut self, workspace_root: P) -> Self {
        self.config.workspace_root = workspace_root.into();
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<RevlensServer> {
        RevlensServer::new(self.config).await
    }
}

impl Default for RevlensServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_config_fields() {
        let builder = RevlensServerBuilder::new()
            .host("localhost")
            .port(4000)
            .database_url("sqlite::memory:")
            .workspace_root("/tmp/revlens-test");

        assert_eq!(builder.config.host, "localhost");
        assert_eq!(builder.config.port, 4000);
        assert_eq!(builder.config.database_url, "sqlite::memory:");
    }

    #[tokio::test]
    async fn server_creation_succeeds_with_in_memory_database() {
        let scratch = tempfile::tempdir().unwrap();
        let server = RevlensServerBuilder::new()
            .database_url("sqlite::memory:")
            .workspace_root(scratch.path())
            .build()
            .await;
        assert!(server.is_ok());
    }
}
