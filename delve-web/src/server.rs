//! Delve Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use delve_core::DelveConfig;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Main Delve web server
pub struct DelveServer {
    config: WebConfig,
    state: AppState,
}

impl DelveServer {
    /// Create a server with pipeline settings loaded from the configured file
    pub fn new(config: WebConfig) -> WebResult<Self> {
        let settings = DelveConfig::load(config.config_path.as_deref())?;
        Self::with_settings(config, settings)
    }

    /// Create a server with explicit pipeline settings
    pub fn with_settings(config: WebConfig, settings: DelveConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone(), settings)?;
        Ok(Self { config, state })
    }

    /// Start the web server and block until shutdown
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("🚀 Starting Delve Web Server");
        info!("📍 Server address: http://{}", address);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("❌ Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server shut down gracefully");
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

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Builder for DelveServer
pub struct DelveServerBuilder {
    config: WebConfig,
    settings: Option<DelveConfig>,
}

impl DelveServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
            settings: None,
        }
    }

    /// Start from an existing web configuration
    pub fn from_config(config: WebConfig) -> Self {
        Self {
            config,
            settings: None,
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

    /// Set the pipeline configuration file
    pub fn config_path<P: Into<std::path::PathBuf>>(mut self, path: P) -> Self {
        self.config.config_path = Some(path.into());
        self
    }

    /// Use these pipeline settings instead of loading a file
    pub fn settings(mut self, settings: DelveConfig) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the server
    pub fn build(self) -> WebResult<DelveServer> {
        match self.settings {
            Some(settings) => DelveServer::with_settings(self.config, settings),
            None => DelveServer::new(self.config),
        }
    }
}

impl Default for DelveServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_builder() {
        let builder = DelveServerBuilder::new()
            .host("localhost")
            .port(3000)
            .config_path("delve.toml");

        assert_eq!(builder.config.host, "localhost");
        assert_eq!(builder.config.port, 3000);
        assert_eq!(
            builder.config.config_path.as_deref(),
            Some(std::path::Path::new("delve.toml"))
        );
        assert!(builder.settings.is_none());
    }

    #[test]
    fn test_default_web_config() {
        let config = WebConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.address(), "127.0.0.1:5000");
    }

    #[test]
    fn test_build_with_explicit_settings() {
        let server = DelveServerBuilder::new()
            .port(5050)
            .settings(DelveConfig::default())
            .build()
            .unwrap();

        assert_eq!(server.config().port, 5050);
        assert_eq!(server.state().settings.pipeline.max_sources, 5);
    }
}
