//! Revlens Web Server
//!
//! HTTP interface and persistence layer around the analysis engine:
//! repository registration, review lifecycle, and report storage.

pub mod db;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use server::RevlensServer;
pub use state::AppState;

use crate::handlers::types::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use revlens_core::{EngineConfig, RevlensError, ServerConfig};
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    // The dashboard is served from its own origin.
    let cors = CorsLayer::permissive();

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// SQLite database URL
    pub database_url: String,
    /// Scratch root handed to the analysis engine
    pub workspace_root: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        let server = ServerConfig::default();
        let engine = EngineConfig::default();
        Self {
            host: server.host,
            port: server.port,
            database_url: server.database_url,
            workspace_root: engine.workspace_root,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("REVLENS_HOST").unwrap_or(defaults.host),
            port: std::env::var("REVLENS_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            workspace_root: std::env::var("REVLENS_WORKSPACE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_root),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Analysis error: {0}")]
    Engine(#[from] RevlensError),
}

impl WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebError::Validation(_) | WebError::Conflict(_) => StatusCode::BAD_REQUEST,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Engine(RevlensError::Validation { .. }) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(ApiResponse::error(self.to_string()))).into_response()
    }
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_core_defaults() {
        let config = WebConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3001);
        assert_eq!(config.address(), "127.0.0.1:3001");
    }

    #[test]
    fn errors_map_to_expected_status_codes() {
        assert_eq!(
            WebError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebError::NotFound("review".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebError::Conflict("dup".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebError::Database("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
