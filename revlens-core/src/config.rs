//! Configuration management

use crate::error::{ErrorContext, RevlensError, RevlensResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the Revlens services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevlensConfig {
    pub engine: EngineConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Analysis engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base scratch directory for per-analysis workspaces.
    ///
    /// Passed explicitly into the workspace manager so parallel deployments
    /// and tests can inject their own roots.
    pub workspace_root: PathBuf,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        Self {
            workspace_root: base.join("revlens").join("workspaces"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            database_url: "sqlite:revlens.db".to_string(),
        }
    }
}

impl Default for RevlensConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RevlensConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RevlensResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RevlensError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: RevlensConfig = toml::from_str(&content).map_err(|e| RevlensError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> RevlensResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| RevlensError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| RevlensError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> RevlensResult<()> {
        if self.engine.workspace_root.as_os_str().is_empty() {
            return Err(RevlensError::Config {
                message: "engine.workspace_root must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set engine.workspace_root to a writable directory"),
            });
        }

        if self.server.host.is_empty() {
            return Err(RevlensError::Config {
                message: "server.host must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set server.host to a bindable address"),
            });
        }

        if self.server.database_url.is_empty() {
            return Err(RevlensError::Config {
                message: "server.database_url must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set server.database_url to a SQLite URL"),
            });
        }

        Ok(())
    }
}
