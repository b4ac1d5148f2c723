//! Revlens Web Server
//!
//! HTTP service for repository change analysis: register repositories,
//! request reviews over a date range, and generate stored reports.

use clap::Parser;
use revlens_core::{init_logging, LoggingConfig, RevlensConfig};
use revlens_web::{RevlensServer, WebConfig};
use std::path::PathBuf;

/// Revlens web server - repository change analysis and review reports
#[derive(Parser)]
#[command(name = "revlens-web")]
#[command(about = "HTTP service for repository change analysis")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database URL
    #[arg(long)]
    database_url: Option<String>,

    /// Scratch directory for analysis workspaces
    #[arg(long)]
    workspace_root: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables before reading configuration
    dotenvy::dotenv().ok();

    let file_config = args
        .config
        .as_ref()
        .map(RevlensConfig::from_file)
        .transpose()?;

    let mut logging = file_config
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_else(LoggingConfig::default);
    logging.level = args.log_level.clone();
    init_logging(&logging).map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    // Precedence: defaults < environment < config file < command line.
    let mut web_config = WebConfig::from_env();
    if let Some(config) = &file_config {
        web_config.host = config.server.host.clone();
        web_config.port = config.server.port;
        web_config.database_url = config.server.database_url.clone();
        web_config.workspace_root = config.engine.workspace_root.clone();
    }
    if let Some(host) = args.host {
        web_config.host = host;
    }
    if let Some(port) = args.port {
        web_config.port = port;
    }
    if let Some(database_url) = args.database_url {
        web_config.database_url = database_url;
    }
    if let Some(workspace_root) = args.workspace_root {
        web_config.workspace_root = workspace_root;
    }

    let server = RevlensServer::new(web_config).await?;
    server.start().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        // Defaults leave the config sources in charge
        let args = Args::parse_from(["revlens-web"]);
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(args.config.is_none());
        assert_eq!(args.log_level, "info");

        // Explicit flags win
        let args = Args::parse_from([
            "revlens-web",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--database-url",
            "sqlite:custom.db",
        ]);
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.database_url.as_deref(), Some("sqlite:custom.db"));
    }
}
