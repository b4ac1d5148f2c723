//! Shared application state

use crate::db::DatabaseService;
use crate::{WebConfig, WebResult};
use revlens_core::EngineConfig;
use revlens_engine::AnalysisOrchestrator;
use std::sync::Arc;

/// State shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: WebConfig,
    pub database: Arc<DatabaseService>,
    pub engine: Arc<AnalysisOrchestrator>,
}

impl AppState {
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let database = Arc::new(DatabaseService::new(&config.database_url).await?);

        let engine_config = EngineConfig {
            workspace_root: config.workspace_root.clone(),
        };
        let engine = Arc::new(AnalysisOrchestrator::new(&engine_config));

        Ok(Self {
            config,
            database,
            engine,
        })
    }
}
