use std::sync::Arc;

use crate::config::ServerConfig;
use crate::orchestrator::ExecutionStateSource;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: jobdeck_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Source of live execution-state reports (the orchestration engine).
    pub executions: Arc<dyn ExecutionStateSource>,
}
