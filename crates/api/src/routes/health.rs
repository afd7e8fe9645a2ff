//! Liveness endpoint.
//!
//! Only the database is probed. The orchestration engine is queried per
//! request by the execution handlers and reports its own failures as 502.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, database) = match jobdeck_db::health_check(&state.pool).await {
        Ok(()) => ("ok", "up"),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            ("degraded", "down")
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

/// `GET /health`, mounted at the root rather than under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
