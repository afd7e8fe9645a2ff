//! Handlers for execution progress.
//!
//! State reports are fetched live from the orchestration engine on every
//! request and never stored. An execution the engine knows nothing about
//! renders as zero progress rather than an error.

use axum::extract::{Path, State};
use axum::Json;
use jobdeck_core::execution_state::ExecutionStateSnapshot;
use jobdeck_core::progress::{self, ProgressSummary};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/executions/{id}/progress
///
/// Overall and per-node completion percentages.
pub async fn get_progress(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(execution_id): Path<i64>,
) -> AppResult<Json<DataResponse<ProgressSummary>>> {
    let snapshot = state.executions.fetch_execution_state(execution_id).await?;
    if snapshot.is_none() {
        tracing::debug!(execution_id, "No state report, reporting zero progress");
    }

    let summary = progress::summarize(snapshot.as_ref());

    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/executions/{id}/state
///
/// The full state report with `overallProgress` and per-node
/// `progressPercent` filled in.
pub async fn get_state(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(execution_id): Path<i64>,
) -> AppResult<Json<DataResponse<ExecutionStateSnapshot>>> {
    let snapshot = state.executions.fetch_execution_state(execution_id).await?;
    let detail = progress::compute_progress_detail(snapshot);

    Ok(Json(DataResponse { data: detail }))
}
