//! Route definitions for the `/executions` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::execution;
use crate::state::AppState;

/// Routes mounted at `/executions`.
///
/// ```text
/// GET    /{id}/progress             -> get_progress
/// GET    /{id}/state                -> get_state
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/progress", get(execution::get_progress))
        .route("/{id}/state", get(execution::get_state))
}
