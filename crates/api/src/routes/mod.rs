pub mod execution;
pub mod health;
pub mod notification;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /executions/{id}/progress                        overall + per-node progress
/// /executions/{id}/state                           annotated state report
///
/// /notifications/preferences                       get (by contact or group), create (admin)
/// /notifications/subscriptions/{id}                update, delete (admin)
///
/// /jobs/{job_id}/notifications/eligibility         available contacts and groups
/// /jobs/{job_id}/notifications/recipients          contacts currently notified
/// /jobs/{job_id}/notifications/contacts/{id}/coverage
///                                                  direct / group coverage of a contact
/// /jobs/{job_id}/notifications/subscriptions       list, batch apply (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/executions", execution::router())
        .nest("/notifications", notification::router())
        .nest("/jobs/{job_id}/notifications", notification::job_router())
}
