//! Route definitions for notification preferences and subscriptions.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /preferences               -> get_preference
/// POST   /preferences               -> create_preference
/// PUT    /subscriptions/{id}        -> update_subscription
/// DELETE /subscriptions/{id}        -> delete_subscription
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/preferences",
            get(notification::get_preference).post(notification::create_preference),
        )
        .route(
            "/subscriptions/{id}",
            put(notification::update_subscription).delete(notification::delete_subscription),
        )
}

/// Job-scoped routes mounted at `/jobs/{job_id}/notifications`.
///
/// ```text
/// GET    /eligibility                       -> get_eligibility
/// GET    /recipients                        -> list_recipients
/// GET    /contacts/{contact_id}/coverage    -> get_contact_coverage
/// GET    /subscriptions                     -> list_subscriptions
/// PUT    /subscriptions                     -> apply_subscription_batch
/// ```
pub fn job_router() -> Router<AppState> {
    Router::new()
        .route("/eligibility", get(notification::get_eligibility))
        .route("/recipients", get(notification::list_recipients))
        .route(
            "/contacts/{contact_id}/coverage",
            get(notification::get_contact_coverage),
        )
        .route(
            "/subscriptions",
            get(notification::list_subscriptions).put(notification::apply_subscription_batch),
        )
}
