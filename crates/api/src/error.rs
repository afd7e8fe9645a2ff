//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"error": <message>, "code": <CODE>}`.
//! Storage and upstream details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jobdeck_core::error::CoreError;
use serde_json::json;

use crate::orchestrator::OrchestratorError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Error type returned by every handler.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The orchestration engine could not be queried.
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),
}

pub type AppResult<T> = Result<T, AppError>;

/// Status, machine-readable code and client-facing message.
type Mapped = (StatusCode, &'static str, String);

fn internal() -> Mapped {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Core(err) => map_core(err),
            AppError::Database(err) => map_sqlx(&err),
            AppError::Orchestrator(err) => {
                tracing::error!(error = %err, "Orchestrator request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "The job orchestration engine is unavailable".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}

fn map_core(err: CoreError) -> Mapped {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", msg),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
    }
}

/// Missing rows and foreign-key misses are 404. Violations of the `uq_`
/// constraints are 409. Anything else is a sanitized 500.
fn map_sqlx(err: &sqlx::Error) -> Mapped {
    let db_err = match err {
        sqlx::Error::RowNotFound => {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            )
        }
        sqlx::Error::Database(db_err) => db_err,
        other => {
            tracing::error!(error = %other, "Database error");
            return internal();
        }
    };

    match (db_err.code().as_deref(), db_err.constraint()) {
        (Some(UNIQUE_VIOLATION), Some(constraint)) if constraint.starts_with("uq_") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            conflict_message(constraint),
        ),
        (Some(FOREIGN_KEY_VIOLATION), _) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Referenced resource not found".to_string(),
        ),
        _ => {
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
    }
}

fn conflict_message(constraint: &str) -> String {
    match constraint {
        "uq_notification_preferences_contact" => {
            "The contact already has a notification preference".to_string()
        }
        "uq_notification_preferences_group" => {
            "The contact group already has a notification preference".to_string()
        }
        "uq_notification_subscriptions_preference_job" => {
            "The preference is already subscribed to this job".to_string()
        }
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}
