//! Role gates layered on [`AuthUser`].
//!
//! Roles are ordered, so each gate names the lowest role it accepts.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jobdeck_core::error::CoreError;
use jobdeck_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    required: Role,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !user.role.satisfies(required) {
        tracing::debug!(
            user_id = user.user_id,
            role = %user.role,
            required = %required,
            "Role check failed",
        );
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "The {required} role is required"
        ))));
    }
    Ok(user)
}

/// Preference and subscription writes. 403 for anyone below admin.
///
/// ```ignore
/// async fn apply(RequireAdmin(admin): RequireAdmin) -> AppResult<StatusCode> {
///     Ok(StatusCode::NO_CONTENT)
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Role::Admin).await.map(RequireAdmin)
    }
}

/// Read access: any known role.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Role::Operator).await.map(RequireAuth)
    }
}
