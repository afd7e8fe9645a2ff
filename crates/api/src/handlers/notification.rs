//! Handlers for notification preferences, eligibility and subscriptions.
//!
//! Reads require any authenticated user; writes require the admin role.
//! Eligibility queries on an unknown job return empty/full lists instead of
//! 404; single-entity writes fail with 404 when the target is missing.

use std::collections::{HashMap, HashSet};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use jobdeck_core::error::CoreError;
use jobdeck_core::notification_eligibility::{
    ContactCoverage, EligibilityResolver, MembershipGraph, PreferenceEntry, PreferenceTarget,
    SubscriptionBatchEntry,
};
use jobdeck_core::types::DbId;
use jobdeck_db::models::contact::{Contact, ContactGroup};
use jobdeck_db::models::notification::{
    CreatePreference, NotificationPreference, NotificationSubscription, UpdateSubscription,
};
use jobdeck_db::repositories::{
    ContactGroupRepo, ContactRepo, JobRepo, NotificationPreferenceRepo,
    NotificationSubscriptionRepo,
};
use jobdeck_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /notifications/preferences`.
#[derive(Debug, Deserialize)]
pub struct PreferenceQuery {
    pub contact_id: Option<DbId>,
    pub group_id: Option<DbId>,
}

/// Body of `GET /notifications/preferences`.
#[derive(Debug, Serialize)]
pub struct PreferenceResponse {
    pub preference: Option<NotificationPreference>,
}

/// Body of `GET /jobs/{job_id}/notifications/eligibility`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub available_contacts: Vec<Contact>,
    pub available_groups: Vec<ContactGroup>,
}

/// Request body for the batch subscription endpoint.
#[derive(Debug, Deserialize)]
pub struct SubscriptionBatchRequest {
    pub subscriptions: Vec<SubscriptionBatchEntry>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Core entries for every well-formed preference row.
fn preference_entries(rows: &[NotificationPreference]) -> Vec<PreferenceEntry> {
    rows.iter()
        .filter_map(|p| {
            let entry = p.to_entry();
            if entry.is_none() {
                tracing::warn!(preference_id = p.id, "Preference without a single target");
            }
            entry
        })
        .collect()
}

/// Load one read snapshot of preferences, the job's subscriptions and the
/// membership graph into a resolver.
async fn load_resolver(pool: &DbPool, job_id: DbId) -> AppResult<EligibilityResolver> {
    let preferences = NotificationPreferenceRepo::list_all(pool).await?;
    let subscriptions = NotificationSubscriptionRepo::list_by_job(pool, job_id).await?;
    let memberships = ContactGroupRepo::list_memberships(pool).await?;

    Ok(EligibilityResolver::new(
        preference_entries(&preferences),
        subscriptions
            .iter()
            .map(NotificationSubscription::to_entry)
            .collect(),
        MembershipGraph::from_edges(memberships.iter().map(|m| (m.group_id, m.contact_id))),
    ))
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications/preferences?contact_id=&group_id=
///
/// The preference owned by exactly one contact or group, or `null` if it
/// has none yet. Supplying both or neither id is a 400.
pub async fn get_preference(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<PreferenceQuery>,
) -> AppResult<Json<DataResponse<PreferenceResponse>>> {
    let mut rows = NotificationPreferenceRepo::list_all(&state.pool).await?;
    let resolver = EligibilityResolver::new(
        preference_entries(&rows),
        Vec::new(),
        MembershipGraph::default(),
    );

    let preference = resolver
        .preference_for(params.contact_id, params.group_id)?
        .map(|entry| entry.id)
        .and_then(|id| rows.iter().position(|row| row.id == id))
        .map(|idx| rows.swap_remove(idx));

    Ok(Json(DataResponse {
        data: PreferenceResponse { preference },
    }))
}

/// POST /api/v1/notifications/preferences
///
/// Create the preference for a contact or group. Returns 201, 409 if the
/// target already has one, or 404 if the target does not exist.
pub async fn create_preference(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreatePreference>,
) -> AppResult<impl IntoResponse> {
    let target = PreferenceTarget::from_ids(input.contact_id, input.group_id)?;

    let existing = NotificationPreferenceRepo::find_by_target(&state.pool, target).await?;
    if let Some(existing) = existing {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "The {target} already has notification preference {}",
            existing.id
        ))));
    }

    // Racing inserts still hit the unique index (409).
    let preference = NotificationPreferenceRepo::create(&state.pool, target).await?;

    tracing::info!(
        preference_id = preference.id,
        %target,
        user_id = admin.user_id,
        "Notification preference created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: preference })))
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs/{job_id}/notifications/eligibility
///
/// Contacts and groups that may still be subscribed to the job. Contacts
/// already reached through a subscribed group are left out.
pub async fn get_eligibility(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<Json<DataResponse<EligibilityResponse>>> {
    let resolver = load_resolver(&state.pool, job_id).await?;
    let contacts = ContactRepo::list_all(&state.pool).await?;
    let groups = ContactGroupRepo::list_all(&state.pool).await?;

    let contact_ids: Vec<DbId> = contacts.iter().map(|c| c.id).collect();
    let group_ids: Vec<DbId> = groups.iter().map(|g| g.id).collect();

    let available_contacts: HashSet<DbId> = resolver
        .available_contacts_for_job(job_id, &contact_ids)
        .into_iter()
        .collect();
    let available_groups: HashSet<DbId> = resolver
        .available_groups_for_job(job_id, &group_ids)
        .into_iter()
        .collect();

    Ok(Json(DataResponse {
        data: EligibilityResponse {
            available_contacts: contacts
                .into_iter()
                .filter(|c| available_contacts.contains(&c.id))
                .collect(),
            available_groups: groups
                .into_iter()
                .filter(|g| available_groups.contains(&g.id))
                .collect(),
        },
    }))
}

/// GET /api/v1/jobs/{job_id}/notifications/recipients
///
/// Distinct contacts the job currently notifies, directly or through a
/// group, in the order their subscriptions were created.
pub async fn list_recipients(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Contact>>>> {
    let resolver = load_resolver(&state.pool, job_id).await?;
    let ids = resolver.contacts_with_active_preference(job_id);

    let mut by_id: HashMap<DbId, Contact> = ContactRepo::list_by_ids(&state.pool, &ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let recipients = ids.iter().filter_map(|id| by_id.remove(id)).collect();

    Ok(Json(DataResponse { data: recipients }))
}

/// GET /api/v1/jobs/{job_id}/notifications/contacts/{contact_id}/coverage
///
/// Whether the contact is reached directly, through groups, or not at all.
pub async fn get_contact_coverage(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path((job_id, contact_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<ContactCoverage>>> {
    let resolver = load_resolver(&state.pool, job_id).await?;
    let coverage = resolver.coverage_for_contact(job_id, contact_id);

    Ok(Json(DataResponse { data: coverage }))
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs/{job_id}/notifications/subscriptions
pub async fn list_subscriptions(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<NotificationSubscription>>>> {
    let subscriptions = NotificationSubscriptionRepo::list_by_job(&state.pool, job_id).await?;
    Ok(Json(DataResponse {
        data: subscriptions,
    }))
}

/// PUT /api/v1/jobs/{job_id}/notifications/subscriptions
///
/// Create or update one subscription per entry. All-or-nothing: an unknown
/// job or preference fails the whole batch with 404 and nothing is saved.
/// A preference named twice takes the flags of its last entry.
pub async fn apply_subscription_batch(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
    Json(input): Json<SubscriptionBatchRequest>,
) -> AppResult<Json<DataResponse<Vec<NotificationSubscription>>>> {
    JobRepo::find_by_id(&state.pool, job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }))?;

    let resolver = load_resolver(&state.pool, job_id).await?;
    let entries = resolver.validate_subscription_batch(&input.subscriptions)?;

    let saved = NotificationSubscriptionRepo::upsert_batch(&state.pool, job_id, &entries).await?;

    tracing::info!(
        job_id,
        count = saved.len(),
        user_id = admin.user_id,
        "Subscription batch applied",
    );

    Ok(Json(DataResponse { data: saved }))
}

/// PUT /api/v1/notifications/subscriptions/{id}
///
/// Update one subscription's flags. Returns 404 if it does not exist.
pub async fn update_subscription(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(subscription_id): Path<DbId>,
    Json(input): Json<UpdateSubscription>,
) -> AppResult<Json<DataResponse<NotificationSubscription>>> {
    let subscription = NotificationSubscriptionRepo::update(&state.pool, subscription_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "NotificationSubscription",
            id: subscription_id,
        }))?;

    tracing::info!(
        subscription_id,
        user_id = admin.user_id,
        "Subscription updated",
    );

    Ok(Json(DataResponse { data: subscription }))
}

/// DELETE /api/v1/notifications/subscriptions/{id}
///
/// Returns 204 No Content, or 404 if the subscription does not exist.
pub async fn delete_subscription(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(subscription_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = NotificationSubscriptionRepo::delete(&state.pool, subscription_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "NotificationSubscription",
            id: subscription_id,
        }));
    }

    tracing::info!(
        subscription_id,
        user_id = admin.user_id,
        "Subscription deleted",
    );

    Ok(StatusCode::NO_CONTENT)
}
