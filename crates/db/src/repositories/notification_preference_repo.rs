//! Repository for the `notification_preferences` table.

use jobdeck_core::notification_eligibility::PreferenceTarget;
use jobdeck_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::NotificationPreference;

/// Column list for `notification_preferences` queries.
const COLUMNS: &str = "id, contact_id, contact_group_id, created_at, updated_at";

/// Provides lookups and inserts for notification preferences.
pub struct NotificationPreferenceRepo;

impl NotificationPreferenceRepo {
    /// Find the preference owned by a contact.
    pub async fn find_by_contact(
        pool: &PgPool,
        contact_id: DbId,
    ) -> Result<Option<NotificationPreference>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM notification_preferences WHERE contact_id = $1");
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(contact_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the preference owned by a contact group.
    pub async fn find_by_group(
        pool: &PgPool,
        group_id: DbId,
    ) -> Result<Option<NotificationPreference>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM notification_preferences WHERE contact_group_id = $1");
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(group_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the preference owned by whatever `target` points at.
    pub async fn find_by_target(
        pool: &PgPool,
        target: PreferenceTarget,
    ) -> Result<Option<NotificationPreference>, sqlx::Error> {
        match target {
            PreferenceTarget::Contact(id) => Self::find_by_contact(pool, id).await,
            PreferenceTarget::Group(id) => Self::find_by_group(pool, id).await,
        }
    }

    /// List every preference ordered by ID.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<NotificationPreference>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notification_preferences ORDER BY id");
        sqlx::query_as::<_, NotificationPreference>(&query)
            .fetch_all(pool)
            .await
    }

    /// Create the preference for a target.
    ///
    /// A second preference for the same target violates
    /// `uq_notification_preferences_contact` / `uq_notification_preferences_group`.
    pub async fn create(
        pool: &PgPool,
        target: PreferenceTarget,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_preferences (contact_id, contact_group_id) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(target.contact_id())
            .bind(target.group_id())
            .fetch_one(pool)
            .await
    }
}
