//! Repository for the `notification_subscriptions` table.

use jobdeck_core::notification_eligibility::SubscriptionBatchEntry;
use jobdeck_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{NotificationSubscription, UpdateSubscription};

/// Column list for `notification_subscriptions` queries.
const COLUMNS: &str =
    "id, preference_id, job_id, is_enabled, attach_log, created_at, updated_at";

/// Provides CRUD operations for notification subscriptions.
pub struct NotificationSubscriptionRepo;

impl NotificationSubscriptionRepo {
    /// List every subscription of a job, oldest first.
    pub async fn list_by_job(
        pool: &PgPool,
        job_id: DbId,
    ) -> Result<Vec<NotificationSubscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_subscriptions \
             WHERE job_id = $1 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, NotificationSubscription>(&query)
            .bind(job_id)
            .fetch_all(pool)
            .await
    }

    /// Find a subscription by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<NotificationSubscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notification_subscriptions WHERE id = $1");
        sqlx::query_as::<_, NotificationSubscription>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update one subscription's flags. Returns `None` if it does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSubscription,
    ) -> Result<Option<NotificationSubscription>, sqlx::Error> {
        let query = format!(
            "UPDATE notification_subscriptions SET \
                is_enabled = COALESCE($2, is_enabled), \
                attach_log = COALESCE($3, attach_log), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationSubscription>(&query)
            .bind(id)
            .bind(input.is_enabled)
            .bind(input.attach_log)
            .fetch_optional(pool)
            .await
    }

    /// Delete a subscription. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notification_subscriptions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Create or update the subscription of every entry to `job_id`.
    ///
    /// Runs in a single transaction: if any entry fails (for example an
    /// unknown preference or job), nothing is written. Rows come back in
    /// entry order.
    pub async fn upsert_batch(
        pool: &PgPool,
        job_id: DbId,
        entries: &[SubscriptionBatchEntry],
    ) -> Result<Vec<NotificationSubscription>, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_subscriptions \
                (preference_id, job_id, is_enabled, attach_log) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (preference_id, job_id) DO UPDATE SET \
                is_enabled = EXCLUDED.is_enabled, \
                attach_log = EXCLUDED.attach_log, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let mut saved = Vec::with_capacity(entries.len());

        for entry in entries {
            let row = sqlx::query_as::<_, NotificationSubscription>(&query)
                .bind(entry.preference_id)
                .bind(job_id)
                .bind(entry.is_enabled)
                .bind(entry.attach_log)
                .fetch_one(&mut *tx)
                .await?;
            saved.push(row);
        }

        tx.commit().await?;

        tracing::debug!(job_id, count = saved.len(), "Subscription batch committed");
        Ok(saved)
    }
}
