//! Repository for the `contact_groups` and `contact_group_members` tables.

use jobdeck_core::types::DbId;
use sqlx::PgPool;

use crate::models::contact::{ContactGroup, CreateContactGroup, GroupMembership};

/// Column list for `contact_groups` queries.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Provides lookups, inserts and membership management for contact groups.
pub struct ContactGroupRepo;

impl ContactGroupRepo {
    /// Insert a new group, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateContactGroup,
    ) -> Result<ContactGroup, sqlx::Error> {
        let query = format!(
            "INSERT INTO contact_groups (name, description) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactGroup>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// List every group ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ContactGroup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contact_groups ORDER BY name, id");
        sqlx::query_as::<_, ContactGroup>(&query)
            .fetch_all(pool)
            .await
    }

    /// Add a contact to a group. Adding an existing member is a no-op.
    pub async fn add_member(
        pool: &PgPool,
        group_id: DbId,
        contact_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO contact_group_members (group_id, contact_id) VALUES ($1, $2) \
             ON CONFLICT (group_id, contact_id) DO NOTHING",
        )
        .bind(group_id)
        .bind(contact_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Remove a contact from a group. Returns `true` if a row was deleted.
    pub async fn remove_member(
        pool: &PgPool,
        group_id: DbId,
        contact_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM contact_group_members WHERE group_id = $1 AND contact_id = $2",
        )
        .bind(group_id)
        .bind(contact_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every membership edge, ordered so group member lists are stable.
    pub async fn list_memberships(pool: &PgPool) -> Result<Vec<GroupMembership>, sqlx::Error> {
        sqlx::query_as::<_, GroupMembership>(
            "SELECT group_id, contact_id FROM contact_group_members \
             ORDER BY group_id, created_at, contact_id",
        )
        .fetch_all(pool)
        .await
    }
}
