//! Repository for the `contacts` table.

use jobdeck_core::types::DbId;
use sqlx::PgPool;

use crate::models::contact::{Contact, CreateContact};

/// Column list for `contacts` queries.
const COLUMNS: &str = "id, name, email, created_at, updated_at";

/// Provides lookups and inserts for contacts.
pub struct ContactRepo;

impl ContactRepo {
    /// Insert a new contact, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateContact) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts (name, email) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    /// List every contact ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts ORDER BY name, id");
        sqlx::query_as::<_, Contact>(&query).fetch_all(pool).await
    }

    /// Fetch the contacts with the given IDs, in no particular order.
    pub async fn list_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Contact>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM contacts WHERE id = ANY($1)");
        sqlx::query_as::<_, Contact>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
