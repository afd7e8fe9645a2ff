//! Repository for the `jobs` table.

use jobdeck_core::types::DbId;
use sqlx::PgPool;

use crate::models::job::{CreateJob, Job};

/// Column list for `jobs` queries.
const COLUMNS: &str = "id, orchestrator_job_id, project_name, name, created_at, updated_at";

/// Provides lookups and inserts for job references.
pub struct JobRepo;

impl JobRepo {
    /// Register a job, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateJob) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (orchestrator_job_id, project_name, name) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(&input.orchestrator_job_id)
            .bind(&input.project_name)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a job by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
