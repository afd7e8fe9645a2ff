//! Job reference model.
//!
//! Jobs are owned by the orchestration engine; this table only keeps the
//! local id that notification subscriptions point at.

use jobdeck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub orchestrator_job_id: String,
    pub project_name: String,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a job.
#[derive(Debug, Deserialize)]
pub struct CreateJob {
    pub orchestrator_job_id: String,
    pub project_name: String,
    pub name: String,
}
