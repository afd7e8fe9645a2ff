//! Contact and contact-group entity models and DTOs.

use jobdeck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a contact.
#[derive(Debug, Deserialize)]
pub struct CreateContact {
    pub name: String,
    pub email: String,
}

/// A row from the `contact_groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactGroup {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a contact group.
#[derive(Debug, Deserialize)]
pub struct CreateContactGroup {
    pub name: String,
    pub description: Option<String>,
}

/// A `(group_id, contact_id)` edge from `contact_group_members`.
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct GroupMembership {
    pub group_id: DbId,
    pub contact_id: DbId,
}
