//! Notification preference and subscription models and DTOs.

use jobdeck_core::notification_eligibility::{
    PreferenceEntry, PreferenceTarget, SubscriptionEntry,
};
use jobdeck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notification_preferences` table.
///
/// Exactly one of `contact_id` / `contact_group_id` is set; the table's
/// check constraint enforces it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationPreference {
    pub id: DbId,
    pub contact_id: Option<DbId>,
    pub contact_group_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NotificationPreference {
    /// The preference's target, or `None` for a row breaking the one-target rule.
    pub fn target(&self) -> Option<PreferenceTarget> {
        PreferenceTarget::from_ids(self.contact_id, self.contact_group_id).ok()
    }

    pub fn to_entry(&self) -> Option<PreferenceEntry> {
        self.target().map(|target| PreferenceEntry {
            id: self.id,
            target,
        })
    }
}

/// DTO for creating a preference. Exactly one id must be given.
#[derive(Debug, Deserialize)]
pub struct CreatePreference {
    pub contact_id: Option<DbId>,
    pub group_id: Option<DbId>,
}

/// A row from the `notification_subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationSubscription {
    pub id: DbId,
    pub preference_id: DbId,
    pub job_id: DbId,
    pub is_enabled: bool,
    pub attach_log: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NotificationSubscription {
    pub fn to_entry(&self) -> SubscriptionEntry {
        SubscriptionEntry {
            preference_id: self.preference_id,
            job_id: self.job_id,
            is_enabled: self.is_enabled,
        }
    }
}

/// DTO for updating a single subscription. `None` leaves a flag unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSubscription {
    pub is_enabled: Option<bool>,
    pub attach_log: Option<bool>,
}
