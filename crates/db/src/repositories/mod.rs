//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod contact_group_repo;
pub mod contact_repo;
pub mod job_repo;
pub mod notification_preference_repo;
pub mod notification_subscription_repo;

pub use contact_group_repo::ContactGroupRepo;
pub use contact_repo::ContactRepo;
pub use job_repo::JobRepo;
pub use notification_preference_repo::NotificationPreferenceRepo;
pub use notification_subscription_repo::NotificationSubscriptionRepo;
