//! Notification eligibility resolution.
//!
//! A notification preference targets exactly one contact or one contact
//! group and links to jobs through subscriptions. Given the preferences,
//! the subscriptions and the group membership graph, this module answers:
//!
//! - which preference belongs to a contact or group,
//! - which contacts a job currently notifies (directly or through a group),
//! - which contacts and groups may still be newly subscribed to a job.
//!
//! A contact already reached through an enabled group subscription is never
//! offered for an individual subscription. Evaluation works on pre-loaded
//! data; nothing here touches storage.

use std::collections::HashMap;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What a notification preference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum PreferenceTarget {
    Contact(DbId),
    Group(DbId),
}

impl PreferenceTarget {
    /// Build a target from a pair of optional ids.
    ///
    /// Exactly one id must be given; both or neither is `InvalidArgument`.
    pub fn from_ids(contact_id: Option<DbId>, group_id: Option<DbId>) -> Result<Self, CoreError> {
        match (contact_id, group_id) {
            (Some(c), None) => Ok(Self::Contact(c)),
            (None, Some(g)) => Ok(Self::Group(g)),
            (Some(_), Some(_)) => Err(CoreError::InvalidArgument(
                "Provide either contact_id or group_id, not both".to_string(),
            )),
            (None, None) => Err(CoreError::InvalidArgument(
                "One of contact_id or group_id is required".to_string(),
            )),
        }
    }

    pub fn contact_id(&self) -> Option<DbId> {
        match self {
            Self::Contact(id) => Some(*id),
            Self::Group(_) => None,
        }
    }

    pub fn group_id(&self) -> Option<DbId> {
        match self {
            Self::Group(id) => Some(*id),
            Self::Contact(_) => None,
        }
    }
}

impl fmt::Display for PreferenceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contact(id) => write!(f, "contact {id}"),
            Self::Group(id) => write!(f, "contact group {id}"),
        }
    }
}

/// A preference record reduced to what eligibility needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceEntry {
    pub id: DbId,
    pub target: PreferenceTarget,
}

/// A subscription record reduced to what eligibility needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionEntry {
    pub preference_id: DbId,
    pub job_id: DbId,
    pub is_enabled: bool,
}

/// One entry of a batch subscription request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionBatchEntry {
    pub preference_id: DbId,
    pub is_enabled: bool,
    pub attach_log: bool,
}

/// How a contact is currently reached by a job's notifications.
///
/// Direct and group coverage are reported side by side; neither takes
/// precedence over the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactCoverage {
    /// The contact's own preference has an enabled subscription.
    pub direct: bool,
    /// Groups containing the contact that have an enabled subscription.
    pub via_groups: Vec<DbId>,
}

impl ContactCoverage {
    pub fn is_covered(&self) -> bool {
        self.direct || !self.via_groups.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Membership graph
// ---------------------------------------------------------------------------

/// Bipartite group/contact membership graph with edges in both directions.
#[derive(Debug, Clone, Default)]
pub struct MembershipGraph {
    members: IndexMap<DbId, IndexSet<DbId>>,
    groups: IndexMap<DbId, IndexSet<DbId>>,
}

impl MembershipGraph {
    /// Build the graph from `(group_id, contact_id)` edges. Duplicate edges
    /// collapse; member order follows first appearance.
    pub fn from_edges(edges: impl IntoIterator<Item = (DbId, DbId)>) -> Self {
        let mut graph = Self::default();
        for (group_id, contact_id) in edges {
            graph.add_edge(group_id, contact_id);
        }
        graph
    }

    pub fn add_edge(&mut self, group_id: DbId, contact_id: DbId) {
        self.members.entry(group_id).or_default().insert(contact_id);
        self.groups.entry(contact_id).or_default().insert(group_id);
    }

    /// Contacts belonging to a group, in insertion order.
    pub fn members_of(&self, group_id: DbId) -> impl Iterator<Item = DbId> + '_ {
        self.members
            .get(&group_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Groups a contact belongs to, in insertion order.
    pub fn groups_of(&self, contact_id: DbId) -> impl Iterator<Item = DbId> + '_ {
        self.groups
            .get(&contact_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Answers eligibility queries over one read snapshot of preference,
/// subscription and membership data.
#[derive(Debug, Clone)]
pub struct EligibilityResolver {
    preferences: Vec<PreferenceEntry>,
    by_id: HashMap<DbId, PreferenceTarget>,
    by_target: HashMap<PreferenceTarget, usize>,
    subscriptions: Vec<SubscriptionEntry>,
    memberships: MembershipGraph,
}

impl EligibilityResolver {
    pub fn new(
        preferences: Vec<PreferenceEntry>,
        subscriptions: Vec<SubscriptionEntry>,
        memberships: MembershipGraph,
    ) -> Self {
        let by_id = preferences.iter().map(|p| (p.id, p.target)).collect();
        let mut by_target = HashMap::with_capacity(preferences.len());
        for (idx, pref) in preferences.iter().enumerate() {
            // Storage guarantees one preference per target; keep the first.
            by_target.entry(pref.target).or_insert(idx);
        }
        Self {
            preferences,
            by_id,
            by_target,
            subscriptions,
            memberships,
        }
    }

    /// The preference owned by a contact or a group.
    ///
    /// Returns `Ok(None)` when the target has no preference yet.
    pub fn preference_for(
        &self,
        contact_id: Option<DbId>,
        group_id: Option<DbId>,
    ) -> Result<Option<&PreferenceEntry>, CoreError> {
        let target = PreferenceTarget::from_ids(contact_id, group_id)?;
        Ok(self.preference_for_target(target))
    }

    pub fn preference_for_target(&self, target: PreferenceTarget) -> Option<&PreferenceEntry> {
        self.by_target
            .get(&target)
            .map(|&idx| &self.preferences[idx])
    }

    /// Targets of the enabled subscriptions to `job_id`, in subscription order.
    fn active_targets(&self, job_id: DbId) -> impl Iterator<Item = PreferenceTarget> + '_ {
        self.subscriptions
            .iter()
            .filter(move |s| s.job_id == job_id && s.is_enabled)
            .filter_map(|s| self.by_id.get(&s.preference_id).copied())
    }

    /// Groups with an enabled subscription to the job.
    pub fn subscribed_groups(&self, job_id: DbId) -> IndexSet<DbId> {
        self.active_targets(job_id)
            .filter_map(|t| t.group_id())
            .collect()
    }

    /// Contacts the job notifies, directly or through a subscribed group.
    ///
    /// Distinct by contact id; the first subscription that reaches a contact
    /// decides its position.
    pub fn contacts_with_active_preference(&self, job_id: DbId) -> Vec<DbId> {
        let mut contacts: IndexSet<DbId> = IndexSet::new();
        for target in self.active_targets(job_id) {
            match target {
                PreferenceTarget::Contact(id) => {
                    contacts.insert(id);
                }
                PreferenceTarget::Group(id) => contacts.extend(self.memberships.members_of(id)),
            }
        }
        contacts.into_iter().collect()
    }

    /// Whether and how `contact_id` is reached by the job's notifications.
    pub fn coverage_for_contact(&self, job_id: DbId, contact_id: DbId) -> ContactCoverage {
        let subscribed_groups = self.subscribed_groups(job_id);
        let direct = self
            .active_targets(job_id)
            .any(|t| t == PreferenceTarget::Contact(contact_id));
        let via_groups = self
            .memberships
            .groups_of(contact_id)
            .filter(|g| subscribed_groups.contains(g))
            .collect();
        ContactCoverage { direct, via_groups }
    }

    /// Groups from `all_groups` without an enabled subscription to the job.
    pub fn available_groups_for_job(&self, job_id: DbId, all_groups: &[DbId]) -> Vec<DbId> {
        let subscribed = self.subscribed_groups(job_id);
        all_groups
            .iter()
            .copied()
            .filter(|g| !subscribed.contains(g))
            .collect()
    }

    /// Contacts from `all_contacts` the job does not reach yet, neither
    /// through their own preference nor through a subscribed group.
    pub fn available_contacts_for_job(&self, job_id: DbId, all_contacts: &[DbId]) -> Vec<DbId> {
        let covered: IndexSet<DbId> = self
            .contacts_with_active_preference(job_id)
            .into_iter()
            .collect();
        all_contacts
            .iter()
            .copied()
            .filter(|c| !covered.contains(c))
            .collect()
    }

    /// Check that every batch entry references a known preference and
    /// return the entries to apply.
    ///
    /// The first unknown id fails the whole batch with `NotFound`. A
    /// preference named more than once keeps its first position and takes
    /// the flags of its last entry.
    pub fn validate_subscription_batch(
        &self,
        entries: &[SubscriptionBatchEntry],
    ) -> Result<Vec<SubscriptionBatchEntry>, CoreError> {
        let mut folded: IndexMap<DbId, SubscriptionBatchEntry> =
            IndexMap::with_capacity(entries.len());
        for entry in entries {
            if !self.by_id.contains_key(&entry.preference_id) {
                return Err(CoreError::NotFound {
                    entity: "NotificationPreference",
                    id: entry.preference_id,
                });
            }
            folded.insert(entry.preference_id, *entry);
        }
        Ok(folded.into_values().collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
