//! Per-resource classifiers
//!
//! Each classifier is a pure function of the provider's current listing, the
//! cleanup policy and the snapshot. Only identifiers land in the snapshot,
//! never full records.

use crate::age::RunningTime;
use crate::snapshot::{CleanupAction, Snapshot};
use chrono::{DateTime, Utc};
use cloudsweep_cloud::{ResourceKind, ResourceRecord};

/// Age and allowlist policy for compute instances
#[derive(Debug, Clone)]
pub struct CleanupPolicy {
    /// Minimum age in minutes before an instance becomes eligible
    pub sla_minutes: i64,

    /// Name prefix marking an instance as eligible for deletion
    pub delete_prefix: String,

    /// Names never touched, regardless of age
    pub never_touch: Vec<String>,

    /// Names only ever stopped, never deleted
    pub stop_only: Vec<String>,
}

impl CleanupPolicy {
    /// Same policy with a different SLA threshold (the `--older-than`
    /// override for tagged-resource evaluation)
    pub fn with_sla_minutes(mut self, sla_minutes: i64) -> Self {
        self.sla_minutes = sla_minutes;
        self
    }
}

/// Decide the fate of a single instance
///
/// Evaluation order is a hard contract: the never-touch allowlist wins over
/// age, and the stop-only allowlist wins over the deletion prefix. Unknown
/// age or age below the SLA threshold leaves the instance unbucketed.
pub fn instance_action(
    name: &str,
    age: Option<RunningTime>,
    policy: &CleanupPolicy,
) -> Option<CleanupAction> {
    if policy.never_touch.iter().any(|n| n == name) {
        return Some(CleanupAction::Skip);
    }
    let age = age?;
    if age.minutes < policy.sla_minutes as f64 {
        return None;
    }
    if policy.stop_only.iter().any(|n| n == name) {
        return Some(CleanupAction::Stop);
    }
    if name.starts_with(&policy.delete_prefix) {
        return Some(CleanupAction::Delete);
    }
    None
}

/// Classify compute instances into the snapshot
pub fn classify_instances(
    instances: &[ResourceRecord],
    policy: &CleanupPolicy,
    now: DateTime<Utc>,
    snapshot: &mut Snapshot,
) {
    for vm in instances {
        let age = RunningTime::since(vm.creation_time, now);
        if let Some(action) = instance_action(&vm.id_or_name, age, policy) {
            snapshot.record(ResourceKind::Instance, action, vm.id_or_name.clone());
        }
    }
}

/// Classify orphaned resources (unused nics, unattached volumes,
/// disassociated addresses)
///
/// The provider query already filters to orphans, so every returned
/// identifier goes straight into the delete bucket.
pub fn classify_orphans(kind: ResourceKind, ids: Vec<String>, snapshot: &mut Snapshot) {
    debug_assert!(kind.is_orphan_kind());
    for id in ids {
        snapshot.record(kind, CleanupAction::Delete, id);
    }
}

/// Classify cluster-tagged leftovers
///
/// A tagged compute instance goes through the same age and prefix policy as
/// a plain instance. Any other tagged resource has no owning instance and is
/// classified delete outright.
pub fn classify_tagged(
    records: &[ResourceRecord],
    policy: &CleanupPolicy,
    now: DateTime<Utc>,
    snapshot: &mut Snapshot,
) {
    for record in records {
        match record.kind {
            ResourceKind::Instance => {
                let age = RunningTime::since(record.creation_time, now);
                if let Some(action) = instance_action(&record.id_or_name, age, policy) {
                    snapshot.record(ResourceKind::TaggedResource, action, record.id_or_name.clone());
                }
            }
            _ => {
                snapshot.record(
                    ResourceKind::TaggedResource,
                    CleanupAction::Delete,
                    record.id_or_name.clone(),
                );
            }
        }
    }
}
