//! Action executor
//!
//! Consumes a populated snapshot and issues the provider-side mutating calls
//! for every enabled category. Never called in dry-run mode, and guards
//! against it anyway: a dry run must not issue a single mutating call.

use crate::snapshot::{CleanupAction, Snapshot};
use cloudsweep_cloud::{BulkFailure, RegionClient, ResourceKind, ResourceRecord};
use serde::Serialize;

/// Category selectors and run mode, as handed in by the CLI layer
#[derive(Debug, Clone, Default)]
pub struct RunFlags {
    pub vms: bool,
    pub nics: bool,
    pub discs: bool,
    pub pips: bool,
    pub ocps: bool,
    pub all: bool,
    pub dry_run: bool,

    /// SLA override in minutes for tagged-resource evaluation
    pub older_than: Option<i64>,
}

impl RunFlags {
    pub fn wants_vms(&self) -> bool {
        self.vms || self.all
    }

    pub fn wants_nics(&self) -> bool {
        self.nics || self.all
    }

    pub fn wants_discs(&self) -> bool {
        self.discs || self.all
    }

    pub fn wants_pips(&self) -> bool {
        self.pips || self.all
    }

    /// Tagged-resource cleanup must be requested explicitly; `--all` does
    /// not cover it.
    pub fn wants_ocps(&self) -> bool {
        self.ocps
    }
}

/// Outcome of one mutating call
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub kind: ResourceKind,
    pub action: CleanupAction,
    pub id: String,
    pub error: Option<String>,
}

/// Result of executing one region's snapshot
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecuteOutcome {
    pub succeeded: Vec<ActionOutcome>,
    pub failed: Vec<ActionOutcome>,
}

impl ExecuteOutcome {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Identifiers whose `kind` / `action` call went through
    pub fn succeeded_ids(&self, kind: ResourceKind, action: CleanupAction) -> Vec<&str> {
        self.succeeded
            .iter()
            .filter(|o| o.kind == kind && o.action == action)
            .map(|o| o.id.as_str())
            .collect()
    }

    /// Append every outcome of `other` (whole-run accumulation)
    pub fn merge(&mut self, other: ExecuteOutcome) {
        self.succeeded.extend(other.succeeded);
        self.failed.extend(other.failed);
    }

    fn add_success(&mut self, kind: ResourceKind, action: CleanupAction, id: &str) {
        self.succeeded.push(ActionOutcome {
            kind,
            action,
            id: id.to_string(),
            error: None,
        });
    }

    fn add_failure(&mut self, kind: ResourceKind, action: CleanupAction, id: &str, error: String) {
        tracing::warn!("Failed to {action} {kind} {id}: {error}");
        self.failed.push(ActionOutcome {
            kind,
            action,
            id: id.to_string(),
            error: Some(error),
        });
    }
}

/// Execute the snapshot's enabled buckets against a region-scoped client
///
/// Every individual resource's action is attempted even when a sibling
/// action fails; one failure never aborts the rest of the bucket or other
/// buckets.
pub async fn execute_region(
    client: &dyn RegionClient,
    snapshot: &Snapshot,
    flags: &RunFlags,
) -> ExecuteOutcome {
    let mut outcome = ExecuteOutcome::default();
    if flags.dry_run {
        return outcome;
    }

    if flags.wants_vms() {
        for name in snapshot.ids(ResourceKind::Instance, CleanupAction::Delete) {
            match client.delete_instance(name).await {
                Ok(()) => outcome.add_success(ResourceKind::Instance, CleanupAction::Delete, name),
                Err(e) => outcome.add_failure(
                    ResourceKind::Instance,
                    CleanupAction::Delete,
                    name,
                    e.to_string(),
                ),
            }
        }
        for name in snapshot.ids(ResourceKind::Instance, CleanupAction::Stop) {
            match client.stop_instance(name).await {
                Ok(()) => outcome.add_success(ResourceKind::Instance, CleanupAction::Stop, name),
                Err(e) => outcome.add_failure(
                    ResourceKind::Instance,
                    CleanupAction::Stop,
                    name,
                    e.to_string(),
                ),
            }
        }
    }

    if flags.wants_nics() {
        let ids = snapshot.ids(ResourceKind::Nic, CleanupAction::Delete);
        if !ids.is_empty() {
            record_bulk(&mut outcome, ResourceKind::Nic, ids, client.delete_nics(ids).await);
        }
    }
    if flags.wants_discs() {
        let ids = snapshot.ids(ResourceKind::Disc, CleanupAction::Delete);
        if !ids.is_empty() {
            record_bulk(
                &mut outcome,
                ResourceKind::Disc,
                ids,
                client.delete_volumes(ids).await,
            );
        }
    }
    if flags.wants_pips() {
        let ids = snapshot.ids(ResourceKind::Address, CleanupAction::Delete);
        if !ids.is_empty() {
            record_bulk(
                &mut outcome,
                ResourceKind::Address,
                ids,
                client.delete_addresses(ids).await,
            );
        }
    }

    if flags.wants_ocps() {
        for id in snapshot.ids(ResourceKind::TaggedResource, CleanupAction::Delete) {
            let record = ResourceRecord::new(id.clone(), ResourceKind::TaggedResource);
            match client.delete_tagged_resource(&record).await {
                Ok(()) => {
                    outcome.add_success(ResourceKind::TaggedResource, CleanupAction::Delete, id)
                }
                Err(e) => outcome.add_failure(
                    ResourceKind::TaggedResource,
                    CleanupAction::Delete,
                    id,
                    e.to_string(),
                ),
            }
        }
        for name in snapshot.ids(ResourceKind::TaggedResource, CleanupAction::Stop) {
            match client.stop_instance(name).await {
                Ok(()) => {
                    outcome.add_success(ResourceKind::TaggedResource, CleanupAction::Stop, name)
                }
                Err(e) => outcome.add_failure(
                    ResourceKind::TaggedResource,
                    CleanupAction::Stop,
                    name,
                    e.to_string(),
                ),
            }
        }
    }

    outcome
}

/// Record the result of one type-specific bulk delete
///
/// The provider reports per-id failures in the `Ok` value; an outer `Err`
/// means the call never ran, so every id counts as failed.
fn record_bulk(
    outcome: &mut ExecuteOutcome,
    kind: ResourceKind,
    ids: &[String],
    result: cloudsweep_cloud::Result<Vec<BulkFailure>>,
) {
    match result {
        Ok(failures) => {
            for id in ids {
                match failures.iter().find(|f| f.id == *id) {
                    Some(f) => outcome.add_failure(kind, CleanupAction::Delete, id, f.error.clone()),
                    None => outcome.add_success(kind, CleanupAction::Delete, id),
                }
            }
        }
        Err(e) => {
            for id in ids {
                outcome.add_failure(kind, CleanupAction::Delete, id, e.to_string());
            }
        }
    }
}
