//! Classification snapshot
//!
//! The per-run mapping from resource kind to action to identifiers. The
//! runner constructs a fresh snapshot for every region, so stale entries
//! from a prior region can never leak into the next region's report or
//! execution.

use cloudsweep_cloud::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Action a classified resource is destined for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupAction {
    /// Remove the resource
    Delete,
    /// Stop the resource but keep it
    Stop,
    /// Allowlisted, never touched
    Skip,
}

impl std::fmt::Display for CleanupAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupAction::Delete => write!(f, "delete"),
            CleanupAction::Stop => write!(f, "stop"),
            CleanupAction::Skip => write!(f, "skip"),
        }
    }
}

/// Ordered identifier lists per action for one resource kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionBuckets {
    pub delete: Vec<String>,
    pub stop: Vec<String>,
    pub skip: Vec<String>,
}

impl ActionBuckets {
    /// Identifiers destined for `action`
    pub fn get(&self, action: CleanupAction) -> &[String] {
        match action {
            CleanupAction::Delete => &self.delete,
            CleanupAction::Stop => &self.stop,
            CleanupAction::Skip => &self.skip,
        }
    }

    fn get_mut(&mut self, action: CleanupAction) -> &mut Vec<String> {
        match action {
            CleanupAction::Delete => &mut self.delete,
            CleanupAction::Stop => &mut self.stop,
            CleanupAction::Skip => &mut self.skip,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.stop.is_empty() && self.skip.is_empty()
    }
}

/// Classification result for one pass
///
/// Mutated only by the classifiers during collection; read-only during
/// execution and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Provider label shown in the report header
    pub provider: String,

    /// Buckets indexed by resource kind
    buckets: BTreeMap<ResourceKind, ActionBuckets>,
}

impl Snapshot {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            buckets: BTreeMap::new(),
        }
    }

    /// Append an identifier to the bucket for `kind` / `action`
    pub fn record(&mut self, kind: ResourceKind, action: CleanupAction, id: impl Into<String>) {
        self.buckets
            .entry(kind)
            .or_default()
            .get_mut(action)
            .push(id.into());
    }

    /// Buckets for a kind, if any identifier was recorded under it
    pub fn bucket(&self, kind: ResourceKind) -> Option<&ActionBuckets> {
        self.buckets.get(&kind)
    }

    /// Identifiers recorded under `kind` / `action` (empty when none)
    pub fn ids(&self, kind: ResourceKind, action: CleanupAction) -> &[String] {
        self.buckets
            .get(&kind)
            .map(|b| b.get(action))
            .unwrap_or(&[])
    }

    /// Drop every bucket (per-region reset invariant)
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Append every identifier of `other` (whole-run report accumulation)
    pub fn merge(&mut self, other: &Snapshot) {
        for (kind, buckets) in &other.buckets {
            for action in [CleanupAction::Delete, CleanupAction::Stop, CleanupAction::Skip] {
                for id in buckets.get(action) {
                    self.record(*kind, action, id.clone());
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(ActionBuckets::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKind, &ActionBuckets)> {
        self.buckets.iter()
    }
}
