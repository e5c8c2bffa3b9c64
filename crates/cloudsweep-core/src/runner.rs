//! Region iterator / run controller
//!
//! Drives one cleanup pass: resolve the region list, collect and classify
//! per region with a fresh snapshot, then execute or accumulate for the
//! dry-run report. Failures in one category or region are logged and never
//! stop the remaining categories or regions; only setup errors abort.

use crate::executor::{ExecuteOutcome, RunFlags, execute_region};
use crate::policy::{CleanupPolicy, classify_instances, classify_orphans, classify_tagged};
use crate::report::ReportSink;
use crate::snapshot::Snapshot;
use chrono::Utc;
use cloudsweep_cloud::{CloudError, CloudProvider, ResourceKind, Result};
use std::sync::Arc;

/// Sentinel region entry meaning "every region the provider offers"
pub const ALL_REGIONS: &str = "all";

/// What one pass produced
///
/// `snapshot` is the cumulative classification across regions; `outcome`
/// holds the per-resource results of the mutating calls, and stays empty in
/// dry-run mode.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub snapshot: Snapshot,
    pub outcome: ExecuteOutcome,
}

/// One cleanup pass over a provider
pub struct Runner {
    provider: Arc<dyn CloudProvider>,
    policy: CleanupPolicy,
    regions: Vec<String>,
    flags: RunFlags,
    tag_pattern: String,
}

impl Runner {
    pub fn new(
        provider: Arc<dyn CloudProvider>,
        policy: CleanupPolicy,
        regions: Vec<String>,
        flags: RunFlags,
        tag_pattern: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            policy,
            regions,
            flags,
            tag_pattern: tag_pattern.into(),
        }
    }

    /// The configured region list, or the provider's full list when the
    /// "all" sentinel is present
    async fn resolve_regions(&self) -> Result<Vec<String>> {
        if self.regions.is_empty() {
            return Err(CloudError::InvalidConfig(
                "no regions configured".to_string(),
            ));
        }
        if self.regions.iter().any(|r| r == ALL_REGIONS) {
            self.provider.list_regions().await
        } else {
            Ok(self.regions.clone())
        }
    }

    /// Run the pass and return the cumulative snapshot and action outcomes
    ///
    /// In dry-run mode the cumulative snapshot goes to `sink` exactly once,
    /// after the last region; otherwise each region's snapshot is executed
    /// before moving on and the per-resource outcomes accumulate into the
    /// returned report.
    pub async fn run(&self, sink: &dyn ReportSink) -> Result<RunReport> {
        let regions = self.resolve_regions().await?;
        let tagged_policy = match self.flags.older_than {
            Some(minutes) => self.policy.clone().with_sla_minutes(minutes),
            None => self.policy.clone(),
        };

        let mut report = Snapshot::new(self.provider.name());
        let mut actions = ExecuteOutcome::default();
        for region in &regions {
            tracing::info!("Resources from the region: {region}");

            // Session is scoped to this region; dropped on every exit path.
            let client = match self.provider.connect(region).await {
                Ok(client) => client,
                Err(e) => {
                    tracing::error!("Skipping region {region}: {e}");
                    continue;
                }
            };

            let now = Utc::now();
            let mut snapshot = Snapshot::new(self.provider.name());

            if self.flags.wants_vms() {
                match client.list_instances().await {
                    Ok(vms) => classify_instances(&vms, &self.policy, now, &mut snapshot),
                    Err(e) => tracing::warn!("Listing instances in {region} failed: {e}"),
                }
            }
            if self.flags.wants_nics() {
                match client.list_unused_nics().await {
                    Ok(ids) => classify_orphans(ResourceKind::Nic, ids, &mut snapshot),
                    Err(e) => tracing::warn!("Listing unused nics in {region} failed: {e}"),
                }
            }
            if self.flags.wants_discs() {
                match client.list_unattached_volumes().await {
                    Ok(ids) => classify_orphans(ResourceKind::Disc, ids, &mut snapshot),
                    Err(e) => tracing::warn!("Listing unattached volumes in {region} failed: {e}"),
                }
            }
            if self.flags.wants_pips() {
                match client.list_disassociated_addresses().await {
                    Ok(ids) => classify_orphans(ResourceKind::Address, ids, &mut snapshot),
                    Err(e) => {
                        tracing::warn!("Listing disassociated addresses in {region} failed: {e}")
                    }
                }
            }
            if self.flags.wants_ocps() {
                match client.list_tagged_resources(&self.tag_pattern).await {
                    Ok(records) => classify_tagged(&records, &tagged_policy, now, &mut snapshot),
                    Err(CloudError::Unauthorized(msg)) => {
                        tracing::info!("Region {region} is unauthorized: {msg}");
                    }
                    Err(e) => tracing::warn!("Tagged-resource search in {region} failed: {e}"),
                }
            }

            if !self.flags.dry_run {
                let outcome = execute_region(client.as_ref(), &snapshot, &self.flags).await;
                tracing::info!(
                    "Region {region}: {} actions applied, {} failed",
                    outcome.succeeded.len(),
                    outcome.failed.len()
                );
                actions.merge(outcome);
            }

            report.merge(&snapshot);
        }

        if self.flags.dry_run {
            sink.emit(&report)?;
        }
        Ok(RunReport {
            snapshot: report,
            outcome: actions,
        })
    }
}
