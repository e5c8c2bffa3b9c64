//! Cloud provider trait definitions

use crate::error::Result;
use crate::record::ResourceRecord;
use async_trait::async_trait;

/// One identifier that a bulk delete could not remove
///
/// Bulk deletes attempt every identifier they are given; failures come back
/// per id so callers can tell removed resources from surviving ones.
#[derive(Debug, Clone)]
pub struct BulkFailure {
    pub id: String,
    pub error: String,
}

/// Cloud provider abstraction trait
///
/// Each concrete provider (AWS today, others later) implements this trait to
/// expose region discovery and region-scoped sessions to the cleanup engine.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "aws")
    fn name(&self) -> &str;

    /// List every region available to the current credentials
    async fn list_regions(&self) -> Result<Vec<String>>;

    /// Open a session scoped to a single region
    ///
    /// The session owns all provider state for that region; dropping it
    /// releases the session on every exit path.
    async fn connect(&self, region: &str) -> Result<Box<dyn RegionClient>>;
}

/// Region-scoped provider session
///
/// All list calls return the provider's current view; the orphan queries
/// (`list_unused_nics`, `list_unattached_volumes`,
/// `list_disassociated_addresses`) are expected to filter server-side so the
/// engine can treat every returned identifier as deletable.
#[async_trait]
pub trait RegionClient: Send + Sync {
    /// List compute instances with their creation timestamps
    async fn list_instances(&self) -> Result<Vec<ResourceRecord>>;

    /// List network interfaces not attached to anything
    async fn list_unused_nics(&self) -> Result<Vec<String>>;

    /// List volumes not attached to any instance
    async fn list_unattached_volumes(&self) -> Result<Vec<String>>;

    /// List address allocations with no association
    async fn list_disassociated_addresses(&self) -> Result<Vec<String>>;

    /// Search resources carrying a cluster-ownership tag
    ///
    /// Fails with [`CloudError::Unauthorized`](crate::CloudError::Unauthorized)
    /// when the provider denies the query for this region.
    async fn list_tagged_resources(&self, tag_pattern: &str) -> Result<Vec<ResourceRecord>>;

    /// Delete a single instance by name
    async fn delete_instance(&self, name: &str) -> Result<()>;

    /// Stop a single instance by name
    async fn stop_instance(&self, name: &str) -> Result<()>;

    /// Delete the given network interfaces
    ///
    /// Every id is attempted even when a sibling fails; per-id failures are
    /// returned in the `Ok` value. The outer `Err` is reserved for failures
    /// that prevent the call from running at all.
    async fn delete_nics(&self, ids: &[String]) -> Result<Vec<BulkFailure>>;

    /// Delete the given volumes (same per-id contract as [`delete_nics`](Self::delete_nics))
    async fn delete_volumes(&self, ids: &[String]) -> Result<Vec<BulkFailure>>;

    /// Release the given address allocations (same per-id contract as
    /// [`delete_nics`](Self::delete_nics))
    async fn delete_addresses(&self, ids: &[String]) -> Result<Vec<BulkFailure>>;

    /// Tear down a single cluster-tagged resource
    ///
    /// Distinct from the generic deletes: cluster leftovers may need
    /// provider-specific teardown semantics per resource type.
    async fn delete_tagged_resource(&self, record: &ResourceRecord) -> Result<()>;
}
