//! Cloudsweep classification-and-action engine
//!
//! The engine walks every configured region of a provider, classifies each
//! listed resource as delete / stop / skip according to age and allowlist
//! policy, and either reports the classification (dry run) or issues the
//! corresponding provider calls.
//!
//! The decision logic lives here; provider I/O is behind the
//! [`cloudsweep_cloud::CloudProvider`] capability traits.

pub mod age;
pub mod executor;
pub mod policy;
pub mod report;
pub mod runner;
pub mod snapshot;

// Re-exports
pub use age::RunningTime;
pub use executor::{ActionOutcome, ExecuteOutcome, RunFlags, execute_region};
pub use policy::{
    CleanupPolicy, classify_instances, classify_orphans, classify_tagged, instance_action,
};
pub use report::{NullSink, ReportSink};
pub use runner::{ALL_REGIONS, RunReport, Runner};
pub use snapshot::{ActionBuckets, CleanupAction, Snapshot};
