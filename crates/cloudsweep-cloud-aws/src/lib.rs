//! AWS provider for cloudsweep
//!
//! Implements the [`cloudsweep_cloud::CloudProvider`] capability interface
//! on top of the AWS SDK: EC2 for instances, volumes, network interfaces and
//! addresses, Resource Explorer for cluster-tagged leftovers.

mod arn;
mod client;
mod provider;

pub use provider::AwsProvider;

/// Resource Explorer tag pattern matching OCP cluster ownership tags
pub const OCP_CLUSTER_TAG: &str = "tag.key:kubernetes.io/cluster/*";
