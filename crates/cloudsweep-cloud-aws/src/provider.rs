//! AWS provider implementation

use crate::client::AwsRegionClient;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ec2 as ec2;
use aws_sdk_resourceexplorer2 as rex;
use cloudsweep_cloud::{CloudError, CloudProvider, RegionClient, Result};

/// AWS provider
///
/// Region discovery goes through EC2 `DescribeRegions` in a default-region
/// bootstrap session; every cleanup pass then opens a region-pinned session
/// via [`connect`](CloudProvider::connect).
pub struct AwsProvider {
    bootstrap_region: String,
}

impl AwsProvider {
    pub fn new(bootstrap_region: impl Into<String>) -> Self {
        Self {
            bootstrap_region: bootstrap_region.into(),
        }
    }

    async fn sdk_config(&self, region: &str) -> aws_config::SdkConfig {
        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await
    }
}

impl Default for AwsProvider {
    fn default() -> Self {
        Self::new("us-east-1")
    }
}

#[async_trait]
impl CloudProvider for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    async fn list_regions(&self) -> Result<Vec<String>> {
        let conf = self.sdk_config(&self.bootstrap_region).await;
        let client = ec2::Client::new(&conf);
        let resp = client
            .describe_regions()
            .send()
            .await
            .map_err(|e| CloudError::Api(ec2::error::DisplayErrorContext(&e).to_string()))?;

        Ok(resp
            .regions()
            .iter()
            .filter_map(|r| r.region_name().map(|name| name.to_string()))
            .collect())
    }

    async fn connect(&self, region: &str) -> Result<Box<dyn RegionClient>> {
        let conf = self.sdk_config(region).await;
        Ok(Box::new(AwsRegionClient {
            region: region.to_string(),
            ec2: ec2::Client::new(&conf),
            explorer: rex::Client::new(&conf),
        }))
    }
}
