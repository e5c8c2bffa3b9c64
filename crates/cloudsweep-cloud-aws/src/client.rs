//! Region-scoped AWS session

use crate::arn;
use async_trait::async_trait;
use aws_sdk_ec2 as ec2;
use aws_sdk_resourceexplorer2 as rex;
use chrono::{DateTime, Utc};
use cloudsweep_cloud::{BulkFailure, CloudError, RegionClient, ResourceKind, ResourceRecord, Result};

const TAGGED_INSTANCE_TYPE: &str = "ec2:instance";

pub struct AwsRegionClient {
    pub(crate) region: String,
    pub(crate) ec2: ec2::Client,
    pub(crate) explorer: rex::Client,
}

/// Render an SDK failure with its full error chain
fn api_err<E, R>(err: ec2::error::SdkError<E, R>) -> CloudError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    CloudError::Api(ec2::error::DisplayErrorContext(&err).to_string())
}

fn name_tag(tags: &[ec2::types::Tag]) -> Option<String> {
    tags.iter()
        .find(|t| t.key() == Some("Name"))
        .and_then(|t| t.value())
        .map(|v| v.to_string())
}

fn launch_time_utc(lt: Option<&aws_sdk_ec2::primitives::DateTime>) -> Option<DateTime<Utc>> {
    let lt = lt?;
    DateTime::<Utc>::from_timestamp(lt.secs(), lt.subsec_nanos())
}

impl AwsRegionClient {
    /// Resolve an instance name (the `Name` tag) to instance ids
    async fn instance_ids_by_name(&self, name: &str) -> Result<Vec<String>> {
        let resp = self
            .ec2
            .describe_instances()
            .filters(
                ec2::types::Filter::builder()
                    .name("tag:Name")
                    .values(name)
                    .build(),
            )
            .send()
            .await
            .map_err(api_err)?;

        let ids: Vec<String> = resp
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .filter_map(|i| i.instance_id().map(|id| id.to_string()))
            .collect();
        if ids.is_empty() {
            return Err(CloudError::ResourceNotFound(format!(
                "instance {name} in {}",
                self.region
            )));
        }
        Ok(ids)
    }

    /// Instance record (name + launch time) for a bare instance id
    async fn instance_record(&self, instance_id: &str) -> Result<ResourceRecord> {
        let resp = self
            .ec2
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(api_err)?;

        let inst = resp
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .next()
            .ok_or_else(|| CloudError::ResourceNotFound(instance_id.to_string()))?;

        let mut record = ResourceRecord::new(
            name_tag(inst.tags()).unwrap_or_else(|| instance_id.to_string()),
            ResourceKind::Instance,
        );
        if let Some(created) = launch_time_utc(inst.launch_time()) {
            record = record.with_creation_time(created);
        }
        Ok(record)
    }
}

#[async_trait]
impl RegionClient for AwsRegionClient {
    async fn list_instances(&self) -> Result<Vec<ResourceRecord>> {
        let mut records = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let resp = self
                .ec2
                .describe_instances()
                .set_next_token(token.clone())
                .send()
                .await
                .map_err(api_err)?;

            for reservation in resp.reservations() {
                for inst in reservation.instances() {
                    let Some(instance_id) = inst.instance_id() else {
                        continue;
                    };
                    let mut record = ResourceRecord::new(
                        name_tag(inst.tags()).unwrap_or_else(|| instance_id.to_string()),
                        ResourceKind::Instance,
                    );
                    if let Some(created) = launch_time_utc(inst.launch_time()) {
                        record = record.with_creation_time(created);
                    }
                    records.push(record);
                }
            }

            token = resp.next_token().map(|s| s.to_string());
            if token.is_none() {
                break;
            }
        }
        Ok(records)
    }

    async fn list_unused_nics(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let resp = self
                .ec2
                .describe_network_interfaces()
                .filters(
                    ec2::types::Filter::builder()
                        .name("status")
                        .values("available")
                        .build(),
                )
                .set_next_token(token.clone())
                .send()
                .await
                .map_err(api_err)?;

            ids.extend(
                resp.network_interfaces()
                    .iter()
                    .filter_map(|nic| nic.network_interface_id().map(|id| id.to_string())),
            );

            token = resp.next_token().map(|s| s.to_string());
            if token.is_none() {
                break;
            }
        }
        Ok(ids)
    }

    async fn list_unattached_volumes(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let resp = self
                .ec2
                .describe_volumes()
                .filters(
                    ec2::types::Filter::builder()
                        .name("status")
                        .values("available")
                        .build(),
                )
                .set_next_token(token.clone())
                .send()
                .await
                .map_err(api_err)?;

            ids.extend(
                resp.volumes()
                    .iter()
                    .filter_map(|vol| vol.volume_id().map(|id| id.to_string())),
            );

            token = resp.next_token().map(|s| s.to_string());
            if token.is_none() {
                break;
            }
        }
        Ok(ids)
    }

    async fn list_disassociated_addresses(&self) -> Result<Vec<String>> {
        let resp = self
            .ec2
            .describe_addresses()
            .send()
            .await
            .map_err(api_err)?;

        Ok(resp
            .addresses()
            .iter()
            .filter(|addr| addr.association_id().is_none())
            .filter_map(|addr| addr.allocation_id().map(|id| id.to_string()))
            .collect())
    }

    async fn list_tagged_resources(&self, tag_pattern: &str) -> Result<Vec<ResourceRecord>> {
        let query = format!("{tag_pattern} region:{}", self.region);
        let mut records = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let resp = match self
                .explorer
                .search()
                .query_string(&query)
                .set_next_token(token.clone())
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(err) => {
                    let service_err = err.into_service_error();
                    if service_err.is_unauthorized_exception() {
                        return Err(CloudError::Unauthorized(format!(
                            "resource-explorer search in {}: {service_err}",
                            self.region
                        )));
                    }
                    return Err(CloudError::Api(service_err.to_string()));
                }
            };

            for resource in resp.resources() {
                let Some(resource_arn) = resource.arn() else {
                    continue;
                };
                if resource.resource_type() == Some(TAGGED_INSTANCE_TYPE) {
                    let instance_id = arn::parse(resource_arn)
                        .map(|parts| parts.resource_id)
                        .unwrap_or(resource_arn);
                    match self.instance_record(instance_id).await {
                        Ok(record) => records.push(record),
                        Err(e) => {
                            tracing::warn!(
                                "Could not resolve tagged instance {instance_id}: {e}"
                            );
                        }
                    }
                } else {
                    records.push(ResourceRecord::new(
                        resource_arn,
                        ResourceKind::TaggedResource,
                    ));
                }
            }

            token = resp.next_token().map(|s| s.to_string());
            if token.is_none() {
                break;
            }
        }
        Ok(records)
    }

    async fn delete_instance(&self, name: &str) -> Result<()> {
        let ids = self.instance_ids_by_name(name).await?;
        self.ec2
            .terminate_instances()
            .set_instance_ids(Some(ids))
            .send()
            .await
            .map_err(api_err)?;
        Ok(())
    }

    async fn stop_instance(&self, name: &str) -> Result<()> {
        let ids = self.instance_ids_by_name(name).await?;
        self.ec2
            .stop_instances()
            .set_instance_ids(Some(ids))
            .send()
            .await
            .map_err(api_err)?;
        Ok(())
    }

    // The bulk deletes attempt every id; one failing sibling never blocks
    // the rest of the batch.

    async fn delete_nics(&self, ids: &[String]) -> Result<Vec<BulkFailure>> {
        let mut failures = Vec::new();
        for id in ids {
            if let Err(e) = self
                .ec2
                .delete_network_interface()
                .network_interface_id(id)
                .send()
                .await
                .map_err(api_err)
            {
                tracing::warn!("Deleting nic {id} in {} failed: {e}", self.region);
                failures.push(BulkFailure {
                    id: id.clone(),
                    error: e.to_string(),
                });
            }
        }
        Ok(failures)
    }

    async fn delete_volumes(&self, ids: &[String]) -> Result<Vec<BulkFailure>> {
        let mut failures = Vec::new();
        for id in ids {
            if let Err(e) = self
                .ec2
                .delete_volume()
                .volume_id(id)
                .send()
                .await
                .map_err(api_err)
            {
                tracing::warn!("Deleting volume {id} in {} failed: {e}", self.region);
                failures.push(BulkFailure {
                    id: id.clone(),
                    error: e.to_string(),
                });
            }
        }
        Ok(failures)
    }

    async fn delete_addresses(&self, ids: &[String]) -> Result<Vec<BulkFailure>> {
        let mut failures = Vec::new();
        for id in ids {
            if let Err(e) = self
                .ec2
                .release_address()
                .allocation_id(id)
                .send()
                .await
                .map_err(api_err)
            {
                tracing::warn!("Releasing address {id} in {} failed: {e}", self.region);
                failures.push(BulkFailure {
                    id: id.clone(),
                    error: e.to_string(),
                });
            }
        }
        Ok(failures)
    }

    /// Cluster teardown: dispatch on the ARN's resource type
    ///
    /// Identifiers that are not ARNs are tagged instances bucketed by name
    /// and terminate through the instance path.
    async fn delete_tagged_resource(&self, record: &ResourceRecord) -> Result<()> {
        let id = record.id_or_name.as_str();
        let Some(parts) = arn::parse(id) else {
            return self.delete_instance(id).await;
        };
        if parts.service != "ec2" {
            return Err(CloudError::UnsupportedResource(id.to_string()));
        }
        match parts.resource_type {
            "instance" => {
                self.ec2
                    .terminate_instances()
                    .instance_ids(parts.resource_id)
                    .send()
                    .await
                    .map_err(api_err)?;
            }
            "volume" => {
                self.ec2
                    .delete_volume()
                    .volume_id(parts.resource_id)
                    .send()
                    .await
                    .map_err(api_err)?;
            }
            "network-interface" => {
                self.ec2
                    .delete_network_interface()
                    .network_interface_id(parts.resource_id)
                    .send()
                    .await
                    .map_err(api_err)?;
            }
            "security-group" => {
                self.ec2
                    .delete_security_group()
                    .group_id(parts.resource_id)
                    .send()
                    .await
                    .map_err(api_err)?;
            }
            "natgateway" => {
                self.ec2
                    .delete_nat_gateway()
                    .nat_gateway_id(parts.resource_id)
                    .send()
                    .await
                    .map_err(api_err)?;
            }
            "elastic-ip" => {
                self.ec2
                    .release_address()
                    .allocation_id(parts.resource_id)
                    .send()
                    .await
                    .map_err(api_err)?;
            }
            _ => return Err(CloudError::UnsupportedResource(id.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(key: &str, value: &str) -> ec2::types::Tag {
        ec2::types::Tag::builder().key(key).value(value).build()
    }

    #[test]
    fn name_tag_picks_the_name_key() {
        let tags = [tag("env", "ci"), tag("Name", "cloudwash-test-1")];
        assert_eq!(name_tag(&tags), Some("cloudwash-test-1".to_string()));
    }

    #[test]
    fn name_tag_is_none_without_a_name_key() {
        let tags = [tag("env", "ci")];
        assert_eq!(name_tag(&tags), None);
    }

    #[test]
    fn launch_time_converts_to_utc() {
        let lt = aws_sdk_ec2::primitives::DateTime::from_secs(1_700_000_000);
        let converted = launch_time_utc(Some(&lt)).unwrap();
        assert_eq!(converted.timestamp(), 1_700_000_000);
        assert!(launch_time_utc(None).is_none());
    }
}
