//! End-to-end engine tests against a call-recording mock provider

use async_trait::async_trait;
use chrono::{Duration, Utc};
use cloudsweep_cloud::{
    BulkFailure, CloudError, CloudProvider, RegionClient, ResourceKind, ResourceRecord, Result,
};
use cloudsweep_core::{
    ALL_REGIONS, CleanupAction, CleanupPolicy, NullSink, RunFlags, Runner, Snapshot,
    execute_region,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default, Clone)]
struct RegionFixture {
    instances: Vec<ResourceRecord>,
    nics: Vec<String>,
    volumes: Vec<String>,
    addresses: Vec<String>,
    tagged: Vec<ResourceRecord>,
    tagged_unauthorized: bool,
    /// Instance names whose delete call fails
    fail_delete: Vec<String>,
    /// Ids whose bulk delete fails
    fail_bulk: Vec<String>,
}

/// Records every mutating call as "region:op:id"
struct MockProvider {
    regions: Vec<String>,
    fixtures: HashMap<String, RegionFixture>,
    mutations: Arc<Mutex<Vec<String>>>,
    region_list_calls: Arc<Mutex<usize>>,
}

impl MockProvider {
    fn new(fixtures: Vec<(&str, RegionFixture)>) -> Self {
        Self {
            regions: fixtures.iter().map(|(r, _)| r.to_string()).collect(),
            fixtures: fixtures
                .into_iter()
                .map(|(r, f)| (r.to_string(), f))
                .collect(),
            mutations: Arc::new(Mutex::new(Vec::new())),
            region_list_calls: Arc::new(Mutex::new(0)),
        }
    }

    fn mutations(&self) -> Vec<String> {
        self.mutations.lock().unwrap().clone()
    }
}

#[async_trait]
impl CloudProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_regions(&self) -> Result<Vec<String>> {
        *self.region_list_calls.lock().unwrap() += 1;
        Ok(self.regions.clone())
    }

    async fn connect(&self, region: &str) -> Result<Box<dyn RegionClient>> {
        Ok(Box::new(MockClient {
            region: region.to_string(),
            fixture: self.fixtures.get(region).cloned().unwrap_or_default(),
            mutations: Arc::clone(&self.mutations),
        }))
    }
}

struct MockClient {
    region: String,
    fixture: RegionFixture,
    mutations: Arc<Mutex<Vec<String>>>,
}

impl MockClient {
    fn record(&self, op: &str, id: &str) {
        self.mutations
            .lock()
            .unwrap()
            .push(format!("{}:{}:{}", self.region, op, id));
    }

    fn bulk(&self, op: &str, ids: &[String]) -> Vec<BulkFailure> {
        let mut failures = Vec::new();
        for id in ids {
            self.record(op, id);
            if self.fixture.fail_bulk.iter().any(|n| n == id) {
                failures.push(BulkFailure {
                    id: id.clone(),
                    error: format!("delete failed for {id}"),
                });
            }
        }
        failures
    }
}

#[async_trait]
impl RegionClient for MockClient {
    async fn list_instances(&self) -> Result<Vec<ResourceRecord>> {
        Ok(self.fixture.instances.clone())
    }

    async fn list_unused_nics(&self) -> Result<Vec<String>> {
        Ok(self.fixture.nics.clone())
    }

    async fn list_unattached_volumes(&self) -> Result<Vec<String>> {
        Ok(self.fixture.volumes.clone())
    }

    async fn list_disassociated_addresses(&self) -> Result<Vec<String>> {
        Ok(self.fixture.addresses.clone())
    }

    async fn list_tagged_resources(&self, _tag_pattern: &str) -> Result<Vec<ResourceRecord>> {
        if self.fixture.tagged_unauthorized {
            return Err(CloudError::Unauthorized(format!(
                "search denied in {}",
                self.region
            )));
        }
        Ok(self.fixture.tagged.clone())
    }

    async fn delete_instance(&self, name: &str) -> Result<()> {
        self.record("delete_instance", name);
        if self.fixture.fail_delete.iter().any(|n| n == name) {
            return Err(CloudError::Api(format!("terminate failed for {name}")));
        }
        Ok(())
    }

    async fn stop_instance(&self, name: &str) -> Result<()> {
        self.record("stop_instance", name);
        Ok(())
    }

    async fn delete_nics(&self, ids: &[String]) -> Result<Vec<BulkFailure>> {
        Ok(self.bulk("delete_nics", ids))
    }

    async fn delete_volumes(&self, ids: &[String]) -> Result<Vec<BulkFailure>> {
        Ok(self.bulk("delete_volumes", ids))
    }

    async fn delete_addresses(&self, ids: &[String]) -> Result<Vec<BulkFailure>> {
        Ok(self.bulk("delete_addresses", ids))
    }

    async fn delete_tagged_resource(&self, record: &ResourceRecord) -> Result<()> {
        self.record("delete_tagged_resource", &record.id_or_name);
        Ok(())
    }
}

fn policy() -> CleanupPolicy {
    CleanupPolicy {
        sla_minutes: 60,
        delete_prefix: "cloudwash-".to_string(),
        never_touch: vec!["pinned".to_string()],
        stop_only: vec!["i-002".to_string()],
    }
}

fn vm(name: &str, age_minutes: i64) -> ResourceRecord {
    ResourceRecord::new(name, ResourceKind::Instance)
        .with_creation_time(Utc::now() - Duration::minutes(age_minutes))
}

fn busy_fixture() -> RegionFixture {
    RegionFixture {
        instances: vec![vm("cloudwash-test-1", 120), vm("i-002", 120), vm("i-003", 30)],
        nics: vec!["eni-1".to_string()],
        volumes: vec!["vol-1".to_string()],
        addresses: vec!["eipalloc-1".to_string()],
        tagged: vec![ResourceRecord::new(
            "arn:aws:ec2:us-east-1:123:natgateway/nat-1",
            ResourceKind::TaggedResource,
        )],
        ..Default::default()
    }
}

#[tokio::test]
async fn dry_run_issues_zero_mutating_calls() {
    let provider = Arc::new(MockProvider::new(vec![("us-east-1", busy_fixture())]));
    let flags = RunFlags {
        all: true,
        ocps: true,
        dry_run: true,
        ..Default::default()
    };
    let runner = Runner::new(
        provider.clone(),
        policy(),
        vec!["us-east-1".to_string()],
        flags,
        "tag.key:kubernetes.io/cluster/*",
    );

    let report = runner.run(&NullSink).await.unwrap().snapshot;

    assert!(!report.is_empty());
    assert!(provider.mutations().is_empty());
}

#[tokio::test]
async fn dry_run_stays_clean_for_any_flag_combination() {
    for flags in [
        RunFlags { vms: true, dry_run: true, ..Default::default() },
        RunFlags { nics: true, discs: true, dry_run: true, ..Default::default() },
        RunFlags { pips: true, ocps: true, dry_run: true, ..Default::default() },
        RunFlags { all: true, ocps: true, dry_run: true, ..Default::default() },
    ] {
        let provider = Arc::new(MockProvider::new(vec![("us-east-1", busy_fixture())]));
        let runner = Runner::new(
            provider.clone(),
            policy(),
            vec!["us-east-1".to_string()],
            flags,
            "tag.key:kubernetes.io/cluster/*",
        );
        runner.run(&NullSink).await.unwrap();
        assert!(provider.mutations().is_empty());
    }
}

#[tokio::test]
async fn classifies_the_sla_scenarios() {
    // i-001 aged and prefixed, i-002 aged and stop-only, i-003 too young
    let fixture = RegionFixture {
        instances: vec![vm("cloudwash-test-1", 120), vm("i-002", 120), vm("i-003", 30)],
        ..Default::default()
    };
    let provider = Arc::new(MockProvider::new(vec![("us-east-1", fixture)]));
    let flags = RunFlags {
        vms: true,
        dry_run: true,
        ..Default::default()
    };
    let runner = Runner::new(
        provider,
        policy(),
        vec!["us-east-1".to_string()],
        flags,
        "tag.key:kubernetes.io/cluster/*",
    );

    let report = runner.run(&NullSink).await.unwrap().snapshot;

    assert_eq!(
        report.ids(ResourceKind::Instance, CleanupAction::Delete),
        ["cloudwash-test-1"]
    );
    assert_eq!(
        report.ids(ResourceKind::Instance, CleanupAction::Stop),
        ["i-002"]
    );
    let bucketed: usize = [CleanupAction::Delete, CleanupAction::Stop, CleanupAction::Skip]
        .iter()
        .map(|a| report.ids(ResourceKind::Instance, *a).len())
        .sum();
    assert_eq!(bucketed, 2, "i-003 must stay unbucketed");
}

#[tokio::test]
async fn regions_never_leak_into_each_other() {
    let region_a = RegionFixture {
        volumes: vec!["vol-a".to_string()],
        ..Default::default()
    };
    let region_b = RegionFixture {
        volumes: vec!["vol-b".to_string()],
        ..Default::default()
    };
    let provider = Arc::new(MockProvider::new(vec![
        ("eu-west-1", region_a),
        ("eu-west-2", region_b),
    ]));
    let flags = RunFlags {
        discs: true,
        ..Default::default()
    };
    let runner = Runner::new(
        provider.clone(),
        policy(),
        vec!["eu-west-1".to_string(), "eu-west-2".to_string()],
        flags,
        "tag.key:kubernetes.io/cluster/*",
    );

    runner.run(&NullSink).await.unwrap();

    assert_eq!(
        provider.mutations(),
        [
            "eu-west-1:delete_volumes:vol-a",
            "eu-west-2:delete_volumes:vol-b"
        ]
    );
}

#[tokio::test]
async fn unauthorized_tagged_search_does_not_stop_the_region() {
    let fixture = RegionFixture {
        instances: vec![vm("cloudwash-test-1", 120)],
        volumes: vec!["vol-1".to_string()],
        tagged_unauthorized: true,
        ..Default::default()
    };
    let provider = Arc::new(MockProvider::new(vec![("eu-central-1", fixture)]));
    let flags = RunFlags {
        vms: true,
        discs: true,
        ocps: true,
        dry_run: true,
        ..Default::default()
    };
    let runner = Runner::new(
        provider,
        policy(),
        vec!["eu-central-1".to_string()],
        flags,
        "tag.key:kubernetes.io/cluster/*",
    );

    let report = runner.run(&NullSink).await.unwrap().snapshot;

    assert!(report.bucket(ResourceKind::TaggedResource).is_none());
    assert_eq!(
        report.ids(ResourceKind::Instance, CleanupAction::Delete),
        ["cloudwash-test-1"]
    );
    assert_eq!(
        report.ids(ResourceKind::Disc, CleanupAction::Delete),
        ["vol-1"]
    );
}

#[tokio::test]
async fn all_sentinel_asks_the_provider_for_regions() {
    let provider = Arc::new(MockProvider::new(vec![
        ("us-east-1", RegionFixture {
            nics: vec!["eni-east".to_string()],
            ..Default::default()
        }),
        ("us-west-2", RegionFixture {
            nics: vec!["eni-west".to_string()],
            ..Default::default()
        }),
    ]));
    let flags = RunFlags {
        nics: true,
        dry_run: true,
        ..Default::default()
    };
    let runner = Runner::new(
        provider.clone(),
        policy(),
        vec![ALL_REGIONS.to_string()],
        flags,
        "tag.key:kubernetes.io/cluster/*",
    );

    let report = runner.run(&NullSink).await.unwrap().snapshot;

    assert_eq!(*provider.region_list_calls.lock().unwrap(), 1);
    assert_eq!(
        report.ids(ResourceKind::Nic, CleanupAction::Delete),
        ["eni-east", "eni-west"]
    );
}

#[tokio::test]
async fn empty_region_list_is_a_setup_error() {
    let provider = Arc::new(MockProvider::new(vec![]));
    let runner = Runner::new(
        provider,
        policy(),
        vec![],
        RunFlags::default(),
        "tag.key:kubernetes.io/cluster/*",
    );

    assert!(matches!(
        runner.run(&NullSink).await,
        Err(CloudError::InvalidConfig(_))
    ));
}

#[tokio::test]
async fn one_failed_delete_does_not_abort_its_siblings() {
    let fixture = RegionFixture {
        fail_delete: vec!["cloudwash-a".to_string()],
        ..Default::default()
    };
    let provider = MockProvider::new(vec![("us-east-1", fixture)]);
    let client = provider.connect("us-east-1").await.unwrap();

    let mut snapshot = Snapshot::new("mock");
    snapshot.record(ResourceKind::Instance, CleanupAction::Delete, "cloudwash-a");
    snapshot.record(ResourceKind::Instance, CleanupAction::Delete, "cloudwash-b");
    snapshot.record(ResourceKind::Instance, CleanupAction::Stop, "i-002");

    let flags = RunFlags {
        vms: true,
        ..Default::default()
    };
    let outcome = execute_region(client.as_ref(), &snapshot, &flags).await;

    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].id, "cloudwash-a");
    assert_eq!(outcome.succeeded.len(), 2);
    assert_eq!(
        provider.mutations(),
        [
            "us-east-1:delete_instance:cloudwash-a",
            "us-east-1:delete_instance:cloudwash-b",
            "us-east-1:stop_instance:i-002"
        ]
    );
}

#[tokio::test]
async fn bulk_delete_failure_still_attempts_the_remaining_ids() {
    let fixture = RegionFixture {
        fail_bulk: vec!["vol-a".to_string()],
        ..Default::default()
    };
    let provider = MockProvider::new(vec![("us-east-1", fixture)]);
    let client = provider.connect("us-east-1").await.unwrap();

    let mut snapshot = Snapshot::new("mock");
    for id in ["vol-a", "vol-b", "vol-c"] {
        snapshot.record(ResourceKind::Disc, CleanupAction::Delete, id);
    }

    let flags = RunFlags {
        discs: true,
        ..Default::default()
    };
    let outcome = execute_region(client.as_ref(), &snapshot, &flags).await;

    // Every id gets its call, and only the failing one is reported failed.
    assert_eq!(
        provider.mutations(),
        [
            "us-east-1:delete_volumes:vol-a",
            "us-east-1:delete_volumes:vol-b",
            "us-east-1:delete_volumes:vol-c"
        ]
    );
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].id, "vol-a");
    assert_eq!(
        outcome.succeeded_ids(ResourceKind::Disc, CleanupAction::Delete),
        ["vol-b", "vol-c"]
    );
}

#[tokio::test]
async fn run_report_separates_applied_from_failed_actions() {
    let fixture = RegionFixture {
        instances: vec![vm("cloudwash-dead", 120), vm("cloudwash-alive", 120)],
        volumes: vec!["vol-1".to_string()],
        fail_delete: vec!["cloudwash-dead".to_string()],
        ..Default::default()
    };
    let provider = Arc::new(MockProvider::new(vec![("us-east-1", fixture)]));
    let flags = RunFlags {
        vms: true,
        discs: true,
        ..Default::default()
    };
    let runner = Runner::new(
        provider,
        policy(),
        vec!["us-east-1".to_string()],
        flags,
        "tag.key:kubernetes.io/cluster/*",
    );

    let report = runner.run(&NullSink).await.unwrap();

    assert_eq!(
        report.outcome.succeeded_ids(ResourceKind::Instance, CleanupAction::Delete),
        ["cloudwash-alive"]
    );
    assert_eq!(
        report.outcome.succeeded_ids(ResourceKind::Disc, CleanupAction::Delete),
        ["vol-1"]
    );
    assert_eq!(report.outcome.failed.len(), 1);
    assert_eq!(report.outcome.failed[0].id, "cloudwash-dead");
    // The classification still lists the failed instance as delete-eligible.
    assert!(
        report
            .snapshot
            .ids(ResourceKind::Instance, CleanupAction::Delete)
            .contains(&"cloudwash-dead".to_string())
    );
}

#[tokio::test]
async fn older_than_overrides_the_tagged_threshold_only() {
    let fixture = RegionFixture {
        instances: vec![vm("cloudwash-plain", 30)],
        tagged: vec![vm("cloudwash-node", 30)],
        ..Default::default()
    };
    let provider = Arc::new(MockProvider::new(vec![("us-east-1", fixture)]));
    let flags = RunFlags {
        vms: true,
        ocps: true,
        dry_run: true,
        older_than: Some(10),
        ..Default::default()
    };
    let runner = Runner::new(
        provider,
        policy(),
        vec!["us-east-1".to_string()],
        flags,
        "tag.key:kubernetes.io/cluster/*",
    );

    let report = runner.run(&NullSink).await.unwrap().snapshot;

    // 30 minutes clears the overridden 10-minute threshold for tagged
    // resources, but not the configured 60-minute SLA for plain instances.
    assert_eq!(
        report.ids(ResourceKind::TaggedResource, CleanupAction::Delete),
        ["cloudwash-node"]
    );
    assert!(report.ids(ResourceKind::Instance, CleanupAction::Delete).is_empty());
}
