use crate::report::ConsoleHtmlSink;
use cloudsweep_cloud::ResourceKind;
use cloudsweep_cloud_aws::{AwsProvider, OCP_CLUSTER_TAG};
use cloudsweep_config::Settings;
use cloudsweep_core::{
    CleanupAction, CleanupPolicy, ExecuteOutcome, NullSink, RunFlags, RunReport, Runner, Snapshot,
};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn handle(settings: &Settings, flags: RunFlags) -> anyhow::Result<()> {
    let aws = &settings.providers.aws;
    let policy = CleanupPolicy {
        sla_minutes: settings.sla_minutes,
        delete_prefix: settings.delete_vm_prefix.clone(),
        never_touch: aws.except_vm_list.clone(),
        stop_only: aws.except_vm_stop_list.clone(),
    };

    let dry_run = flags.dry_run;
    let runner = Runner::new(
        Arc::new(AwsProvider::default()),
        policy,
        aws.regions.clone(),
        flags,
        OCP_CLUSTER_TAG,
    );

    let report = if dry_run {
        println!("{}", "Dry run: collecting and classifying only...".yellow());
        let sink = ConsoleHtmlSink::new(PathBuf::from("cleanup_report.html"));
        runner.run(&sink).await?
    } else {
        println!("{}", "Cleaning up AWS resources...".yellow());
        let report = runner.run(&NullSink).await?;
        print_outcome(&report);
        report
    };

    if report.snapshot.is_empty() {
        println!("{}", "No resources were eligible for cleanup.".green());
    }
    Ok(())
}

/// Console summary of an execute-mode pass
///
/// "Removed" and "Stopped" come from the actions that actually went through;
/// a resource whose call failed shows up under "Failed actions" instead of
/// being reported as removed. "Skipped" is classification-only and comes
/// from the snapshot.
fn print_outcome(report: &RunReport) {
    let lines = [
        ("Removed VMs", ResourceKind::Instance, CleanupAction::Delete),
        ("Stopped VMs", ResourceKind::Instance, CleanupAction::Stop),
        ("Removed NICs", ResourceKind::Nic, CleanupAction::Delete),
        ("Removed Discs", ResourceKind::Disc, CleanupAction::Delete),
        ("Removed PIPs", ResourceKind::Address, CleanupAction::Delete),
        (
            "Removed OCP leftovers",
            ResourceKind::TaggedResource,
            CleanupAction::Delete,
        ),
        (
            "Stopped OCP instances",
            ResourceKind::TaggedResource,
            CleanupAction::Stop,
        ),
    ];
    for (label, kind, action) in lines {
        let ids = report.outcome.succeeded_ids(kind, action);
        if !ids.is_empty() {
            println!("{}", format!("{label}:").bold());
            for id in ids {
                println!("  • {}", id.cyan());
            }
        }
    }

    print_skipped(&report.snapshot);
    print_failed(&report.outcome);
}

fn print_skipped(snapshot: &Snapshot) {
    let skipped = snapshot.ids(ResourceKind::Instance, CleanupAction::Skip);
    if !skipped.is_empty() {
        println!("{}", "Skipped VMs:".bold());
        for id in skipped {
            println!("  • {}", id.cyan());
        }
    }
}

fn print_failed(outcome: &ExecuteOutcome) {
    if outcome.failed.is_empty() {
        return;
    }
    println!("{}", "Failed actions:".bold().red());
    for action in &outcome.failed {
        let reason = action.error.as_deref().unwrap_or("unknown error");
        println!(
            "  ✗ {} {} {}: {}",
            action.action,
            action.kind,
            action.id.cyan(),
            reason.red()
        );
    }
}
