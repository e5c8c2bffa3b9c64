//! Reporting sink boundary
//!
//! The engine hands the finished whole-run snapshot to a sink exactly once
//! per dry run; rendering (console, HTML) lives outside the core.

use crate::snapshot::Snapshot;
use cloudsweep_cloud::Result;

/// Consumer of the final classification snapshot
pub trait ReportSink: Send + Sync {
    fn emit(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Sink that discards the snapshot (execute mode, tests)
pub struct NullSink;

impl ReportSink for NullSink {
    fn emit(&self, _snapshot: &Snapshot) -> Result<()> {
        Ok(())
    }
}
