//! Resource model shared by classifiers and provider adapters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of cloud resource handled by the cleanup pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Compute instance (VM)
    Instance,
    /// Block storage volume
    Disc,
    /// Public IP address allocation
    Address,
    /// Network interface
    Nic,
    /// Cluster-tagged leftover resource
    TaggedResource,
}

impl ResourceKind {
    /// Kinds covered by the orphan queries (no age or allowlist policy)
    pub fn is_orphan_kind(&self) -> bool {
        matches!(
            self,
            ResourceKind::Disc | ResourceKind::Address | ResourceKind::Nic
        )
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Instance => write!(f, "vms"),
            ResourceKind::Disc => write!(f, "discs"),
            ResourceKind::Address => write!(f, "pips"),
            ResourceKind::Nic => write!(f, "nics"),
            ResourceKind::TaggedResource => write!(f, "ocps"),
        }
    }
}

/// A single listed cloud resource
///
/// Records are transient: constructed fresh from each provider list call and
/// never persisted. Classifiers reduce them to bare identifiers, so execution
/// and reporting operate on identifiers alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Provider identifier or display name, whichever the provider's
    /// mutating calls accept for this kind
    pub id_or_name: String,

    /// Resource category
    pub kind: ResourceKind,

    /// Creation timestamp (UTC) when the provider exposes one
    pub creation_time: Option<DateTime<Utc>>,
}

impl ResourceRecord {
    pub fn new(id_or_name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id_or_name: id_or_name.into(),
            kind,
            creation_time: None,
        }
    }

    pub fn with_creation_time(mut self, creation_time: DateTime<Utc>) -> Self {
        self.creation_time = Some(creation_time);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display_matches_category_flags() {
        assert_eq!(ResourceKind::Instance.to_string(), "vms");
        assert_eq!(ResourceKind::Disc.to_string(), "discs");
        assert_eq!(ResourceKind::Address.to_string(), "pips");
        assert_eq!(ResourceKind::Nic.to_string(), "nics");
        assert_eq!(ResourceKind::TaggedResource.to_string(), "ocps");
    }

    #[test]
    fn orphan_kinds() {
        assert!(ResourceKind::Disc.is_orphan_kind());
        assert!(ResourceKind::Nic.is_orphan_kind());
        assert!(ResourceKind::Address.is_orphan_kind());
        assert!(!ResourceKind::Instance.is_orphan_kind());
        assert!(!ResourceKind::TaggedResource.is_orphan_kind());
    }
}
