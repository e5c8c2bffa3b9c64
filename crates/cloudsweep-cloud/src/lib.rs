//! Cloudsweep cloud provider abstraction
//!
//! This crate defines the capability interface every cloud provider adapter
//! implements, plus the resource model and error taxonomy shared by the
//! classification engine and the adapters.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                cloudsweep CLI                    │
//! │          (cloudsweep aws --dry-run)              │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │              cloudsweep-core                     │
//! │   classifiers · snapshot · executor · runner     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │              cloudsweep-cloud                    │
//! │  trait CloudProvider / trait RegionClient        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!          ┌────────▼────────┐
//!          │ cloudsweep-     │
//!          │   cloud-aws     │
//!          └─────────────────┘
//! ```

pub mod error;
pub mod provider;
pub mod record;

// Re-exports
pub use error::{CloudError, Result};
pub use provider::{BulkFailure, CloudProvider, RegionClient};
pub use record::{ResourceKind, ResourceRecord};
