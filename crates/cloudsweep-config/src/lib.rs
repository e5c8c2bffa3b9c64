//! Cloudsweep configuration
//!
//! Settings discovery and loading. A settings file is found in this
//! priority order:
//!
//! 1. `CLOUDSWEEP_CONFIG_PATH` environment variable (direct path)
//! 2. Current directory: `cloudsweep.toml`, `.cloudsweep.toml`
//! 3. `~/.config/cloudsweep/cloudsweep.toml`
//!
//! Values can be overridden through `CLOUDSWEEP_`-prefixed environment
//! variables (e.g. `CLOUDSWEEP_SLA_MINUTES=120`). Validation failures are
//! fatal: a run never starts on a malformed policy.

pub mod error;

pub use error::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};

const SETTINGS_CANDIDATES: [&str; 2] = ["cloudsweep.toml", ".cloudsweep.toml"];

/// Fully materialized run settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Minimum age in minutes before a resource is eligible for cleanup
    pub sla_minutes: i64,

    /// Instance-name prefix marking deletion candidates
    pub delete_vm_prefix: String,

    pub providers: Providers,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
    pub aws: ProviderSettings,
}

/// Per-provider policy knobs
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// Explicit region list, or the single entry "all"
    pub regions: Vec<String>,

    /// Instance names never touched
    #[serde(default)]
    pub except_vm_list: Vec<String>,

    /// Instance names only ever stopped, never deleted
    #[serde(default)]
    pub except_vm_stop_list: Vec<String>,
}

impl Settings {
    /// Load settings from an explicit file path plus environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("CLOUDSWEEP").separator("__"))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Discover the settings file and load it
    pub fn load() -> Result<Self> {
        Self::load_from(&find_settings_file()?)
    }

    fn validate(&self) -> Result<()> {
        if self.sla_minutes < 0 {
            return Err(ConfigError::Invalid(format!(
                "sla_minutes must not be negative (got {})",
                self.sla_minutes
            )));
        }
        if self.delete_vm_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "delete_vm_prefix must not be empty".to_string(),
            ));
        }
        if self.providers.aws.regions.is_empty() {
            return Err(ConfigError::Invalid(
                "providers.aws.regions must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Locate the settings file (see module docs for the priority order)
pub fn find_settings_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var("CLOUDSWEEP_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    for filename in &SETTINGS_CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("cloudsweep").join("cloudsweep.toml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::SettingsFileNotFound)
}
