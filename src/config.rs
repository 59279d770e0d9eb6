//! Runtime settings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::DEFAULT_KEY_PREFIX;
use crate::remote::{DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT};
use crate::{Error, Result};

/// Default minimum time between automatic updates (1 day).
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(86400);

/// Settings for the blocklist subsystem.
///
/// Every field has a default, so a YAML file only needs the keys it
/// overrides:
///
/// ```yaml
/// source_url: https://example.com/gambling.txt
/// cache_dir: /var/lib/betblock
/// update_interval_secs: 3600
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// URL of the plain-text domain list
    pub source_url: String,
    /// Directory holding persisted state
    pub cache_dir: PathBuf,
    /// Namespace for stored keys
    pub key_prefix: String,
    /// Minimum seconds between automatic updates
    pub update_interval_secs: u64,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            cache_dir: std::env::temp_dir().join("betblock"),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            update_interval_secs: DEFAULT_UPDATE_INTERVAL.as_secs(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file and validate them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse settings from YAML text and validate them.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.source_url.trim().is_empty() {
            return Err(Error::Config("source_url must not be empty".to_string()));
        }
        if !self.source_url.starts_with("http://") && !self.source_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "source_url must be http(s): {}",
                self.source_url
            )));
        }
        if self.key_prefix.trim().is_empty() {
            return Err(Error::Config("key_prefix must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
