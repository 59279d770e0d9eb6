//! Platform blocker capability facade.
//!
//! [`Blocker`] is the single interface the app talks to. Two implementations
//! exist and one is picked at startup by [`connect`]:
//!
//! - [`StorageBlocker`]: no enforcement backend. State lives only in the
//!   [`BlocklistCache`]; status reflects what *should* be active.
//! - [`NativeBlocker`]: wraps a platform backend (VPN, DNS, content blocker)
//!   that implements the same trait, and mirrors enablement into the cache.

mod native;
mod storage;

pub use native::NativeBlocker;
pub use storage::StorageBlocker;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::cache::BlocklistCache;
use crate::Result;

/// Desired blocker configuration passed to [`Blocker::enable`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerConfig {
    pub enabled: bool,
    pub domains: Vec<String>,
    pub apps: Vec<String>,
}

/// A named mechanism that can enforce blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementLayer {
    /// Synthetic layer: state kept in local storage only
    Storage,
    /// Local VPN filtering
    Vpn,
    /// DNS filtering
    Dns,
    /// OS content blocker rules
    ContentBlocker,
    /// Accessibility-service app blocking
    Accessibility,
    /// Usage-stats based app blocking
    UsageStats,
}

impl EnforcementLayer {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnforcementLayer::Storage => "storage",
            EnforcementLayer::Vpn => "vpn",
            EnforcementLayer::Dns => "dns",
            EnforcementLayer::ContentBlocker => "content_blocker",
            EnforcementLayer::Accessibility => "accessibility",
            EnforcementLayer::UsageStats => "usage_stats",
        }
    }
}

impl fmt::Display for EnforcementLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether blocking is active and through which layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerStatus {
    pub active: bool,
    pub layers: Vec<EnforcementLayer>,
}

/// What an attempted access targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptKind {
    Domain,
    App,
}

/// A blocked access attempt reported by an enforcement backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedAttempt {
    /// Domain or app identifier
    pub target: String,
    pub kind: AttemptKind,
    #[serde(with = "crate::metadata::millis")]
    pub timestamp: SystemTime,
    pub layer: EnforcementLayer,
}

/// State of a single OS permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    #[default]
    Unknown,
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
            PermissionState::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Permission state per category the blocker may need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionStatus {
    pub vpn: PermissionState,
    pub accessibility: PermissionState,
    pub usage_stats: PermissionState,
    pub notifications: PermissionState,
}

impl PermissionStatus {
    /// All categories unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Whether every category is granted.
    pub fn all_granted(&self) -> bool {
        [self.vpn, self.accessibility, self.usage_stats, self.notifications]
            .iter()
            .all(|s| *s == PermissionState::Granted)
    }
}

/// Uniform blocker capability interface.
///
/// Platform enforcement backends implement this trait too, so a real
/// backend can be handed to [`connect`] or [`NativeBlocker::new`].
pub trait Blocker: Send + Sync {
    /// Apply `config`. Returns whether enablement succeeded.
    fn enable(&self, config: &BlockerConfig) -> Result<bool>;

    /// Turn blocking off. Returns whether it succeeded.
    fn disable(&self) -> Result<bool>;

    /// Current activity and engaged layers.
    fn status(&self) -> Result<BlockerStatus>;

    /// Replace the enforced domain list.
    fn update_blocklist(&self, domains: &[String]) -> Result<bool>;

    /// Add one user domain to enforcement.
    fn add_custom_domain(&self, domain: &str) -> Result<bool>;

    /// Add one user app identifier to enforcement.
    fn add_custom_app(&self, app_id: &str) -> Result<bool>;

    /// Attempts blocked so far, oldest first.
    fn blocked_attempts(&self) -> Result<Vec<BlockedAttempt>>;

    /// Ask the OS for the permissions blocking needs.
    fn request_permissions(&self) -> Result<PermissionStatus>;

    /// Report current permission state without prompting.
    fn check_permissions(&self) -> Result<PermissionStatus>;
}

/// Pick the blocker implementation once, at startup.
///
/// With a platform backend the result delegates to it; without one the
/// storage-only emulation is used for the whole session.
pub fn connect(cache: BlocklistCache, backend: Option<Arc<dyn Blocker>>) -> Arc<dyn Blocker> {
    match backend {
        Some(backend) => {
            log::info!("Using native blocker backend");
            Arc::new(NativeBlocker::new(cache, backend))
        }
        None => {
            log::info!("No native blocker backend, using storage emulation");
            Arc::new(StorageBlocker::new(cache))
        }
    }
}
