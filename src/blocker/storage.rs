//! Blocker emulation backed only by local storage.

use super::{
    BlockedAttempt, Blocker, BlockerConfig, BlockerStatus, EnforcementLayer, PermissionStatus,
};
use crate::cache::BlocklistCache;
use crate::Result;

/// Blocker used when no platform enforcement exists.
///
/// Nothing is actually blocked. The enabled flag records intent, status is
/// derived from it, attempts are never observed and permissions are unknown.
#[derive(Debug, Clone)]
pub struct StorageBlocker {
    cache: BlocklistCache,
}

impl StorageBlocker {
    pub fn new(cache: BlocklistCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &BlocklistCache {
        &self.cache
    }
}

impl Blocker for StorageBlocker {
    fn enable(&self, config: &BlockerConfig) -> Result<bool> {
        self.cache.set_enabled(config.enabled)?;
        Ok(true)
    }

    fn disable(&self) -> Result<bool> {
        self.cache.set_enabled(false)?;
        Ok(true)
    }

    fn status(&self) -> Result<BlockerStatus> {
        let active = self.cache.is_enabled();
        let layers = if active {
            vec![EnforcementLayer::Storage]
        } else {
            Vec::new()
        };
        Ok(BlockerStatus { active, layers })
    }

    /// Nothing to push: the updater already wrote the fetched set to the
    /// cache, and custom entries live under their own keys.
    fn update_blocklist(&self, domains: &[String]) -> Result<bool> {
        log::debug!("Storage blocker: {} domains already cached", domains.len());
        Ok(true)
    }

    fn add_custom_domain(&self, domain: &str) -> Result<bool> {
        self.cache.add_custom_domain(domain)
    }

    fn add_custom_app(&self, app_id: &str) -> Result<bool> {
        self.cache.add_custom_app(app_id)
    }

    fn blocked_attempts(&self) -> Result<Vec<BlockedAttempt>> {
        Ok(Vec::new())
    }

    fn request_permissions(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::unknown())
    }

    fn check_permissions(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::unknown())
    }
}
