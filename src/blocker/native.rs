//! Blocker that delegates to a platform enforcement backend.

use std::sync::Arc;

use super::{BlockedAttempt, Blocker, BlockerConfig, BlockerStatus, PermissionStatus};
use crate::cache::BlocklistCache;
use crate::Result;

/// Forwards every call to a platform backend.
///
/// Enablement results and accepted custom entries reported by the backend
/// are written to the cache so local reads agree with what the platform
/// enforces. Backend errors are
/// returned as-is; there is no switch to storage emulation mid-session.
pub struct NativeBlocker {
    cache: BlocklistCache,
    backend: Arc<dyn Blocker>,
}

impl NativeBlocker {
    pub fn new(cache: BlocklistCache, backend: Arc<dyn Blocker>) -> Self {
        Self { cache, backend }
    }

    pub fn cache(&self) -> &BlocklistCache {
        &self.cache
    }

    fn mirror_enabled(&self, enabled: bool) -> Result<()> {
        if self.cache.is_enabled() != enabled {
            log::debug!("Mirroring backend enablement into cache: {}", enabled);
            self.cache.set_enabled(enabled)?;
        }
        Ok(())
    }
}

impl Blocker for NativeBlocker {
    fn enable(&self, config: &BlockerConfig) -> Result<bool> {
        let ok = self.backend.enable(config)?;
        if ok {
            self.mirror_enabled(config.enabled)?;
        } else if config.enabled {
            log::warn!("Native backend refused to enable blocking");
            self.mirror_enabled(false)?;
        }
        Ok(ok)
    }

    fn disable(&self) -> Result<bool> {
        let ok = self.backend.disable()?;
        if ok {
            self.mirror_enabled(false)?;
        }
        Ok(ok)
    }

    fn status(&self) -> Result<BlockerStatus> {
        let status = self.backend.status()?;
        self.mirror_enabled(status.active)?;
        Ok(status)
    }

    fn update_blocklist(&self, domains: &[String]) -> Result<bool> {
        self.backend.update_blocklist(domains)
    }

    fn add_custom_domain(&self, domain: &str) -> Result<bool> {
        let ok = self.backend.add_custom_domain(domain)?;
        if ok {
            self.cache.add_custom_domain(domain)?;
        }
        Ok(ok)
    }

    fn add_custom_app(&self, app_id: &str) -> Result<bool> {
        let ok = self.backend.add_custom_app(app_id)?;
        if ok {
            self.cache.add_custom_app(app_id)?;
        }
        Ok(ok)
    }

    fn blocked_attempts(&self) -> Result<Vec<BlockedAttempt>> {
        self.backend.blocked_attempts()
    }

    fn request_permissions(&self) -> Result<PermissionStatus> {
        self.backend.request_permissions()
    }

    fn check_permissions(&self) -> Result<PermissionStatus> {
        self.backend.check_permissions()
    }
}
