//! Typed, namespaced blocklist state on top of a [`KvStore`].
//!
//! Reads never fail: a missing, unreadable or corrupt value is replaced by
//! its default and logged. Writes propagate their errors so callers know the
//! cache still holds the previous value.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;

use crate::domain_set::BlockedDomainSet;
use crate::metadata::{from_millis, to_millis, BlocklistUpdateRecord};
use crate::store::KvStore;
use crate::{Error, Result};

/// Default namespace for all keys written by the cache.
pub const DEFAULT_KEY_PREFIX: &str = "@bethunter/blocker";

const KEY_ENABLED: &str = "enabled";
const KEY_DOMAINS: &str = "domains";
const KEY_CUSTOM_DOMAINS: &str = "custom_domains";
const KEY_CUSTOM_APPS: &str = "custom_apps";
const KEY_LAST_UPDATE: &str = "last_update";
const KEY_ETAG: &str = "etag";

/// Blocklist state cache.
///
/// Cheap to clone; clones share the same underlying store.
#[derive(Clone)]
pub struct BlocklistCache {
    store: Arc<dyn KvStore>,
    prefix: String,
}

impl BlocklistCache {
    /// Create a cache over `store` using [`DEFAULT_KEY_PREFIX`].
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_prefix(store, DEFAULT_KEY_PREFIX)
    }

    /// Create a cache over `store` with a custom key namespace.
    pub fn with_prefix(store: Arc<dyn KvStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// The key namespace in use.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn key(&self, name: &str) -> String {
        format!("{}:{}", self.prefix, name)
    }

    /// Read and decode a value, substituting the default on any failure.
    fn read_or_default<T>(&self, name: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let key = self.key(name);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                log::warn!("Failed to read {}, using default: {}", key, e);
                return T::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Corrupt value under {}, using default: {}", key, e);
                T::default()
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(&self.key(name), &raw)
    }

    /// Replace the cached domain set and stamp the update time.
    ///
    /// Either both values change or neither does: the timestamp is written
    /// first and restored if the domains write fails. Returns the recorded
    /// update time.
    pub fn set_domains(&self, domains: &BlockedDomainSet) -> Result<SystemTime> {
        let stamp_key = self.key(KEY_LAST_UPDATE);
        let previous_stamp = self.store.get(&stamp_key)?;
        let now = self.touch_last_updated()?;

        if let Err(e) = self.write(KEY_DOMAINS, domains) {
            let restored = match previous_stamp {
                Some(raw) => self.store.set(&stamp_key, &raw),
                None => self.store.remove(&stamp_key),
            };
            if let Err(restore_err) = restored {
                log::warn!("Failed to restore {}: {}", stamp_key, restore_err);
            }
            return Err(e);
        }

        log::debug!("Cached {} blocked domains", domains.len());
        Ok(now)
    }

    /// The cached domain set, empty if none was ever stored.
    pub fn domains(&self) -> BlockedDomainSet {
        self.read_or_default(KEY_DOMAINS)
    }

    /// Time of the last successful update, `None` if never updated.
    pub fn last_updated_at(&self) -> Option<SystemTime> {
        self.read_or_default::<Option<u64>>(KEY_LAST_UPDATE)
            .map(from_millis)
    }

    /// Set the update time to now without touching the domains.
    pub fn touch_last_updated(&self) -> Result<SystemTime> {
        let now = SystemTime::now();
        self.write(KEY_LAST_UPDATE, &to_millis(now))?;
        Ok(now)
    }

    /// Cached domains together with their update time.
    pub fn record(&self) -> BlocklistUpdateRecord {
        BlocklistUpdateRecord {
            domains: self.domains(),
            last_updated_at: self.last_updated_at(),
        }
    }

    /// Persist the blocker enabled flag.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.write(KEY_ENABLED, &enabled)
    }

    /// The blocker enabled flag, `false` when absent or unreadable.
    pub fn is_enabled(&self) -> bool {
        self.read_or_default(KEY_ENABLED)
    }

    /// Add a user domain (trimmed, lowercased).
    ///
    /// Returns `false` if it was already present.
    pub fn add_custom_domain(&self, domain: &str) -> Result<bool> {
        let domain = domain.trim().to_lowercase();
        self.append_unique(KEY_CUSTOM_DOMAINS, domain)
    }

    /// User-added domains in insertion order.
    pub fn custom_domains(&self) -> Vec<String> {
        self.read_or_default(KEY_CUSTOM_DOMAINS)
    }

    /// Add a user app identifier (trimmed, case kept).
    ///
    /// Returns `false` if it was already present.
    pub fn add_custom_app(&self, app_id: &str) -> Result<bool> {
        self.append_unique(KEY_CUSTOM_APPS, app_id.trim().to_string())
    }

    /// User-added app identifiers in insertion order.
    pub fn custom_apps(&self) -> Vec<String> {
        self.read_or_default(KEY_CUSTOM_APPS)
    }

    /// Fetched domains plus user-added domains.
    pub fn effective_domains(&self) -> BlockedDomainSet {
        let custom: BlockedDomainSet = self.custom_domains().into_iter().collect();
        self.domains().union(&custom)
    }

    /// ETag of the last downloaded list.
    pub fn etag(&self) -> Option<String> {
        self.read_or_default(KEY_ETAG)
    }

    /// Store or clear the ETag of the last downloaded list.
    pub fn set_etag(&self, etag: Option<&str>) -> Result<()> {
        match etag {
            Some(etag) => self.write(KEY_ETAG, etag),
            None => self.store.remove(&self.key(KEY_ETAG)),
        }
    }

    // Read, append, write back. Concurrent callers may lose an entry.
    fn append_unique(&self, name: &str, entry: String) -> Result<bool> {
        if entry.is_empty() {
            return Err(Error::EmptyEntry);
        }

        let mut entries: Vec<String> = self.read_or_default(name);
        if entries.contains(&entry) {
            return Ok(false);
        }
        entries.push(entry);
        self.write(name, &entries)?;
        Ok(true)
    }
}

impl std::fmt::Debug for BlocklistCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlocklistCache")
            .field("prefix", &self.prefix)
            .finish()
    }
}
