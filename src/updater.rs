//! Blocklist update orchestration.
//!
//! One update is fetch, then parse, then persist, strictly in that order.
//! [`BlocklistUpdater::update_with_fallback`] makes a single attempt and, if
//! it fails, serves the cached list instead. Only an empty cache lets the
//! failure through.

use std::fmt;
use std::time::Duration;

use crate::cache::BlocklistCache;
use crate::config::{Settings, DEFAULT_UPDATE_INTERVAL};
use crate::converter::parse_domain_list;
use crate::domain_set::BlockedDomainSet;
use crate::remote::{FetchedList, HttpListFetcher, ListFetcher};
use crate::{Error, Result};

/// Result of an update attempt that produced a usable list.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// A new list was downloaded and cached
    Fresh(BlockedDomainSet),
    /// The server reported the cached list is current
    Unchanged(BlockedDomainSet),
    /// The update failed; this is the last-known cached list
    Cached {
        domains: BlockedDomainSet,
        error: Error,
    },
}

impl UpdateOutcome {
    /// The domain set to use.
    pub fn domains(&self) -> &BlockedDomainSet {
        match self {
            UpdateOutcome::Fresh(domains) | UpdateOutcome::Unchanged(domains) => domains,
            UpdateOutcome::Cached { domains, .. } => domains,
        }
    }

    /// Consume the outcome, keeping the domain set.
    pub fn into_domains(self) -> BlockedDomainSet {
        match self {
            UpdateOutcome::Fresh(domains) | UpdateOutcome::Unchanged(domains) => domains,
            UpdateOutcome::Cached { domains, .. } => domains,
        }
    }

    /// Whether the list came from the cache after a failed update.
    pub fn is_fallback(&self) -> bool {
        matches!(self, UpdateOutcome::Cached { .. })
    }
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOutcome::Fresh(domains) => {
                write!(f, "downloaded {} blocked domains", domains.len())
            }
            UpdateOutcome::Unchanged(domains) => {
                write!(f, "blocklist unchanged, {} blocked domains", domains.len())
            }
            UpdateOutcome::Cached { domains, error } => write!(
                f,
                "could not reach update server, using last-known list of {} domains ({})",
                domains.len(),
                error
            ),
        }
    }
}

/// Drives blocklist refreshes against a cache.
pub struct BlocklistUpdater<F: ListFetcher> {
    fetcher: F,
    cache: BlocklistCache,
    update_interval: Duration,
}

impl BlocklistUpdater<HttpListFetcher> {
    /// Build an HTTP-backed updater from settings.
    pub fn from_settings(settings: &Settings, cache: BlocklistCache) -> Self {
        let fetcher = HttpListFetcher::with_timeout(&settings.source_url, settings.timeout());
        BlocklistUpdater::new(fetcher, cache).with_update_interval(settings.update_interval())
    }
}

impl<F: ListFetcher> BlocklistUpdater<F> {
    pub fn new(fetcher: F, cache: BlocklistCache) -> Self {
        Self {
            fetcher,
            cache,
            update_interval: DEFAULT_UPDATE_INTERVAL,
        }
    }

    /// Set a custom update interval for [`update_if_needed`](Self::update_if_needed).
    ///
    /// Default is 1 day (86400 seconds).
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn cache(&self) -> &BlocklistCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch, parse and persist. Any failure is returned.
    ///
    /// A conditional request is only made when a non-empty list is cached,
    /// so a "not modified" reply always has data behind it.
    pub fn update(&self) -> Result<UpdateOutcome> {
        let cached = self.cache.domains();
        let etag = if cached.is_empty() {
            None
        } else {
            self.cache.etag()
        };

        match self.fetcher.fetch(etag.as_deref())? {
            FetchedList::Modified { text, etag } => {
                let domains = parse_domain_list(&text);
                self.cache.set_domains(&domains)?;
                self.cache.set_etag(etag.as_deref())?;
                log::info!("Blocklist updated: {} domains", domains.len());
                Ok(UpdateOutcome::Fresh(domains))
            }
            FetchedList::NotModified => {
                self.cache.touch_last_updated()?;
                log::info!("Blocklist unchanged: {} domains", cached.len());
                Ok(UpdateOutcome::Unchanged(cached))
            }
        }
    }

    /// Update once, falling back to the cached list on failure.
    ///
    /// Returns the original error only when nothing is cached.
    pub fn update_with_fallback(&self) -> Result<UpdateOutcome> {
        match self.update() {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                let domains = self.cache.domains();
                if domains.is_empty() {
                    log::error!("Blocklist update failed with empty cache: {}", error);
                    return Err(error);
                }
                log::warn!(
                    "Blocklist update failed, using {} cached domains: {}",
                    domains.len(),
                    error
                );
                Ok(UpdateOutcome::Cached { domains, error })
            }
        }
    }

    /// Check if the update interval has elapsed since the last update.
    pub fn needs_update(&self) -> bool {
        self.cache.record().needs_update(self.update_interval)
    }

    /// Run [`update_with_fallback`](Self::update_with_fallback) only when due.
    ///
    /// Returns `None` if no update was needed.
    pub fn update_if_needed(&self) -> Result<Option<UpdateOutcome>> {
        if self.needs_update() {
            self.update_with_fallback().map(Some)
        } else {
            Ok(None)
        }
    }
}
