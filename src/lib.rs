//! betblock - gambling blocklist acquisition and local persistence.
//!
//! This crate keeps a canonical list of gambling domains up to date and
//! exposes it to whatever enforcement the platform offers.
//!
//! # Features
//!
//! - **Remote list fetching**: plain-text feed over HTTP(S), ETag aware
//! - **Normalization**: comments and blanks dropped, lowercased, deduplicated
//! - **Persistent cache**: namespaced key-value state with fail-soft reads
//! - **Cached fallback**: a failed update serves the last-known list
//! - **Blocker facade**: one interface over a native backend or storage-only
//!   emulation, picked once at startup
//! - **Rule export**: flat domain lists and capped content-blocker rules
//!
//! # Quick Start
//!
//! ```ignore
//! use betblock::{BlocklistCache, BlocklistUpdater, FileStore, Settings};
//! use std::sync::Arc;
//!
//! let settings = Settings::default();
//! let store = Arc::new(FileStore::open(&settings.cache_dir)?);
//! let cache = BlocklistCache::with_prefix(store, settings.key_prefix.clone());
//!
//! let updater = BlocklistUpdater::from_settings(&settings, cache.clone());
//! let outcome = updater.update_with_fallback()?;
//! println!("{}", outcome);
//! ```
//!
//! # Blocker
//!
//! ```ignore
//! use betblock::blocker::{connect, BlockerConfig};
//!
//! // No native backend available: storage emulation
//! let blocker = connect(cache.clone(), None);
//! blocker.enable(&BlockerConfig { enabled: true, ..Default::default() })?;
//! assert!(blocker.status()?.active);
//! ```
//!
//! # Concurrency
//!
//! All I/O is blocking and runs on the caller's thread. Concurrent updates
//! are not serialized: the last write to a key wins, and adding custom
//! entries from several threads at once can lose one of them.

mod cache;
mod config;
mod domain_set;
mod error;
mod metadata;
mod updater;

pub mod blocker;
pub mod converter;
pub mod remote;
pub mod store;

// Re-export core types
pub use cache::{BlocklistCache, DEFAULT_KEY_PREFIX};
pub use config::{Settings, DEFAULT_UPDATE_INTERVAL};
pub use domain_set::BlockedDomainSet;
pub use error::{Error, Result};
pub use metadata::{from_millis, to_millis, BlocklistUpdateRecord};

// Re-export update orchestration
pub use updater::{BlocklistUpdater, UpdateOutcome};

// Re-export storage backends
pub use store::{FileStore, KvStore, MemoryStore};

// Re-export fetching
pub use remote::{FetchedList, HttpListFetcher, ListFetcher, DEFAULT_SOURCE_URL};

// Re-export blocker facade
pub use blocker::{
    connect, BlockedAttempt, Blocker, BlockerConfig, BlockerStatus, EnforcementLayer,
    NativeBlocker, PermissionState, PermissionStatus, StorageBlocker,
};

// Re-export rule adapters
pub use converter::{
    parse_domain_list, to_content_blocker_rules, to_domain_list, ContentBlockerRule,
    MAX_CONTENT_BLOCKER_RULES,
};
