//! End-to-end blocklist workflow over an on-disk store.

use betblock::blocker::{connect, BlockerConfig, EnforcementLayer};
use betblock::{
    parse_domain_list, to_content_blocker_rules, to_millis, BlockedDomainSet, BlocklistCache,
    BlocklistUpdater, Error, FetchedList, FileStore, KvStore, ListFetcher, Result,
    MAX_CONTENT_BLOCKER_RULES,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::SystemTime;

/// Fetcher returning a fixed body, or failing.
struct FixedFetcher(Option<&'static str>);

impl ListFetcher for FixedFetcher {
    fn fetch(&self, _etag: Option<&str>) -> Result<FetchedList> {
        match self.0 {
            Some(text) => Ok(FetchedList::Modified {
                text: text.to_string(),
                etag: None,
            }),
            None => Err(Error::Unreachable("offline".to_string())),
        }
    }
}

fn file_cache(dir: &std::path::Path) -> BlocklistCache {
    BlocklistCache::new(Arc::new(FileStore::open(dir).unwrap()))
}

#[test]
fn test_fetch_parse_persist_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let cache = file_cache(dir.path());
    let updater = BlocklistUpdater::new(
        FixedFetcher(Some("#comment\nfoo.com\nFOO.com\n\nbar.net\n")),
        cache.clone(),
    );

    let before = SystemTime::now();
    let outcome = updater.update_with_fallback().unwrap();
    assert_eq!(outcome.domains().to_sorted_vec(), vec!["bar.net", "foo.com"]);

    // A fresh cache over the same directory sees the persisted state
    let reopened = file_cache(dir.path());
    assert_eq!(reopened.domains().to_sorted_vec(), vec!["bar.net", "foo.com"]);
    assert!(to_millis(reopened.last_updated_at().unwrap()) >= to_millis(before));
}

#[test]
fn test_offline_fallback_uses_disk_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = file_cache(dir.path());
    BlocklistUpdater::new(FixedFetcher(Some("a.com\nb.com\n")), cache.clone())
        .update()
        .unwrap();

    let offline = BlocklistUpdater::new(FixedFetcher(None), file_cache(dir.path()));
    let outcome = offline.update_with_fallback().unwrap();
    assert!(outcome.is_fallback());
    assert_eq!(outcome.domains().len(), 2);
}

#[test]
fn test_offline_without_cache_fails() {
    let dir = tempfile::tempdir().unwrap();
    let offline = BlocklistUpdater::new(FixedFetcher(None), file_cache(dir.path()));
    assert!(matches!(
        offline.update_with_fallback(),
        Err(Error::Unreachable(_))
    ));
}

#[test]
fn test_corrupt_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    store
        .set("@bethunter/blocker:domains", "\u{0}garbage[")
        .unwrap();
    store.set("@bethunter/blocker:enabled", "maybe").unwrap();

    let cache = BlocklistCache::new(store);
    assert!(cache.domains().is_empty());
    assert!(!cache.is_enabled());
}

#[test]
fn test_storage_blocker_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let cache = file_cache(dir.path());
    let blocker = connect(cache.clone(), None);

    let config = BlockerConfig {
        enabled: true,
        domains: vec!["bet.com".to_string()],
        apps: vec![],
    };
    assert!(blocker.enable(&config).unwrap());
    let status = blocker.status().unwrap();
    assert!(status.active);
    assert_eq!(status.layers, vec![EnforcementLayer::Storage]);

    assert!(blocker.disable().unwrap());
    let status = blocker.status().unwrap();
    assert!(!status.active);
    assert!(status.layers.is_empty());
}

#[test]
fn test_custom_domain_dedupe_persists() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = connect(file_cache(dir.path()), None);

    blocker.add_custom_domain("Example.COM").unwrap();
    blocker.add_custom_domain("example.com").unwrap();

    assert_eq!(file_cache(dir.path()).custom_domains(), vec!["example.com"]);
}

#[test]
fn test_content_blocker_export_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = file_cache(dir.path());
    cache
        .set_domains(&parse_domain_list("a.com\nb.com\n"))
        .unwrap();
    cache.add_custom_domain("*.c.com").unwrap();

    let rules = to_content_blocker_rules(&cache.effective_domains());
    assert_eq!(rules.len(), 3);
    let json = serde_json::to_string(&rules).unwrap();
    assert!(json.contains(r#""action":{"type":"block"}"#));

    let big: BlockedDomainSet = (0..MAX_CONTENT_BLOCKER_RULES * 2)
        .map(|i| format!("d{}.com", i))
        .collect();
    assert_eq!(to_content_blocker_rules(&big).len(), MAX_CONTENT_BLOCKER_RULES);
}

/// File store that parks the first domains write carrying `marker` until
/// released.
struct GatedStore {
    inner: FileStore,
    marker: &'static str,
    parked: Barrier,
    release: Barrier,
    gated: AtomicBool,
}

impl KvStore for GatedStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if key.ends_with(":domains")
            && value.contains(self.marker)
            && !self.gated.swap(true, Ordering::SeqCst)
        {
            self.parked.wait();
            self.release.wait();
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }
}

#[test]
fn test_overlapping_set_domains_last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(GatedStore {
        inner: FileStore::open(dir.path()).unwrap(),
        marker: "a1.com",
        parked: Barrier::new(2),
        release: Barrier::new(2),
        gated: AtomicBool::new(false),
    });
    let cache = BlocklistCache::new(store.clone());

    let a: BlockedDomainSet = ["a1.com", "a2.com"].into_iter().collect();
    let b: BlockedDomainSet = ["b1.com"].into_iter().collect();

    // A starts first and is held just before its domains write
    let writer_a = {
        let cache = cache.clone();
        let a = a.clone();
        thread::spawn(move || cache.set_domains(&a).unwrap())
    };
    store.parked.wait();

    // B runs to completion while A is in flight
    let writer_b = {
        let cache = cache.clone();
        let b = b.clone();
        thread::spawn(move || cache.set_domains(&b).unwrap())
    };
    writer_b.join().unwrap();
    assert_eq!(cache.domains(), b);

    // A's domains write lands last and replaces B's whole set
    store.release.wait();
    writer_a.join().unwrap();

    assert_eq!(cache.domains(), a);
    assert_eq!(file_cache(dir.path()).domains(), a);
    assert!(cache.last_updated_at().is_some());
}

#[test]
fn test_prefixes_sharing_a_directory_stay_separate() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let app = BlocklistCache::with_prefix(store.clone(), "app");
    let app_custom = BlocklistCache::with_prefix(store, "app_custom");

    // "app_custom:domains" and "app:custom_domains" must not share a file
    app_custom
        .set_domains(&["bet.com"].into_iter().collect())
        .unwrap();
    app.add_custom_domain("mine.com").unwrap();

    assert_eq!(app.custom_domains(), vec!["mine.com"]);
    assert!(app.domains().is_empty());
    assert_eq!(app_custom.domains().to_vec(), vec!["bet.com".to_string()]);
    assert!(app_custom.custom_domains().is_empty());
}

#[test]
fn test_refresh_while_active_keeps_custom_domains_separate() {
    let dir = tempfile::tempdir().unwrap();
    let cache = file_cache(dir.path());
    let blocker = connect(cache.clone(), None);
    blocker
        .enable(&BlockerConfig {
            enabled: true,
            ..Default::default()
        })
        .unwrap();
    blocker.add_custom_domain("mine.com").unwrap();

    let updater = BlocklistUpdater::new(FixedFetcher(Some("feed.com\n")), cache.clone());
    updater.update_with_fallback().unwrap();
    // Push the effective list to the active blocker after a fresh download
    blocker
        .update_blocklist(&cache.effective_domains().to_sorted_vec())
        .unwrap();

    assert_eq!(cache.domains().to_sorted_vec(), vec!["feed.com"]);
    assert_eq!(
        cache.effective_domains().to_sorted_vec(),
        vec!["feed.com", "mine.com"]
    );

    let offline = BlocklistUpdater::new(FixedFetcher(None), file_cache(dir.path()));
    let outcome = offline.update_with_fallback().unwrap();
    assert!(outcome.is_fallback());
    assert_eq!(outcome.domains().len(), 1);
}
