//! HTTP fetcher and updater against a mock server.
//!
//! The fetcher is blocking, so each call runs on tokio's blocking pool while
//! the mock server keeps serving on the runtime.

use betblock::{
    BlocklistCache, BlocklistUpdater, Error, FetchedList, HttpListFetcher, ListFetcher,
    MemoryStore, Result, UpdateOutcome,
};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer) -> HttpListFetcher {
    HttpListFetcher::with_timeout(
        &format!("{}/gambling.txt", server.uri()),
        Duration::from_secs(5),
    )
}

async fn fetch(fetcher: HttpListFetcher, etag: Option<&'static str>) -> Result<FetchedList> {
    tokio::task::spawn_blocking(move || fetcher.fetch(etag))
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_plain_text_with_etag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gambling.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .set_body_string("#comment\nfoo.com\nFOO.com\n\nbar.net\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetched = fetch(fetcher(&server), None).await.unwrap();
    assert_eq!(
        fetched,
        FetchedList::Modified {
            text: "#comment\nfoo.com\nFOO.com\n\nbar.net\n".to_string(),
            etag: Some("\"v1\"".to_string()),
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_status_embeds_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gambling.txt"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = fetch(fetcher(&server), None).await.unwrap_err();
    match err {
        Error::HttpStatus { status, ref url } => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/gambling.txt"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_not_modified_with_etag() {
    let server = MockServer::start().await;
    // Without the header the request falls through to wiremock's 404
    Mock::given(method("GET"))
        .and(path("/gambling.txt"))
        .and(header("If-None-Match", "\"v1\""))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = fetch(fetcher(&server), Some("\"v1\"")).await.unwrap();
    assert_eq!(fetched, FetchedList::NotModified);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gzip_file_body_is_decompressed() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"casino.com\nslots.io\n").unwrap();
    let body = encoder.finish().unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gambling.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/octet-stream")
                .set_body_bytes(body),
        )
        .mount(&server)
        .await;

    match fetch(fetcher(&server), None).await.unwrap() {
        FetchedList::Modified { text, .. } => assert_eq!(text, "casino.com\nslots.io\n"),
        other => panic!("unexpected fetch result: {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_utf8_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gambling.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xfe, 0x00, 0x41]))
        .mount(&server)
        .await;

    let err = fetch(fetcher(&server), None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidBody(_)));
    assert!(err.is_fetch_failure());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_updater_sends_cached_etag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gambling.txt"))
        .and(header("If-None-Match", "\"abc\""))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gambling.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"abc\"")
                .set_body_string("bet.com\n"),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    let cache = BlocklistCache::new(Arc::new(MemoryStore::new()));
    let updater = BlocklistUpdater::new(fetcher(&server), cache.clone());

    let (first, second) = tokio::task::spawn_blocking(move || {
        (updater.update().unwrap(), updater.update().unwrap())
    })
    .await
    .unwrap();

    assert!(matches!(first, UpdateOutcome::Fresh(_)));
    match second {
        UpdateOutcome::Unchanged(domains) => assert_eq!(domains.to_vec(), vec!["bet.com"]),
        other => panic!("expected unchanged list, got {}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_updater_over_http_then_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gambling.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"abc\"")
                .set_body_string("bet.com\nPoker.net\n"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gambling.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let cache = BlocklistCache::new(Arc::new(MemoryStore::new()));
    let updater = BlocklistUpdater::new(fetcher(&server), cache.clone());

    let (first, second) = tokio::task::spawn_blocking(move || {
        (
            updater.update_with_fallback().unwrap(),
            updater.update_with_fallback().unwrap(),
        )
    })
    .await
    .unwrap();

    assert!(matches!(first, UpdateOutcome::Fresh(_)));
    assert_eq!(cache.etag(), Some("\"abc\"".to_string()));

    match second {
        UpdateOutcome::Cached { domains, error } => {
            assert_eq!(domains.to_sorted_vec(), vec!["bet.com", "poker.net"]);
            assert!(matches!(error, Error::HttpStatus { status: 500, .. }));
        }
        other => panic!("expected cached fallback, got {}", other),
    }
}
