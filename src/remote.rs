//! Remote blocklist fetching.
//!
//! This module provides the [`ListFetcher`] seam and [`HttpListFetcher`],
//! which handles:
//! - Plain GET of a fixed text URL
//! - ETag-based conditional requests (304 Not Modified)
//! - Gzip decompression of `.gz` payloads
//! - Telling error statuses apart from unreachable hosts
//!
//! There are no retries at this layer.

use flate2::read::GzDecoder;
use std::io::Read;
use std::time::Duration;

use crate::{Error, Result};

/// Default blocklist source: one gambling domain per line.
pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/blocklistproject/Lists/master/alt-version/gambling-nl.txt";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedList {
    /// Fresh list text, with the ETag if the server sent one
    Modified { text: String, etag: Option<String> },
    /// The server confirmed the list behind the sent ETag is current
    NotModified,
}

/// Source of raw blocklist text.
pub trait ListFetcher: Send + Sync {
    /// Fetch the list.
    ///
    /// When `etag` is given the request is conditional and may return
    /// [`FetchedList::NotModified`].
    fn fetch(&self, etag: Option<&str>) -> Result<FetchedList>;
}

/// Fetches the blocklist over HTTP(S).
///
/// # Example
///
/// ```ignore
/// use betblock::remote::{HttpListFetcher, ListFetcher, FetchedList};
///
/// let fetcher = HttpListFetcher::new("https://example.com/gambling.txt");
/// if let FetchedList::Modified { text, .. } = fetcher.fetch(None)? {
///     println!("{} bytes", text.len());
/// }
/// ```
pub struct HttpListFetcher {
    url: String,
    agent: ureq::Agent,
}

impl HttpListFetcher {
    /// Create a fetcher for `url` with the default timeout.
    pub fn new(url: &str) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create a fetcher for `url` with a custom timeout.
    pub fn with_timeout(url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("betblock/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            url: url.to_string(),
            agent,
        }
    }

    /// Get the URL being used.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Read the body, decompressing gzip if needed.
    fn read_body(&self, response: ureq::Response) -> Result<String> {
        let mut raw_data = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut raw_data)
            .map_err(|e| Error::InvalidBody(format!("failed to read response: {}", e)))?;

        let raw_len = raw_data.len();
        let data = if is_gzip(&raw_data) {
            let mut decoder = GzDecoder::new(&raw_data[..]);
            let mut data = Vec::new();
            decoder
                .read_to_end(&mut data)
                .map_err(|e| Error::InvalidBody(format!("gzip decompression failed: {}", e)))?;
            log::debug!(
                "Decompressed blocklist: {} bytes (compressed: {} bytes)",
                data.len(),
                raw_len
            );
            data
        } else {
            raw_data
        };

        String::from_utf8(data).map_err(|e| Error::InvalidBody(format!("not UTF-8: {}", e)))
    }
}

impl ListFetcher for HttpListFetcher {
    fn fetch(&self, etag: Option<&str>) -> Result<FetchedList> {
        let mut request = self.agent.get(&self.url);
        if let Some(etag) = etag {
            request = request.set("If-None-Match", etag);
        }

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(Error::HttpStatus {
                    status,
                    url: self.url.clone(),
                });
            }
            Err(ureq::Error::Transport(t)) => return Err(Error::Unreachable(t.to_string())),
        };

        // ureq only turns 4xx/5xx into errors
        let status = response.status();
        if status == 304 && etag.is_some() {
            log::debug!("Blocklist not modified (304)");
            return Ok(FetchedList::NotModified);
        }
        if !(200..300).contains(&status) {
            return Err(Error::HttpStatus {
                status,
                url: self.url.clone(),
            });
        }

        let new_etag = response.header("ETag").map(str::to_string);
        let text = self.read_body(response)?;
        log::info!("Downloaded blocklist from {}: {} bytes", self.url, text.len());

        Ok(FetchedList::Modified {
            text,
            etag: new_etag,
        })
    }
}

/// Check if data is gzip compressed.
fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}
