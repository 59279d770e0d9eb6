//! Error types for betblock.

use thiserror::Error;

/// Error type for betblock operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Remote list source answered with a non-success status
    #[error("HTTP error {status} fetching {url}")]
    HttpStatus { status: u16, url: String },

    /// Remote list source could not be reached at all
    #[error("blocklist source unreachable: {0}")]
    Unreachable(String),

    /// Response body could not be read or decoded
    #[error("invalid response body: {0}")]
    InvalidBody(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Custom domain or app identifier empty after trimming
    #[error("empty custom entry")]
    EmptyEntry,

    /// Failure reported by a platform enforcement backend
    #[error("backend error: {0}")]
    Backend(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error means fresh list data is not available right now.
    ///
    /// Unreachable hosts, error statuses and unreadable bodies are all treated
    /// the same by the cache fallback policy.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Error::HttpStatus { .. } | Error::Unreachable(_) | Error::InvalidBody(_)
        )
    }

    /// Whether the remote host could not be reached (no HTTP response).
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Error::Unreachable(_))
    }
}

/// Result type alias for betblock operations.
pub type Result<T> = std::result::Result<T, Error>;
