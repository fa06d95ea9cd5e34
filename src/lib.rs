//! Tidecomb: a session-aware media feed harvester
//!
//! This crate implements the crawl-orchestration core of a harvester that
//! walks a paginated, authenticated media API: keyword search → content
//! items → comments → replies, and creator → content items → comments.
//! Transport signing, browser sessions, proxies, and result storage are
//! external collaborators consumed through capability traits.

pub mod client;
pub mod config;
pub mod crawler;
pub mod model;
pub mod session;
pub mod sink;

use thiserror::Error;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The remote service answered with its soft-block signature: an empty
    /// body or the known block sentinel. The session is likely rate limited
    /// or banned.
    #[error("Soft-blocked at {endpoint}: {reason}")]
    Blocked { endpoint: String, reason: String },

    /// A response body was present but could not be parsed as the expected
    /// structure, or was missing an expected top-level field.
    #[error("Unparseable response from {endpoint}: {message} (body: {body_snippet})")]
    DataFetch {
        endpoint: String,
        message: String,
        body_snippet: String,
    },

    /// A valid response indicating the requested id does not exist. Treated
    /// as a skip, not a failure.
    #[error("Item not found: {id}")]
    ItemNotFound { id: String },

    #[error("HTTP transport error for {endpoint}: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Signing oracle failure: {0}")]
    Signing(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl HarvestError {
    /// Whether this error should abort the pagination stream it occurred in.
    ///
    /// `ItemNotFound` is a normal empty result; everything else observed
    /// during a page fetch terminates that stream (but never its siblings).
    pub fn aborts_stream(&self) -> bool {
        !matches!(self, HarvestError::ItemNotFound { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{ApiClient, ProxyInfo, ProxyProvider, SigningOracle};
pub use config::{CrawlMode, HarvestConfig};
pub use crawler::Harvester;
pub use model::{Comment, ContentItem, ItemRef, ReplyExpansion};
pub use session::{BrowserSession, SessionState};
pub use sink::{MemorySink, Sink};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_not_found_does_not_abort() {
        let err = HarvestError::ItemNotFound {
            id: "123".to_string(),
        };
        assert!(!err.aborts_stream());
    }

    #[test]
    fn test_blocked_aborts_stream() {
        let err = HarvestError::Blocked {
            endpoint: "/aweme/v1/web/comment/list/".to_string(),
            reason: "empty body".to_string(),
        };
        assert!(err.aborts_stream());
    }

    #[test]
    fn test_error_display_includes_context() {
        let err = HarvestError::DataFetch {
            endpoint: "/aweme/v1/web/general/search/single/".to_string(),
            message: "expected value".to_string(),
            body_snippet: "<html>".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("/aweme/v1/web/general/search/single/"));
        assert!(text.contains("<html>"));
    }
}
