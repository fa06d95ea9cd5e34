//! Request pipeline for the protected API
//!
//! Every outgoing call is shaped to look like a genuine browser session:
//! caller parameters are merged with the session fingerprint, the merged
//! query is signed by the external signing oracle, and the raw response is
//! classified as success, soft-block, or transport failure. The pipeline
//! performs no retries; retry policy belongs to the orchestration layer.

mod endpoints;
mod pipeline;

pub use endpoints::{COMMENT_PAGE_SIZE, POSTS_PAGE_SIZE, SEARCH_PAGE_SIZE};
pub use pipeline::{
    build_http_client, ApiClient, ProxyInfo, ProxyProvider, SigningOracle, DEFAULT_BASE_URL,
};
