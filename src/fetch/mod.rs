//! Page fetching
//!
//! Retrieves raw page content for the crawl stages

mod http;

pub use http::{HttpFetcher, HttpFetcherConfig, DEFAULT_USER_AGENT};

use async_trait::async_trait;
use thiserror::Error;

/// Network or HTTP failure while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or body-read failure
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },
    /// Server answered with a non-success status
    #[error("HTTP {status_code} from {url}: {message}")]
    Status {
        url: String,
        status_code: u16,
        message: String,
    },
}

impl FetchError {
    /// HTTP status code, if the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status { status_code, .. } => Some(*status_code),
            FetchError::Transport { .. } => None,
        }
    }
}

/// Trait for page fetcher implementations
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `url` and return its body
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
