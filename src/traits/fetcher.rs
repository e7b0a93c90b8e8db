//! Page fetching abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FetchResult;

/// A fetched page: decoded text plus the raw bytes, which the
/// encoding-sniffing strategy needs untouched.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL as requested
    pub url: String,

    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Body decoded as UTF-8 (lossily, when the page lies about charset)
    pub html: String,

    /// Raw body bytes
    pub bytes: Vec<u8>,

    /// Content-Type header if present
    pub content_type: Option<String>,

    /// When the fetch completed
    pub fetched_at: DateTime<Utc>,
}

impl FetchedPage {
    /// Build a page from already-decoded HTML (tests, cached content).
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let html = html.into();
        Self {
            final_url: url.clone(),
            url,
            status: 200,
            bytes: html.as_bytes().to_vec(),
            html,
            content_type: Some("text/html; charset=utf-8".to_string()),
            fetched_at: Utc::now(),
        }
    }
}

/// Fetches one page over the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a URL, following redirects, retrying transient failures
    /// within the implementation's bounded budget.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;
}
