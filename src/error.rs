//! Typed errors for the extraction pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. None of these errors cross
//! the orchestrator's public boundary: `Extractor::extract` converts every
//! failure mode into a recorded attempt and a null result.

use thiserror::Error;

/// Errors that can occur during extraction operations.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Page fetch failed after retries
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Headless rendering failed
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Selector advisor call failed or returned garbage
    #[error("advisor error: {0}")]
    Advisor(#[from] AdvisorError),

    /// Malformed HTML or structured data
    #[error("parse error: {0}")]
    Parse(String),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// URL could not be normalized
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Filesystem error (snapshot load/save)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while fetching a page over HTTP.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connection, TLS, protocol)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Request timed out
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Retry budget exhausted
    #[error("gave up on {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },
}

impl FetchError {
    /// Whether a retry within the fetch budget is worthwhile.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Http(_) => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors from the headless browser engine.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Browser process failed to launch
    #[error("browser launch failed: {0}")]
    Launch(String),

    /// Navigation failed or was rejected
    #[error("navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    /// Script evaluation inside the page failed
    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    /// Total operation budget exceeded
    #[error("render budget exceeded for: {url}")]
    Timeout { url: String },

    /// Page rendered but produced no usable text
    #[error("no usable content rendered for: {url}")]
    NoContent { url: String },

    /// Session semaphore closed (engine shutting down)
    #[error("browser session limit unavailable")]
    SessionUnavailable,
}

/// Errors from the AI selector advisor.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// HTTP transport failure talking to the model API
    #[error("advisor HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Response was not valid JSON or did not match the schema
    #[error("unparseable advisor response: {0}")]
    InvalidResponse(String),

    /// Model returned nothing
    #[error("empty advisor response")]
    EmptyResponse,

    /// API key not configured
    #[error("advisor API key not set")]
    MissingApiKey,
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for browser operations.
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// Result type alias for advisor operations.
pub type AdvisorResult<T> = std::result::Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_fetch_errors() {
        assert!(FetchError::Timeout {
            url: "https://example.com".into()
        }
        .is_transient());
        assert!(FetchError::Status {
            url: "https://example.com".into(),
            status: 503
        }
        .is_transient());
        assert!(!FetchError::Status {
            url: "https://example.com".into(),
            status: 404
        }
        .is_transient());
    }
}
