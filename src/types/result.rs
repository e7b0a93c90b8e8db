//! The transient result handed to callers. Never persisted by this crate.

use serde::{Deserialize, Serialize};

/// `method_used` value for a call that exhausted every strategy.
pub const METHOD_FAILED: &str = "failed";

/// Prefix of `method_used` when a learned selector produced the content.
pub const METHOD_LEARNED_PREFIX: &str = "learned_pattern_";

/// Everything a single `extract()` call produces.
///
/// Callers distinguish success from failure only via `content` being
/// present and `method_used`; the orchestrator never returns an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted article text, or None on total failure
    pub content: Option<String>,

    /// Article title if found
    pub title: Option<String>,

    /// Publication date normalized to ISO-8601, or None
    pub publication_date: Option<String>,

    /// Author if found
    pub author: Option<String>,

    /// Short description / standfirst if found
    pub description: Option<String>,

    /// Name of the strategy that produced the content
    pub method_used: String,
}

impl ExtractionResult {
    /// A result with content from the named method.
    pub fn with_content(content: impl Into<String>, method_used: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            title: None,
            publication_date: None,
            author: None,
            description: None,
            method_used: method_used.into(),
        }
    }

    /// The null result returned when every strategy failed.
    pub fn failed() -> Self {
        Self {
            content: None,
            title: None,
            publication_date: None,
            author: None,
            description: None,
            method_used: METHOD_FAILED.to_string(),
        }
    }

    /// Whether the call produced usable content.
    pub fn is_success(&self) -> bool {
        self.content.is_some() && self.method_used != METHOD_FAILED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_shape() {
        let r = ExtractionResult::failed();
        assert!(r.content.is_none());
        assert_eq!(r.method_used, METHOD_FAILED);
        assert!(!r.is_success());
    }

    #[test]
    fn content_result_is_success() {
        let r = ExtractionResult::with_content("body text", "readability");
        assert!(r.is_success());
    }
}
