//! The selector advisor seam - an LLM asked to propose selectors for a
//! domain the built-in strategies keep failing on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AdvisorResult;

/// One proposed selector with the model's confidence and rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorProposal {
    pub selector: String,
    pub confidence: f32,
    #[serde(default)]
    pub reasoning: String,
}

/// The strict response schema. Anything that does not deserialize into
/// this is discarded wholesale - partial responses are never trusted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedSelectors {
    #[serde(default)]
    pub content_selectors: Vec<SelectorProposal>,

    #[serde(default)]
    pub date_selectors: Vec<SelectorProposal>,

    /// Whether articles on this domain sit behind teaser links
    #[serde(default)]
    pub requires_link_following: bool,

    /// URL patterns identifying the real article pages, when
    /// `requires_link_following` is set
    #[serde(default)]
    pub link_patterns: Vec<String>,
}

/// A low-performing pattern cited in the prompt so the model avoids
/// re-proposing selectors that already failed.
#[derive(Debug, Clone, Serialize)]
pub struct KnownPattern {
    pub selector: String,
    pub strategy: String,
    pub success_rate: f64,
    pub attempts: u64,
}

/// Everything the advisor sees. The HTML excerpt is pre-truncated by the
/// optimizer; implementations must not expand it.
#[derive(Debug, Clone)]
pub struct SelectorRequest {
    pub domain: String,
    pub sample_url: String,
    pub html_excerpt: String,
    pub known_patterns: Vec<KnownPattern>,
}

/// Proposes content and date selectors for a domain.
#[async_trait]
pub trait SelectorAdvisor: Send + Sync {
    async fn propose_selectors(&self, request: &SelectorRequest) -> AdvisorResult<ParsedSelectors>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_schema_rejects_wrong_shape() {
        let bad = r#"{"content_selectors": "not-a-list"}"#;
        assert!(serde_json::from_str::<ParsedSelectors>(bad).is_err());
    }

    #[test]
    fn missing_fields_default() {
        let minimal = r#"{"content_selectors": [{"selector": ".story", "confidence": 0.9}]}"#;
        let parsed: ParsedSelectors = serde_json::from_str(minimal).unwrap();
        assert_eq!(parsed.content_selectors.len(), 1);
        assert!(parsed.date_selectors.is_empty());
        assert!(!parsed.requires_link_following);
    }
}
