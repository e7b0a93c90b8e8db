//! The extraction strategy cascade.
//!
//! Strategies run in a fixed order from cheapest to most expensive. Each
//! one either produces a candidate, fails (which is recorded as evidence
//! against the domain), or declares itself inapplicable (which records
//! nothing, so domains are not penalized for strategies that could never
//! have worked).

use async_trait::async_trait;
use std::sync::Arc;

use crate::quality::QualityGate;
use crate::traits::browser::BrowserEngine;
use crate::traits::fetcher::FetchedPage;
use crate::traits::memory::ExtractionMemory;
use crate::types::config::ExtractorConfig;

pub mod browser;
pub mod encoding;
pub mod learned;
pub mod raw_text;
pub mod readability;
pub mod selectors;

pub use browser::BrowserRenderStrategy;
pub use encoding::EncodingSniffStrategy;
pub use learned::LearnedPatternStrategy;
pub use raw_text::RawTextStrategy;
pub use readability::ReadabilityStrategy;
pub use selectors::SelectorCatalogStrategy;

/// Canonical strategy names, used in attempt records and pattern keys.
pub mod names {
    /// Pseudo-strategy recorded when the page fetch itself fails.
    pub const FETCH: &str = "fetch";
    pub const LEARNED_PATTERN: &str = "learned_pattern";
    pub const READABILITY: &str = "readability";
    pub const SELECTOR_CATALOG: &str = "selector_catalog";
    pub const BROWSER: &str = "browser";
    pub const ENCODING_SNIFF: &str = "encoding_sniff";
    pub const RAW_TEXT: &str = "raw_text";
    /// Pattern strategy for learned date selectors.
    pub const DATE_SELECTOR: &str = "date";
}

/// Everything a strategy may consult for one attempt.
pub struct StrategyContext<'a> {
    pub url: &'a str,
    pub domain: &'a str,
    pub page: &'a FetchedPage,
    pub memory: &'a dyn ExtractionMemory,
    pub gate: &'a QualityGate,
    pub browser: Option<&'a dyn BrowserEngine>,
    pub config: &'a ExtractorConfig,
}

/// A content candidate that already passed the quality gate.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub content: String,

    /// Selector that produced the content, when one did. Recorded on the
    /// attempt so successful selectors become learned patterns.
    pub selector: Option<String>,

    /// Value for `ExtractionResult::method_used`
    pub method: String,

    /// Whether the content came from a dedicated article container
    pub full_article: bool,
}

/// The three ways a strategy attempt can end.
#[derive(Debug)]
pub enum StrategyOutcome {
    /// Gate-approved content. The cascade stops here.
    Extracted(Candidate),

    /// The strategy could not apply to this page at all. Nothing is
    /// recorded; the cascade moves on.
    Skipped(String),

    /// The strategy applied and did not produce acceptable content.
    /// Recorded as a failed attempt (degrading `selector` if set).
    Failed {
        error: String,
        selector: Option<String>,
    },
}

/// One rung of the cascade.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Name used in attempt records.
    fn name(&self) -> &'static str;

    /// Try to extract gate-worthy content from the fetched page.
    async fn attempt(&self, ctx: &StrategyContext<'_>) -> StrategyOutcome;
}

/// The standard cascade, cheapest first.
pub fn default_cascade() -> Vec<Arc<dyn Strategy>> {
    vec![
        Arc::new(LearnedPatternStrategy),
        Arc::new(ReadabilityStrategy),
        Arc::new(SelectorCatalogStrategy),
        Arc::new(BrowserRenderStrategy),
        Arc::new(EncodingSniffStrategy),
        Arc::new(RawTextStrategy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_order_is_cheapest_first() {
        let cascade = default_cascade();
        let order: Vec<&str> = cascade.iter().map(|s| s.name()).collect();
        assert_eq!(
            order,
            vec![
                names::LEARNED_PATTERN,
                names::READABILITY,
                names::SELECTOR_CATALOG,
                names::BROWSER,
                names::ENCODING_SNIFF,
                names::RAW_TEXT,
            ]
        );
    }
}
