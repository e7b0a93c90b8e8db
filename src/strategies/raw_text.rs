//! Strategy 6: the last resort. Strip markup, keep whatever text is left
//! if it clears a bare length floor and is not an error page.

use async_trait::async_trait;

use crate::parsers::html::{normalize_whitespace, strip_boilerplate};
use crate::quality::has_boilerplate;
use crate::strategies::{names, Candidate, Strategy, StrategyContext, StrategyOutcome};

pub struct RawTextStrategy;

#[async_trait]
impl Strategy for RawTextStrategy {
    fn name(&self) -> &'static str {
        names::RAW_TEXT
    }

    async fn attempt(&self, ctx: &StrategyContext<'_>) -> StrategyOutcome {
        let text = normalize_whitespace(&strip_boilerplate(&ctx.page.html));

        if text.chars().count() < ctx.gate.thresholds().raw_text_floor {
            return StrategyOutcome::Failed {
                error: "stripped text below raw floor".to_string(),
                selector: None,
            };
        }
        if has_boilerplate(&text) {
            return StrategyOutcome::Failed {
                error: "stripped text is an error page".to_string(),
                selector: None,
            };
        }

        StrategyOutcome::Extracted(Candidate {
            content: text,
            selector: None,
            method: names::RAW_TEXT.to_string(),
            full_article: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityGate;
    use crate::stores::MemoryStore;
    use crate::traits::fetcher::FetchedPage;
    use crate::types::config::ExtractorConfig;

    fn ctx<'a>(
        page: &'a FetchedPage,
        memory: &'a MemoryStore,
        gate: &'a QualityGate,
        config: &'a ExtractorConfig,
    ) -> StrategyContext<'a> {
        StrategyContext {
            url: "https://x.example/a",
            domain: "x.example",
            page,
            memory,
            gate,
            browser: None,
            config,
        }
    }

    #[tokio::test]
    async fn accepts_plain_text_above_floor() {
        let html = "<html><body><div>Officials released the annual water \
            quality report on Thursday, noting steady improvement in three of \
            the four monitored watersheds across the county.</div></body></html>";
        let page = FetchedPage::from_html("https://x.example/a", html);
        let memory = MemoryStore::new();
        let gate = QualityGate::default();
        let config = ExtractorConfig::default();

        match RawTextStrategy.attempt(&ctx(&page, &memory, &gate, &config)).await {
            StrategyOutcome::Extracted(c) => {
                assert_eq!(c.method, names::RAW_TEXT);
                assert!(!c.full_article);
            }
            other => panic!("expected extraction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_error_pages() {
        let html = "<html><body>Page not found. The page you requested does \
            not exist on this server anymore. Try searching from the homepage \
            or browse the archive for older stories and features.</body></html>";
        let page = FetchedPage::from_html("https://x.example/a", html);
        let memory = MemoryStore::new();
        let gate = QualityGate::default();
        let config = ExtractorConfig::default();
        assert!(matches!(
            RawTextStrategy.attempt(&ctx(&page, &memory, &gate, &config)).await,
            StrategyOutcome::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn rejects_below_floor() {
        let page = FetchedPage::from_html("https://x.example/a", "<html><body>hi</body></html>");
        let memory = MemoryStore::new();
        let gate = QualityGate::default();
        let config = ExtractorConfig::default();
        assert!(matches!(
            RawTextStrategy.attempt(&ctx(&page, &memory, &gate, &config)).await,
            StrategyOutcome::Failed { .. }
        ));
    }
}
