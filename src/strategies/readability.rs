//! Strategy 2: readability-style scoring of text blocks, no site
//! knowledge required.

use async_trait::async_trait;

use crate::parsers::html::extract_readable;
use crate::strategies::{names, Candidate, Strategy, StrategyContext, StrategyOutcome};

pub struct ReadabilityStrategy;

#[async_trait]
impl Strategy for ReadabilityStrategy {
    fn name(&self) -> &'static str {
        names::READABILITY
    }

    async fn attempt(&self, ctx: &StrategyContext<'_>) -> StrategyOutcome {
        let Some(text) = extract_readable(&ctx.page.html) else {
            return StrategyOutcome::Failed {
                error: "no readable text block found".to_string(),
                selector: None,
            };
        };

        let verdict = ctx.gate.evaluate(&text, true);
        if verdict.accepted {
            StrategyOutcome::Extracted(Candidate {
                content: text,
                selector: None,
                method: names::READABILITY.to_string(),
                full_article: true,
            })
        } else {
            StrategyOutcome::Failed {
                error: format!(
                    "readable block rejected: {}",
                    verdict.rejection.unwrap_or("quality gate")
                ),
                selector: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityGate;
    use crate::stores::MemoryStore;
    use crate::traits::fetcher::FetchedPage;
    use crate::types::config::ExtractorConfig;

    #[tokio::test]
    async fn extracts_article_body() {
        let html = r#"
            <html><body>
            <nav><a href="/">Home</a><a href="/about">About</a></nav>
            <article>
            <p>Researchers announced a breakthrough in battery chemistry on
            Monday, describing a cell that retains most of its capacity after
            thousands of charge cycles in laboratory conditions.</p>
            <p>The team cautioned that manufacturing at scale remains an open
            problem, though several industrial partners have already licensed
            the underlying electrode design for pilot production.</p>
            </article>
            <footer>Copyright 2026. Privacy. Terms.</footer>
            </body></html>
        "#;
        let page = FetchedPage::from_html("https://sci.example/a", html);
        let memory = MemoryStore::new();
        let gate = QualityGate::default();
        let config = ExtractorConfig::default();
        let ctx = StrategyContext {
            url: "https://sci.example/a",
            domain: "sci.example",
            page: &page,
            memory: &memory,
            gate: &gate,
            browser: None,
            config: &config,
        };

        match ReadabilityStrategy.attempt(&ctx).await {
            StrategyOutcome::Extracted(c) => {
                assert!(c.content.contains("battery chemistry"));
                assert!(!c.content.contains("Copyright"));
                assert_eq!(c.method, names::READABILITY);
            }
            other => panic!("expected extraction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fails_on_empty_page() {
        let page = FetchedPage::from_html("https://x.example/a", "<html><body></body></html>");
        let memory = MemoryStore::new();
        let gate = QualityGate::default();
        let config = ExtractorConfig::default();
        let ctx = StrategyContext {
            url: "https://x.example/a",
            domain: "x.example",
            page: &page,
            memory: &memory,
            gate: &gate,
            browser: None,
            config: &config,
        };
        assert!(matches!(
            ReadabilityStrategy.attempt(&ctx).await,
            StrategyOutcome::Failed { .. }
        ));
    }
}
