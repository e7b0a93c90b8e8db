//! Strategy 3: the shared catalogue of common article container
//! selectors, tried in order. A hit here feeds the learned-pattern store
//! through the attempt record, so the catalogue bootstraps per-domain
//! knowledge.

use async_trait::async_trait;
use tracing::debug;

use crate::parsers::html::{select_text, CONTENT_SELECTORS};
use crate::strategies::{names, Candidate, Strategy, StrategyContext, StrategyOutcome};

pub struct SelectorCatalogStrategy;

#[async_trait]
impl Strategy for SelectorCatalogStrategy {
    fn name(&self) -> &'static str {
        names::SELECTOR_CATALOG
    }

    async fn attempt(&self, ctx: &StrategyContext<'_>) -> StrategyOutcome {
        for selector in CONTENT_SELECTORS {
            let Some(text) = select_text(&ctx.page.html, selector) else {
                continue;
            };
            if ctx.gate.is_good_content(&text, true) {
                debug!(domain = ctx.domain, %selector, "catalog selector hit");
                return StrategyOutcome::Extracted(Candidate {
                    content: text,
                    selector: Some(selector.to_string()),
                    method: names::SELECTOR_CATALOG.to_string(),
                    full_article: true,
                });
            }
        }
        StrategyOutcome::Failed {
            error: "no catalog selector produced acceptable content".to_string(),
            selector: None,
        }
    }
}
