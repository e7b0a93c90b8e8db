//! Strategy 4: headless rendering for JavaScript-built pages.

use async_trait::async_trait;

use crate::parsers::html::normalize_whitespace;
use crate::strategies::{names, Candidate, Strategy, StrategyContext, StrategyOutcome};
use crate::traits::browser::RenderMethod;

pub struct BrowserRenderStrategy;

#[async_trait]
impl Strategy for BrowserRenderStrategy {
    fn name(&self) -> &'static str {
        names::BROWSER
    }

    async fn attempt(&self, ctx: &StrategyContext<'_>) -> StrategyOutcome {
        let Some(browser) = ctx.browser else {
            return StrategyOutcome::Skipped("no browser engine configured".to_string());
        };

        let rendered = match browser.render(ctx.url).await {
            Ok(rendered) => rendered,
            Err(e) => {
                return StrategyOutcome::Failed {
                    error: format!("render failed: {e}"),
                    selector: None,
                }
            }
        };

        let text = normalize_whitespace(&rendered.text);
        let (selector, full_article) = match &rendered.method {
            RenderMethod::Selector(s) => (Some(s.clone()), true),
            RenderMethod::Paragraphs => (None, true),
            RenderMethod::FullDocument => (None, false),
        };

        let verdict = ctx.gate.evaluate(&text, full_article);
        if verdict.accepted {
            StrategyOutcome::Extracted(Candidate {
                content: text,
                selector,
                method: names::BROWSER.to_string(),
                full_article,
            })
        } else {
            StrategyOutcome::Failed {
                error: format!(
                    "rendered text rejected: {}",
                    verdict.rejection.unwrap_or("quality gate")
                ),
                selector,
            }
        }
    }
}
