//! Strategy 1: selectors this domain has already proven out, plus any
//! AI-proposed selectors that have never been exercised.

use async_trait::async_trait;
use tracing::debug;

use crate::parsers::html::select_text;
use crate::strategies::{names, Candidate, Strategy, StrategyContext, StrategyOutcome};
use crate::types::result::METHOD_LEARNED_PREFIX;

pub struct LearnedPatternStrategy;

#[async_trait]
impl Strategy for LearnedPatternStrategy {
    fn name(&self) -> &'static str {
        names::LEARNED_PATTERN
    }

    async fn attempt(&self, ctx: &StrategyContext<'_>) -> StrategyOutcome {
        let best = match ctx.memory.best_pattern(ctx.domain).await {
            Ok(best) => best,
            Err(e) => {
                return StrategyOutcome::Failed {
                    error: format!("pattern lookup failed: {e}"),
                    selector: None,
                }
            }
        };
        let untested = ctx
            .memory
            .untested_ai_patterns(ctx.domain)
            .await
            .unwrap_or_default();

        let mut selectors: Vec<String> = Vec::new();
        if let Some(best) = &best {
            selectors.push(best.selector.clone());
        }
        for p in &untested {
            if p.strategy != names::DATE_SELECTOR && !selectors.contains(&p.selector) {
                selectors.push(p.selector.clone());
            }
        }

        if selectors.is_empty() {
            return StrategyOutcome::Skipped("no learned patterns for domain".to_string());
        }

        let mut tried: Vec<String> = Vec::new();
        for selector in selectors {
            let Some(text) = select_text(&ctx.page.html, &selector) else {
                tried.push(selector);
                continue;
            };
            if ctx.gate.is_good_content(&text, true) {
                debug!(domain = ctx.domain, %selector, "learned pattern hit");
                // Degrade the selectors that came up empty before this one.
                for miss in &tried {
                    let _ = ctx
                        .memory
                        .degrade_pattern(ctx.domain, miss, names::LEARNED_PATTERN)
                        .await;
                }
                return StrategyOutcome::Extracted(Candidate {
                    content: text,
                    method: format!("{METHOD_LEARNED_PREFIX}{selector}"),
                    selector: Some(selector),
                    full_article: true,
                });
            }
            tried.push(selector);
        }

        // The attempt record degrades the first selector; the rest are
        // degraded here so every miss counts against its own pattern.
        let (primary, rest) = tried
            .split_first()
            .map(|(p, r)| (p.clone(), r.to_vec()))
            .unwrap_or_default();
        for miss in &rest {
            let _ = ctx
                .memory
                .degrade_pattern(ctx.domain, miss, names::LEARNED_PATTERN)
                .await;
        }

        StrategyOutcome::Failed {
            error: "no learned selector produced acceptable content".to_string(),
            selector: Some(primary),
        }
    }
}
