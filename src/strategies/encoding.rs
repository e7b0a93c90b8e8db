//! Strategy 5: re-decode the raw bytes for pages whose declared charset
//! lied. Only applies when a fresh decode actually changes the document.

use async_trait::async_trait;
use tracing::debug;

use crate::fetch::encoding::decode_with_fallbacks;
use crate::parsers::html::{extract_readable, select_text, CONTENT_SELECTORS};
use crate::strategies::{names, Candidate, Strategy, StrategyContext, StrategyOutcome};

pub struct EncodingSniffStrategy;

#[async_trait]
impl Strategy for EncodingSniffStrategy {
    fn name(&self) -> &'static str {
        names::ENCODING_SNIFF
    }

    async fn attempt(&self, ctx: &StrategyContext<'_>) -> StrategyOutcome {
        let (redecoded, detected) =
            decode_with_fallbacks(&ctx.page.bytes, ctx.page.content_type.as_deref());

        if redecoded == ctx.page.html {
            return StrategyOutcome::Skipped("page already decoded cleanly".to_string());
        }
        debug!(
            domain = ctx.domain,
            encoding = detected.encoding.name(),
            confidence = detected.confidence,
            "re-decoded page with sniffed charset"
        );

        if let Some(text) = extract_readable(&redecoded) {
            if ctx.gate.is_good_content(&text, true) {
                return StrategyOutcome::Extracted(Candidate {
                    content: text,
                    selector: None,
                    method: names::ENCODING_SNIFF.to_string(),
                    full_article: true,
                });
            }
        }

        for selector in CONTENT_SELECTORS {
            if let Some(text) = select_text(&redecoded, selector) {
                if ctx.gate.is_good_content(&text, true) {
                    return StrategyOutcome::Extracted(Candidate {
                        content: text,
                        selector: Some(selector.to_string()),
                        method: names::ENCODING_SNIFF.to_string(),
                        full_article: true,
                    });
                }
            }
        }

        StrategyOutcome::Failed {
            error: "re-decoded document still produced no acceptable content".to_string(),
            selector: None,
        }
    }
}
