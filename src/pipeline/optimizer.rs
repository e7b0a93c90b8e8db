//! AI-assisted selector discovery for domains the cascade keeps failing.
//!
//! The optimizer never touches the hot path: it runs out of band, asks the
//! advisor for selector proposals, and seeds them into the pattern store
//! as untested candidates for the learned-pattern strategy to try. A
//! malformed or failed advisor response discards the whole proposal set;
//! nothing partial is ever stored.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pipeline::stability::DomainStabilityTracker;
use crate::strategies::names;
use crate::traits::advisor::{KnownPattern, SelectorAdvisor, SelectorRequest};
use crate::traits::fetcher::PageFetcher;
use crate::traits::memory::ExtractionMemory;
use crate::types::config::AdvisorConfig;
use crate::types::pattern::DiscoveredBy;

/// Drives advisor calls for struggling domains.
pub struct SelectorOptimizer {
    memory: Arc<dyn ExtractionMemory>,
    fetcher: Arc<dyn PageFetcher>,
    advisor: Arc<dyn SelectorAdvisor>,
    tracker: DomainStabilityTracker,
    config: AdvisorConfig,
}

impl SelectorOptimizer {
    pub fn new(
        memory: Arc<dyn ExtractionMemory>,
        fetcher: Arc<dyn PageFetcher>,
        advisor: Arc<dyn SelectorAdvisor>,
        tracker: DomainStabilityTracker,
        config: AdvisorConfig,
    ) -> Self {
        Self {
            memory,
            fetcher,
            advisor,
            tracker,
            config,
        }
    }

    /// Analyze one domain using a sample article URL. Returns how many new
    /// patterns were stored (zero when the decision table says no, the
    /// sample page is unreachable, or the advisor response is unusable).
    pub async fn optimize_domain(&self, domain: &str, sample_url: &str) -> Result<usize> {
        let decision = self.tracker.should_optimize(domain).await?;
        if !decision.approved {
            debug!(domain, reason = decision.reason, "skipping optimization");
            return Ok(0);
        }
        info!(domain, reason = decision.reason, "optimizing domain");

        let page = match self.fetcher.fetch(sample_url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(domain, sample_url, error = %e, "sample fetch failed");
                return Ok(0);
            }
        };

        let excerpt: String = page.html.chars().take(self.config.html_excerpt_chars).collect();
        let known_patterns = self.low_performers(domain).await?;

        let request = SelectorRequest {
            domain: domain.to_string(),
            sample_url: sample_url.to_string(),
            html_excerpt: excerpt,
            known_patterns,
        };

        let parsed = match self.advisor.propose_selectors(&request).await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(domain, error = %e, "advisor response discarded");
                return Ok(0);
            }
        };

        let mut stored = 0usize;
        for proposal in &parsed.content_selectors {
            if proposal.confidence < self.config.confidence_floor {
                debug!(
                    domain,
                    selector = %proposal.selector,
                    confidence = proposal.confidence,
                    "proposal below confidence floor"
                );
                continue;
            }
            self.memory
                .add_discovered_pattern(
                    domain,
                    &proposal.selector,
                    names::LEARNED_PATTERN,
                    DiscoveredBy::Ai,
                )
                .await?;
            stored += 1;
        }
        for proposal in &parsed.date_selectors {
            if proposal.confidence < self.config.confidence_floor {
                continue;
            }
            self.memory
                .add_discovered_pattern(
                    domain,
                    &proposal.selector,
                    names::DATE_SELECTOR,
                    DiscoveredBy::Ai,
                )
                .await?;
            stored += 1;
        }

        info!(domain, stored, "stored advisor proposals");
        Ok(stored)
    }

    /// Run the decision table over every domain the store flags, bounded
    /// by `limit`. Sample URLs default to the domain root.
    pub async fn optimize_pending(&self, limit: usize) -> Result<usize> {
        let domains = self.memory.domains_needing_analysis(limit).await?;
        let mut total = 0usize;
        for domain in domains {
            let sample_url = format!("https://{domain}/");
            total += self.optimize_domain(&domain, &sample_url).await?;
        }
        Ok(total)
    }

    /// The worst-performing exercised patterns, cited in the prompt so the
    /// model avoids re-proposing known failures.
    async fn low_performers(&self, domain: &str) -> Result<Vec<KnownPattern>> {
        let mut patterns: Vec<KnownPattern> = self
            .memory
            .patterns_for_domain(domain)
            .await?
            .into_iter()
            .filter(|p| !p.is_untested())
            .map(|p| KnownPattern {
                success_rate: p.success_rate(),
                attempts: p.attempts(),
                selector: p.selector,
                strategy: p.strategy,
            })
            .collect();
        patterns.sort_by(|a, b| {
            a.success_rate
                .partial_cmp(&b.success_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        patterns.truncate(self.config.max_patterns_in_prompt);
        Ok(patterns)
    }
}
