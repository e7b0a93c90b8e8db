//! The extraction orchestrator.
//!
//! Drives the strategy cascade over a bounded number of rounds, records
//! every applicable try in the memory store, enriches winners with
//! structured metadata, and falls back to alternate URLs when the budget
//! runs out. `extract` never returns an error: total failure is a result
//! with no content and `method_used == "failed"`.

use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::parsers::alternates::discover_alternates;
use crate::parsers::dates::normalize_date;
use crate::parsers::html::select_text;
use crate::parsers::structured::extract_metadata;
use crate::quality::QualityGate;
use crate::strategies::{default_cascade, names, Candidate, Strategy, StrategyContext, StrategyOutcome};
use crate::traits::browser::BrowserEngine;
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::traits::memory::ExtractionMemory;
use crate::types::config::ExtractorConfig;
use crate::types::{attempt::ExtractionAttempt, result::ExtractionResult};

/// The cascade driver.
pub struct Extractor {
    memory: Arc<dyn ExtractionMemory>,
    fetcher: Arc<dyn PageFetcher>,
    browser: Option<Arc<dyn BrowserEngine>>,
    strategies: Vec<Arc<dyn Strategy>>,
    gate: QualityGate,
    config: ExtractorConfig,
}

impl Extractor {
    /// Create an extractor with the default cascade and config.
    pub fn new(memory: Arc<dyn ExtractionMemory>, fetcher: Arc<dyn PageFetcher>) -> Self {
        let config = ExtractorConfig::default();
        Self {
            memory,
            fetcher,
            browser: None,
            strategies: default_cascade(),
            gate: QualityGate::new(config.quality.clone()),
            config,
        }
    }

    /// Attach a browser engine (enables the rendering strategy).
    pub fn with_browser(mut self, browser: Arc<dyn BrowserEngine>) -> Self {
        self.browser = Some(browser);
        self
    }

    /// Replace the configuration. Rebuilds the quality gate from the new
    /// thresholds.
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.gate = QualityGate::new(config.quality.clone());
        self.config = config;
        self
    }

    /// Replace the cascade. Order is significant; callers own it.
    pub fn with_strategies(mut self, strategies: Vec<Arc<dyn Strategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn memory(&self) -> &Arc<dyn ExtractionMemory> {
        &self.memory
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract an article. Infallible by contract.
    pub async fn extract(&self, url: &str) -> ExtractionResult {
        self.extract_with_budget(url, self.config.retry_budget)
            .await
    }

    /// Extract with a per-call retry budget overriding the configured one.
    pub async fn extract_with_budget(&self, url: &str, retry_budget: u32) -> ExtractionResult {
        self.extract_inner(url, retry_budget, &CancellationToken::new())
            .await
    }

    /// Extract with cooperative cancellation. A cancelled call returns the
    /// null result; attempts recorded before the cancellation point stay
    /// recorded.
    pub async fn extract_cancellable(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> ExtractionResult {
        self.extract_inner(url, self.config.retry_budget, token).await
    }

    #[instrument(skip(self, token), fields(url = %url))]
    async fn extract_inner(
        &self,
        url: &str,
        retry_budget: u32,
        token: &CancellationToken,
    ) -> ExtractionResult {
        let Some((normalized, domain)) = normalize_url(url) else {
            warn!(url, "unextractable URL");
            return ExtractionResult::failed();
        };

        let mut last_page: Option<FetchedPage> = None;
        for round in 1..=retry_budget.max(1) {
            if token.is_cancelled() {
                info!(round, "extraction cancelled");
                return ExtractionResult::failed();
            }
            debug!(round, domain, "cascade round");
            match self.run_round(&normalized, &domain, token, &mut last_page).await {
                Some(result) => return result,
                None => continue,
            }
        }

        // The budget is spent; look for a better door into the same story.
        if let Some(page) = &last_page {
            if let Some(result) = self.try_alternates(page, &domain, token).await {
                return result;
            }
        }

        info!(domain, "extraction exhausted every strategy");
        ExtractionResult::failed()
    }

    /// One fetch plus one full pass over the cascade. Returns a result on
    /// success, None when the round produced nothing.
    async fn run_round(
        &self,
        url: &str,
        domain: &str,
        token: &CancellationToken,
        last_page: &mut Option<FetchedPage>,
    ) -> Option<ExtractionResult> {
        let started = Instant::now();
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                // One record per failed round so unreachable hosts build
                // real failure history without inflating it per strategy.
                let attempt = ExtractionAttempt::failed(url, domain, names::FETCH, e.to_string())
                    .with_duration(started.elapsed());
                self.record(&attempt).await;
                return None;
            }
        };
        *last_page = Some(page.clone());

        let ctx = StrategyContext {
            url,
            domain,
            page: &page,
            memory: self.memory.as_ref(),
            gate: &self.gate,
            browser: self.browser.as_deref(),
            config: &self.config,
        };

        for strategy in &self.strategies {
            if token.is_cancelled() {
                return Some(ExtractionResult::failed());
            }
            let started = Instant::now();
            match strategy.attempt(&ctx).await {
                StrategyOutcome::Extracted(candidate) => {
                    let duration = started.elapsed();
                    // Strategies pre-filter, but acceptance is decided here.
                    let verdict = self.gate.evaluate(&candidate.content, candidate.full_article);
                    if !verdict.accepted {
                        let reason = verdict.rejection.unwrap_or("quality rejected");
                        debug!(domain, strategy = strategy.name(), reason, "candidate rejected");
                        let mut attempt =
                            ExtractionAttempt::failed(url, domain, strategy.name(), reason)
                                .with_quality_score(verdict.score)
                                .with_duration(duration);
                        if let Some(selector) = &candidate.selector {
                            attempt = attempt.with_selector(selector.clone());
                        }
                        self.record(&attempt).await;
                        continue;
                    }
                    let mut attempt =
                        ExtractionAttempt::succeeded(url, domain, strategy.name())
                            .with_content_length(candidate.content.chars().count())
                            .with_quality_score(verdict.score)
                            .with_duration(duration);
                    if let Some(selector) = &candidate.selector {
                        attempt = attempt.with_selector(selector.clone());
                    }
                    self.record(&attempt).await;
                    info!(
                        domain,
                        strategy = strategy.name(),
                        chars = attempt.content_length,
                        "extraction succeeded"
                    );
                    return Some(self.finish(candidate, &page, domain).await);
                }
                StrategyOutcome::Skipped(reason) => {
                    debug!(domain, strategy = strategy.name(), %reason, "strategy skipped");
                }
                StrategyOutcome::Failed { error, selector } => {
                    debug!(domain, strategy = strategy.name(), %error, "strategy failed");
                    let mut attempt =
                        ExtractionAttempt::failed(url, domain, strategy.name(), error)
                            .with_duration(started.elapsed());
                    if let Some(selector) = selector {
                        attempt = attempt.with_selector(selector);
                    }
                    self.record(&attempt).await;
                }
            }
        }
        None
    }

    /// Build the final result: truncate, then fill title/date/author from
    /// structured metadata and learned date selectors.
    async fn finish(
        &self,
        candidate: Candidate,
        page: &FetchedPage,
        domain: &str,
    ) -> ExtractionResult {
        let content = truncate_at_sentence(&candidate.content, self.config.max_content_length);
        let mut result = ExtractionResult::with_content(content, candidate.method);

        let meta = extract_metadata(&page.html);
        result.title = meta.title;
        result.author = meta.author;
        result.description = meta.description;
        result.publication_date = meta.published.as_deref().and_then(normalize_date);

        if result.publication_date.is_none() {
            result.publication_date = self.date_from_learned_selectors(page, domain).await;
        }
        result
    }

    /// Try learned date selectors, best first, degrading the ones whose
    /// matches no longer normalize.
    async fn date_from_learned_selectors(
        &self,
        page: &FetchedPage,
        domain: &str,
    ) -> Option<String> {
        let patterns = self.memory.patterns_for_domain(domain).await.ok()?;
        for pattern in patterns
            .iter()
            .filter(|p| p.strategy == names::DATE_SELECTOR)
        {
            let Some(raw) = select_text(&page.html, &pattern.selector) else {
                continue;
            };
            match normalize_date(&raw) {
                Some(date) => {
                    let attempt =
                        ExtractionAttempt::succeeded(&page.url, domain, names::DATE_SELECTOR)
                            .with_selector(pattern.selector.clone())
                            .with_quality_score(1.0)
                            .with_content_length(date.chars().count());
                    self.record(&attempt).await;
                    return Some(date);
                }
                None => {
                    let _ = self
                        .memory
                        .degrade_pattern(domain, &pattern.selector, names::DATE_SELECTOR)
                        .await;
                }
            }
        }
        None
    }

    /// After the main budget: one cascade round each over a bounded set of
    /// canonical/AMP/read-more alternates discovered on the last page.
    async fn try_alternates(
        &self,
        page: &FetchedPage,
        domain: &str,
        token: &CancellationToken,
    ) -> Option<ExtractionResult> {
        if self.config.max_alternate_urls == 0 {
            return None;
        }
        let base = Url::parse(&page.final_url).ok()?;
        let alternates: Vec<String> = discover_alternates(&page.html, &base)
            .into_iter()
            .take(self.config.max_alternate_urls)
            .collect();

        for alternate in alternates {
            if token.is_cancelled() {
                return Some(ExtractionResult::failed());
            }
            info!(domain, %alternate, "trying alternate URL");
            let mut scratch = None;
            if let Some(result) = self
                .run_round(&alternate, domain, token, &mut scratch)
                .await
            {
                return Some(result);
            }
        }
        None
    }

    async fn record(&self, attempt: &ExtractionAttempt) {
        if let Err(e) = self.memory.record_attempt(attempt).await {
            warn!(error = %e, "failed to record attempt");
        }
    }
}

/// Clean and validate a URL; returns the normalized form and its domain.
/// Strips control and zero-width characters that survive copy-paste and
/// drops the fragment. Domains are keyed without a leading `www.` so both
/// hosts share one ledger.
pub fn normalize_url(raw: &str) -> Option<(String, String)> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| {
            !c.is_control()
                && !matches!(c, '\u{200B}'..='\u{200F}' | '\u{FEFF}' | '\u{2060}')
        })
        .collect();

    let mut url = Url::parse(&cleaned).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    let host = url.host_str()?.to_lowercase();
    let domain = host.strip_prefix("www.").unwrap_or(&host).to_string();
    Some((url.to_string(), domain))
}

/// Truncate to at most `max` characters, cutting at the last sentence
/// boundary (falling back to the last whitespace) so output never ends
/// mid-word.
pub fn truncate_at_sentence(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();

    if let Some(idx) = head.rfind(['.', '!', '?']) {
        let cut = &head[..=idx];
        // A boundary too close to the start loses too much; fall through.
        if cut.chars().count() * 2 >= max {
            return cut.trim_end().to_string();
        }
    }
    match head.rfind(char::is_whitespace) {
        Some(idx) => head[..idx].trim_end().to_string(),
        None => head,
    }
}
