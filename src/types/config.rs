//! Configuration for the extraction pipeline.
//!
//! Every threshold the pipeline consults lives here as a named field with
//! a documented default, so behavior stays reproducible across deployments.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for an `Extractor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Cascade rounds per `extract()` call. Default: 3.
    pub retry_budget: u32,

    /// Maximum content length; longer text is truncated at a sentence
    /// boundary. Default: 10 000.
    pub max_content_length: usize,

    /// How many canonical/AMP/"read more" alternates to try after the
    /// retry budget is exhausted. Default: 2.
    pub max_alternate_urls: usize,

    /// Average extraction time above which a domain counts as slow enough
    /// to justify optimization. Default: 10s.
    pub slow_domain_ceiling: Duration,

    /// Domains with no activity for this long are pruned. Default: 30 days.
    pub domain_retention: Duration,

    pub quality: QualityThresholds,
    pub fetch: FetchConfig,
    pub browser: BrowserConfig,
    pub advisor: AdvisorConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            retry_budget: 3,
            max_content_length: 10_000,
            max_alternate_urls: 2,
            slow_domain_ceiling: Duration::from_secs(10),
            domain_retention: Duration::from_secs(30 * 24 * 60 * 60),
            quality: QualityThresholds::default(),
            fetch: FetchConfig::default(),
            browser: BrowserConfig::default(),
            advisor: AdvisorConfig::default(),
        }
    }
}

impl ExtractorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry budget.
    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    /// Set the maximum content length.
    pub fn with_max_content_length(mut self, max: usize) -> Self {
        self.max_content_length = max;
        self
    }

    /// Replace the quality thresholds.
    pub fn with_quality(mut self, quality: QualityThresholds) -> Self {
        self.quality = quality;
        self
    }

    /// Replace the browser settings.
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }
}

/// Thresholds for the composite content quality gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Minimum acceptable length; halved when the full-article hint is set.
    /// Default: 200.
    pub min_length: usize,

    /// Lower bound on whitespace chars / total chars. Default: 0.05.
    pub min_whitespace_ratio: f32,

    /// Upper bound on whitespace chars / total chars. Default: 0.5.
    pub max_whitespace_ratio: f32,

    /// Minimum number of real sentences; 1 under the full-article hint.
    /// Default: 2.
    pub min_sentences: usize,

    /// A sentence counts only above this many characters. Default: 10.
    pub min_sentence_chars: usize,

    /// Minimum average length of counted sentences. Default: 15.
    pub min_avg_sentence_chars: f32,

    /// Minimum unique-words (len > 3) / total-words ratio. Default: 0.3.
    pub min_unique_word_ratio: f32,

    /// Maximum navigation/boilerplate keyword share of all words;
    /// relaxed under the full-article hint. Defaults: 0.10 / 0.15.
    pub max_nav_keyword_ratio: f32,
    pub relaxed_nav_keyword_ratio: f32,

    /// No single word (len > 4) may exceed this share of all words.
    /// Default: 0.15.
    pub max_single_word_ratio: f32,

    /// Floor for the raw-text last-resort strategy. Default: 100.
    pub raw_text_floor: usize,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_length: 200,
            min_whitespace_ratio: 0.05,
            max_whitespace_ratio: 0.5,
            min_sentences: 2,
            min_sentence_chars: 10,
            min_avg_sentence_chars: 15.0,
            min_unique_word_ratio: 0.3,
            max_nav_keyword_ratio: 0.10,
            relaxed_nav_keyword_ratio: 0.15,
            max_single_word_ratio: 0.15,
            raw_text_floor: 100,
        }
    }
}

impl QualityThresholds {
    /// Set the minimum content length.
    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = min;
        self
    }
}

/// HTTP fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout. Default: 20s.
    pub timeout: Duration,

    /// Bounded retries per fetch. Default: 3.
    pub retries: u32,

    /// Fixed backoff between retries. Default: 500ms.
    pub backoff: Duration,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Sustained request rate for the rate-limited wrapper. Default: 4.
    pub requests_per_second: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            retries: 3,
            backoff: Duration::from_millis(500),
            user_agent: "article-extraction/0.1".to_string(),
            requests_per_second: 4,
        }
    }
}

impl FetchConfig {
    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry count.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Headless browser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Process-wide ceiling on concurrent browser sessions. Default: 2.
    pub max_sessions: usize,

    /// Per-navigation timeout. Default: 15s.
    pub navigation_timeout: Duration,

    /// Hard total budget for one render; every wait point recomputes its
    /// allowance from this. Default: 30s.
    pub total_budget: Duration,

    /// Paragraph aggregation needs at least this many paragraphs... Default: 3.
    pub min_paragraphs: usize,

    /// ...each longer than this many characters. Default: 50.
    pub min_paragraph_chars: usize,

    /// Body text length treated as "substantial content appeared".
    /// Default: 400.
    pub settle_chars: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            max_sessions: 2,
            navigation_timeout: Duration::from_secs(15),
            total_budget: Duration::from_secs(30),
            min_paragraphs: 3,
            min_paragraph_chars: 50,
            settle_chars: 400,
        }
    }
}

impl BrowserConfig {
    /// Set the session ceiling.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    /// Set the total render budget.
    pub fn with_total_budget(mut self, budget: Duration) -> Self {
        self.total_budget = budget;
        self
    }
}

/// Selector advisor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Proposals below this confidence are discarded. Default: 0.3.
    pub confidence_floor: f32,

    /// How many low-performing patterns the prompt may cite. Default: 5.
    pub max_patterns_in_prompt: usize,

    /// HTML excerpt length included in the prompt. Default: 8000 chars.
    pub html_excerpt_chars: usize,

    /// Model name for the OpenAI-compatible advisor.
    pub model: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.3,
            max_patterns_in_prompt: 5,
            html_excerpt_chars: 8_000,
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl AdvisorConfig {
    /// Set the confidence floor.
    pub fn with_confidence_floor(mut self, floor: f32) -> Self {
        self.confidence_floor = floor;
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ExtractorConfig::default();
        assert_eq!(config.retry_budget, 3);
        assert_eq!(config.browser.max_sessions, 2);
        assert_eq!(config.quality.min_length, 200);
        assert!((config.advisor.confidence_floor - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn builder_methods() {
        let config = ExtractorConfig::new()
            .with_retry_budget(1)
            .with_max_content_length(500)
            .with_quality(QualityThresholds::default().with_min_length(50));

        assert_eq!(config.retry_budget, 1);
        assert_eq!(config.max_content_length, 500);
        assert_eq!(config.quality.min_length, 50);
    }
}
