//! Learned extraction patterns - per-domain selector knowledge with
//! accumulated success/failure evidence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pattern counts as stable after this many uninterrupted successes.
pub const STABLE_AFTER_SUCCESSES: u32 = 3;

/// How a pattern entered the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveredBy {
    /// Curated by hand or promoted from a built-in strategy
    Manual,
    /// Proposed by the selector advisor
    Ai,
}

/// Learned knowledge keyed by (domain, selector, strategy).
///
/// Created on the first success for the triple (or on AI discovery with
/// zero counts) and updated on every subsequent attempt. The `stable` flag
/// holds only while `consecutive_failures == 0` and
/// `consecutive_successes >= STABLE_AFTER_SUCCESSES`; any failure clears it
/// immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionPattern {
    pub domain: String,
    pub selector: String,
    pub strategy: String,

    pub success_count: u64,
    pub failure_count: u64,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,

    /// Running mean quality score over successes (incremental mean)
    pub avg_quality: f32,

    /// Running mean content length over successes (incremental mean)
    pub avg_content_length: f32,

    pub discovered_by: DiscoveredBy,
    pub stable: bool,

    pub last_used_at: Option<DateTime<Utc>>,
}

impl ExtractionPattern {
    /// Create an empty pattern with no evidence yet.
    pub fn new(
        domain: impl Into<String>,
        selector: impl Into<String>,
        strategy: impl Into<String>,
        discovered_by: DiscoveredBy,
    ) -> Self {
        Self {
            domain: domain.into(),
            selector: selector.into(),
            strategy: strategy.into(),
            success_count: 0,
            failure_count: 0,
            consecutive_successes: 0,
            consecutive_failures: 0,
            avg_quality: 0.0,
            avg_content_length: 0.0,
            discovered_by,
            stable: false,
            last_used_at: None,
        }
    }

    /// Total recorded attempts for this pattern.
    pub fn attempts(&self) -> u64 {
        self.success_count + self.failure_count
    }

    /// Derived success rate in [0, 1]. Zero when no attempts exist.
    pub fn success_rate(&self) -> f64 {
        let total = self.attempts();
        if total == 0 {
            0.0
        } else {
            self.success_count as f64 / total as f64
        }
    }

    /// Whether this pattern has never been exercised.
    pub fn is_untested(&self) -> bool {
        self.attempts() == 0
    }

    /// Fold in a success.
    pub fn record_success(&mut self, quality_score: f32, content_length: usize) {
        self.success_count += 1;
        self.consecutive_failures = 0;
        self.consecutive_successes += 1;

        let n = self.success_count as f32;
        self.avg_quality += (quality_score - self.avg_quality) / n;
        self.avg_content_length += (content_length as f32 - self.avg_content_length) / n;

        self.stable = self.consecutive_successes >= STABLE_AFTER_SUCCESSES;
        self.last_used_at = Some(Utc::now());
    }

    /// Fold in a failure. Clears `stable` unconditionally.
    pub fn record_failure(&mut self) {
        self.failure_count += 1;
        self.consecutive_successes = 0;
        self.consecutive_failures += 1;
        self.stable = false;
        self.last_used_at = Some(Utc::now());
    }
}
