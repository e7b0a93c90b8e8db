//! Per-domain rollup statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::types::attempt::ExtractionAttempt;

/// A domain counts as stable at or above this many attempts...
pub const STABILITY_MIN_ATTEMPTS: u64 = 5;
/// ...with at least this success rate.
pub const STABILITY_MIN_SUCCESS_RATE: f64 = 0.7;
/// Below this success rate a domain is considered broken enough to
/// justify optimization spend.
pub const OPTIMIZATION_MAX_SUCCESS_RATE: f64 = 0.5;

/// Per-strategy success/failure counters with average timing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyStats {
    pub successes: u64,
    pub failures: u64,
    /// Running mean duration in milliseconds (incremental mean)
    pub avg_duration_ms: f64,
}

impl StrategyStats {
    pub fn attempts(&self) -> u64 {
        self.successes + self.failures
    }

    fn record(&mut self, success: bool, duration: Duration) {
        if success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
        let n = self.attempts() as f64;
        self.avg_duration_ms += (duration.as_secs_f64() * 1000.0 - self.avg_duration_ms) / n;
    }
}

/// Rollup statistics for one domain, created lazily on first attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainStats {
    pub domain: String,

    pub total_attempts: u64,
    pub successes: u64,
    pub failures: u64,

    /// Per-strategy counters keyed by strategy name
    #[serde(default)]
    pub per_strategy: HashMap<String, StrategyStats>,

    /// Running mean duration across all attempts, milliseconds
    pub avg_duration_ms: f64,

    /// Running mean content length over successes
    pub avg_content_length: f64,

    /// Running mean quality score over successes
    pub avg_quality: f64,

    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
}

impl DomainStats {
    /// Create empty stats for a domain.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            total_attempts: 0,
            successes: 0,
            failures: 0,
            per_strategy: HashMap::new(),
            avg_duration_ms: 0.0,
            avg_content_length: 0.0,
            avg_quality: 0.0,
            last_success_at: None,
            last_failure_at: None,
        }
    }

    /// Success rate in [0, 1]. Zero when no attempts exist.
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.total_attempts as f64
        }
    }

    /// Enough evidence and a high enough rate to trust cheap strategies.
    pub fn is_stable(&self) -> bool {
        self.total_attempts >= STABILITY_MIN_ATTEMPTS
            && self.success_rate() >= STABILITY_MIN_SUCCESS_RATE
    }

    /// Broken or slow enough that optimization spend is justified.
    pub fn needs_optimization(&self, slow_ceiling: Duration) -> bool {
        if self.total_attempts == 0 {
            return false;
        }
        self.success_rate() < OPTIMIZATION_MAX_SUCCESS_RATE
            || self.avg_duration_ms > slow_ceiling.as_secs_f64() * 1000.0
    }

    /// Most recent activity timestamp, used for retention pruning.
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        match (self.last_success_at, self.last_failure_at) {
            (Some(s), Some(f)) => Some(s.max(f)),
            (s, f) => s.or(f),
        }
    }

    /// Fold an attempt into the rollup.
    pub fn record(&mut self, attempt: &ExtractionAttempt) {
        self.total_attempts += 1;
        let n = self.total_attempts as f64;
        self.avg_duration_ms += (attempt.duration.as_secs_f64() * 1000.0 - self.avg_duration_ms) / n;

        if attempt.success {
            self.successes += 1;
            let k = self.successes as f64;
            self.avg_content_length += (attempt.content_length as f64 - self.avg_content_length) / k;
            self.avg_quality += (attempt.quality_score as f64 - self.avg_quality) / k;
            self.last_success_at = Some(attempt.recorded_at);
        } else {
            self.failures += 1;
            self.last_failure_at = Some(attempt.recorded_at);
        }

        self.per_strategy
            .entry(attempt.strategy.clone())
            .or_default()
            .record(attempt.success, attempt.duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(domain: &str, strategy: &str) -> ExtractionAttempt {
        ExtractionAttempt::succeeded("https://example.com/a", domain, strategy)
            .with_content_length(1000)
            .with_quality_score(0.8)
            .with_duration(Duration::from_millis(100))
    }

    fn failure(domain: &str, strategy: &str) -> ExtractionAttempt {
        ExtractionAttempt::failed("https://example.com/a", domain, strategy, "boom")
            .with_duration(Duration::from_millis(50))
    }

    #[test]
    fn five_attempts_four_successes_is_stable() {
        let mut stats = DomainStats::new("d");
        for _ in 0..4 {
            stats.record(&success("d", "readability"));
        }
        stats.record(&failure("d", "readability"));

        assert_eq!(stats.total_attempts, 5);
        assert!(stats.is_stable());
        assert!(!stats.needs_optimization(Duration::from_secs(10)));
    }

    #[test]
    fn three_failures_need_optimization() {
        let mut stats = DomainStats::new("d2");
        for _ in 0..3 {
            stats.record(&failure("d2", "browser"));
        }
        assert!(!stats.is_stable());
        assert!(stats.needs_optimization(Duration::from_secs(10)));
    }

    #[test]
    fn slow_domain_needs_optimization_despite_successes() {
        let mut stats = DomainStats::new("slow");
        for _ in 0..6 {
            let a = success("slow", "browser").with_duration(Duration::from_secs(20));
            stats.record(&a);
        }
        assert!(stats.is_stable());
        assert!(stats.needs_optimization(Duration::from_secs(10)));
    }

    #[test]
    fn per_strategy_counters() {
        let mut stats = DomainStats::new("d");
        stats.record(&success("d", "readability"));
        stats.record(&failure("d", "browser"));

        assert_eq!(stats.per_strategy["readability"].successes, 1);
        assert_eq!(stats.per_strategy["browser"].failures, 1);
        assert!(stats.last_activity().is_some());
    }
}
