//! Domain stability tracking - the gatekeeper for optimization spend.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::traits::memory::ExtractionMemory;
use crate::types::config::ExtractorConfig;
use crate::types::domain::STABILITY_MIN_ATTEMPTS;

/// Whether a domain justifies an advisor call, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationDecision {
    pub approved: bool,
    pub reason: &'static str,
}

impl OptimizationDecision {
    fn rejected(reason: &'static str) -> Self {
        Self {
            approved: false,
            reason,
        }
    }

    fn approved(reason: &'static str) -> Self {
        Self {
            approved: true,
            reason,
        }
    }
}

/// Reads domain rollups and answers two questions: is this domain healthy,
/// and is it worth spending advisor tokens on.
#[derive(Clone)]
pub struct DomainStabilityTracker {
    memory: Arc<dyn ExtractionMemory>,
    slow_ceiling: Duration,
    retention: Duration,
}

impl DomainStabilityTracker {
    pub fn new(memory: Arc<dyn ExtractionMemory>, slow_ceiling: Duration) -> Self {
        Self {
            memory,
            slow_ceiling,
            retention: ExtractorConfig::default().domain_retention,
        }
    }

    /// Build from the configured slow ceiling and retention window.
    pub fn from_config(memory: Arc<dyn ExtractionMemory>, config: &ExtractorConfig) -> Self {
        Self {
            memory,
            slow_ceiling: config.slow_domain_ceiling,
            retention: config.domain_retention,
        }
    }

    /// Drop domains whose last activity predates the retention window.
    /// Returns how many were removed.
    pub async fn prune_expired(&self) -> Result<usize> {
        let window = chrono::Duration::from_std(self.retention)
            .unwrap_or_else(|_| chrono::Duration::max_value());
        self.memory.prune_inactive(Utc::now() - window).await
    }

    /// Whether the domain has enough history and a high enough success
    /// rate to be trusted.
    pub async fn is_stable(&self, domain: &str) -> Result<bool> {
        Ok(self
            .memory
            .domain_stats(domain)
            .await?
            .map(|s| s.is_stable())
            .unwrap_or(false))
    }

    /// The sole gate on optimizer spend. One discovery call per domain is
    /// amortized: while AI proposals sit unexercised, further calls are
    /// rejected until the cascade has tried them.
    pub async fn should_optimize(&self, domain: &str) -> Result<OptimizationDecision> {
        if !self.memory.untested_ai_patterns(domain).await?.is_empty() {
            return Ok(OptimizationDecision::rejected("untested proposals pending"));
        }

        let stats = self.memory.domain_stats(domain).await?;
        let Some(stats) = stats.filter(|s| s.total_attempts > 0) else {
            return Ok(OptimizationDecision::approved(
                "unknown domain, try AI discovery",
            ));
        };

        if stats.is_stable() && !stats.needs_optimization(self.slow_ceiling) {
            return Ok(OptimizationDecision::rejected("domain stable"));
        }
        if stats.needs_optimization(self.slow_ceiling) {
            return Ok(OptimizationDecision::approved("domain needs optimization"));
        }
        if stats.total_attempts < STABILITY_MIN_ATTEMPTS {
            return Ok(OptimizationDecision::approved("insufficient data"));
        }
        Ok(OptimizationDecision::rejected("performance adequate"))
    }
}
