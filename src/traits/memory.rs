//! The learning-state repository trait.
//!
//! All per-domain knowledge flows through this seam: attempt records in,
//! patterns and rollups out. The default implementation is an in-memory
//! concurrent map ([`crate::stores::MemoryStore`]); a persistent backend
//! can be swapped in without touching any caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{
    attempt::ExtractionAttempt,
    domain::DomainStats,
    pattern::{DiscoveredBy, ExtractionPattern},
};

/// Repository for attempts, patterns, and domain rollups.
///
/// Updates must be atomic per domain key; concurrent updates to different
/// domains proceed independently.
#[async_trait]
pub trait ExtractionMemory: Send + Sync {
    /// Fold an attempt into the domain rollup, and into the matching
    /// pattern when a selector was involved: success upserts and improves
    /// the pattern, failure degrades it.
    async fn record_attempt(&self, attempt: &ExtractionAttempt) -> Result<()>;

    /// Degrade a pattern without an attempt record: failure_count up,
    /// consecutive successes reset, `stable` cleared. No-op when the
    /// pattern does not exist. Used when a previously trusted selector is
    /// later found to produce poor results (e.g. a date selector that
    /// stopped yielding parseable dates).
    async fn degrade_pattern(&self, domain: &str, selector: &str, strategy: &str) -> Result<()>;

    /// The highest-ranked proven pattern for a domain, ordered by
    /// (success_rate, consecutive_successes, success_count) among patterns
    /// with at least one success and a success rate above 50%.
    /// Idempotent between writes.
    async fn best_pattern(&self, domain: &str) -> Result<Option<ExtractionPattern>>;

    /// AI-discovered patterns that have never been exercised, so discovery
    /// output gets a chance to earn evidence.
    async fn untested_ai_patterns(&self, domain: &str) -> Result<Vec<ExtractionPattern>>;

    /// All patterns for a domain, any state.
    async fn patterns_for_domain(&self, domain: &str) -> Result<Vec<ExtractionPattern>>;

    /// Insert a zero-evidence pattern. Existing evidence for the same
    /// selector (within the same content/date class) is never clobbered.
    /// The `strategy` argument distinguishes date selectors ("date") from
    /// content selectors (everything else).
    async fn add_discovered_pattern(
        &self,
        domain: &str,
        selector: &str,
        strategy: &str,
        discovered_by: DiscoveredBy,
    ) -> Result<()>;

    /// Rollup stats for one domain, if it has ever been seen.
    async fn domain_stats(&self, domain: &str) -> Result<Option<DomainStats>>;

    /// Domains worth a discovery call: success rate below 50% with at
    /// least 3 attempts, or known but never attempted.
    async fn domains_needing_analysis(&self, limit: usize) -> Result<Vec<String>>;

    /// Raw attempt records for a domain, oldest first.
    async fn attempts_for_domain(&self, domain: &str) -> Result<Vec<ExtractionAttempt>>;

    /// Drop domains with no activity since `cutoff`. Returns how many
    /// were removed.
    async fn prune_inactive(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}
