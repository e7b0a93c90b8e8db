//! In-memory learning store.
//!
//! The default [`ExtractionMemory`] implementation: a concurrent map with
//! one mutex per domain, so updates are atomic per domain key while
//! different domains never contend. Process-lifetime only; pair it with
//! [`crate::stores::snapshot`] to survive restarts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::Result;
use crate::strategies::names;
use crate::traits::memory::ExtractionMemory;
use crate::types::{
    attempt::ExtractionAttempt,
    domain::{DomainStats, OPTIMIZATION_MAX_SUCCESS_RATE},
    pattern::{DiscoveredBy, ExtractionPattern},
};

/// Patterns below this rate are never returned as "best".
const BEST_PATTERN_MIN_RATE: f64 = 0.5;

/// Analysis candidates need at least this many attempts to count as
/// provably broken (fewer is just noise).
const ANALYSIS_MIN_ATTEMPTS: u64 = 3;

#[derive(Debug, Default)]
pub(crate) struct DomainEntry {
    pub(crate) stats: Option<DomainStats>,
    pub(crate) patterns: Vec<ExtractionPattern>,
    pub(crate) attempts: Vec<ExtractionAttempt>,
}

/// In-memory store for attempts, patterns, and domain rollups.
#[derive(Default)]
pub struct MemoryStore {
    domains: RwLock<HashMap<String, Arc<Mutex<DomainEntry>>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of domains currently tracked.
    pub fn domain_count(&self) -> usize {
        self.domains.read().unwrap().len()
    }

    fn entry(&self, domain: &str) -> Arc<Mutex<DomainEntry>> {
        if let Some(entry) = self.domains.read().unwrap().get(domain) {
            return Arc::clone(entry);
        }
        let mut map = self.domains.write().unwrap();
        Arc::clone(map.entry(domain.to_string()).or_default())
    }

    fn existing_entry(&self, domain: &str) -> Option<Arc<Mutex<DomainEntry>>> {
        self.domains.read().unwrap().get(domain).cloned()
    }

    pub(crate) fn for_each_entry<F: FnMut(&str, &DomainEntry)>(&self, mut f: F) {
        let map = self.domains.read().unwrap();
        for (domain, entry) in map.iter() {
            let entry = entry.lock().unwrap();
            f(domain, &entry);
        }
    }

    pub(crate) fn insert_entry(&self, domain: String, entry: DomainEntry) {
        self.domains
            .write()
            .unwrap()
            .insert(domain, Arc::new(Mutex::new(entry)));
    }
}

/// Patterns come in two classes: date selectors and content selectors.
/// A selector's evidence is shared within its class, whichever strategy
/// exercised it; the stored `strategy` records where it first succeeded.
fn same_class(pattern_strategy: &str, strategy: &str) -> bool {
    (pattern_strategy == names::DATE_SELECTOR) == (strategy == names::DATE_SELECTOR)
}

fn rank(patterns: &mut Vec<ExtractionPattern>) {
    patterns.sort_by(|a, b| {
        b.success_rate()
            .partial_cmp(&a.success_rate())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.consecutive_successes.cmp(&a.consecutive_successes))
            .then(b.success_count.cmp(&a.success_count))
            .then(a.selector.cmp(&b.selector))
    });
}

#[async_trait]
impl ExtractionMemory for MemoryStore {
    async fn record_attempt(&self, attempt: &ExtractionAttempt) -> Result<()> {
        let entry = self.entry(&attempt.domain);
        let mut entry = entry.lock().unwrap();

        entry
            .stats
            .get_or_insert_with(|| DomainStats::new(&attempt.domain))
            .record(attempt);

        if let Some(selector) = &attempt.selector {
            let existing = entry
                .patterns
                .iter_mut()
                .find(|p| &p.selector == selector && same_class(&p.strategy, &attempt.strategy));

            if attempt.success {
                let pattern = match existing {
                    Some(p) => p,
                    None => {
                        // Patterns are created on first success for the triple.
                        entry.patterns.push(ExtractionPattern::new(
                            &attempt.domain,
                            selector,
                            &attempt.strategy,
                            DiscoveredBy::Manual,
                        ));
                        entry.patterns.last_mut().unwrap()
                    }
                };
                pattern.record_success(attempt.quality_score, attempt.content_length);
            } else if let Some(p) = existing {
                p.record_failure();
            }
        }

        entry.attempts.push(attempt.clone());
        Ok(())
    }

    async fn degrade_pattern(&self, domain: &str, selector: &str, strategy: &str) -> Result<()> {
        let Some(entry) = self.existing_entry(domain) else {
            return Ok(());
        };
        let mut entry = entry.lock().unwrap();
        if let Some(p) = entry
            .patterns
            .iter_mut()
            .find(|p| p.selector == selector && same_class(&p.strategy, strategy))
        {
            p.record_failure();
        }
        Ok(())
    }

    async fn best_pattern(&self, domain: &str) -> Result<Option<ExtractionPattern>> {
        let Some(entry) = self.existing_entry(domain) else {
            return Ok(None);
        };
        let entry = entry.lock().unwrap();
        let mut candidates: Vec<ExtractionPattern> = entry
            .patterns
            .iter()
            .filter(|p| {
                p.strategy != names::DATE_SELECTOR
                    && p.success_count > 0
                    && p.success_rate() > BEST_PATTERN_MIN_RATE
            })
            .cloned()
            .collect();
        rank(&mut candidates);
        Ok(candidates.into_iter().next())
    }

    async fn untested_ai_patterns(&self, domain: &str) -> Result<Vec<ExtractionPattern>> {
        let Some(entry) = self.existing_entry(domain) else {
            return Ok(Vec::new());
        };
        let entry = entry.lock().unwrap();
        Ok(entry
            .patterns
            .iter()
            .filter(|p| p.discovered_by == DiscoveredBy::Ai && p.is_untested())
            .cloned()
            .collect())
    }

    async fn patterns_for_domain(&self, domain: &str) -> Result<Vec<ExtractionPattern>> {
        let Some(entry) = self.existing_entry(domain) else {
            return Ok(Vec::new());
        };
        let entry = entry.lock().unwrap();
        let mut patterns = entry.patterns.clone();
        rank(&mut patterns);
        Ok(patterns)
    }

    async fn add_discovered_pattern(
        &self,
        domain: &str,
        selector: &str,
        strategy: &str,
        discovered_by: DiscoveredBy,
    ) -> Result<()> {
        let entry = self.entry(domain);
        let mut entry = entry.lock().unwrap();
        let exists = entry
            .patterns
            .iter()
            .any(|p| p.selector == selector && same_class(&p.strategy, strategy));
        if !exists {
            entry
                .patterns
                .push(ExtractionPattern::new(domain, selector, strategy, discovered_by));
        }
        Ok(())
    }

    async fn domain_stats(&self, domain: &str) -> Result<Option<DomainStats>> {
        let Some(entry) = self.existing_entry(domain) else {
            return Ok(None);
        };
        let stats = entry.lock().unwrap().stats.clone();
        Ok(stats)
    }

    async fn domains_needing_analysis(&self, limit: usize) -> Result<Vec<String>> {
        let mut needing: Vec<String> = Vec::new();
        self.for_each_entry(|domain, entry| {
            let qualifies = match &entry.stats {
                None => true, // known domain, never attempted
                Some(stats) => {
                    stats.total_attempts == 0
                        || (stats.total_attempts >= ANALYSIS_MIN_ATTEMPTS
                            && stats.success_rate() < OPTIMIZATION_MAX_SUCCESS_RATE)
                }
            };
            if qualifies {
                needing.push(domain.to_string());
            }
        });
        needing.sort();
        needing.truncate(limit);
        Ok(needing)
    }

    async fn attempts_for_domain(&self, domain: &str) -> Result<Vec<ExtractionAttempt>> {
        let Some(entry) = self.existing_entry(domain) else {
            return Ok(Vec::new());
        };
        let attempts = entry.lock().unwrap().attempts.clone();
        Ok(attempts)
    }

    async fn prune_inactive(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut map = self.domains.write().unwrap();
        let before = map.len();
        map.retain(|_, entry| {
            let entry = entry.lock().unwrap();
            match entry.stats.as_ref().and_then(|s| s.last_activity()) {
                Some(at) => at >= cutoff,
                // AI-seeded domains with no attempts yet are kept.
                None => true,
            }
        });
        Ok(before - map.len())
    }
}
