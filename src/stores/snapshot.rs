//! JSON snapshots of the learning state.
//!
//! Patterns and domain rollups are worth keeping across restarts; the raw
//! attempt log is not, so snapshots deliberately exclude it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::stores::memory::{DomainEntry, MemoryStore};
use crate::types::{domain::DomainStats, pattern::ExtractionPattern};

/// Serialized learning state for one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSnapshot {
    pub domain: String,
    pub stats: Option<DomainStats>,
    pub patterns: Vec<ExtractionPattern>,
}

/// A point-in-time dump of every tracked domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub saved_at: DateTime<Utc>,
    pub domains: Vec<DomainSnapshot>,
}

impl MemoryStore {
    /// Capture the current patterns and rollups.
    pub fn snapshot(&self) -> MemorySnapshot {
        let mut domains = Vec::new();
        self.for_each_entry(|domain, entry| {
            domains.push(DomainSnapshot {
                domain: domain.to_string(),
                stats: entry.stats.clone(),
                patterns: entry.patterns.clone(),
            });
        });
        domains.sort_by(|a, b| a.domain.cmp(&b.domain));
        MemorySnapshot {
            saved_at: Utc::now(),
            domains,
        }
    }

    /// Rebuild a store from a snapshot. Attempt logs start empty.
    pub fn from_snapshot(snapshot: MemorySnapshot) -> Self {
        let store = MemoryStore::new();
        for d in snapshot.domains {
            store.insert_entry(
                d.domain,
                DomainEntry {
                    stats: d.stats,
                    patterns: d.patterns,
                    attempts: Vec::new(),
                },
            );
        }
        store
    }

    /// Write a snapshot to disk as pretty-printed JSON.
    pub async fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.snapshot())?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Load a store from a snapshot file.
    pub async fn load_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let snapshot: MemorySnapshot = serde_json::from_slice(&bytes)?;
        Ok(Self::from_snapshot(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::memory::ExtractionMemory;
    use crate::types::{attempt::ExtractionAttempt, pattern::DiscoveredBy};

    #[tokio::test]
    async fn snapshot_round_trip_preserves_patterns_and_stats() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            let a = ExtractionAttempt::succeeded("https://n.example/a", "n.example", "readability")
                .with_selector("article")
                .with_quality_score(0.9)
                .with_content_length(1200);
            store.record_attempt(&a).await.unwrap();
        }
        store
            .add_discovered_pattern("n.example", ".body", "learned_pattern", DiscoveredBy::Ai)
            .await
            .unwrap();

        let restored = MemoryStore::from_snapshot(store.snapshot());

        let stats = restored.domain_stats("n.example").await.unwrap().unwrap();
        assert_eq!(stats.successes, 3);

        let patterns = restored.patterns_for_domain("n.example").await.unwrap();
        assert_eq!(patterns.len(), 2);
        let learned = patterns.iter().find(|p| p.selector == "article").unwrap();
        assert!(learned.stable);

        // Attempt logs are not carried over.
        assert!(restored.attempts_for_domain("n.example").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn snapshot_serializes_to_json() {
        let store = MemoryStore::new();
        let a = ExtractionAttempt::failed("https://x.example/a", "x.example", "fetch", "timeout");
        store.record_attempt(&a).await.unwrap();

        let json = serde_json::to_string(&store.snapshot()).unwrap();
        let parsed: MemorySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.domains.len(), 1);
        assert_eq!(parsed.domains[0].domain, "x.example");
    }
}
