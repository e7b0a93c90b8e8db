//! Attempt records - the append-only facts the learning layer is built on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// One record per strategy try, successes and failures alike.
///
/// Attempts are never mutated after creation. The memory store folds them
/// into `DomainStats` and `ExtractionPattern` counters but keeps the raw
/// record for inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionAttempt {
    /// Unique id for this record
    pub id: Uuid,

    /// URL the strategy ran against
    pub url: String,

    /// Domain key for the learning layer
    pub domain: String,

    /// Strategy name (e.g. "readability", "browser", "fetch")
    pub strategy: String,

    /// Selector applied, when the strategy used one
    pub selector: Option<String>,

    /// Whether the candidate passed the quality gate
    pub success: bool,

    /// Length of extracted content in characters (0 on failure)
    pub content_length: usize,

    /// Quality score in [0, 1] from the gate evaluation
    pub quality_score: f32,

    /// How long the strategy ran
    pub duration: Duration,

    /// Error or rejection reason for failed tries
    pub error: Option<String>,

    /// When the attempt was recorded
    pub recorded_at: DateTime<Utc>,
}

impl ExtractionAttempt {
    /// Create a successful attempt record.
    pub fn succeeded(
        url: impl Into<String>,
        domain: impl Into<String>,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            domain: domain.into(),
            strategy: strategy.into(),
            selector: None,
            success: true,
            content_length: 0,
            quality_score: 0.0,
            duration: Duration::ZERO,
            error: None,
            recorded_at: Utc::now(),
        }
    }

    /// Create a failed attempt record.
    pub fn failed(
        url: impl Into<String>,
        domain: impl Into<String>,
        strategy: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            domain: domain.into(),
            strategy: strategy.into(),
            selector: None,
            success: false,
            content_length: 0,
            quality_score: 0.0,
            duration: Duration::ZERO,
            error: Some(error.into()),
            recorded_at: Utc::now(),
        }
    }

    /// Attach the selector the strategy applied.
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Set the extracted content length.
    pub fn with_content_length(mut self, length: usize) -> Self {
        self.content_length = length;
        self
    }

    /// Set the quality score.
    pub fn with_quality_score(mut self, score: f32) -> Self {
        self.quality_score = score;
        self
    }

    /// Set the strategy duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}
