//! Self-Improving Article Extraction Library
//!
//! A cascading article extractor that learns per-domain. Every extraction
//! attempt is recorded; successful selectors become learned patterns that
//! run first on the next visit, and domains the cascade keeps failing on
//! can be handed to an AI selector advisor for fresh proposals.
//!
//! # Design Philosophy
//!
//! **"Cheap first, evidence always"**
//!
//! - Strategies run cheapest-first and stop at the first quality-gated hit
//! - Every applicable try leaves an attempt record, success or failure
//! - Learned patterns are evidence, not configuration: they degrade the
//!   moment they stop working
//! - AI spend is gated by the stability tracker and runs off the hot path
//! - `extract()` never returns an error; failure is a null result
//!
//! # Usage
//!
//! ```rust,ignore
//! use article_extraction::{Extractor, HttpFetcher, MemoryStore};
//! use std::sync::Arc;
//!
//! let memory = Arc::new(MemoryStore::new());
//! let fetcher = Arc::new(HttpFetcher::new(Default::default())?);
//! let extractor = Extractor::new(memory, fetcher);
//!
//! let result = extractor.extract("https://news.example.com/story").await;
//! if let Some(content) = result.content {
//!     println!("{} via {}", content.len(), result.method_used);
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (memory, fetcher, browser, advisor)
//! - [`types`] - Attempts, patterns, domain stats, config, results
//! - [`quality`] - The composite content quality gate
//! - [`parsers`] - HTML, structured metadata, date, and alternate-URL parsing
//! - [`strategies`] - The six-rung extraction cascade
//! - [`pipeline`] - Orchestrator, stability tracker, selector optimizer
//! - [`stores`] - Learning-state storage (in-memory plus JSON snapshots)
//! - [`fetch`] - HTTP fetching with retries, rate limiting, charset sniffing
//! - [`browser`] - Headless Chrome rendering
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod browser;
pub mod error;
pub mod fetch;
pub mod parsers;
pub mod pipeline;
pub mod quality;
pub mod stores;
pub mod strategies;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{AdvisorError, BrowserError, ExtractError, FetchError};
pub use traits::{
    advisor::{KnownPattern, ParsedSelectors, SelectorAdvisor, SelectorProposal, SelectorRequest},
    browser::{BrowserEngine, RenderMethod, RenderedPage},
    fetcher::{FetchedPage, PageFetcher},
    memory::ExtractionMemory,
};
pub use types::{
    attempt::ExtractionAttempt,
    config::{AdvisorConfig, BrowserConfig, ExtractorConfig, FetchConfig, QualityThresholds},
    domain::{DomainStats, StrategyStats},
    pattern::{DiscoveredBy, ExtractionPattern},
    result::ExtractionResult,
};

pub use quality::{QualityGate, QualityVerdict};

// Re-export pipeline components
pub use pipeline::{DomainStabilityTracker, Extractor, OptimizationDecision, SelectorOptimizer};

// Re-export strategies
pub use strategies::{default_cascade, Candidate, Strategy, StrategyContext, StrategyOutcome};

// Re-export stores
pub use stores::{MemorySnapshot, MemoryStore};

// Re-export fetch and browser implementations
pub use browser::HeadlessChrome;
pub use fetch::{HttpFetcher, RateLimitedFetcher};

// Re-export the advisor implementation
pub use ai::OpenAiAdvisor;

// Re-export testing utilities
pub use testing::{MockAdvisor, MockBrowser, MockFetcher};
