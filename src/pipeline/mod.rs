//! The orchestration layer: cascade driver, stability tracking, and the
//! AI-assisted selector optimizer.

pub mod optimizer;
pub mod orchestrator;
pub mod stability;

pub use optimizer::SelectorOptimizer;
pub use orchestrator::Extractor;
pub use stability::{DomainStabilityTracker, OptimizationDecision};
