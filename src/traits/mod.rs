//! Core trait abstractions: learning memory, page fetching, headless
//! rendering, and the selector advisor.

pub mod advisor;
pub mod browser;
pub mod fetcher;
pub mod memory;
