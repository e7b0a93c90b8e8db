//! Core data types for attempts, learned patterns, domain rollups,
//! extraction results, and configuration.

pub mod attempt;
pub mod config;
pub mod domain;
pub mod pattern;
pub mod result;
