//! Storage implementations for the learning state.

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::{DomainSnapshot, MemorySnapshot};
