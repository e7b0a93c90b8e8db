//! Stateless helpers that turn raw HTML into candidate text and metadata.
//!
//! Strategies are built on top of these; none of them hold state and none
//! of them touch the network.

pub mod alternates;
pub mod dates;
pub mod html;
pub mod structured;
