//! Scenario and integration tests for the registry.
//!
//! # Test Structure
//!
//! - `scenarios.rs`: end-to-end resolution against a small game-server type
//!   system
//! - `concurrency.rs`: resolution from many threads against a shared registry
//! - `helpers.rs`: the fixture type system, runtime payloads and descriptor
//!   factories

mod helpers;

// Re-export for convenience
pub use helpers::*;
