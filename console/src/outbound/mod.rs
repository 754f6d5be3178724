//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **rest**: reqwest-backed JSON resources
//! - **memory**: process-local collections for offline use and tests
//!
//! Adapters are thin translators between domain types and their transport.
//! They contain no business logic.

pub mod memory;
pub mod rest;
