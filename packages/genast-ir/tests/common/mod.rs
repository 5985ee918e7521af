//! Common test utilities for genast-ir
//!
//! Shared fixtures and builders for integration tests.

#![allow(dead_code)]
#![allow(unused_imports)]

mod builders;
mod fixtures;

// Re-export all utilities
pub use builders::*;
pub use fixtures::*;
