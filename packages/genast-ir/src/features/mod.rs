//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains (as needed):
//! - domain/     - Pure types and rules (no I/O)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - External dependency implementations

pub mod lang_detection;
pub mod normalization;
pub mod parsing;
pub mod rule_model;
