//! Language Detection Feature
//!
//! Decides whether a target file belongs to a language, from its path and
//! at most its first line and first block.
//!
//! ## Structure
//! - `domain/` - predicates, per-language table, shebangs, skip records
//! - `application/` - evaluator and LanguageClassifier
//! - `infrastructure/` - filesystem probes

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-exports
pub use application::{Classification, LanguageClassifier};
pub use domain::{predicate_for, Predicate, Shebang, SkipReason, SkipReasonKind};
