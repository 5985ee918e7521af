/*
 * Genast IR - Generic AST core of a multi-language matcher
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (tokens, languages, generic AST) and tree utilities
 * - features/    : Vertical slices (parsing → normalization, rule_model, lang_detection)
 * - config/      : Versioned YAML configuration
 *
 * Flow:
 * - lang_detection gates which files enter the pipeline
 * - parsing + normalization turn each file into a generic program
 * - rule_model compiles rules independently; a matcher (not in this crate)
 *   evaluates them against normalized programs
 */

// Crate-level lint configuration
#![allow(clippy::type_complexity)] // Nested Result<Result<..>> in classifier API
#![allow(clippy::large_enum_variant)] // AST enums mirror the syntax they model
#![allow(clippy::unnecessary_map_or)] // map_or style preference
#![allow(clippy::should_implement_trait)] // Predicate::not naming intentional

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{ConfigError, EngineConfig};
pub use errors::{ClassifyError, GenastError, NormalizeError, ParseError, Result, RuleError};
pub use features::lang_detection::{LanguageClassifier, SkipReason};
pub use features::normalization::{NormalizeFilesUseCase, Normalizer, PythonNormalizer};
pub use features::parsing::{ParseFileUseCase, Parser, PythonParser};
pub use features::rule_model::{Formula, PFormula, Rule, RuleCompilationSession, Xlang};
pub use shared::models::generic_ast;
pub use shared::models::{Lang, Tok};
