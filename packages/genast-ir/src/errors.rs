//! Error types for genast-ir
//!
//! One enum per concern, plus `GenastError` unifying them at the crate
//! boundary. Defects (normalizer inconsistencies, unsupported legacy
//! conditions) are ordinary `Err` values so that a batch driver can
//! isolate them per file or per rule.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Python front end failure
#[derive(Debug, Error)]
pub enum ParseError {
    /// tree-sitter could not be set up for the grammar
    #[error("Parser initialization failed: {0}")]
    Init(String),

    /// tree-sitter gave up on the input
    #[error("Parse of {file} produced no tree")]
    NoTree { file: String },

    /// The tree contains an ERROR or MISSING node
    #[error("Syntax error at {location}: unexpected {snippet:?}")]
    Syntax { location: String, snippet: String },

    /// Valid Python the front end has no mapping for
    #[error("Unsupported syntax '{kind}' at {location}")]
    Unsupported { kind: String, location: String },
}

/// Normalizer defect: the input tree violates a structural invariant
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Impossible input at {location}: {what}")]
    Impossible { what: String, location: String },
}

impl NormalizeError {
    pub fn impossible(what: impl Into<String>, location: impl Into<String>) -> Self {
        NormalizeError::Impossible {
            what: what.into(),
            location: location.into(),
        }
    }
}

/// Rule model failure. Every variant names the rule and a position.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Rule {rule_id}: invalid language '{value}' at {location}. Supported: {supported}")]
    InvalidLanguage {
        rule_id: String,
        value: String,
        location: String,
        supported: String,
    },

    #[error("Rule {rule_id}: invalid regexp '{pattern}' at {location}: {message}")]
    InvalidRegexp {
        rule_id: String,
        pattern: String,
        location: String,
        message: String,
    },

    #[error("Rule {rule_id}: ill-formed formula at {location}: {message}")]
    IllFormedFormula {
        rule_id: String,
        location: String,
        message: String,
    },

    /// Condition shape this layer cannot express (embedded script)
    #[error("Rule {rule_id}: unsupported condition '{kind}' at {location}")]
    UnsupportedCondition {
        rule_id: String,
        kind: String,
        location: String,
    },
}

/// Classifier failure. Never produced for "not this language".
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid content pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

/// Main error type for genast-ir operations
#[derive(Debug, Error)]
pub enum GenastError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for genast-ir operations
pub type Result<T> = std::result::Result<T, GenastError>;
