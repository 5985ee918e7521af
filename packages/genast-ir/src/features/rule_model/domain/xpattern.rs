//! Leaf patterns
//!
//! A pattern is tagged with the engine that evaluates it. Only the
//! structural kind carries a parsed tree; regex and spacegrep patterns keep
//! their text, the engines themselves live outside this crate.

use std::fmt;

use crate::errors::RuleError;
use crate::shared::models::generic_ast;
use crate::shared::models::{Lang, Tok, Wrap};

/// Globally unique id of a leaf pattern, allocated at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(pub u64);

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Uncompiled regular expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Regexp {
    pub source: String,
}

impl Regexp {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Check the expression with the `regex` crate
    pub fn compile(&self, rule_id: &str, tok: &Tok) -> Result<regex::Regex, RuleError> {
        regex::Regex::new(&self.source).map_err(|e| RuleError::InvalidRegexp {
            rule_id: rule_id.to_string(),
            pattern: self.source.clone(),
            location: tok.describe(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum XpatternKind {
    /// Structural pattern parsed for one language
    Sem(Box<generic_ast::Any>, Lang),
    /// Indentation-based generic pattern
    Spacegrep(String),
    Regexp(Regexp),
}

impl XpatternKind {
    pub fn name(&self) -> &'static str {
        match self {
            XpatternKind::Sem(..) => "semgrep",
            XpatternKind::Spacegrep(_) => "spacegrep",
            XpatternKind::Regexp(_) => "regexp",
        }
    }
}

/// A leaf pattern.
///
/// Equality looks at the parsed `kind` only: neither the source text
/// (`pstr`) nor the allocated id take part.
#[derive(Debug, Clone)]
pub struct Xpattern {
    pub kind: XpatternKind,
    pub pstr: Wrap<String>,
    pub pid: PatternId,
}

impl PartialEq for Xpattern {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Xpattern {
    /// Position of the pattern text, for error reporting
    pub fn tok(&self) -> &Tok {
        &self.pstr.1
    }
}
