//! Rules
//!
//! A rule is a formula (or three lists of formulas in taint mode) plus the
//! metadata reported with each finding. The mode is a type parameter so a
//! search-only or taint-only collection can be expressed directly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::RuleError;
use crate::shared::models::{Lang, Tok, Wrap};

use super::formula::PFormula;
use super::xpattern::Regexp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Language a rule targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Xlang {
    /// First language plus the others, all parsed structurally
    L(Lang, Vec<Lang>),
    /// `regex` / `none`: patterns are raw regular expressions
    LRegex,
    /// `generic`: indentation-based matching, no parser
    LGeneric,
}

impl Xlang {
    /// Interpret the `languages:` field of a rule
    pub fn parse(rule_id: &str, tok: &Tok, keys: &[String]) -> Result<Xlang, RuleError> {
        let invalid = |value: &str| RuleError::InvalidLanguage {
            rule_id: rule_id.to_string(),
            value: value.to_string(),
            location: tok.describe(),
            supported: format!("regex, none, generic, {}", Lang::supported_keys()),
        };

        let normalized: Vec<String> = keys.iter().map(|k| k.trim().to_lowercase()).collect();
        match normalized.as_slice() {
            [] => Err(invalid("")),
            [only] if only == "regex" || only == "none" => Ok(Xlang::LRegex),
            [only] if only == "generic" => Ok(Xlang::LGeneric),
            [first, rest @ ..] => {
                let lang = |key: &String| Lang::from_key(key).ok_or_else(|| invalid(key));
                let first = lang(first)?;
                let rest = rest.iter().map(lang).collect::<Result<Vec<_>, _>>()?;
                Ok(Xlang::L(first, rest))
            }
        }
    }

    /// Every structural language, first one included
    pub fn langs(&self) -> Vec<Lang> {
        match self {
            Xlang::L(first, rest) => std::iter::once(*first).chain(rest.iter().copied()).collect(),
            Xlang::LRegex | Xlang::LGeneric => Vec::new(),
        }
    }
}

impl fmt::Display for Xlang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Xlang::LRegex => f.write_str("regex"),
            Xlang::LGeneric => f.write_str("generic"),
            Xlang::L(..) => {
                let names: Vec<&str> = self.langs().iter().map(|l| l.name()).collect();
                f.write_str(&names.join(", "))
            }
        }
    }
}

/// `paths: { include, exclude }` globs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paths {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `fix-regex:` replacement
#[derive(Debug, Clone, PartialEq)]
pub struct FixRegexp {
    pub regexp: Regexp,
    pub count: Option<usize>,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaintSpec {
    pub sources: Vec<PFormula>,
    pub sanitizers: Vec<PFormula>,
    pub sinks: Vec<PFormula>,
}

/// Mode of a rule whose kind is not known statically
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Search(PFormula),
    Taint(TaintSpec),
}

/// Anything that holds the formulas of a rule
pub trait RuleMode {
    fn formulas(&self) -> Vec<&PFormula>;
}

impl RuleMode for PFormula {
    fn formulas(&self) -> Vec<&PFormula> {
        vec![self]
    }
}

impl RuleMode for TaintSpec {
    fn formulas(&self) -> Vec<&PFormula> {
        self.sources
            .iter()
            .chain(&self.sanitizers)
            .chain(&self.sinks)
            .collect()
    }
}

impl RuleMode for Mode {
    fn formulas(&self) -> Vec<&PFormula> {
        match self {
            Mode::Search(f) => f.formulas(),
            Mode::Taint(spec) => spec.formulas(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule<M> {
    pub id: Wrap<String>,
    pub mode: M,
    pub message: String,
    pub severity: Severity,
    pub languages: Xlang,
    /// Rule file the rule was read from
    pub file: String,
    pub paths: Option<Paths>,
    pub fix: Option<String>,
    pub fix_regexp: Option<FixRegexp>,
    pub metadata: Option<serde_json::Value>,
}

pub type SearchRule = Rule<PFormula>;
pub type TaintRule = Rule<TaintSpec>;

impl<M> Rule<M> {
    pub fn id(&self) -> &str {
        &self.id.0
    }

    /// Detach the mode from the rest of the rule
    pub fn into_parts(self) -> (M, Rule<()>) {
        let rest = Rule {
            id: self.id,
            mode: (),
            message: self.message,
            severity: self.severity,
            languages: self.languages,
            file: self.file,
            paths: self.paths,
            fix: self.fix,
            fix_regexp: self.fix_regexp,
            metadata: self.metadata,
        };
        (self.mode, rest)
    }

    /// Same rule with another mode value
    pub fn with_mode<N>(self, mode: N) -> Rule<N> {
        let (_, rest) = self.into_parts();
        Rule {
            id: rest.id,
            mode,
            message: rest.message,
            severity: rest.severity,
            languages: rest.languages,
            file: rest.file,
            paths: rest.paths,
            fix: rest.fix,
            fix_regexp: rest.fix_regexp,
            metadata: rest.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(ks: &[&str]) -> Vec<String> {
        ks.iter().map(|k| k.to_string()).collect()
    }

    fn parse(ks: &[&str]) -> Result<Xlang, RuleError> {
        Xlang::parse("r", &Tok::fake("languages"), &keys(ks))
    }

    #[test]
    fn test_xlang_three_way_tag() {
        assert_eq!(parse(&["regex"]).unwrap(), Xlang::LRegex);
        assert_eq!(parse(&["none"]).unwrap(), Xlang::LRegex);
        assert_eq!(parse(&["generic"]).unwrap(), Xlang::LGeneric);
        assert_eq!(
            parse(&["py", "JS"]).unwrap(),
            Xlang::L(Lang::Python, vec![Lang::Javascript])
        );
    }

    #[test]
    fn test_xlang_display_is_verbatim() {
        assert_eq!(Xlang::LRegex.to_string(), "regex");
        assert_eq!(Xlang::LGeneric.to_string(), "generic");
        assert_eq!(
            Xlang::L(Lang::Python, vec![Lang::Go]).to_string(),
            "python, go"
        );
    }

    #[test]
    fn test_xlang_rejects_unknown_and_mixed() {
        match parse(&["cobol"]) {
            Err(RuleError::InvalidLanguage { rule_id, value, .. }) => {
                assert_eq!(rule_id, "r");
                assert_eq!(value, "cobol");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse(&[]).is_err());
        assert!(parse(&["python", "regex"]).is_err());
    }

    #[test]
    fn test_severity_serde() {
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"ERROR\"");
        let s: Severity = serde_json::from_str("\"INFO\"").unwrap();
        assert_eq!(s, Severity::Info);
    }

    #[test]
    fn test_paths_default_lists() {
        let p: Paths = serde_json::from_str(r#"{"include": ["src/"]}"#).unwrap();
        assert_eq!(p.include, vec!["src/"]);
        assert!(p.exclude.is_empty());
    }
}
