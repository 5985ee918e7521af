//! Source tokens
//!
//! Every node of both the Python tree and the generic tree carries the
//! token(s) it came from. Tokens produced by the normalizer that have no
//! source text of their own are `Fake`, optionally anchored at the real
//! token they were derived from.
//!
//! Tokens never take part in structural comparison: two trees that differ
//! only in positions are equal.

use std::fmt;
use std::sync::Arc;

/// Single location in source code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: Arc<str>,
    /// 1-based line
    pub line: u32,
    /// 0-based column (bytes)
    pub column: u32,
    pub byte_offset: usize,
}

impl Location {
    pub fn new(file: Arc<str>, line: u32, column: u32, byte_offset: usize) -> Self {
        Self {
            file,
            line,
            column,
            byte_offset,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A source token
#[derive(Debug, Clone)]
pub enum Tok {
    /// Token read from the source file
    Origin { text: String, loc: Location },

    /// Synthetic token; `anchor` is the real location it was derived from
    Fake {
        text: String,
        anchor: Option<Location>,
    },
}

impl Tok {
    pub fn origin(text: impl Into<String>, loc: Location) -> Self {
        Tok::Origin {
            text: text.into(),
            loc,
        }
    }

    /// Synthetic token with no position at all
    pub fn fake(text: impl Into<String>) -> Self {
        Tok::Fake {
            text: text.into(),
            anchor: None,
        }
    }

    /// Zero-width synthetic token positioned at `tok`.
    ///
    /// Distinct from `tok` itself, so a node built on it never aliases the
    /// source range of the node `tok` belongs to.
    pub fn fake_at(tok: &Tok) -> Self {
        Tok::Fake {
            text: String::new(),
            anchor: tok.location().cloned(),
        }
    }

    pub fn is_fake(&self) -> bool {
        matches!(self, Tok::Fake { .. })
    }

    pub fn text(&self) -> &str {
        match self {
            Tok::Origin { text, .. } | Tok::Fake { text, .. } => text,
        }
    }

    /// Real location, or the anchor of a fake token
    pub fn location(&self) -> Option<&Location> {
        match self {
            Tok::Origin { loc, .. } => Some(loc),
            Tok::Fake { anchor, .. } => anchor.as_ref(),
        }
    }

    /// Human readable position used in error messages
    pub fn describe(&self) -> String {
        match self.location() {
            Some(loc) => loc.to_string(),
            None => "<unknown location>".to_string(),
        }
    }
}

impl PartialEq for Tok {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Tok {}

/// Value paired with its token
pub type Wrap<T> = (T, Tok);

/// Value between an opening and a closing token
pub type Bracket<T> = (Tok, T, Tok);

/// Bracket made of fake tokens
pub fn fake_bracket<T>(inner: T) -> Bracket<T> {
    (Tok::fake("("), inner, Tok::fake(")"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32, column: u32) -> Location {
        Location::new(Arc::from("a.py"), line, column, 0)
    }

    #[test]
    fn test_tokens_never_affect_equality() {
        let a = Tok::origin("x", loc(1, 0));
        let b = Tok::origin("y", loc(9, 4));
        assert_eq!(a, b);
        assert_eq!(a, Tok::fake("x"));
    }

    #[test]
    fn test_fake_at_is_zero_width_and_anchored() {
        let real = Tok::origin("'abc'", loc(3, 7));
        let fake = Tok::fake_at(&real);
        assert!(fake.is_fake());
        assert!(!real.is_fake());
        assert_eq!(fake.text(), "");
        assert_eq!(fake.location().map(|l| l.line), Some(3));
    }

    #[test]
    fn test_describe() {
        assert_eq!(Tok::origin("x", loc(2, 5)).describe(), "a.py:2:5");
        assert_eq!(Tok::fake("x").describe(), "<unknown location>");
    }
}
