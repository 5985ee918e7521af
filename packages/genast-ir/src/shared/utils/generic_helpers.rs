//! Helpers shared by every frontend producing generic trees

use once_cell::sync::Lazy;
use regex::Regex;

use crate::shared::models::generic_ast::*;

/// Default shape of a metavariable name: `$X`, `$FOO_2`
pub const DEFAULT_METAVARIABLE_PATTERN: &str = r"^\$[A-Z_][A-Z_0-9]*$";

static METAVARIABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_METAVARIABLE_PATTERN).unwrap_or_else(|e| {
        unreachable!("metavariable pattern is a literal and compiles: {}", e)
    })
});

/// Compiled default metavariable regex
pub fn metavariable_regex() -> &'static Regex {
    &METAVARIABLE_RE
}

pub fn is_metavar_name(s: &str) -> bool {
    METAVARIABLE_RE.is_match(s)
}

/// Convert an expression in binding position (loop target, `as` target)
/// into a destructuring pattern.
pub fn expr_to_pattern(e: Expr) -> Pattern {
    match e {
        Expr::Id(name, info) => Pattern::PatId(name, info),
        Expr::Tuple((l, xs, r)) => {
            Pattern::PatTuple((l, xs.into_iter().map(expr_to_pattern).collect(), r))
        }
        Expr::Container(ContainerOperator::List, (l, xs, r)) => {
            Pattern::PatList((l, xs.into_iter().map(expr_to_pattern).collect(), r))
        }
        Expr::L(lit) => Pattern::PatLiteral(lit),
        Expr::Ellipsis(t) => Pattern::PatEllipsis(t),
        other => Pattern::OtherPat(OtherPatternOperator::Expr, vec![Any::E(other)]),
    }
}

/// Type written as an expression (`x: List[int]`)
pub fn expr_to_type(e: Expr) -> Type {
    Type::TyExpr(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::token::{fake_bracket, Tok};

    fn ident(s: &str) -> Ident {
        (s.to_string(), Tok::fake(s))
    }

    #[test]
    fn test_is_metavar_name() {
        assert!(is_metavar_name("$X"));
        assert!(is_metavar_name("$FOO_2"));
        assert!(is_metavar_name("$_"));
        assert!(!is_metavar_name("$x"));
        assert!(!is_metavar_name("X"));
        assert!(!is_metavar_name("$2X"));
    }

    #[test]
    fn test_expr_to_pattern_destructures_tuples() {
        let e = Expr::Tuple(fake_bracket(vec![
            Expr::id(ident("a")),
            Expr::Container(
                ContainerOperator::List,
                fake_bracket(vec![Expr::id(ident("b"))]),
            ),
        ]));
        let expected = Pattern::PatTuple(fake_bracket(vec![
            Pattern::PatId(ident("a"), IdInfo::empty()),
            Pattern::PatList(fake_bracket(vec![Pattern::PatId(
                ident("b"),
                IdInfo::empty(),
            )])),
        ]));
        assert_eq!(expr_to_pattern(e), expected);
    }

    #[test]
    fn test_expr_to_pattern_falls_back_to_other() {
        let e = Expr::DotAccess(Box::new(Expr::id(ident("a"))), Tok::fake("."), ident("b"));
        assert!(matches!(
            expr_to_pattern(e),
            Pattern::OtherPat(OtherPatternOperator::Expr, _)
        ));
    }
}
