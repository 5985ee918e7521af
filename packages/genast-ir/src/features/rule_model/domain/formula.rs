//! Rule formulas
//!
//! Two shapes exist. `Formula` is the canonical boolean tree evaluated by
//! the matcher. `FormulaOld` is the flat legacy list (`pattern`,
//! `pattern-not`, `pattern-either`, `patterns`, ...) that rules may still
//! be written in; it is converted with `convert_legacy`.

use crate::shared::models::generic_ast::Expr;
use crate::shared::models::Tok;

use super::xpattern::{Regexp, Xpattern};

/// Metavariable name, `$X`
pub type MetavarName = String;

/// Restricts a leaf to matches nested inside another match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Inside;

// ═══════════════════════════════════════════════════════════════════════════
// Canonical formula
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum MetavarCond {
    /// Boolean expression over metavariables (`int($X) > 2`)
    CondGeneric(Expr),
    CondRegexp(MetavarName, Regexp),
    /// Bound content must itself match a pattern
    CondPattern(MetavarName, Xpattern),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    P(Xpattern, Option<Inside>),
    MetavarCond(Tok, MetavarCond),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    Leaf(Leaf),
    And(Tok, Vec<Formula>),
    Or(Tok, Vec<Formula>),
    /// Only meaningful as a direct child of `And`
    Not(Tok, Box<Formula>),
}

impl Formula {
    pub fn pattern(xpat: Xpattern) -> Self {
        Formula::Leaf(Leaf::P(xpat, None))
    }

    pub fn inside(xpat: Xpattern) -> Self {
        Formula::Leaf(Leaf::P(xpat, Some(Inside)))
    }

    /// Positive members are the ones that can produce matches on their own
    pub fn is_positive(&self) -> bool {
        !matches!(self, Formula::Not(..) | Formula::Leaf(Leaf::MetavarCond(..)))
    }

    /// Position of the node, when it has one of its own
    pub fn tok(&self) -> &Tok {
        match self {
            Formula::Leaf(Leaf::P(xpat, _)) => xpat.tok(),
            Formula::Leaf(Leaf::MetavarCond(t, _))
            | Formula::And(t, _)
            | Formula::Or(t, _)
            | Formula::Not(t, _) => t,
        }
    }
}

/// Visit every leaf pattern, depth first, left to right.
///
/// Conditions are skipped, including the pattern embedded in a
/// `CondPattern`. Callers rely on this order matching pattern-id
/// allocation order.
pub fn visit_new_formula<F>(formula: &Formula, f: &mut F)
where
    F: FnMut(&Xpattern, Option<Inside>),
{
    match formula {
        Formula::Leaf(Leaf::P(xpat, inside)) => f(xpat, *inside),
        Formula::Leaf(Leaf::MetavarCond(..)) => {}
        Formula::And(_, xs) | Formula::Or(_, xs) => {
            for x in xs {
                visit_new_formula(x, f);
            }
        }
        Formula::Not(_, x) => visit_new_formula(x, f),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Legacy formula
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Extra {
    MetavarRegexp(MetavarName, Regexp),
    MetavarPattern(MetavarName, Xpattern),
    MetavarComparison(MetavarComparison),
    /// Arbitrary embedded Python; not expressible as a condition
    PatWherePython(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetavarComparison {
    pub metavariable: Option<MetavarName>,
    pub comparison: Expr,
    pub strip: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormulaOld {
    Pat(Xpattern),
    PatNot(Tok, Xpattern),
    PatInside(Xpattern),
    PatNotInside(Tok, Xpattern),
    PatEither(Tok, Vec<FormulaOld>),
    Patterns(Tok, Vec<FormulaOld>),
    PatExtra(Tok, Extra),
}

/// Formula as written in a rule file
#[derive(Debug, Clone, PartialEq)]
pub enum PFormula {
    New(Formula),
    Old(FormulaOld),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::rule_model::domain::xpattern::{PatternId, XpatternKind};

    fn xpat(id: u64) -> Xpattern {
        Xpattern {
            kind: XpatternKind::Spacegrep(format!("p{}", id)),
            pstr: (format!("p{}", id), Tok::fake("")),
            pid: PatternId(id),
        }
    }

    #[test]
    fn test_visit_is_depth_first_left_to_right() {
        let f = Formula::And(
            Tok::fake("and"),
            vec![
                Formula::inside(xpat(1)),
                Formula::Or(
                    Tok::fake("or"),
                    vec![Formula::pattern(xpat(2)), Formula::pattern(xpat(3))],
                ),
                Formula::Leaf(Leaf::MetavarCond(
                    Tok::fake("cond"),
                    MetavarCond::CondPattern("$X".to_string(), xpat(99)),
                )),
                Formula::Not(Tok::fake("not"), Box::new(Formula::pattern(xpat(4)))),
            ],
        );
        let mut seen = Vec::new();
        visit_new_formula(&f, &mut |x: &Xpattern, inside| seen.push((x.pid.0, inside.is_some())));
        assert_eq!(seen, vec![(1, true), (2, false), (3, false), (4, false)]);
    }

    #[test]
    fn test_positive_members() {
        assert!(Formula::pattern(xpat(1)).is_positive());
        assert!(!Formula::Not(Tok::fake(""), Box::new(Formula::pattern(xpat(1)))).is_positive());
        assert!(!Formula::Leaf(Leaf::MetavarCond(
            Tok::fake(""),
            MetavarCond::CondRegexp("$X".to_string(), Regexp::new("a"))
        ))
        .is_positive());
    }
}
