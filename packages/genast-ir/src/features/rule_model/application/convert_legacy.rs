//! Legacy formula conversion
//!
//! | legacy            | canonical                     |
//! |-------------------|-------------------------------|
//! | `Pat`             | `Leaf(P(p, None))`            |
//! | `PatNot`          | `Not(Leaf(P(p, None)))`       |
//! | `PatInside`       | `Leaf(P(p, Some(Inside)))`    |
//! | `PatNotInside`    | `Not(Leaf(P(p, Some(Inside))))` |
//! | `PatEither`       | `Or`                          |
//! | `Patterns`        | `And`                         |
//! | `PatExtra`        | `Leaf(MetavarCond)`           |
//!
//! The token of the legacy node is carried onto the produced node.

use crate::errors::RuleError;
use crate::features::rule_model::domain::{
    Extra, Formula, FormulaOld, Inside, Leaf, MetavarComparison, MetavarCond, PFormula,
};
use crate::shared::models::generic_ast::{Argument, Expr};
use crate::shared::models::{fake_bracket, Tok};
use crate::shared::utils::generic_mapper::{walk_expr, Mapper};

/// Canonical formula of a rule formula; canonical input is returned as is
pub fn formula_of_pformula(rule_id: &str, pformula: PFormula) -> Result<Formula, RuleError> {
    match pformula {
        PFormula::New(formula) => Ok(formula),
        PFormula::Old(old) => convert_legacy(rule_id, old),
    }
}

pub fn convert_legacy(rule_id: &str, old: FormulaOld) -> Result<Formula, RuleError> {
    let converted = match old {
        FormulaOld::Pat(xpat) => Formula::Leaf(Leaf::P(xpat, None)),
        FormulaOld::PatInside(xpat) => Formula::Leaf(Leaf::P(xpat, Some(Inside))),
        FormulaOld::PatNot(tok, xpat) => {
            Formula::Not(tok, Box::new(Formula::Leaf(Leaf::P(xpat, None))))
        }
        FormulaOld::PatNotInside(tok, xpat) => {
            Formula::Not(tok, Box::new(Formula::Leaf(Leaf::P(xpat, Some(Inside)))))
        }
        FormulaOld::PatEither(tok, xs) => Formula::Or(tok, convert_all(rule_id, xs)?),
        FormulaOld::Patterns(tok, xs) => Formula::And(tok, convert_all(rule_id, xs)?),
        FormulaOld::PatExtra(tok, extra) => {
            let cond = convert_extra(rule_id, &tok, extra)?;
            Formula::Leaf(Leaf::MetavarCond(tok, cond))
        }
    };
    Ok(converted)
}

fn convert_all(rule_id: &str, xs: Vec<FormulaOld>) -> Result<Vec<Formula>, RuleError> {
    xs.into_iter().map(|x| convert_legacy(rule_id, x)).collect()
}

/// Legacy `metavariable-*` / `where-python` condition → canonical condition
pub fn convert_extra(rule_id: &str, tok: &Tok, extra: Extra) -> Result<MetavarCond, RuleError> {
    match extra {
        Extra::MetavarRegexp(mvar, re) => Ok(MetavarCond::CondRegexp(mvar, re)),
        Extra::MetavarPattern(mvar, xpat) => Ok(MetavarCond::CondPattern(mvar, xpat)),
        Extra::MetavarComparison(MetavarComparison {
            metavariable: Some(mvar),
            comparison,
            strip: Some(true),
        }) => Ok(MetavarCond::CondGeneric(rewrite_metavariable_strip(
            &mvar, comparison,
        ))),
        Extra::MetavarComparison(MetavarComparison { comparison, .. }) => {
            Ok(MetavarCond::CondGeneric(comparison))
        }
        Extra::PatWherePython(_) => {
            tracing::warn!(rule_id, location = %tok.describe(), "where-python condition reached the rule model");
            Err(RuleError::UnsupportedCondition {
                rule_id: rule_id.to_string(),
                kind: "pattern-where-python".to_string(),
                location: tok.describe(),
            })
        }
    }
}

/// Replace every `mvar` in `e` by `int(mvar)`
pub fn rewrite_metavariable_strip(mvar: &str, e: Expr) -> Expr {
    StripRewriter { mvar }.map_expr(e)
}

struct StripRewriter<'a> {
    mvar: &'a str,
}

impl Mapper for StripRewriter<'_> {
    fn map_expr(&mut self, e: Expr) -> Expr {
        match e {
            Expr::Id((name, tok), info) if name == self.mvar => {
                let int = Expr::id(("int".to_string(), Tok::fake_at(&tok)));
                let arg = Expr::Id((name, tok), info);
                Expr::Call(Box::new(int), fake_bracket(vec![Argument::Arg(arg)]))
            }
            other => walk_expr(self, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::rule_model::application::RuleCompilationSession;
    use crate::features::rule_model::domain::{Regexp, Xpattern, XpatternKind};
    use crate::shared::models::generic_ast::{Literal, Operator, Special};
    use pretty_assertions::assert_eq;

    fn pat(session: &RuleCompilationSession, s: &str) -> Xpattern {
        session.mk_pattern(
            XpatternKind::Spacegrep(s.to_string()),
            (s.to_string(), Tok::fake(s)),
        )
    }

    fn id(s: &str) -> Expr {
        Expr::id((s.to_string(), Tok::fake(s)))
    }

    fn gt(l: Expr, r: Expr) -> Expr {
        Expr::special_call(
            Special::Op(Operator::Gt),
            Tok::fake(">"),
            vec![Argument::Arg(l), Argument::Arg(r)],
        )
    }

    fn int_call(e: Expr) -> Expr {
        Expr::call_positional(id("int"), vec![e])
    }

    #[test]
    fn test_legacy_shapes() {
        let s = RuleCompilationSession::new();
        let old = FormulaOld::Patterns(
            Tok::fake("patterns"),
            vec![
                FormulaOld::PatInside(pat(&s, "def f(): ...")),
                FormulaOld::Pat(pat(&s, "foo()")),
                FormulaOld::PatNot(Tok::fake("pattern-not"), pat(&s, "foo(1)")),
                FormulaOld::PatNotInside(Tok::fake("pattern-not-inside"), pat(&s, "if x: ...")),
                FormulaOld::PatEither(
                    Tok::fake("pattern-either"),
                    vec![FormulaOld::Pat(pat(&s, "a")), FormulaOld::Pat(pat(&s, "b"))],
                ),
            ],
        );
        let expected = Formula::And(
            Tok::fake(""),
            vec![
                Formula::inside(pat(&s, "def f(): ...")),
                Formula::pattern(pat(&s, "foo()")),
                Formula::Not(Tok::fake(""), Box::new(Formula::pattern(pat(&s, "foo(1)")))),
                Formula::Not(Tok::fake(""), Box::new(Formula::inside(pat(&s, "if x: ...")))),
                Formula::Or(
                    Tok::fake(""),
                    vec![Formula::pattern(pat(&s, "a")), Formula::pattern(pat(&s, "b"))],
                ),
            ],
        );
        assert_eq!(convert_legacy("r", old).unwrap(), expected);
    }

    #[test]
    fn test_position_token_is_propagated() {
        let s = RuleCompilationSession::new();
        let old = FormulaOld::PatEither(
            Tok::fake("pattern-either"),
            vec![FormulaOld::Pat(pat(&s, "a"))],
        );
        match convert_legacy("r", old).unwrap() {
            Formula::Or(tok, _) => assert_eq!(tok.text(), "pattern-either"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_canonical_input_is_identity() {
        let s = RuleCompilationSession::new();
        let formula = Formula::And(
            Tok::fake("and"),
            vec![Formula::pattern(pat(&s, "x")), Formula::pattern(pat(&s, "y"))],
        );
        assert_eq!(
            formula_of_pformula("r", PFormula::New(formula.clone())).unwrap(),
            formula
        );
    }

    #[test]
    fn test_extra_conditions() {
        let tok = Tok::fake("metavariable-regex");
        let cond = convert_extra(
            "r",
            &tok,
            Extra::MetavarRegexp("$X".to_string(), Regexp::new("^a")),
        )
        .unwrap();
        assert_eq!(
            cond,
            MetavarCond::CondRegexp("$X".to_string(), Regexp::new("^a"))
        );

        let comparison = gt(id("$X"), Expr::L(Literal::Int((Some(2), Tok::fake("2")))));
        let plain = convert_extra(
            "r",
            &tok,
            Extra::MetavarComparison(MetavarComparison {
                metavariable: Some("$X".to_string()),
                comparison: comparison.clone(),
                strip: None,
            }),
        )
        .unwrap();
        assert_eq!(plain, MetavarCond::CondGeneric(comparison));
    }

    #[test]
    fn test_strip_rewrites_every_occurrence() {
        let comparison = gt(id("$X"), Expr::Tuple(fake_bracket(vec![id("$X"), id("$Y")])));
        let cond = convert_extra(
            "r",
            &Tok::fake("metavariable-comparison"),
            Extra::MetavarComparison(MetavarComparison {
                metavariable: Some("$X".to_string()),
                comparison,
                strip: Some(true),
            }),
        )
        .unwrap();
        let expected = gt(
            int_call(id("$X")),
            Expr::Tuple(fake_bracket(vec![int_call(id("$X")), id("$Y")])),
        );
        assert_eq!(cond, MetavarCond::CondGeneric(expected));
    }

    #[test]
    fn test_where_python_is_unsupported() {
        let old = FormulaOld::PatExtra(
            Tok::fake("pattern-where-python"),
            Extra::PatWherePython("vars['$X'] == 1".to_string()),
        );
        let err = convert_legacy("my-rule", old).unwrap_err();
        match err {
            RuleError::UnsupportedCondition { rule_id, kind, .. } => {
                assert_eq!(rule_id, "my-rule");
                assert_eq!(kind, "pattern-where-python");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
