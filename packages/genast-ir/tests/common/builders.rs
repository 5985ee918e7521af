//! Builders for rule-model values

use genast_ir::features::rule_model::domain::{
    Formula, FormulaOld, Mode, PFormula, Rule, Severity, Xlang, Xpattern, XpatternKind,
};
use genast_ir::features::rule_model::RuleCompilationSession;
use genast_ir::{Lang, Tok};

pub fn tok(s: &str) -> Tok {
    Tok::fake(s)
}

pub fn spacegrep(session: &RuleCompilationSession, text: &str) -> Xpattern {
    session.mk_pattern(
        XpatternKind::Spacegrep(text.to_string()),
        (text.to_string(), tok(text)),
    )
}

/// `patterns: [pattern-inside, pattern, pattern-not, pattern-either]`
pub fn legacy_sample(session: &RuleCompilationSession) -> FormulaOld {
    FormulaOld::Patterns(
        tok("patterns"),
        vec![
            FormulaOld::PatInside(spacegrep(session, "def $F(...): ...")),
            FormulaOld::Pat(spacegrep(session, "eval($X)")),
            FormulaOld::PatNot(tok("pattern-not"), spacegrep(session, "eval(\"...\")")),
            FormulaOld::PatEither(
                tok("pattern-either"),
                vec![
                    FormulaOld::Pat(spacegrep(session, "$X.read()")),
                    FormulaOld::Pat(spacegrep(session, "input()")),
                ],
            ),
        ],
    )
}

/// Canonical equivalent of `legacy_sample`
pub fn canonical_sample(session: &RuleCompilationSession) -> Formula {
    Formula::And(
        tok("and"),
        vec![
            Formula::inside(spacegrep(session, "def $F(...): ...")),
            Formula::pattern(spacegrep(session, "eval($X)")),
            Formula::Not(
                tok("not"),
                Box::new(Formula::pattern(spacegrep(session, "eval(\"...\")"))),
            ),
            Formula::Or(
                tok("or"),
                vec![
                    Formula::pattern(spacegrep(session, "$X.read()")),
                    Formula::pattern(spacegrep(session, "input()")),
                ],
            ),
        ],
    )
}

pub fn search_rule(id: &str, formula: PFormula) -> Rule<Mode> {
    Rule {
        id: (id.to_string(), tok(id)),
        mode: Mode::Search(formula),
        message: format!("{} matched", id),
        severity: Severity::Error,
        languages: Xlang::L(Lang::Python, vec![]),
        file: "rules.yaml".to_string(),
        paths: None,
        fix: None,
        fix_regexp: None,
        metadata: None,
    }
}
