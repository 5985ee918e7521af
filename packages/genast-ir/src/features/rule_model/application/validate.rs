//! Formula well-formedness
//!
//! - `Not` appears only as a direct member of an `And`
//! - every `And` has at least one positive member (a pattern, `And`, or `Or`)
//! - `Or` is never empty
//! - every regular expression (leaf or condition) compiles

use crate::errors::RuleError;
use crate::features::rule_model::application::formula_of_pformula;
use crate::features::rule_model::domain::{
    Formula, Leaf, MetavarCond, Rule, RuleMode, XpatternKind,
};
use crate::shared::models::Tok;

pub fn validate_formula(rule_id: &str, formula: &Formula) -> Result<(), RuleError> {
    check(rule_id, formula, false)
}

fn ill_formed(rule_id: &str, tok: &Tok, message: &str) -> RuleError {
    RuleError::IllFormedFormula {
        rule_id: rule_id.to_string(),
        location: tok.describe(),
        message: message.to_string(),
    }
}

fn check(rule_id: &str, formula: &Formula, under_and: bool) -> Result<(), RuleError> {
    match formula {
        Formula::Leaf(Leaf::P(xpat, _)) => match &xpat.kind {
            XpatternKind::Regexp(re) => re.compile(rule_id, xpat.tok()).map(|_| ()),
            XpatternKind::Sem(..) | XpatternKind::Spacegrep(_) => Ok(()),
        },
        Formula::Leaf(Leaf::MetavarCond(tok, cond)) => match cond {
            MetavarCond::CondRegexp(_, re) => re.compile(rule_id, tok).map(|_| ()),
            MetavarCond::CondPattern(_, xpat) => match &xpat.kind {
                XpatternKind::Regexp(re) => re.compile(rule_id, xpat.tok()).map(|_| ()),
                _ => Ok(()),
            },
            MetavarCond::CondGeneric(_) => Ok(()),
        },
        Formula::Not(tok, inner) => {
            if !under_and {
                return Err(ill_formed(
                    rule_id,
                    tok,
                    "negation must be a direct member of a conjunction",
                ));
            }
            check(rule_id, inner, false)
        }
        Formula::And(tok, members) => {
            if !members.iter().any(Formula::is_positive) {
                return Err(ill_formed(
                    rule_id,
                    tok,
                    "conjunction needs at least one positive member",
                ));
            }
            members.iter().try_for_each(|m| check(rule_id, m, true))
        }
        Formula::Or(tok, members) => {
            if members.is_empty() {
                return Err(ill_formed(rule_id, tok, "empty disjunction"));
            }
            members.iter().try_for_each(|m| check(rule_id, m, false))
        }
    }
}

impl<M: RuleMode> Rule<M> {
    /// Validate every formula of the rule, converting legacy ones first
    pub fn validate(&self) -> Result<(), RuleError> {
        for pformula in self.mode.formulas() {
            let formula = formula_of_pformula(self.id(), pformula.clone())?;
            validate_formula(self.id(), &formula)?;
        }
        if let Some(fix) = &self.fix_regexp {
            fix.regexp.compile(self.id(), &self.id.1)?;
        }
        tracing::debug!(rule_id = self.id(), languages = %self.languages, "rule validated");
        Ok(())
    }
}
