//! Rule Model Feature
//!
//! Compiled rules: boolean formulas over leaf patterns and metavariable
//! conditions, the legacy flat shape and its conversion, and taint rules.
//!
//! ## Structure
//! - `domain/` - patterns, formulas, rules
//! - `application/` - compilation session, legacy conversion, validation,
//!   partitioning

pub mod application;
pub mod domain;

// Re-exports
pub use application::{
    convert_extra, convert_legacy, formula_of_pformula, partition_rules,
    rewrite_metavariable_strip, validate_formula, RuleCompilationSession,
};
pub use domain::{
    visit_new_formula, Formula, FormulaOld, Leaf, Mode, PFormula, Rule, SearchRule, TaintRule,
    Xlang, Xpattern, XpatternKind,
};
