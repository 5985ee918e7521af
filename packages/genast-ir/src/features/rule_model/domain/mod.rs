//! Rule model domain types

pub mod formula;
pub mod rule;
pub mod xpattern;

pub use formula::{
    visit_new_formula, Extra, Formula, FormulaOld, Inside, Leaf, MetavarComparison, MetavarCond,
    MetavarName, PFormula,
};
pub use rule::{
    FixRegexp, Mode, Paths, Rule, RuleMode, SearchRule, Severity, TaintRule, TaintSpec, Xlang,
};
pub use xpattern::{PatternId, Regexp, Xpattern, XpatternKind};
