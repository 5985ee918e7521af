//! Rule model operations

mod convert_legacy;
mod partition;
mod session;
mod validate;

pub use convert_legacy::{
    convert_extra, convert_legacy, formula_of_pformula, rewrite_metavariable_strip,
};
pub use partition::partition_rules;
pub use session::RuleCompilationSession;
pub use validate::validate_formula;
