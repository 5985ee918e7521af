//! Language detection domain

pub mod lang_table;
pub mod predicate;
pub mod shebang;
pub mod skip_reason;

pub use lang_table::predicate_for;
pub use predicate::{Predicate, Test};
pub use shebang::{Shebang, ShebangCommand};
pub use skip_reason::{SkipReason, SkipReasonKind};
