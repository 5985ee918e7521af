//! Generic-tree utilities

pub mod generic_helpers;
pub mod generic_mapper;

pub use generic_helpers::{expr_to_pattern, expr_to_type, is_metavar_name, metavariable_regex};
pub use generic_mapper::Mapper;
