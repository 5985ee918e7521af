//! Shared models
//!
//! - `token`       : source tokens (real and synthetic)
//! - `lang`        : target languages
//! - `generic_ast` : the language-agnostic tree

pub mod generic_ast;
pub mod lang;
pub mod token;

pub use lang::Lang;
pub use token::{fake_bracket, Bracket, Location, Tok, Wrap};
