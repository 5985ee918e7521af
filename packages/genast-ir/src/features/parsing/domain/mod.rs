//! Parsing domain models

pub mod python_ast;

pub use python_ast::{Any, Module, ResolvedName};
